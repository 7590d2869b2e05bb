//! Grammar and AST construction.

use sysyc::ast::*;
use sysyc::ty::Typename;

fn parse(source: &str) -> CompileUnit {
    sysyc::parse(source).expect("parse")
}

fn main_body(source: &str) -> Vec<BlockItem> {
    let unit = parse(source);
    for item in unit.items {
        if let GlobalItem::Func(func) = item {
            if func.name == "main" {
                return func.body.items;
            }
        }
    }
    panic!("no main in {}", source);
}

fn return_expr(source: &str) -> Expr {
    match main_body(source).into_iter().next() {
        Some(BlockItem::Stmt(Stmt::Return(Some(expr)))) => expr,
        other => panic!("expected return, got {:?}", other),
    }
}

fn binary_parts(expr: &Expr) -> (BinaryOp, &Expr, &Expr) {
    match expr {
        Expr::Binary { op, lhs, rhs } => (*op, lhs, rhs),
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn precedence_mul_over_add() {
    // 1 + 2 * 3 parses as 1 + (2 * 3).
    let expr = return_expr("int main() { return 1 + 2 * 3; }");
    let (op, lhs, rhs) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(lhs.as_number(), Some(Number::Int(1)));
    let (op, _, _) = binary_parts(rhs);
    assert_eq!(op, BinaryOp::Mul);
}

#[test]
fn arithmetic_is_left_associative() {
    // 10 - 4 - 3 parses as (10 - 4) - 3.
    let expr = return_expr("int main() { return 10 - 4 - 3; }");
    let (op, lhs, rhs) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Sub);
    assert_eq!(rhs.as_number(), Some(Number::Int(3)));
    let (op, _, _) = binary_parts(lhs);
    assert_eq!(op, BinaryOp::Sub);
}

#[test]
fn relational_binds_tighter_than_logical() {
    // a < b && b > a parses as (a < b) && (b > a).
    let items = main_body("int main() { int a; int b; return a < b && b > a; }");
    let BlockItem::Stmt(Stmt::Return(Some(expr))) = &items[2] else {
        panic!("expected return");
    };
    let (op, lhs, rhs) = binary_parts(expr);
    assert_eq!(op, BinaryOp::And);
    assert_eq!(binary_parts(lhs).0, BinaryOp::Lt);
    assert_eq!(binary_parts(rhs).0, BinaryOp::Gt);
}

#[test]
fn or_binds_looser_than_and() {
    // a || b && c parses as a || (b && c).
    let items = main_body("int main() { int a; return a || a && a; }");
    let BlockItem::Stmt(Stmt::Return(Some(expr))) = &items[1] else {
        panic!("expected return");
    };
    let (op, _, rhs) = binary_parts(expr);
    assert_eq!(op, BinaryOp::Or);
    assert_eq!(binary_parts(rhs).0, BinaryOp::And);
}

#[test]
fn parentheses_override_precedence() {
    let expr = return_expr("int main() { return (1 + 2) * 3; }");
    let (op, lhs, _) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Mul);
    assert_eq!(binary_parts(lhs).0, BinaryOp::Add);
}

#[test]
fn unary_operators_nest() {
    let expr = return_expr("int main() { return - ! + 1; }");
    let Expr::Unary {
        op: UnaryOp::Minus,
        expr,
    } = expr
    else {
        panic!("expected unary minus");
    };
    let Expr::Unary {
        op: UnaryOp::Not,
        expr,
    } = *expr
    else {
        panic!("expected unary not");
    };
    assert!(matches!(
        *expr,
        Expr::Unary {
            op: UnaryOp::Plus,
            ..
        }
    ));
}

#[test]
fn dangling_else_attaches_to_inner_if() {
    let items = main_body("int main() { if (1) if (2) return 1; else return 2; return 3; }");
    let BlockItem::Stmt(Stmt::If { then, els, .. }) = &items[0] else {
        panic!("expected if");
    };
    assert!(els.is_none(), "outer if has no else");
    let Stmt::If { els: inner_els, .. } = then.as_ref() else {
        panic!("expected inner if");
    };
    assert!(inner_els.is_some(), "inner if owns the else");
}

#[test]
fn multi_def_declarations() {
    let unit = parse("int a, b = 1, c[2] = {1, 2};");
    let GlobalItem::Decl(Decl::Var(decl)) = &unit.items[0] else {
        panic!("expected var decl");
    };
    assert_eq!(decl.ty, Typename::Int);
    assert_eq!(decl.defs.len(), 3);
    assert!(decl.defs[0].init.is_none());
    assert!(decl.defs[1].init.is_some());
    assert_eq!(decl.defs[2].dims.len(), 1);
}

#[test]
fn function_arg_shapes() {
    let unit = parse("void f(int x, float y, int a[], int b[][4]) {}");
    let GlobalItem::Func(func) = &unit.items[0] else {
        panic!("expected function");
    };
    assert_eq!(func.return_ty, Typename::Void);
    assert_eq!(func.args.len(), 4);
    assert!(func.args[0].dims.is_none());
    assert_eq!(func.args[1].ty, Typename::Float);

    let a_dims = func.args[2].dims.as_ref().unwrap();
    assert_eq!(a_dims.len(), 1);
    assert!(a_dims[0].is_none());

    let b_dims = func.args[3].dims.as_ref().unwrap();
    assert_eq!(b_dims.len(), 2);
    assert!(b_dims[0].is_none());
    assert!(b_dims[1].is_some());
}

#[test]
fn nested_initializer_lists() {
    let unit = parse("int a[2][2] = {{1, 2}, {3}};");
    let GlobalItem::Decl(Decl::Var(decl)) = &unit.items[0] else {
        panic!("expected var decl");
    };
    let Some(InitializerElement::List(rows)) = &decl.defs[0].init else {
        panic!("expected list initializer");
    };
    assert_eq!(rows.len(), 2);
    assert!(matches!(&rows[0], InitializerElement::List(r) if r.len() == 2));
    assert!(matches!(&rows[1], InitializerElement::List(r) if r.len() == 1));
}

#[test]
fn empty_initializer_list() {
    let unit = parse("int a[4] = {};");
    let GlobalItem::Decl(Decl::Var(decl)) = &unit.items[0] else {
        panic!("expected var decl");
    };
    assert_eq!(
        decl.defs[0].init,
        Some(InitializerElement::List(Vec::new()))
    );
}

#[test]
fn literal_forms() {
    let items = main_body(
        "int main() {
             int a = 0x1F;
             int b = 017;
             float c = 1.5;
             float d = .5;
             float e = 2.;
             float f = 1e3;
             float g = 0x1p-1;
             return 0;
         }",
    );
    let expect = [
        Number::Int(31),
        Number::Int(15),
        Number::Float(1.5),
        Number::Float(0.5),
        Number::Float(2.0),
        Number::Float(1000.0),
        Number::Float(0.5),
    ];
    for (item, want) in items.iter().zip(expect) {
        let BlockItem::Decl(Decl::Var(decl)) = item else {
            panic!("expected declaration");
        };
        let Some(InitializerElement::Expr(expr)) = &decl.defs[0].init else {
            panic!("expected scalar initializer");
        };
        assert_eq!(expr.as_number(), Some(want));
    }
}

#[test]
fn call_expressions_and_statements() {
    let items = main_body("int main() { putint(getint()); f(1, 2, 3); return 0; }");
    let BlockItem::Stmt(Stmt::Expr(Expr::Call { name, args })) = &items[0] else {
        panic!("expected call statement");
    };
    assert_eq!(name, "putint");
    assert!(matches!(&args[0], Expr::Call { name, .. } if name == "getint"));

    let BlockItem::Stmt(Stmt::Expr(Expr::Call { args, .. })) = &items[1] else {
        panic!("expected call statement");
    };
    assert_eq!(args.len(), 3);
}

#[test]
fn lvalue_index_chains() {
    let items = main_body("int main() { int g[2][3]; g[1][2] = 5; return g[0][0]; }");
    let BlockItem::Stmt(Stmt::Assign { lvalue, .. }) = &items[1] else {
        panic!("expected assignment");
    };
    assert_eq!(lvalue.name, "g");
    assert_eq!(lvalue.indices.len(), 2);
}

#[test]
fn comments_and_whitespace_ignored() {
    let unit = parse("/* leading */ int /* mid */ main() { return 0; } // trailing");
    assert_eq!(unit.items.len(), 1);
}

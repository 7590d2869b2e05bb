//! Const-eval pass: folding, dimension checking, initializer reshaping.

use sysyc::ast::*;
use sysyc::consteval;
use sysyc::error::Error;

fn folded(source: &str) -> CompileUnit {
    let mut unit = sysyc::parse(source).expect("parse");
    consteval::run(&mut unit).expect("consteval");
    unit
}

fn fold_err(source: &str) -> Error {
    let mut unit = sysyc::parse(source).expect("parse");
    consteval::run(&mut unit).expect_err("consteval should fail")
}

fn first_const_def(unit: &CompileUnit) -> &ConstVariableDef {
    match &unit.items[0] {
        GlobalItem::Decl(Decl::Const(decl)) => &decl.defs[0],
        other => panic!("expected const decl, got {:?}", other),
    }
}

fn var_def(unit: &CompileUnit, item: usize) -> &VariableDef {
    match &unit.items[item] {
        GlobalItem::Decl(Decl::Var(decl)) => &decl.defs[0],
        other => panic!("expected var decl, got {:?}", other),
    }
}

fn int_leaf(v: i32) -> InitializerElement {
    InitializerElement::Expr(Expr::Number(Number::Int(v)))
}

fn float_leaf(v: f32) -> InitializerElement {
    InitializerElement::Expr(Expr::Number(Number::Float(v)))
}

#[test]
fn scalar_const_folds_and_feeds_dimensions() {
    // S1: the constant folds to 7 and the array length resolves through it.
    let unit = folded("const int N = 3 + 4; int a[N];");

    let n = first_const_def(&unit);
    assert_eq!(n.init, int_leaf(7));

    let a = var_def(&unit, 1);
    assert_eq!(a.dims, vec![Expr::Number(Number::Int(7))]);
}

#[test]
fn nested_initializer_reshapes_to_declared_dims() {
    // S2: {1, 2, 3, 4} over [2][3] becomes {{1, 2, 3}, {4, 0, 0}}.
    let unit = folded("int a[2][3] = {1, 2, 3, 4};");
    let a = var_def(&unit, 0);
    assert_eq!(
        a.init.as_ref().unwrap(),
        &InitializerElement::List(vec![
            InitializerElement::List(vec![int_leaf(1), int_leaf(2), int_leaf(3)]),
            InitializerElement::List(vec![int_leaf(4), int_leaf(0), int_leaf(0)]),
        ])
    );
}

#[test]
fn initializer_shape_matches_dims_at_every_level() {
    let unit = folded("int a[2][2][2] = {1, 2, 3, 4, 5};");
    let a = var_def(&unit, 0);
    let InitializerElement::List(level0) = a.init.as_ref().unwrap() else {
        panic!("expected list");
    };
    assert_eq!(level0.len(), 2);
    for level1 in level0 {
        let InitializerElement::List(rows) = level1 else {
            panic!("expected nested list");
        };
        assert_eq!(rows.len(), 2);
        for row in rows {
            let InitializerElement::List(leaves) = row else {
                panic!("expected leaf row");
            };
            assert_eq!(leaves.len(), 2);
            for leaf in leaves {
                assert!(matches!(leaf, InitializerElement::Expr(Expr::Number(_))));
            }
        }
    }
}

#[test]
fn integer_literals_in_float_initializer_become_float() {
    // S3: both leaves coerce to the declared element type.
    let unit = folded("float f[2] = {1, 2};");
    let f = var_def(&unit, 0);
    assert_eq!(
        f.init.as_ref().unwrap(),
        &InitializerElement::List(vec![float_leaf(1.0), float_leaf(2.0)])
    );
}

#[test]
fn scalar_float_const_coerces_int_init() {
    let unit = folded("const float x = 3;");
    assert_eq!(first_const_def(&unit).init, float_leaf(3.0));
}

#[test]
fn const_scalar_substitutes_into_later_declarations() {
    let unit = folded("const int N = 2; const int M = N * 3; int a[M][N];");
    let a = match &unit.items[2] {
        GlobalItem::Decl(Decl::Var(decl)) => &decl.defs[0],
        other => panic!("expected var decl, got {:?}", other),
    };
    assert_eq!(
        a.dims,
        vec![Expr::Number(Number::Int(6)), Expr::Number(Number::Int(2))]
    );
}

#[test]
fn fold_is_idempotent() {
    let source = "
        const int N = 4 / 2 % 3;
        const float F = 1 + N;
        int a[N][N + 1] = {{1}, 2, 3};
        float g[2] = {F, 0};
        int main() { return a[0][0]; }
    ";
    let mut once = sysyc::parse(source).unwrap();
    consteval::run(&mut once).unwrap();

    let mut twice = once.clone();
    consteval::run(&mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn unary_chains_fold() {
    let unit = folded("const int x = -(-3); const int y = +x; const int z = - + - x;");
    assert_eq!(first_const_def(&unit).init, int_leaf(3));
    match &unit.items[2] {
        GlobalItem::Decl(Decl::Const(decl)) => assert_eq!(decl.defs[0].init, int_leaf(3)),
        other => panic!("expected const decl, got {:?}", other),
    }
}

#[test]
fn division_truncates_toward_zero() {
    let unit = folded("const int a = -7 / 2, b = -7 % 2, c = 7 / -2;");
    match &unit.items[0] {
        GlobalItem::Decl(Decl::Const(decl)) => {
            assert_eq!(decl.defs[0].init, int_leaf(-3));
            assert_eq!(decl.defs[1].init, int_leaf(-1));
            assert_eq!(decl.defs[2].init, int_leaf(-3));
        }
        other => panic!("expected const decl, got {:?}", other),
    }
}

#[test]
fn int_float_promotion_in_folding() {
    let unit = folded("const float x = 1 + 2.5;");
    assert_eq!(first_const_def(&unit).init, float_leaf(3.5));
}

#[test]
fn local_declarations_fold_inside_scopes() {
    let unit = folded(
        "const int N = 3;
         int main() {
             const int M = N + 1;
             int a[M];
             return 0;
         }",
    );
    let GlobalItem::Func(func) = &unit.items[1] else {
        panic!("expected function");
    };
    let BlockItem::Decl(Decl::Var(decl)) = &func.body.items[1] else {
        panic!("expected var decl");
    };
    assert_eq!(decl.defs[0].dims, vec![Expr::Number(Number::Int(4))]);
}

#[test]
fn shadowed_constant_folds_to_inner_binding() {
    let unit = folded(
        "const int N = 1;
         int main() {
             const int N = 2;
             int a[N];
             return 0;
         }",
    );
    let GlobalItem::Func(func) = &unit.items[1] else {
        panic!("expected function");
    };
    let BlockItem::Decl(Decl::Var(decl)) = &func.body.items[1] else {
        panic!("expected var decl");
    };
    assert_eq!(decl.defs[0].dims, vec![Expr::Number(Number::Int(2))]);
}

#[test]
fn statement_expressions_are_not_folded() {
    let unit = folded("int main() { return 1 + 2; }");
    let GlobalItem::Func(func) = &unit.items[0] else {
        panic!("expected function");
    };
    let BlockItem::Stmt(Stmt::Return(Some(expr))) = &func.body.items[0] else {
        panic!("expected return");
    };
    assert!(matches!(expr, Expr::Binary { .. }));
}

#[test]
fn const_without_initializer_is_a_syntax_error() {
    assert!(sysyc::parse("const int a;").is_err());
}

#[test]
fn negative_dimension_rejected() {
    assert!(matches!(fold_err("int a[-1];"), Error::InvalidArrayLen));
}

#[test]
fn non_constant_dimension_rejected() {
    assert!(matches!(
        fold_err("int n; int main() { int a[n]; return 0; }"),
        Error::InvalidArrayLen
    ));
}

#[test]
fn float_dimension_rejected() {
    assert!(matches!(fold_err("int a[2.5];"), Error::InvalidArrayLen));
}

#[test]
fn initializer_overflow_rejected() {
    assert!(matches!(
        fold_err("int a[2] = {1, 2, 3};"),
        Error::InitializerOverflow
    ));
}

#[test]
fn too_deep_initializer_rejected() {
    assert!(matches!(
        fold_err("int a[3] = {1, {2}, 3};"),
        Error::InitializerTooDeep
    ));
}

#[test]
fn float_mod_rejected_in_fold() {
    assert!(matches!(fold_err("float x = 1.0 % 2.0;"), Error::FloatMod));
}

#[test]
fn division_by_zero_rejected_in_fold() {
    assert!(matches!(
        fold_err("const int x = 1 / 0;"),
        Error::DivisionByZero
    ));
}

#[test]
fn non_literal_const_initializer_rejected() {
    assert!(matches!(
        fold_err("int main() { int y = 1; const int x = y; return x; }"),
        Error::NonConstInit
    ));
}

#[test]
fn duplicate_const_in_same_scope_rejected() {
    assert!(matches!(
        fold_err("const int a = 1; const int a = 2;"),
        Error::DuplicatedDef(_)
    ));
}

#[test]
fn scalar_with_list_initializer_rejected() {
    assert!(matches!(
        fold_err("int x = {1};"),
        Error::ScalarListInit
    ));
}

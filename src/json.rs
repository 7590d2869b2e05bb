//! JSON rendering of the AST.
//!
//! Written to the log stream after parsing and again after const-eval, so
//! a pass's effect on the tree can be diffed by eye. The output is plain
//! JSON: node kind under `"node"`, children under their field names.

use std::fmt::Write;

use crate::ast::*;

pub fn dump(unit: &CompileUnit) -> String {
    let mut out = String::new();
    let mut w = JsonWriter::new(&mut out);
    w.unit(unit);
    out
}

struct JsonWriter<'a> {
    out: &'a mut String,
}

impl<'a> JsonWriter<'a> {
    fn new(out: &'a mut String) -> Self {
        Self { out }
    }

    fn unit(&mut self, unit: &CompileUnit) {
        self.open("CompileUnit");
        self.key("items");
        self.array(&unit.items, |w, item| match item {
            GlobalItem::Decl(decl) => w.decl(decl),
            GlobalItem::Func(func) => w.func(func),
        });
        self.close();
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Const(decl) => {
                self.open("ConstVariableDecl");
                self.field_str("type", &decl.ty.to_string());
                self.key("defs");
                self.array(&decl.defs, |w, def| {
                    w.open("ConstVariableDef");
                    w.field_str("name", &def.name);
                    w.key("dims");
                    w.array(&def.dims, |w, dim| w.expr(dim));
                    w.key("init");
                    w.initializer(&def.init);
                    w.close();
                });
                self.close();
            }
            Decl::Var(decl) => {
                self.open("VariableDecl");
                self.field_str("type", &decl.ty.to_string());
                self.key("defs");
                self.array(&decl.defs, |w, def| {
                    w.open("VariableDef");
                    w.field_str("name", &def.name);
                    w.key("dims");
                    w.array(&def.dims, |w, dim| w.expr(dim));
                    if let Some(init) = &def.init {
                        w.key("init");
                        w.initializer(init);
                    }
                    w.close();
                });
                self.close();
            }
        }
    }

    fn initializer(&mut self, init: &InitializerElement) {
        match init {
            InitializerElement::Expr(expr) => self.expr(expr),
            InitializerElement::List(elements) => {
                self.open("InitializerList");
                self.key("elements");
                self.array(elements, |w, element| w.initializer(element));
                self.close();
            }
        }
    }

    fn func(&mut self, func: &FunctionDef) {
        self.open("FunctionDef");
        self.field_str("returnType", &func.return_ty.to_string());
        self.field_str("name", &func.name);
        self.key("args");
        self.array(&func.args, |w, arg| {
            w.open("FunctionArg");
            w.field_str("type", &arg.ty.to_string());
            w.field_str("name", &arg.name);
            if let Some(dims) = &arg.dims {
                w.key("dims");
                w.array(dims, |w, dim| match dim {
                    Some(expr) => w.expr(expr),
                    None => w.raw("null"),
                });
            }
            w.close();
        });
        self.key("body");
        self.block(&func.body);
        self.close();
    }

    fn block(&mut self, block: &Block) {
        self.open("Block");
        self.key("elements");
        self.array(&block.items, |w, item| match item {
            BlockItem::Decl(decl) => w.decl(decl),
            BlockItem::Stmt(stmt) => w.stmt(stmt),
        });
        self.close();
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lvalue, rvalue } => {
                self.open("AssignStmt");
                self.key("lvalue");
                self.lvalue(lvalue);
                self.key("rvalue");
                self.expr(rvalue);
                self.close();
            }
            Stmt::Expr(expr) => {
                self.open("ExprStmt");
                self.key("expr");
                self.expr(expr);
                self.close();
            }
            Stmt::Null => {
                self.open("NullStmt");
                self.close();
            }
            Stmt::Block(block) => {
                self.open("BlockStmt");
                self.key("block");
                self.block(block);
                self.close();
            }
            Stmt::If { cond, then, els } => {
                self.open("IfStmt");
                self.key("cond");
                self.expr(cond);
                self.key("then");
                self.stmt(then);
                if let Some(els) = els {
                    self.key("else");
                    self.stmt(els);
                }
                self.close();
            }
            Stmt::While { cond, body } => {
                self.open("WhileStmt");
                self.key("cond");
                self.expr(cond);
                self.key("body");
                self.stmt(body);
                self.close();
            }
            Stmt::Break => {
                self.open("BreakStmt");
                self.close();
            }
            Stmt::Continue => {
                self.open("ContinueStmt");
                self.close();
            }
            Stmt::Return(expr) => {
                self.open("ReturnStmt");
                if let Some(expr) = expr {
                    self.key("expr");
                    self.expr(expr);
                }
                self.close();
            }
        }
    }

    fn lvalue(&mut self, lvalue: &LValue) {
        self.open("LValue");
        self.field_str("name", &lvalue.name);
        self.key("indices");
        self.array(&lvalue.indices, |w, index| w.expr(index));
        self.close();
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(Number::Int(v)) => {
                self.open("NumberExpr");
                self.field_str("type", "int");
                self.key("value");
                self.raw(&v.to_string());
                self.close();
            }
            Expr::Number(Number::Float(v)) => {
                self.open("NumberExpr");
                self.field_str("type", "float");
                self.key("value");
                self.raw(&format!("{:?}", v));
                self.close();
            }
            Expr::Variable(lvalue) => {
                self.open("VariableExpr");
                self.field_str("name", &lvalue.name);
                self.key("indices");
                self.array(&lvalue.indices, |w, index| w.expr(index));
                self.close();
            }
            Expr::Unary { op, expr } => {
                self.open("UnaryExpr");
                let op = match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                    UnaryOp::Not => "!",
                };
                self.field_str("op", op);
                self.key("expr");
                self.expr(expr);
                self.close();
            }
            Expr::Binary { op, lhs, rhs } => {
                self.open("BinaryExpr");
                self.field_str("op", binary_op_str(*op));
                self.key("lhs");
                self.expr(lhs);
                self.key("rhs");
                self.expr(rhs);
                self.close();
            }
            Expr::Call { name, args } => {
                self.open("FunctionCallExpr");
                self.field_str("name", name);
                self.key("args");
                self.array(args, |w, arg| w.expr(arg));
                self.close();
            }
        }
    }

    fn open(&mut self, node: &str) {
        let _ = write!(self.out, "{{\"node\":\"{}\"", node);
    }

    fn close(&mut self) {
        self.out.push('}');
    }

    fn key(&mut self, key: &str) {
        let _ = write!(self.out, ",\"{}\":", key);
    }

    fn field_str(&mut self, key: &str, value: &str) {
        let _ = write!(self.out, ",\"{}\":\"{}\"", key, escape(value));
    }

    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn array<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            each(self, item);
        }
        self.out.push(']');
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_declarations_and_functions() {
        let unit = crate::parse("const int N = 2; int main() { return N; }").unwrap();
        let json = dump(&unit);
        assert!(json.starts_with("{\"node\":\"CompileUnit\""));
        assert!(json.contains("\"node\":\"ConstVariableDecl\""));
        assert!(json.contains("\"name\":\"N\""));
        assert!(json.contains("\"node\":\"FunctionDef\""));
        assert!(json.contains("\"node\":\"ReturnStmt\""));
    }

    #[test]
    fn array_parameter_sentinel_dumps_as_null() {
        let unit = crate::parse("int f(int a[][3]) { return a[0][0]; } int main() { return 0; }")
            .unwrap();
        let json = dump(&unit);
        assert!(json.contains("\"dims\":[null,"));
    }

    #[test]
    fn operators_render_as_source_tokens() {
        let unit = crate::parse("int main() { return 1 + 2 * 3; }").unwrap();
        let json = dump(&unit);
        assert!(json.contains("\"op\":\"+\""));
        assert!(json.contains("\"op\":\"*\""));
    }
}

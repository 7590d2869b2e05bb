//! Whole-pipeline runs over realistic SysY programs.

use sysyc::error::{Error, ErrorKind};
use sysyc::ir::{Instr, Module};

fn compile(source: &str) -> Module {
    sysyc::compile(source).expect("compile")
}

#[test]
fn matrix_sum_program() {
    let module = compile(
        "const int ROWS = 2, COLS = 3;
         int mat[ROWS][COLS] = {{1, 2, 3}, {4, 5, 6}};

         int sum(int a[][3], int rows) {
             int total = 0;
             int i = 0;
             while (i < rows) {
                 int j = 0;
                 while (j < 3) {
                     total = total + a[i][j];
                     j = j + 1;
                 }
                 i = i + 1;
             }
             return total;
         }

         int main() {
             putint(sum(mat, ROWS));
             return 0;
         }",
    );
    assert!(module.function_by_name("sum").is_some());
    assert!(module.global_by_name("mat").is_some());
    let text = module.to_string();
    assert!(text.contains("define internal i32 @sum([3 x i32]* %a, i32 %rows)"));
    assert!(text.contains("icmp slt i32"));
}

#[test]
fn float_average_program() {
    let module = compile(
        "float average(float a[], int n) {
             float total = 0.0;
             int i = 0;
             while (i < n) {
                 total = total + a[i];
                 i = i + 1;
             }
             return total / n;
         }

         int main() {
             float data[4] = {1.5, 2.5, 3.0, 0x1p2};
             putfloat(average(data, 4));
             return 0;
         }",
    );
    let text = module.to_string();
    assert!(text.contains("fadd float"));
    assert!(text.contains("fdiv float"));
    // `total / n` promotes the int operand.
    assert!(text.contains("sitofp i32"));
}

#[test]
fn compound_condition_program() {
    let module = compile(
        "int find(int a[], int n, int key) {
             int i = 0;
             while (i < n && a[i] != key) {
                 i = i + 1;
             }
             if (i == n || a[i] != key) {
                 return -1;
             }
             return i;
         }
         int main() {
             int a[3] = {7, 8, 9};
             return find(a, 3, 8);
         }",
    );
    let find = module.function_by_name("find").unwrap();
    let phis = find
        .blocks
        .iter()
        .flat_map(|b| &b.instrs)
        .filter(|i| matches!(i, Instr::Phi { .. }))
        .count();
    assert_eq!(phis, 2, "one phi per short-circuit operator");
}

#[test]
fn timing_intrinsics_link() {
    compile(
        "int main() {
             _sysy_starttime(1);
             putint(getint());
             _sysy_stoptime(3);
             return 0;
         }",
    );
}

#[test]
fn deeply_nested_control_flow() {
    compile(
        "int classify(int x) {
             if (x > 0) {
                 if (x > 100) {
                     return 2;
                 } else {
                     return 1;
                 }
             } else {
                 if (x < -100) {
                     return -2;
                 }
             }
             return 0;
         }
         int main() { return classify(getint()); }",
    );
}

#[test]
fn else_binds_to_nearest_if() {
    let module = compile(
        "int main() {
             int x = getint();
             if (x > 0)
                 if (x > 10)
                     putint(2);
                 else
                     putint(1);
             return 0;
         }",
    );
    // The else belongs to the inner if, so the outer if has no else arm:
    // its false edge goes straight to a merge block, and both calls to
    // putint sit behind the inner branch.
    let main = module.function_by_name("main").unwrap();
    let branches = main
        .blocks
        .iter()
        .filter(|b| matches!(b.terminator(), Some(Instr::Branch { .. })))
        .count();
    assert_eq!(branches, 2);
}

#[test]
fn local_initializer_stores_every_leaf() {
    let module = compile(
        "int main() {
             int a[2][2] = {1};
             return a[0][0];
         }",
    );
    let main = module.function_by_name("main").unwrap();
    let stores = main
        .blocks
        .iter()
        .flat_map(|b| &b.instrs)
        .filter(|i| matches!(i, Instr::Store { .. }))
        .count();
    // Four element stores; the zero padding is written out too.
    assert_eq!(stores, 4);
}

#[test]
fn const_scalars_vanish_from_expressions() {
    // Inside declaration contexts the name is substituted, so only the
    // global remains; statement uses still load it.
    let module = compile(
        "const int N = 8;
         int main() {
             int a[N];
             a[0] = N;
             return a[0];
         }",
    );
    let text = module.to_string();
    assert!(text.contains("alloca [8 x i32]"));
}

#[test]
fn comment_styles_are_skipped() {
    compile(
        "// line comment
         /* block
            comment */
         int main() { // trailing
             return 0; /* inline */
         }",
    );
}

#[test]
fn literal_radices_accepted() {
    let module = compile(
        "int main() {
             int a = 0x1F;
             int b = 017;
             int c = 10;
             float d = 1.5e1;
             float e = 0x1.8p1;
             return a + b + c;
         }",
    );
    assert!(module.function_by_name("main").is_some());
}

#[test]
fn void_result_in_expression_rejected() {
    let err = sysyc::compile("void f() {} int main() { return f(); }").unwrap_err();
    assert!(matches!(err, Error::UseVoidValue));
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn scalar_argument_for_array_parameter_rejected() {
    let err = sysyc::compile("int main() { return getarray(5); }").unwrap_err();
    assert!(matches!(err, Error::ArgMismatch(_)));
}

#[test]
fn array_argument_for_scalar_parameter_rejected() {
    let err = sysyc::compile("int main() { int a[2] = {1, 2}; putint(a); return 0; }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn error_kinds_route_to_taxonomy() {
    let cases: Vec<(&str, ErrorKind)> = vec![
        ("int main() { return 0 }", ErrorKind::Syntax),
        ("int a[-1]; int main() { return 0; }", ErrorKind::Shape),
        ("const int x = 1 / 0; int main() { return 0; }", ErrorKind::Const),
        ("int main() { break; return 0; }", ErrorKind::Scope),
        ("float x = 1.0 % 2.0; int main() { return 0; }", ErrorKind::Type),
        ("int f() { } int main() { return f(); }", ErrorKind::Internal),
    ];
    for (source, kind) in cases {
        let err = sysyc::compile(source).unwrap_err();
        assert_eq!(err.kind(), kind, "source: {}", source);
    }
}

#[test]
fn parse_errors_carry_positions() {
    let err = sysyc::compile("int main() {\n  return 0\n}").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("syntax error"));
    // The offending token is the `}` on line 3.
    assert!(message.contains("3:1"), "message: {}", message);
}

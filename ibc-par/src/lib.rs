//! Token stream to AST: the Pratt-style precedence-climbing parser and
//! the statement/expression tree it produces.

mod ast;
mod bp;
mod parser;

pub use ast::{BinaryOp, Expr, ExprKind, Literal, PostfixOp, Program, Stmt, UnaryOp};
pub use parser::{parse, Parser};

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_lex::tokenize;

    fn parse_src(src: &str) -> Program {
        parse(tokenize(src).unwrap()).unwrap()
    }

    #[test]
    fn simple_assignment_statement() {
        let prog = parse_src("x = 1\n");
        assert_eq!(prog.len(), 1);
        match &prog[0] {
            Stmt::Expr(e) => match &e.kind {
                ExprKind::Binary(BinaryOp::Assign, lhs, rhs) => {
                    assert!(matches!(lhs.kind, ExprKind::Identifier(_)));
                    assert!(matches!(rhs.kind, ExprKind::Literal(Literal::Int(1))));
                }
                _ => panic!("expected assignment"),
            },
            _ => panic!("expected expr statement"),
        }
    }

    #[test]
    fn if_elseif_else_chain() {
        let src = "if x == 1 then\n\ty = 1\nelse if x == 2\n\ty = 2\nelse\n\ty = 3\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::If { cases, .. } => assert_eq!(cases.len(), 3),
            _ => panic!("expected if statement"),
        }
    }

    #[test]
    fn while_loop_with_block() {
        let src = "while x < 10\n\tx = x+1\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::While { body, .. } => assert_eq!(body.len(), 1),
            _ => panic!("expected while"),
        }
    }

    #[test]
    fn for_range_loop() {
        let src = "loop for i from 0 to n-1\n\ttmp = b\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::ForRange { counter, .. } => assert_eq!(counter, "i"),
            _ => panic!("expected for range"),
        }
    }

    #[test]
    fn function_def_with_params() {
        let src = "method fib(n)\n\treturn n\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::FunctionDef { name, params, .. } => {
                assert_eq!(name, "fib");
                assert_eq!(params, &vec!["n".to_string()]);
            }
            _ => panic!("expected function def"),
        }
    }

    #[test]
    fn call_and_subscript_and_member_chain() {
        let src = "a.b(1)[2]\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::Expr(e) => assert!(matches!(e.kind, ExprKind::Subscript(_, _))),
            _ => panic!("expected expr"),
        }
    }

    #[test]
    fn parenthesized_expression_is_rvalue() {
        let src = "(x)\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::Expr(e) => assert!(e.force_rvalue),
            _ => panic!("expected expr"),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let src = "x = y = 1\n";
        let prog = parse_src(src);
        match &prog[0] {
            Stmt::Expr(e) => match &e.kind {
                ExprKind::Binary(BinaryOp::Assign, _, rhs) => {
                    assert!(matches!(rhs.kind, ExprKind::Binary(BinaryOp::Assign, _, _)));
                }
                _ => panic!("expected assignment"),
            },
            _ => panic!("expected expr"),
        }
    }

    #[test]
    fn indentation_error_on_over_indent() {
        let src = "x = 1\n\t\ty = 2\n";
        assert!(parse(tokenize(src).unwrap()).is_err());
    }

    #[quickcheck_macros::quickcheck]
    fn integer_literal_statement_parses_to_a_single_expr_stmt(n: u32) -> bool {
        let src = format!("{n}\n");
        match parse(tokenize(&src).unwrap()) {
            Ok(prog) => {
                prog.len() == 1
                    && matches!(&prog[0], Stmt::Expr(e) if matches!(e.kind, ExprKind::Literal(Literal::Int(v)) if v == n as i64))
            }
            Err(_) => false,
        }
    }
}

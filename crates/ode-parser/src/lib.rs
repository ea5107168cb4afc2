//! Parser for the Ode language.
//!
//! Transforms a token stream into an abstract syntax tree. Indentation is
//! the block structure: each two-space unit at the start of a line arrives
//! as one `Whitespace` token, and a block is the run of lines carrying
//! exactly the expected number of units.

mod parser;

pub use parser::{ParseError, Parser};

#[cfg(test)]
mod tests {
    use super::*;
    use ode_ast::expr::{BinOp, ExprKind};
    use ode_ast::stmt::{Stmt, StmtKind};
    use ode_ast::Program;

    fn parse(src: &str) -> Program {
        let tokens = ode_lexer::Lexer::new(src).tokenize().expect("lex error");
        Parser::new(tokens).parse().expect("parse error")
    }

    fn parse_err(src: &str) -> ParseError {
        let tokens = ode_lexer::Lexer::new(src).tokenize().expect("lex error");
        Parser::new(tokens).parse().expect_err("expected a parse error")
    }

    #[test]
    fn simple_assignment() {
        let program = parse("x = 5");
        assert_eq!(program.len(), 1);
        let StmtKind::Assign { name, value } = &program[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(name, "x");
        assert!(matches!(value.kind, ExprKind::Number(n) if n == 5.0));
    }

    #[test]
    fn compound_assignment_desugars_to_binary() {
        let program = parse("x += 2");
        let StmtKind::Assign { name, value } = &program[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(name, "x");
        let ExprKind::Binary { op, left, right } = &value.kind else {
            panic!("expected binary rhs");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(&left.kind, ExprKind::Ident(n) if n == "x"));
        assert!(matches!(right.kind, ExprKind::Number(n) if n == 2.0));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("y = 1+2*3");
        let StmtKind::Assign { value, .. } = &program[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(&right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn comparisons_bind_at_the_term_level() {
        // `1 + 2 < 3` groups as `1 + (2 < 3)` in this grammar.
        let program = parse("y = 1 + 2 < 3");
        let StmtKind::Assign { value, .. } = &program[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(&right.kind, ExprKind::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn call_statement() {
        let program = parse("print(1, 2)");
        let StmtKind::Expr(expr) = &program[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { name, args } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(name, "print");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn if_elif_else_chain() {
        let program = parse("if a\n  x = 1\nelif b\n  x = 2\nelse\n  x = 3");
        assert_eq!(program.len(), 1);
        let StmtKind::If { arms, else_body } = &program[0].kind else {
            panic!("expected conditional");
        };
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].1.len(), 1);
        assert_eq!(else_body.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn blank_lines_do_not_break_a_chain() {
        let program = parse("if a\n  x = 1\n\nelse\n  x = 2");
        assert_eq!(program.len(), 1);
        let StmtKind::If { else_body, .. } = &program[0].kind else {
            panic!("expected conditional");
        };
        assert!(else_body.is_some());
    }

    #[test]
    fn shallower_line_ends_the_block() {
        let program = parse("if a\n  x = 1\ny = 2");
        assert_eq!(program.len(), 2);
        let StmtKind::If { arms, .. } = &program[0].kind else {
            panic!("expected conditional");
        };
        assert_eq!(arms[0].1.len(), 1);
    }

    #[test]
    fn nested_blocks() {
        let program = parse("if a\n  if b\n    x = 1\n  y = 2");
        let StmtKind::If { arms, .. } = &program[0].kind else {
            panic!("expected conditional");
        };
        assert_eq!(arms[0].1.len(), 2);
        let Stmt { kind: StmtKind::If { arms: inner, .. }, .. } = &arms[0].1[0] else {
            panic!("expected nested conditional");
        };
        assert_eq!(inner[0].1.len(), 1);
    }

    #[test]
    fn over_indented_line_is_an_error() {
        let err = parse_err("if a\n    x = 1");
        assert!(err.message.contains("indentation"), "{}", err.message);
    }

    #[test]
    fn function_definition_shape() {
        let program = parse("fn add(a, b)\n  return a + b");
        let StmtKind::FnDef { name, params, body } = &program[0].kind else {
            panic!("expected function definition");
        };
        assert_eq!(name, "add");
        assert_eq!(params, &["a".to_string(), "b".to_string()]);
        assert!(matches!(&body[0].kind, StmtKind::Return(Some(_))));
    }

    #[test]
    fn nested_function_definition_is_an_error() {
        let err = parse_err("if a\n  fn f()\n    return");
        assert!(err.message.contains("top level"), "{}", err.message);
    }

    #[test]
    fn return_without_value() {
        let program = parse("fn f()\n  return\nx = 1");
        let StmtKind::FnDef { body, .. } = &program[0].kind else {
            panic!("expected function definition");
        };
        assert!(matches!(&body[0].kind, StmtKind::Return(None)));
        assert!(matches!(&program[1].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn index_assignment_on_a_variable() {
        let program = parse("x[0] = 1");
        let StmtKind::IndexAssign { object, .. } = &program[0].kind else {
            panic!("expected index assignment");
        };
        assert!(matches!(&object.kind, ExprKind::Ident(n) if n == "x"));
    }

    #[test]
    fn nested_index_assignment() {
        let program = parse("x[0][1] = 2");
        let StmtKind::IndexAssign { object, .. } = &program[0].kind else {
            panic!("expected index assignment");
        };
        assert!(matches!(&object.kind, ExprKind::Index { .. }));
    }

    #[test]
    fn compound_index_assignment_desugars() {
        let program = parse("x[0] += 1");
        let StmtKind::IndexAssign { value, .. } = &program[0].kind else {
            panic!("expected index assignment");
        };
        let ExprKind::Binary { op, left, .. } = &value.kind else {
            panic!("expected binary rhs");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(&left.kind, ExprKind::Index { .. }));
    }

    #[test]
    fn indexing_a_call_result_is_not_assignable() {
        let err = parse_err("fn get_x()\n  return x\n\nget_x()[0] = 1");
        assert!(err.message.contains("assignment target"), "{}", err.message);
    }

    #[test]
    fn collection_literals_accept_newline_separators() {
        let program = parse("x = [\n  1,\n  2\n  3\n]");
        let StmtKind::Assign { value, .. } = &program[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Array(values) = &value.kind else {
            panic!("expected array literal");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn dictionary_literal() {
        let program = parse(r#"x = {"a": 1, "b": 2}"#);
        let StmtKind::Assign { value, .. } = &program[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Dict(pairs) = &value.kind else {
            panic!("expected dictionary literal");
        };
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn method_calls_chain() {
        let program = parse("x.get(0).to_string()");
        let StmtKind::Expr(expr) = &program[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::MethodCall { object, method, .. } = &expr.kind else {
            panic!("expected method call");
        };
        assert_eq!(method, "to_string");
        assert!(matches!(&object.kind, ExprKind::MethodCall { .. }));
    }

    #[test]
    fn increment_forms() {
        let program = parse("y = x++\nz = ++x");
        let StmtKind::Assign { value, .. } = &program[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&value.kind, ExprKind::PostIncDec { increment: true, .. }));
        let StmtKind::Assign { value, .. } = &program[1].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&value.kind, ExprKind::PreIncDec { increment: true, .. }));
    }

    #[test]
    fn unclosed_call_is_an_error() {
        let err = parse_err("print(1");
        assert!(err.message.contains("')'"), "{}", err.message);
    }

    #[test]
    fn trailing_tokens_after_a_statement_are_an_error() {
        let err = parse_err("x = 1 y");
        assert!(err.message.contains("end of line"), "{}", err.message);

        let err = parse_err("fn main()\n  robot.get_location()x");
        assert!(err.message.contains("end of line"), "{}", err.message);
    }

    #[test]
    fn statements_must_start_with_a_keyword_or_name() {
        let err = parse_err("5 + 5");
        assert!(err.message.contains("Expected a statement"), "{}", err.message);
    }
}

#[cfg(test)]
mod parser_tests {
    use hi_interpreter as hi;

    use hi::ast::{Expr, Stmt};
    use hi::ast_printer::AstPrinter;
    use hi::parser::Parser;
    use hi::scanner::scan_tokens;
    use hi::session::parse_program;
    use pretty_assertions::assert_eq;

    fn parse_expr(source: &str) -> String {
        let tokens = scan_tokens(source).expect("source should scan");
        let expr = Parser::new(tokens)
            .parse_expression()
            .expect("source should parse");

        AstPrinter::print(&expr)
    }

    fn parse_stmts(source: &str) -> Vec<String> {
        parse_program(source)
            .expect("program should parse")
            .iter()
            .map(AstPrinter::print_stmt)
            .collect()
    }

    fn parse_errors(source: &str) -> Vec<String> {
        parse_program(source)
            .expect_err("program should not parse")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_parser_01_precedence() {
        assert_eq!(parse_expr("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(parse_expr("-1 * 2"), "(* (- 1.0) 2.0)");
        assert_eq!(parse_expr("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(parse_expr("1 == 2 != yerr"), "(!= (== 1.0 2.0) yerr)");
        assert_eq!(parse_expr("1 < 2 == 3 >= 4"), "(== (< 1.0 2.0) (>= 3.0 4.0))");
        assert_eq!(parse_expr("!!nahh"), "(! (! nahh))");
    }

    #[test]
    fn test_parser_02_logical_and_assignment() {
        assert_eq!(parse_expr("x or y and z"), "(or x (and y z))");
        assert_eq!(parse_expr("a = b = 1"), "(= a (= b 1.0))");
        assert_eq!(parse_expr("obj.field = nada"), "(= (. obj field) nada)");
    }

    #[test]
    fn test_parser_03_calls_properties_and_arrays() {
        assert_eq!(
            parse_expr("obj.field.method(1, 2)"),
            "(call (. (. obj field) method) 1.0 2.0)"
        );
        assert_eq!(parse_expr("f()()"), "(call (call f))");
        assert_eq!(parse_expr("[1, \"two\", nada]"), "(array 1.0 two nada)");
        assert_eq!(parse_expr("[]"), "(array)");
        assert_eq!(parse_expr("super.greet"), "(super greet)");
    }

    #[test]
    fn test_parser_04_statements() {
        assert_eq!(
            parse_stmts("var a; var b = 2; print a; a;"),
            vec![
                "(var a)".to_string(),
                "(var b = 2.0)".to_string(),
                "(print a)".to_string(),
                "(; a)".to_string(),
            ]
        );

        assert_eq!(
            parse_stmts("if (a) print 1; else { print 2; }"),
            vec!["(if a (print 1.0) (block (print 2.0)))".to_string()]
        );

        assert_eq!(
            parse_stmts("while (x) x = x - 1;"),
            vec!["(while x (; (= x (- x 1.0))))".to_string()]
        );
    }

    #[test]
    fn test_parser_05_functions_and_classes() {
        assert_eq!(
            parse_stmts("fun add(a, b) { return a + b; }"),
            vec!["(fun add(a b) (return (+ a b)))".to_string()]
        );

        assert_eq!(
            parse_stmts("class B < A { init(x) { self.x = x; } get() { return; } }"),
            vec![
                "(class B < A (method init(x) (; (= (. self x) x))) (method get() (return)))"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_parser_06_for_is_desugared_to_while() {
        assert_eq!(
            parse_stmts("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec![
                "(block (var i = 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
                    .to_string()
            ]
        );

        assert_eq!(
            parse_stmts("for (;;) print 1;"),
            vec!["(while yerr (print 1.0))".to_string()]
        );

        let program = parse_program("for (i = 0; i < 1;) {}").unwrap();

        match &program[0] {
            Stmt::Block(inner) => {
                assert!(matches!(inner[0], Stmt::Expression(Expr::Assign { .. })));
                assert!(matches!(inner[1], Stmt::While { .. }));
            }
            other => panic!("expected a block, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_07_collects_every_error() {
        assert_eq!(
            parse_errors("var = 1;\nprint ;\nvar ok = 2;\nprint (1;"),
            vec![
                "[line 1] Error: Expect variable name.".to_string(),
                "[line 2] Error: Expect expression.".to_string(),
                "[line 4] Error: Expect ')' after expression.".to_string(),
            ]
        );
    }

    #[test]
    fn test_parser_08_invalid_assignment_target() {
        assert_eq!(
            parse_errors("1 + 2 = 3;"),
            vec!["[line 1] Error: Invalid assignment target.".to_string()]
        );
    }

    #[test]
    fn test_parser_09_argument_limit() {
        let args = |n: usize| vec!["1"; n].join(", ");

        assert!(parse_program(&format!("f({});", args(255))).is_ok());

        assert_eq!(
            parse_errors(&format!("f({});", args(256))),
            vec!["[line 1] Error: Can't have more than 255 arguments.".to_string()]
        );
    }

    #[test]
    fn test_parser_10_parameter_limit() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        assert_eq!(
            parse_errors(&source),
            vec!["[line 1] Error: Can't have more than 255 parameters.".to_string()]
        );
    }

    #[test]
    fn test_parser_11_trailing_tokens_after_expression() {
        let tokens = scan_tokens("1 2").unwrap();
        let err = Parser::new(tokens).parse_expression().unwrap_err();

        assert_eq!(err.to_string(), "[line 1] Error: Unexpected '2' after expression.");
    }

    #[test]
    fn test_parser_12_deep_nesting_does_not_overflow() {
        let depth = 2_000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

        let printed = parse_expr(&source);

        assert!(printed.starts_with("(group (group"));
    }
}

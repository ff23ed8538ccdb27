mod common;

#[cfg(test)]
mod interpreter_tests {
    use hi_interpreter as hi;

    use hi::error::{HiError, NativeError, RuntimeError};
    use hi::interpreter::Interpreter;
    use hi::session::Session;
    use hi::value::Value;
    use pretty_assertions::assert_eq;

    use crate::common::{run, run_err, run_ok, session, SharedBuffer};

    // ── arithmetic and printing ──────────────────────────────────────────

    #[test]
    fn test_interpreter_01_arithmetic_precedence() {
        assert_eq!(run_ok("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run_ok("print (1 + 2) * 3;"), "9\n");
        assert_eq!(run_ok("print -2 - -3;"), "1\n");
    }

    #[test]
    fn test_interpreter_02_number_formatting() {
        assert_eq!(run_ok("print 6 / 2;"), "3\n");
        assert_eq!(run_ok("print 7 / 2;"), "3.5\n");
        assert_eq!(run_ok("print 3.14;"), "3.14\n");
        assert_eq!(run_ok("print round(PI * 100) / 100;"), "3.14\n");
        assert_eq!(run_ok("print 1 / 0;"), "inf\n");
    }

    #[test]
    fn test_interpreter_03_literals_and_truthiness() {
        assert_eq!(
            run_ok("print yerr; print nahh; print nada; print \"hi\";"),
            "yerr\nnahh\nnada\nhi\n"
        );

        assert_eq!(
            run_ok("print !nada; print !nahh; print !0; print !\"\";"),
            "yerr\nyerr\nnahh\nnahh\n"
        );
    }

    #[test]
    fn test_interpreter_04_equality_and_comparison() {
        assert_eq!(
            run_ok(
                "print 1 == 1; print \"a\" == \"a\"; print 1 == \"1\"; \
                 print nada == nada; print nada == nahh; print 2 != 3;"
            ),
            "yerr\nyerr\nnahh\nyerr\nnahh\nyerr\n"
        );

        assert_eq!(
            run_ok("print 1 < 2; print 2 <= 2; print 3 > 4; print 4 >= 5;"),
            "yerr\nyerr\nnahh\nnahh\n"
        );
    }

    #[test]
    fn test_interpreter_05_string_concatenation() {
        assert_eq!(run_ok("var a = \"hi\"; print a + \" there\";"), "hi there\n");
    }

    #[test]
    fn test_interpreter_06_logical_operators_return_operands() {
        assert_eq!(
            run_ok("print nada or \"x\"; print 0 and 1; print nahh and boom; print yerr or boom;"),
            "x\n1\nnahh\nyerr\n"
        );
    }

    // ── variables and scope ──────────────────────────────────────────────

    #[test]
    fn test_interpreter_07_block_scoping() {
        assert_eq!(
            run_ok("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
    }

    #[test]
    fn test_interpreter_08_assignment_reaches_enclosing_scope() {
        assert_eq!(
            run_ok("var a = 1; { a = a + 1; { a = a * 10; } } print a;"),
            "20\n"
        );
    }

    #[test]
    fn test_interpreter_09_closures_bind_lexically() {
        let source = r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
        "#;

        assert_eq!(run_ok(source), "global\nglobal\n");
    }

    #[test]
    fn test_interpreter_10_control_flow() {
        assert_eq!(
            run_ok("if (1 > 2) print \"no\"; else print \"yes\";"),
            "yes\n"
        );

        assert_eq!(
            run_ok("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            "0\n1\n2\n"
        );

        assert_eq!(
            run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
    }

    // ── functions ────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_11_independent_closures() {
        let source = r#"
            fun make(n) {
                fun f() { return n; }
                return f;
            }
            var one = make(1);
            var two = make(2);
            print one();
            print two();
            print one();
        "#;

        assert_eq!(run_ok(source), "1\n2\n1\n");
    }

    #[test]
    fn test_interpreter_12_closures_share_captured_state() {
        let source = r#"
            fun counter() {
                var i = 0;
                fun inc() { i = i + 1; return i; }
                return inc;
            }
            var c = counter();
            c();
            c();
            print c();
        "#;

        assert_eq!(run_ok(source), "3\n");
    }

    #[test]
    fn test_interpreter_13_recursion_and_early_return() {
        let source = r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(15);

            fun first(limit) {
                for (var i = 0; ; i = i + 1) {
                    if (i * i > limit) return i;
                }
            }
            print first(50);

            fun nothing() {}
            print nothing();
        "#;

        assert_eq!(run_ok(source), "610\n8\nnada\n");
    }

    #[test]
    fn test_interpreter_14_callables_print() {
        assert_eq!(
            run_ok("fun f() {} class C {} print f; print C; print clock; print C();"),
            "<fn f>\nC\n<native fn clock>\nC instance\n"
        );
    }

    // ── classes ──────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_15_initializer_and_methods() {
        let source = r#"
            class A {
                init(x) { self.x = x; }
                getX() { return self.x; }
            }
            var a = A(5);
            print a.getX();
        "#;

        assert_eq!(run_ok(source), "5\n");
    }

    #[test]
    fn test_interpreter_16_inherited_methods() {
        let source = r#"
            class A {
                init(x) { self.x = x; }
                getX() { return self.x; }
            }
            class B < A {}
            var b = B(7);
            print b.getX();
        "#;

        assert_eq!(run_ok(source), "7\n");
    }

    #[test]
    fn test_interpreter_17_super_calls() {
        let source = r#"
            class A {
                name() { return "A"; }
                describe() { return "I am " + self.name(); }
            }
            class B < A {
                name() { return "B" + super.name(); }
            }
            class C < B {
                describe() { return super.describe() + "!"; }
            }
            print B().name();
            print C().describe();
        "#;

        assert_eq!(run_ok(source), "BA\nI am BA!\n");
    }

    #[test]
    fn test_interpreter_18_initializer_returns_self() {
        let source = r#"
            class P {
                init() { self.v = 1; return; }
            }
            var p = P();
            p.v = 2;
            print p.init().v;
            print p.init() == p;
        "#;

        assert_eq!(run_ok(source), "1\nyerr\n");
    }

    #[test]
    fn test_interpreter_19_fields_and_bound_methods() {
        let source = r#"
            class Box {
                get() { return self.value; }
            }
            var b = Box();
            b.value = "held";
            var m = b.get;
            b.value = "changed";
            print m();
            print Box() == Box();
            print b == b;
        "#;

        assert_eq!(run_ok(source), "changed\nnahh\nyerr\n");
    }

    // ── arrays ───────────────────────────────────────────────────────────

    #[test]
    fn test_interpreter_20_array_builtins() {
        let source = r#"
            var a = Array(3);
            print a;
            print a.length;
            a.set(0, 5);
            a.add("x");
            print a.get(0);
            print a.length;
            print a;
        "#;

        assert_eq!(
            run_ok(source),
            "[nada, nada, nada]\n3\n5\n4\n[5, nada, nada, x]\n"
        );
    }

    #[test]
    fn test_interpreter_21_array_literals_and_sort() {
        let source = r#"
            var a = [3, 1.5, -2, 10];
            a.sort();
            print a;
            var nested = [1, [2, 3], []];
            print nested;
            var same = a;
            same.add(0);
            print a.length;
        "#;

        assert_eq!(run_ok(source), "[-2, 1.5, 3, 10]\n[1, [2, 3], []]\n5\n");
    }

    #[test]
    fn test_interpreter_22_self_containing_array_prints() {
        assert_eq!(run_ok("var a = [1]; a.add(a); print a;"), "[1, [...]]\n");
    }

    #[test]
    fn test_interpreter_23_natives() {
        assert_eq!(
            run_ok("print sin(0); print cos(0); print tan(0); print round(2.5); print clock() > 0;"),
            "0\n1\n0\n3\nyerr\n"
        );
    }

    // ── runtime errors ───────────────────────────────────────────────────

    #[test]
    fn test_interpreter_24_type_errors() {
        assert_eq!(
            run_err("print 1 / 2 + \"x\";"),
            vec!["[line 1] Error: Operands must be two numbers or two strings.".to_string()]
        );

        assert_eq!(
            run_err("print -\"x\";"),
            vec!["[line 1] Error: Operand must be a number.".to_string()]
        );

        assert_eq!(
            run_err("print\n1 <\nnada;"),
            vec!["[line 2] Error: Operands must be numbers.".to_string()]
        );
    }

    #[test]
    fn test_interpreter_25_lookup_errors() {
        assert_eq!(
            run_err("print y;"),
            vec!["[line 1] Error: Undefined variable 'y'.".to_string()]
        );

        assert_eq!(
            run_err("y = 1;"),
            vec!["[line 1] Error: Undefined variable 'y'.".to_string()]
        );

        assert_eq!(
            run_err("class C {} print C().x;"),
            vec!["[line 1] Error: Undefined property 'x'.".to_string()]
        );

        assert_eq!(
            run_err("print [1].missing;"),
            vec!["[line 1] Error: Undefined property 'missing'.".to_string()]
        );
    }

    #[test]
    fn test_interpreter_26_call_errors() {
        assert_eq!(
            run_err("\"x\"();"),
            vec!["[line 1] Error: Can only call functions and classes.".to_string()]
        );

        assert_eq!(
            run_err("fun f(a) {} f();"),
            vec!["[line 1] Error: Expected 1 arguments but got 0.".to_string()]
        );

        assert_eq!(
            run_err("class P { init(a, b) {} } P(1);"),
            vec!["[line 1] Error: Expected 2 arguments but got 1.".to_string()]
        );

        assert_eq!(
            run_err("var n = 1; n.x = 2;"),
            vec!["[line 1] Error: Only instances have fields.".to_string()]
        );

        assert_eq!(
            run_err("var N = 1; class C < N {}"),
            vec!["[line 1] Error: Superclass must be a class.".to_string()]
        );
    }

    #[test]
    fn test_interpreter_27_native_errors() {
        assert_eq!(
            run_err("var a = [1];\nprint a.get(1);"),
            vec!["[line 2] Error: Index 1 is out of range for an array of length 1.".to_string()]
        );

        assert_eq!(
            run_err("[1, 2].set(0.5, 0);"),
            vec![
                "[line 1] Error: Index 0.5 is out of range for an array of length 2.".to_string()
            ]
        );

        assert_eq!(
            run_err("var a = [1, \"x\"]; a.sort();"),
            vec!["[line 1] Error: Can only sort an array of numbers, found a string.".to_string()]
        );

        assert_eq!(
            run_err("Array(-1);"),
            vec!["[line 1] Error: Array size must be a non-negative integer.".to_string()]
        );

        assert_eq!(
            run_err("Array(1000000000000000000);"),
            vec!["[line 1] Error: Array size 1000000000000000000 is too large.".to_string()]
        );

        assert_eq!(
            run_err("sin(\"x\");"),
            vec!["[line 1] Error: Operand must be a number.".to_string()]
        );
    }

    #[test]
    fn test_interpreter_28_native_error_is_kept_as_source() {
        let (_, result) = run("[].get(0);");
        let errors = result.unwrap_err();

        match &errors[0] {
            HiError::Runtime(RuntimeError::Native { error, line }) => {
                assert_eq!(*line, 1);
                assert_eq!(
                    *error,
                    NativeError::IndexOutOfRange {
                        index: 0.0,
                        length: 0
                    }
                );
            }
            other => panic!("expected a native error, got {:?}", other),
        }
    }

    #[test]
    fn test_interpreter_29_stack_overflow() {
        let buffer = SharedBuffer::default();
        let interpreter = Interpreter::with_output(Box::new(buffer.clone())).with_max_call_depth(64);
        let mut session = Session::with_interpreter(interpreter);

        let errors = session
            .run("fun down(n) { return down(n + 1); }\ndown(0);")
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Stack overflow.");
        assert!(errors[0].is_runtime());

        // The limit is on depth, not on the number of calls.
        session
            .run("fun count(n) { if (n > 0) return count(n - 1); return 0; }\nfor (var i = 0; i < 100; i = i + 1) count(60);")
            .unwrap();
    }

    #[test]
    fn test_interpreter_30_default_depth_limit_is_reported() {
        assert_eq!(
            run_err("fun f() { f(); } f();"),
            vec!["[line 1] Error: Stack overflow.".to_string()]
        );
    }

    // ── phases and sessions ──────────────────────────────────────────────

    #[test]
    fn test_interpreter_31_static_errors_prevent_execution() {
        let (output, result) = run("print \"before\";\nprint ;");

        assert_eq!(output, "");
        assert!(!result.unwrap_err()[0].is_runtime());

        let (output, result) = run("print \"before\";\nvar a = a;");

        assert_eq!(output, "");
        assert_eq!(
            result.unwrap_err()[0].to_string(),
            "[line 2] Error: Can't read local variable in its own initializer."
        );
    }

    #[test]
    fn test_interpreter_32_runtime_error_keeps_earlier_output() {
        let (output, result) = run("print 1;\nprint nope;\nprint 2;");

        assert_eq!(output, "1\n");
        assert_eq!(
            result.unwrap_err()[0].to_string(),
            "[line 2] Error: Undefined variable 'nope'."
        );
    }

    #[test]
    fn test_interpreter_33_session_keeps_globals_between_runs() {
        let (mut session, buffer) = session();

        session.run("var x = 1; fun bump() { x = x + 1; }").unwrap();
        session.run("bump(); bump();").unwrap();

        // A runtime error inside a block leaves the session usable.
        assert!(session.run("{ var inner = 1; print missing; }").is_err());
        assert!(session.run("print inner;").is_err());

        session.run("print x;").unwrap();

        assert_eq!(buffer.contents(), "3\n");
    }

    #[test]
    fn test_interpreter_34_evaluate_expression() {
        let (mut session, _) = session();

        session.run("var base = 40;").unwrap();

        let value = session.evaluate("base + 2").unwrap();

        assert!(matches!(value, Value::Number(n) if n == 42.0));
        assert_eq!(value.to_string(), "42");

        let errors = session.evaluate("base +").unwrap_err();

        assert_eq!(errors[0].to_string(), "[line 1] Error: Expect expression.");
    }

    #[test]
    fn test_interpreter_35_globals_are_predefined() {
        let interpreter = Interpreter::new();
        let globals = interpreter.globals().borrow();

        for name in ["clock", "sin", "cos", "tan", "round", "Array", "PI"] {
            let token = hi::token::Token::new(hi::token::TokenType::IDENTIFIER, name, 0);
            assert!(globals.get(&token).is_ok(), "missing global '{}'", name);
        }
    }

    #[test]
    fn test_interpreter_36_rejected_sort_leaves_array_untouched() {
        let (mut session, buffer) = session();

        let errors = session
            .run("var a = [2, \"x\", 1];\na.sort();")
            .unwrap_err();

        assert_eq!(
            errors[0].to_string(),
            "[line 2] Error: Can only sort an array of numbers, found a string."
        );

        session.run("print a; print a.length;").unwrap();

        assert_eq!(buffer.contents(), "[2, x, 1]\n3\n");
    }

    #[test]
    fn test_interpreter_37_deeply_nested_program_runs() {
        let depth = 10_000;
        let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));

        assert_eq!(run_ok(&source), "1\n");

        let blocks = format!("{}print 2;{}", "{".repeat(depth), "}".repeat(depth));

        assert_eq!(run_ok(&blocks), "2\n");
    }

    #[test]
    fn test_interpreter_38_global_redefinition_reads_previous_value() {
        assert_eq!(run_ok("var a = 1; var a = a + 1; print a;"), "2\n");

        let (mut session, buffer) = session();

        session.run("var count = 1;").unwrap();
        session.run("var count = count + 1;").unwrap();
        session.run("print count;").unwrap();

        assert_eq!(buffer.contents(), "2\n");

        // A name nothing has bound yet still can't read itself.
        let errors = session.run("var fresh = fresh;").unwrap_err();

        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error: Can't read local variable in its own initializer."
        );
    }
}

mod common;

#[cfg(test)]
mod interpreter_tests {
    use super::common::{output, runtime_error, session};

    // ── scoping and closures ─────────────────────────────────────────────

    #[test]
    fn test_block_shadowing() {
        let source = r#"
            var a = "outer";
            {
                var a = "inner";
                print a;
            }
            print a;
        "#;

        assert_eq!(output(source), "inner\nouter\n");
    }

    #[test]
    fn test_closure_binds_lexically() {
        let source = r#"
            var a = "global";
            {
                fun showA() { print a; }
                showA();
                var a = "block";
                showA();
                print a;
            }
        "#;

        assert_eq!(output(source), "global\nglobal\nblock\n");
    }

    #[test]
    fn test_counter_closure() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
            counter();
        "#;

        assert_eq!(output(source), "1\n2\n3\n");
    }

    #[test]
    fn test_counters_do_not_share_state() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var a = makeCounter();
            var b = makeCounter();
            a();
            a();
            b();
            a();
        "#;

        assert_eq!(output(source), "1\n2\n1\n3\n");
    }

    #[test]
    fn test_closures_capture_variables_not_values() {
        let source = r#"
            var f;
            {
                var x = 1;
                fun g() { return x; }
                x = 2;
                f = g;
            }
            print f();
        "#;

        assert_eq!(output(source), "2\n");
    }

    #[test]
    fn test_recursion() {
        let source = r#"
            fun fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }
            print fib(10);
        "#;

        assert_eq!(output(source), "55\n");
    }

    #[test]
    fn test_function_literals() {
        let source = r#"
            var twice = fun (f, x) { return f(f(x)); };
            print twice(fun (n) { return n * 3; }, 2);
        "#;

        assert_eq!(output(source), "18\n");
    }

    // ── control flow ─────────────────────────────────────────────────────

    #[test]
    fn test_break_exits_only_the_innermost_loop() {
        let source = r#"
            var count = 0;
            for (var i = 0; i < 3; i = i + 1) {
                while (true) { break; }
                count = count + 1;
            }
            print count;
        "#;

        assert_eq!(output(source), "3\n");
    }

    #[test]
    fn test_continue_in_for_still_increments() {
        let source = r#"
            for (var i = 0; i < 5; i = i + 1) {
                if (i == 2) continue;
                print i;
            }
        "#;

        assert_eq!(output(source), "0\n1\n3\n4\n");
    }

    #[test]
    fn test_continue_in_while() {
        let source = r#"
            var i = 0;
            while (i < 3) {
                i = i + 1;
                if (i == 2) continue;
                print i;
            }
        "#;

        assert_eq!(output(source), "1\n3\n");
    }

    #[test]
    fn test_return_unwinds_loops() {
        let source = r#"
            fun first() {
                var i = 0;
                while (true) {
                    i = i + 1;
                    if (i == 3) return i;
                }
            }
            print first();
        "#;

        assert_eq!(output(source), "3\n");
    }

    #[test]
    fn test_if_else_and_logical_operators() {
        let source = r#"
            if (nil) print "no"; else print "yes";
            print nil or "default";
            print 0 and "zero is truthy";
            print false and undefined;
        "#;

        assert_eq!(output(source), "yes\ndefault\nzero is truthy\nfalse\n");
    }

    // ── expressions ──────────────────────────────────────────────────────

    #[test]
    fn test_arithmetic() {
        assert_eq!(output("print 10 / 2;"), "5\n");
        assert_eq!(output("print 7 / 2;"), "3.5\n");
        assert_eq!(output("print 1 + 2 * 3 - 4;"), "3\n");
        assert_eq!(output("print -(2 - 5);"), "3\n");
        assert_eq!(output("print 3.0;"), "3\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(output(r#"print "a" + "b";"#), "ab\n");
        assert_eq!(output(r#"print "n" + 1;"#), "n1\n");
        assert_eq!(output(r#"print 2.5 + "x";"#), "2.5x\n");
    }

    #[test]
    fn test_conditional_and_comma() {
        assert_eq!(output(r#"print 1 < 2 ? "yes" : "no";"#), "yes\n");
        assert_eq!(output("print nil ? 1 : false ? 2 : 3;"), "3\n");
        assert_eq!(output("var x = (1, 2, 3); print x;"), "3\n");
        assert_eq!(output("var a; var b; a = 1, b = 2; print a + b;"), "3\n");
    }

    #[test]
    fn test_equality() {
        let source = r#"
            class A {}
            fun f() {}
            var a = A();
            print 1 == 1;
            print "a" == "a";
            print nil == false;
            print 1 == "1";
            print A() == A();
            print a == a;
            print f == f;
            print 1 != 2;
        "#;

        assert_eq!(
            output(source),
            "true\ntrue\nfalse\nfalse\nfalse\ntrue\ntrue\ntrue\n"
        );
    }

    #[test]
    fn test_print_formats() {
        let source = r#"
            class A {}
            fun f() {}
            print nil;
            print true;
            print "text";
            print clock;
            print f;
            print fun () {};
            print A;
            print A();
        "#;

        assert_eq!(
            output(source),
            "none\ntrue\ntext\n<native fn clock>\n<fn f>\n<fn>\nA\nA instance\n"
        );
    }

    #[test]
    fn test_clock() {
        assert_eq!(output("var t = clock(); print t > 0;"), "true\n");
    }

    // ── classes ──────────────────────────────────────────────────────────

    #[test]
    fn test_class_fields_and_methods() {
        let source = r#"
            class Counter {
                init(start) { this.n = start; }
                inc() {
                    this.n = this.n + 1;
                    return this;
                }
            }
            var c = Counter(10);
            c.inc().inc();
            print c.n;
        "#;

        assert_eq!(output(source), "12\n");
    }

    #[test]
    fn test_init_with_bare_return_yields_instance() {
        let source = r#"
            class P {
                init(x) {
                    this.x = x;
                    return;
                    this.x = "unreachable";
                }
            }
            var p = P(1);
            print p.x;
            print p.init(2) == p;
            print p.x;
        "#;

        assert_eq!(output(source), "1\ntrue\n2\n");
    }

    #[test]
    fn test_fields_shadow_methods() {
        let source = r#"
            class A { m() { return "method"; } }
            var a = A();
            print a.m();
            a.m = "field";
            print a.m;
        "#;

        assert_eq!(output(source), "method\nfield\n");
    }

    #[test]
    fn test_bound_methods_remember_this() {
        let source = r#"
            class Box {
                init(v) { this.v = v; }
                get() {
                    fun inner() { return this.v; }
                    return inner;
                }
            }
            var getter = Box("kept").get();
            print getter();
            var m = Box("bound").get;
            print m()();
        "#;

        assert_eq!(output(source), "kept\nbound\n");
    }

    // ── runtime errors ───────────────────────────────────────────────────

    #[test]
    fn test_divide_by_zero_aborts() {
        let (error, out) = runtime_error("print 1;\nprint 10 / 0;\nprint 2;");

        assert_eq!(error, "Divide by zero.\n[line 2]");
        assert_eq!(out, "1\n");
    }

    #[test]
    fn test_arity_mismatch() {
        let (error, _) = runtime_error("fun f(a) { return a; }\nf(1, 2);");
        assert_eq!(error, "Expected 1 arguments but got 2.\n[line 2]");

        let (error, _) = runtime_error("clock(1);");
        assert_eq!(error, "Expected 0 arguments but got 1.\n[line 1]");

        let (error, _) = runtime_error("class A { init(x) { this.x = x; } }\nA();");
        assert_eq!(error, "Expected 1 arguments but got 0.\n[line 2]");
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            runtime_error(r#"print -"a";"#).0,
            "Operand must be a number.\n[line 1]"
        );
        assert_eq!(
            runtime_error(r#"print 1 < "a";"#).0,
            "Operands must be numbers.\n[line 1]"
        );
        assert_eq!(
            runtime_error(r#"print "a" + true;"#).0,
            "Operands must be two numbers or two strings.\n[line 1]"
        );
        assert_eq!(
            runtime_error(r#""text"();"#).0,
            "Can only call functions and classes.\n[line 1]"
        );
    }

    #[test]
    fn test_undefined_names() {
        assert_eq!(
            runtime_error("print missing;").0,
            "Undefined variable 'missing'.\n[line 1]"
        );
        assert_eq!(
            runtime_error("missing = 1;").0,
            "Undefined variable 'missing'.\n[line 1]"
        );
        assert_eq!(
            runtime_error("class A {}\nprint A().nope;").0,
            "Undefined property 'nope'.\n[line 2]"
        );
    }

    #[test]
    fn test_property_access_on_non_instances() {
        assert_eq!(
            runtime_error("print 1.x;").0,
            "Only instances have properties.\n[line 1]"
        );
        assert_eq!(
            runtime_error(r#"var s = "str"; s.f = 1;"#).0,
            "Only instances have fields.\n[line 1]"
        );
    }

    // ── sessions ─────────────────────────────────────────────────────────

    #[test]
    fn test_session_keeps_globals_between_runs() {
        let (mut ze, buffer) = session();

        ze.run("var a = 1;").unwrap();
        ze.run("fun f() { return a; }").unwrap();
        assert!(ze.run("print nope;").is_err());
        ze.run("a = a + 1;").unwrap();
        ze.run("print f();").unwrap();

        assert_eq!(buffer.contents(), "2\n");
        assert!(ze.global_names().contains(&"f".to_string()));
    }

    #[test]
    fn test_session_closures_survive_their_source() {
        let (mut ze, buffer) = session();

        ze.run("fun make() { var n = 0; fun next() { n = n + 1; return n; } return next; }")
            .unwrap();
        ze.run("var next = make();").unwrap();
        ze.run("next();").unwrap();
        ze.run("print next();").unwrap();

        assert_eq!(buffer.contents(), "2\n");
    }

    #[test]
    fn test_static_error_leaves_session_untouched() {
        let (mut ze, buffer) = session();

        ze.run("var a = 1;").unwrap();
        assert_eq!(ze.run("a = 2; print ;").unwrap_err().exit_code(), 64);
        ze.run("print a;").unwrap();

        assert_eq!(buffer.contents(), "1\n");
    }

    #[test]
    fn test_natives_are_predefined() {
        let (ze, _) = session();

        assert_eq!(ze.global_names(), vec!["clock".to_string()]);
    }
}

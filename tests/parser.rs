#[cfg(test)]
mod parser_tests {
    use ze::ast::{Expr, Stmt};
    use ze::ast_printer::AstPrinter;
    use ze::parser::Parser;

    fn printed(source: &str) -> Vec<String> {
        let statements = ze::parse(source)
            .unwrap_or_else(|errors| panic!("unexpected parse errors: {:?}", errors));

        statements.iter().map(AstPrinter::print_stmt).collect()
    }

    fn errors(source: &str) -> Vec<String> {
        match ze::parse(source) {
            Ok(statements) => panic!("expected errors, parsed {:?}", statements),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            printed("print 1 + 2 * 3 - -4 / (5);"),
            vec!["(print (- (+ 1 (* 2 3)) (/ (- 4) (group 5))))"]
        );
        assert_eq!(
            printed("a == b < c or d and !e;"),
            vec!["(; (or (== a (< b c)) (and d (! e))))"]
        );
    }

    #[test]
    fn test_conditional_is_right_associative() {
        assert_eq!(
            printed("a ? b : c ? d : e;"),
            vec!["(; (?: a b (?: c d e)))"]
        );
    }

    #[test]
    fn test_comma_sequence_and_call_arguments() {
        assert_eq!(printed("a, b = 1, c;"), vec!["(; (comma a (= b 1) c))"]);
        assert_eq!(printed("f(1, 2)(3);"), vec!["(; (call (call f 1 2) 3))"]);
    }

    #[test]
    fn test_assignment_chains_and_property_set() {
        assert_eq!(printed("a = b = c;"), vec!["(; (= a (= b c)))"]);
        assert_eq!(printed("o.p.q = 1;"), vec!["(; (.= (. o p) q 1))"]);
    }

    #[test]
    fn test_for_is_desugared_into_while() {
        assert_eq!(
            printed("for (var i = 0; i < 3; i = i + 1) print i;"),
            vec!["(block (var i 0) (while (< i 3) (print i) (= i (+ i 1))))"]
        );
        assert_eq!(printed("for (;;) break;"), vec!["(while true (break))"]);
    }

    #[test]
    fn test_for_keeps_increment_outside_body() {
        let statements = ze::parse("for (; x; x = x - 1) { continue; }").unwrap();

        match &statements[0] {
            Stmt::While {
                body, increment, ..
            } => {
                assert!(matches!(**body, Stmt::Block(_)));
                assert!(matches!(increment, Some(Expr::Assign { .. })));
            }
            other => panic!("expected a while loop, got {:?}", other),
        }
    }

    #[test]
    fn test_functions_and_classes() {
        assert_eq!(
            printed("fun add(a, b) { return a + b; }"),
            vec!["(fun add (a b) (return (+ a b)))"]
        );
        assert_eq!(
            printed("var f = fun (x) { return; };"),
            vec!["(var f (fun (x) (return)))"]
        );
        assert_eq!(
            printed("class A { init(x) { this.x = x; } get() { return this.x; } }"),
            vec!["(class A (init (x) (; (.= this x x))) (get () (return (. this x))))"]
        );
    }

    #[test]
    fn test_statements() {
        assert_eq!(
            printed("var s = \"hi\"; if (s) print s; else { print nil; }"),
            vec![
                "(var s \"hi\")",
                "(if-else s (print s) (block (print nil)))",
            ]
        );
        assert_eq!(
            printed("while (true) { continue; }"),
            vec!["(while true (block (continue)))"]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            errors("1 = 2;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
        assert_eq!(
            errors("a + b = c;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_recovers_and_reports_every_error() {
        let source = "var = 1;\nprint ;\nprint 3;\nprint 4";

        assert_eq!(
            errors(source),
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 2] Error at ';': Expect expression.",
                "[line 4] Error at end: Expect ';' after value.",
            ]
        );
    }

    #[test]
    fn test_loop_jumps_need_a_loop() {
        assert_eq!(
            errors("break;"),
            vec!["[line 1] Error at 'break': Must be inside a loop to use 'break'."]
        );
        assert_eq!(
            errors("while (true) {\n fun f() { continue; }\n}"),
            vec!["[line 2] Error at 'continue': Must be inside a loop to use 'continue'."]
        );
    }

    #[test]
    fn test_super_is_reserved() {
        assert_eq!(
            errors("super.x;"),
            vec!["[line 1] Error at 'super': Expect expression."]
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let args: Vec<&str> = vec!["0"; 256];
        let source = format!("f({});", args.join(", "));

        assert_eq!(
            errors(&source),
            vec!["[line 1] Error at '0': Can't have more than 255 arguments."]
        );
    }

    #[test]
    fn test_missing_eof_is_supplied() {
        let (mut tokens, _) = ze::tokenize("print 1;");
        tokens.pop();

        let statements = Parser::new(tokens).parse().unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_empty_program() {
        assert!(printed("// nothing here\n").is_empty());
    }
}

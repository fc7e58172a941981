mod common;

#[cfg(test)]
mod resolver_tests {
    use super::common::{parse, run_ok, FILE};

    use glpc::ast::{Expr, ExprId, SetTarget, Stmt};
    use glpc::parser::Program;
    use glpc::resolver::{Resolutions, Resolver};
    use glpc::scanner::scan_tokens;
    use proptest::prelude::*;

    /// Every name-bearing expression in source order, paired with its
    /// resolved distance.
    fn distances(source: &str) -> Vec<(String, Option<usize>)> {
        let program = match parse(source) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected syntax errors in {:?}:\n{}", source, errors),
        };

        let mut refs = Vec::new();
        for stmt in &program.statements {
            walk_stmt(stmt, &mut refs);
        }

        refs.into_iter()
            .map(|(name, id)| (name, program.resolutions.distance(id)))
            .collect()
    }

    fn walk_stmt(stmt: &Stmt, refs: &mut Vec<(String, ExprId)>) {
        match stmt {
            Stmt::Block(statements) => statements.iter().for_each(|s| walk_stmt(s, refs)),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Import { .. } => {}
            Stmt::Class {
                superclass,
                methods,
                ..
            } => {
                if let Some(superclass) = superclass {
                    walk_expr(superclass, refs);
                }
                for method in methods {
                    method.body.iter().for_each(|s| walk_stmt(s, refs));
                }
            }
            Stmt::Expression(expr) => walk_expr(expr, refs),
            Stmt::Function(function) => function.body.iter().for_each(|s| walk_stmt(s, refs)),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                walk_expr(condition, refs);
                walk_stmt(then_branch, refs);
                if let Some(else_branch) = else_branch {
                    walk_stmt(else_branch, refs);
                }
            }
            Stmt::For {
                initializer,
                condition,
                body,
                increment,
                ..
            } => {
                if let Some(initializer) = initializer {
                    walk_stmt(initializer, refs);
                }
                if let Some(condition) = condition {
                    walk_expr(condition, refs);
                }
                walk_stmt(body, refs);
                if let Some(increment) = increment {
                    walk_expr(increment, refs);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    walk_expr(value, refs);
                }
            }
            Stmt::Var { initializer, .. } => {
                if let Some(initializer) = initializer {
                    walk_expr(initializer, refs);
                }
            }
        }
    }

    fn walk_expr(expr: &Expr, refs: &mut Vec<(String, ExprId)>) {
        match expr {
            Expr::Assign { id, name, value } => {
                refs.push((name.lexeme.clone(), *id));
                walk_expr(value, refs);
            }
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                walk_expr(left, refs);
                walk_expr(right, refs);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                walk_expr(callee, refs);
                arguments.iter().for_each(|a| walk_expr(a, refs));
            }
            Expr::Get { object, .. } => walk_expr(object, refs),
            Expr::Set {
                object,
                target,
                value,
            } => {
                walk_expr(object, refs);
                if let SetTarget::Index { index, .. } = target {
                    walk_expr(index, refs);
                }
                walk_expr(value, refs);
            }
            Expr::Grouping(inner) => walk_expr(inner, refs),
            Expr::Index { object, index, .. } => {
                walk_expr(object, refs);
                walk_expr(index, refs);
            }
            Expr::List { elements, .. } => elements.iter().for_each(|e| walk_expr(e, refs)),
            Expr::Literal(_) => {}
            Expr::Unary { right, .. } => walk_expr(right, refs),
            Expr::Variable { id, name } => refs.push((name.lexeme.clone(), *id)),
            Expr::This { id, keyword } | Expr::Super { id, keyword, .. } => {
                refs.push((keyword.lexeme.clone(), *id))
            }
        }
    }

    fn expected(pairs: &[(&str, Option<usize>)]) -> Vec<(String, Option<usize>)> {
        pairs.iter().map(|(n, d)| (n.to_string(), *d)).collect()
    }

    fn messages(source: &str) -> Vec<String> {
        match parse(source) {
            Ok(_) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.message.clone()).collect(),
        }
    }

    #[test]
    fn test_scope_bookkeeping() {
        let tokens = scan_tokens(b"a b", FILE);
        let (a, b) = (&tokens[0], &tokens[1]);

        let mut resolver = Resolver::new();

        // Top level: nothing is tracked.
        assert!(resolver.declare(a).is_ok());
        assert_eq!(resolver.depth(), 0);
        assert_eq!(resolver.peek("a"), None);
        assert_eq!(resolver.local(ExprId(0), a), None);

        resolver.begin();
        resolver.declare(a).expect("first declaration");
        assert_eq!(resolver.peek("a"), Some(false));

        let error = resolver.check_initializer(a).expect_err("read in own initializer");
        assert_eq!(error.message, "Cannot read local variable in its own initializer.");

        resolver.define(a);
        assert_eq!(resolver.peek("a"), Some(true));
        assert!(resolver.check_initializer(a).is_ok());

        resolver.begin();
        assert_eq!(resolver.local(ExprId(1), a), Some(1));

        assert!(resolver.declare(b).is_ok());
        let error = resolver.declare(b).expect_err("duplicate declaration");
        assert_eq!(error.message, "Variable with this name already declared in this scope.");
        assert_eq!(error.location, "at 'b'");
        assert_eq!(resolver.local(ExprId(2), b), Some(0));

        resolver.end();
        resolver.end();
        resolver.end();
        assert_eq!(resolver.depth(), 0);

        let resolutions = resolver.into_resolutions();
        assert_eq!(resolutions.len(), 2);
        assert_eq!(resolutions.distance(ExprId(0)), None);
        assert_eq!(resolutions.distance(ExprId(1)), Some(1));
        assert_eq!(resolutions.distance(ExprId(2)), Some(0));
    }

    #[test]
    fn test_resolutions_extend() {
        let mut first = Resolutions::new();
        first.record(ExprId(0), 2);

        let mut second = Resolutions::new();
        second.record(ExprId(5), 0);

        first.extend(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.distance(ExprId(0)), Some(2));
        assert_eq!(first.distance(ExprId(5)), Some(0));
        assert!(Resolutions::new().is_empty());
    }

    #[test]
    fn test_parameter_and_closure_distances() {
        assert_eq!(
            distances("fn f(a) { return a; }"),
            expected(&[("a", Some(0))])
        );

        assert_eq!(
            distances(
                "fn outer() { var x = 1; fn inner() { return x; } return inner; }"
            ),
            expected(&[("x", Some(1)), ("inner", Some(0))])
        );
    }

    #[test]
    fn test_recursive_local_function_resolves() {
        assert_eq!(
            distances("{ fn f(n) { return f(n); } }"),
            expected(&[("f", Some(1)), ("n", Some(0))])
        );
    }

    #[test]
    fn test_this_and_super_distances() {
        assert_eq!(
            distances("class A : B { m() { return super.m() + this.v; } }"),
            expected(&[("B", None), ("super", Some(2)), ("this", Some(1))])
        );

        assert_eq!(
            distances("class A { m() { fn inner() { return this; } } }"),
            expected(&[("this", Some(2))])
        );
    }

    #[test]
    fn test_loop_variable_distances() {
        assert_eq!(
            distances("fn f() { for (var i = 0; i < 3; i += 1) { print(i); } }"),
            expected(&[
                ("i", Some(0)),
                ("print", None),
                ("i", Some(1)),
                ("i", Some(0)),
                ("i", Some(0)),
            ])
        );
    }

    #[test]
    fn test_globals_stay_unresolved() {
        assert_eq!(
            distances("var g = 1; fn f() { return g; } g = 2;"),
            expected(&[("g", None), ("g", None)])
        );
    }

    #[test]
    fn test_nested_blocks() {
        assert_eq!(
            distances("{ var a = 1; { var b = 2; a; b; } a; }"),
            expected(&[("a", Some(1)), ("b", Some(0)), ("a", Some(0))])
        );
    }

    #[test]
    fn test_local_redeclaration_is_an_error() {
        let tests = [
            "{ var a = 1; var a = 2; }",
            "fn f(a, a) {}",
            "fn f() { var a; var a; }",
            "{ fn g() {} var g; }",
        ];

        for input in tests {
            assert_eq!(
                messages(input),
                vec!["Variable with this name already declared in this scope.".to_string()],
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_shadowing_and_globals_are_allowed() {
        let tests = [
            "var a = 1; { var a = 2; }",
            "{ var a = 1; { var a = 2; } }",
            "var a = 1; var a = 2;",
            "var a = a;",
            "fn f(a) { { var b = a; } }",
        ];

        for input in tests {
            assert!(messages(input).is_empty(), "input: {}", input);
        }
    }

    #[test]
    fn test_local_read_in_own_initializer() {
        assert_eq!(
            messages("{ var a = 1; { var a = a; } }"),
            vec!["Cannot read local variable in its own initializer.".to_string()]
        );
    }

    #[test]
    fn test_class_inheriting_itself_inside_block() {
        assert_eq!(
            messages("{ class A : A {} }"),
            vec!["A class can't inherit from itself.".to_string()]
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let program: Program = match parse("var a = 1; { var b = a; b = a + b; }") {
            Ok(program) => program,
            Err(errors) => panic!("{}", errors),
        };

        let mut refs = Vec::new();
        for stmt in &program.statements {
            walk_stmt(stmt, &mut refs);
        }

        let mut ids: Vec<ExprId> = refs.iter().map(|(_, id)| *id).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert!(ids.iter().all(|id| id.0 < program.next_id));
    }

    fn nested_source(depth: usize, declared_at: usize) -> String {
        let mut source = String::new();

        for level in 1..=depth {
            source.push_str("{ ");
            if level == declared_at {
                source.push_str("var x = 1; ");
            }
        }

        source.push_str("print(x); ");

        for _ in 0..depth {
            source.push_str("} ");
        }

        source
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_block_distance_matches_nesting(
            (depth, declared_at) in (1usize..8).prop_flat_map(|d| (Just(d), 1..=d))
        ) {
            let source = nested_source(depth, declared_at);

            prop_assert_eq!(
                distances(&source),
                expected(&[("print", None), ("x", Some(depth - declared_at))])
            );

            let (_, output) = run_ok(&source);
            prop_assert_eq!(output, "1\n");
        }
    }
}

mod common;

#[cfg(test)]
mod modules_tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::common::{global, interpreter, SharedBuffer};

    use glpc::environment::Environment;
    use glpc::error::{GlpcError, RuntimeError, RuntimeErrorKind};
    use glpc::modules::ModuleCache;
    use glpc::value::Value;
    use glpc::Interpreter;

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    /// Scratch directory removed on drop.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new() -> Self {
            let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
            let dir = std::env::temp_dir().join(format!("glpc-modules-{}-{}", std::process::id(), n));
            fs::create_dir_all(&dir).expect("create scratch dir");
            Scratch(dir)
        }

        fn write(&self, name: &str, source: &str) -> PathBuf {
            let path = self.0.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create module dir");
            }
            fs::write(&path, source).expect("write module");
            path
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn run_file(path: &Path) -> (Interpreter, Result<Rc<RefCell<Environment>>, GlpcError>, SharedBuffer) {
        let (mut interpreter, buffer) = interpreter();
        let result = interpreter.run_file(path);
        (interpreter, result, buffer)
    }

    fn runtime_error(result: Result<Rc<RefCell<Environment>>, GlpcError>) -> RuntimeError {
        match result {
            Err(GlpcError::Runtime(error)) => error,
            Err(other) => panic!("expected a runtime error, got {:?}", other),
            Ok(_) => panic!("program unexpectedly succeeded"),
        }
    }

    #[test]
    fn test_import_merges_bindings() {
        let dir = Scratch::new();
        dir.write("lib.gpc", "var greeting = \"hi\"; fn double(x) { return x * 2; }");
        let main = dir.write("main.gpc", "import \"lib.gpc\"; var r = double(21); print(greeting);");

        let (_, result, buffer) = run_file(&main);
        let env = result.expect("main runs");

        assert_eq!(global(&env, "r"), Value::int(42));
        assert_eq!(buffer.contents(), "hi\n");
    }

    #[test]
    fn test_module_functions_use_module_globals() {
        let dir = Scratch::new();
        dir.write(
            "counter.gpc",
            "var count = 0; fn bump() { count += 1; return count; }",
        );
        let main = dir.write(
            "main.gpc",
            "import \"counter.gpc\"; bump(); var r = bump(); var seen = count;",
        );

        let (_, result, _) = run_file(&main);
        let env = result.expect("main runs");

        assert_eq!(global(&env, "r"), Value::int(2));
        // The importer holds a copy taken when the import ran.
        assert_eq!(global(&env, "seen"), Value::int(0));
    }

    #[test]
    fn test_module_runs_once() {
        let dir = Scratch::new();
        dir.write("lib.gpc", "print(\"loading\"); var x = 1;");
        dir.write("a.gpc", "import \"lib.gpc\";");
        let main = dir.write(
            "main.gpc",
            "import \"lib.gpc\"; import \"a.gpc\"; import \"lib.gpc\"; var r = x;",
        );

        let (interpreter, result, buffer) = run_file(&main);
        let env = result.expect("main runs");

        assert_eq!(global(&env, "r"), Value::int(1));
        assert_eq!(buffer.contents(), "loading\n");
        assert_eq!(interpreter.modules().len(), 3);
    }

    #[test]
    fn test_local_binding_wins_over_import() {
        let dir = Scratch::new();
        dir.write("lib.gpc", "var name = \"lib\"; fn who() { return name; }");
        let main = dir.write(
            "main.gpc",
            "var name = \"main\"; import \"lib.gpc\"; var r = name; var w = who();",
        );

        let (_, result, _) = run_file(&main);
        let env = result.expect("main runs");

        assert_eq!(global(&env, "r"), Value::string("main"));
        assert_eq!(global(&env, "w"), Value::string("lib"));
    }

    #[test]
    fn test_nested_relative_imports() {
        let dir = Scratch::new();
        dir.write("dir/sub/util.gpc", "var deep = 7;");
        dir.write("dir/helper.gpc", "import \"sub/util.gpc\"; var mid = deep + 1;");
        let main = dir.write("main.gpc", "import \"dir/helper.gpc\"; var r = mid; var d = deep;");

        let (_, result, _) = run_file(&main);
        let env = result.expect("main runs");

        assert_eq!(global(&env, "r"), Value::int(8));
        assert_eq!(global(&env, "d"), Value::int(7));
    }

    #[test]
    fn test_missing_module() {
        let dir = Scratch::new();
        let main = dir.write("main.gpc", "import \"nope.gpc\";");

        let (interpreter, result, _) = run_file(&main);
        let error = runtime_error(result);

        assert_eq!(error.kind, RuntimeErrorKind::Import);
        assert!(
            error.message.starts_with("Unable to import 'nope.gpc': "),
            "message: {}",
            error.message
        );
        assert!(interpreter.modules().is_empty());
    }

    #[test]
    fn test_module_with_syntax_errors() {
        let dir = Scratch::new();
        dir.write("bad.gpc", "var = ;");
        let main = dir.write("main.gpc", "import \"bad.gpc\";");

        let (interpreter, result, _) = run_file(&main);
        let error = runtime_error(result);

        assert_eq!(error.kind, RuntimeErrorKind::Import);
        assert!(
            error.message.starts_with("Syntax errors in imported module '"),
            "message: {}",
            error.message
        );
        assert!(error.message.contains("Expect variable name."));
        assert_eq!(error.token.lexeme, "import");
        assert!(interpreter.modules().is_empty());
    }

    #[test]
    fn test_module_runtime_error_propagates() {
        let dir = Scratch::new();
        dir.write("boom.gpc", "var x = missing;");
        let main = dir.write("main.gpc", "import \"boom.gpc\";");

        let (interpreter, result, _) = run_file(&main);
        let error = runtime_error(result);

        assert_eq!(error.kind, RuntimeErrorKind::UndefinedVariable);
        assert!(error.token.file.ends_with("boom.gpc"));
        assert!(interpreter.modules().is_empty());
    }

    #[test]
    fn test_circular_imports_terminate() {
        let dir = Scratch::new();
        let a = dir.write("a.gpc", "import \"b.gpc\"; var a = 1;");
        dir.write("b.gpc", "import \"a.gpc\"; var b = 2;");

        let (interpreter, result, _) = run_file(&a);
        let env = result.expect("cycle loads");

        assert_eq!(global(&env, "a"), Value::int(1));
        assert_eq!(global(&env, "b"), Value::int(2));
        assert_eq!(interpreter.modules().len(), 2);
    }

    #[test]
    fn test_self_import_is_ignored() {
        let dir = Scratch::new();
        let main = dir.write("main.gpc", "import \"main.gpc\"; var r = 1;");

        let (_, result, _) = run_file(&main);
        let env = result.expect("main runs");

        assert_eq!(global(&env, "r"), Value::int(1));
    }

    #[test]
    fn test_missing_script_is_io_error() {
        let dir = Scratch::new();
        let (_, result, _) = run_file(&dir.0.join("absent.gpc"));

        assert!(matches!(result, Err(GlpcError::Io(_))));
    }

    #[test]
    fn test_preloaded_module_cache() {
        let dir = Scratch::new();
        let lib = dir.write("lib.gpc", "print(\"should not run\");");
        let main = dir.write("main.gpc", "import \"lib.gpc\"; var r = cached;");

        let mut env = Environment::new();
        env.insert("cached", Value::int(5));

        let canonical = fs::canonicalize(&lib).expect("canonical path");
        let mut cache = ModuleCache::new();
        cache.insert(canonical.clone(), Rc::new(RefCell::new(env)));

        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(buffer.clone()).with_module_cache(cache);
        let env = interpreter.run_file(&main).expect("main runs");

        assert_eq!(global(&env, "r"), Value::int(5));
        assert_eq!(buffer.contents(), "");
        assert!(interpreter.modules().get(&canonical).is_some());
    }

    #[test]
    fn test_interpreters_keep_separate_caches() {
        let dir = Scratch::new();
        dir.write("lib.gpc", "print(\"loading\");");
        let main = dir.write("main.gpc", "import \"lib.gpc\";");

        let (first, result, first_output) = run_file(&main);
        result.expect("first run");
        let (second, result, second_output) = run_file(&main);
        result.expect("second run");

        assert_eq!(first_output.contents(), "loading\n");
        assert_eq!(second_output.contents(), "loading\n");

        let cache = first.into_modules();
        assert_eq!(cache.len(), 2);
        assert_eq!(second.modules().len(), 2);
        assert!(cache.paths().any(|p| p.ends_with("lib.gpc")));
    }
}

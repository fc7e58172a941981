mod common;

#[cfg(test)]
mod numbers_tests {
    use super::common::{eval, global, run_err, run_ok};

    use glpc::error::{GlpcError, RuntimeErrorKind};
    use glpc::value::{ArithmeticError, Number, Value};
    use proptest::prelude::*;

    fn runtime_error(source: &str) -> (RuntimeErrorKind, String) {
        match run_err(source) {
            GlpcError::Runtime(error) => (error.kind, error.message),
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    fn is_int(value: &Value) -> bool {
        matches!(value, Value::Number(n) if n.is_int())
    }

    #[test]
    fn test_promotion_table() {
        // (expression, printed result, still an integer)
        let tests = [
            ("1 + 2", "3", true),
            ("1 + 2.5", "3.50", false),
            ("5 - 7", "-2", true),
            ("2 * 3.0", "6.00", false),
            ("6 / 2", "3", true),
            ("7 / 2", "3.50", false),
            ("1 / 4", "0.25", false),
            ("7.0 / 2", "3.50", false),
            ("7 ~/ 2", "3", true),
            ("-7 ~/ 2", "-3", true),
            ("7.9 ~/ 2", "3", true),
            ("7 % 3", "1", true),
            ("-7 % 3", "-1", true),
            ("0.1 + 0.2", "0.30", false),
            ("-(3)", "-3", true),
            ("-2.5", "-2.50", false),
            ("1.5", "1.50", false),
            ("2 + 3 * 4 - 10 / 5", "12", true),
        ];

        for (input, printed, int) in tests {
            let value = eval(input);
            assert_eq!(value.to_string(), printed, "input: {}", input);
            assert_eq!(is_int(&value), int, "input: {}", input);
        }
    }

    #[test]
    fn test_float_division_by_zero_is_infinite() {
        let Value::Number(n) = eval("1.0 / 0") else {
            panic!("expected a number");
        };

        assert!(!n.is_int());
        assert!(n.as_f64().is_infinite());
    }

    #[test]
    fn test_arithmetic_errors() {
        let tests = [
            ("var x = 5 % 4.0;", RuntimeErrorKind::TypeError, "Operands must both be integer values."),
            ("var x = 1 / 0;", RuntimeErrorKind::DivisionByZero, "Division by zero."),
            ("var x = 1 ~/ 0;", RuntimeErrorKind::DivisionByZero, "Division by zero."),
            ("var x = 1 % 0;", RuntimeErrorKind::DivisionByZero, "Division by zero."),
            (
                "var x = 1 + \"a\";",
                RuntimeErrorKind::TypeError,
                "Unsupported operand types for '+': NUMBER and STRING.",
            ),
            (
                "var x = \"a\" - \"b\";",
                RuntimeErrorKind::TypeError,
                "Unsupported operand types for '-': STRING and STRING.",
            ),
            (
                "var x = null + 1;",
                RuntimeErrorKind::TypeError,
                "Unsupported operand types for '+': NULL and NUMBER.",
            ),
            (
                "var x = 1 < \"a\";",
                RuntimeErrorKind::TypeError,
                "Unsupported operand types for '<': NUMBER and STRING.",
            ),
            ("var x = -\"a\";", RuntimeErrorKind::TypeError, "Operand must be a number."),
        ];

        for (input, kind, message) in tests {
            assert_eq!(runtime_error(input), (kind, message.to_string()), "input: {}", input);
        }
    }

    #[test]
    fn test_compound_assignment_arithmetic_error() {
        assert_eq!(
            runtime_error("var x = 5; x %= 2.0;"),
            (
                RuntimeErrorKind::TypeError,
                "Operands must both be integer values.".to_string()
            )
        );
    }

    #[test]
    fn test_integer_overflow_wraps() {
        assert_eq!(eval("9223372036854775807 + 1"), Value::int(i64::MIN));
        assert_eq!(eval("-9223372036854775807 - 2"), Value::int(i64::MAX));
        assert_eq!(eval("9223372036854775807 * 2"), Value::int(-2));
    }

    #[test]
    fn test_equality_and_comparison() {
        let tests = [
            ("1 == 1.0", true),
            ("1 != 2", true),
            ("\"a\" == \"a\"", true),
            ("\"a\" == \"b\"", false),
            ("null == null", true),
            ("null == false", false),
            ("1 == \"1\"", false),
            ("true == true", true),
            ("[1] == [1]", false),
            ("2 > 1.5", true),
            ("1 <= 1", true),
            ("1.5 >= 2", false),
            ("-1 < 0", true),
        ];

        for (input, expected) in tests {
            assert_eq!(eval(input), Value::Boolean(expected), "input: {}", input);
        }
    }

    #[test]
    fn test_list_equality_is_identity() {
        let (env, _) = run_ok("var l = [1, 2]; var same = l == l; var copy = l == [1, 2];");

        assert_eq!(global(&env, "same"), Value::Boolean(true));
        assert_eq!(global(&env, "copy"), Value::Boolean(false));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("\"foo\" + \"bar\""), Value::string("foobar"));
    }

    #[test]
    fn test_number_operations() {
        let seven = Number::int(7);
        let two = Number::int(2);

        assert_eq!(seven.add(two), Number::int(9));
        assert_eq!(seven.sub(two), Number::int(5));
        assert_eq!(seven.mul(two), Number::int(14));

        let half = seven.div(two).expect("non-zero divisor");
        assert!(!half.is_int());
        assert_eq!(half.as_f64(), 3.5);

        assert_eq!(seven.int_div(two), Ok(Number::int(3)));
        assert_eq!(seven.rem(two), Ok(Number::int(1)));

        assert_eq!(seven.div(Number::int(0)), Err(ArithmeticError::DivisionByZero));
        assert_eq!(seven.rem(Number::float(2.0)), Err(ArithmeticError::NonInteger));
        assert_eq!(Number::int(i64::MIN).neg(), Number::int(i64::MIN));
        assert_eq!(Number::float(2.0).neg(), Number::float(-2.0));
    }

    #[test]
    fn test_number_ordering_and_display() {
        assert!(Number::int(1) < Number::int(2));
        assert!(Number::int(2) > Number::float(1.5));
        assert_eq!(Number::int(3), Number::float(3.0));
        assert!(Number::float(f64::NAN).partial_cmp(&Number::float(1.0)).is_none());

        assert_eq!(Number::int(-42).to_string(), "-42");
        assert_eq!(Number::float(2.0).to_string(), "2.00");
        assert_eq!(Number::float(3.14159).to_string(), "3.14");
        assert_eq!(Number::float(7.9).as_i64(), 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_integer_arithmetic_matches_i64(a in -1000i64..1000, b in -1000i64..1000) {
            prop_assert_eq!(eval(&format!("{} + {}", a, b)), Value::int(a + b));
            prop_assert_eq!(eval(&format!("{} - {}", a, b)), Value::int(a - b));
            prop_assert_eq!(eval(&format!("{} * {}", a, b)), Value::int(a * b));

            if b != 0 {
                let quotient = eval(&format!("{} / {}", a, b));
                if a % b == 0 {
                    prop_assert_eq!(quotient, Value::int(a / b));
                } else {
                    prop_assert!(!is_int(&quotient));
                    prop_assert_eq!(quotient, Value::float(a as f64 / b as f64));
                }

                prop_assert_eq!(eval(&format!("{} ~/ {}", a, b)), Value::int(a / b));
                prop_assert_eq!(eval(&format!("{} % {}", a, b)), Value::int(a % b));
            }
        }

        #[test]
        fn prop_float_operand_promotes(a in -1000i64..1000, b in 0i64..1000) {
            let sum = eval(&format!("{} + {}.0", a, b));

            prop_assert!(!is_int(&sum));
            prop_assert_eq!(sum, Value::float(a as f64 + b as f64));
        }
    }
}

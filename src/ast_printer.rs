use crate::ast::{Expr, LiteralValue, SetTarget, Stmt};

/// Renders syntax trees in parenthesised prefix form, e.g. `(+ 5 (* 4 2))`.
///
/// Integers print bare, floats with two decimals, strings without quotes.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Null => "null".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Int(n) => itoa::Buffer::new().format(*n).to_string(),

                LiteralValue::Float(f) => format!("{:.2}", f),
            },

            Expr::List { elements, .. } => {
                let items: Vec<String> = elements.iter().map(Self::print).collect();
                format!("[{}]", items.join(", "))
            }

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => Self::parenthesize("group", &[&**inner]),

            // ── operators ───────────────────────────────────────────────
            Expr::Unary { operator, right } => Self::parenthesize(&operator.lexeme, &[&**right]),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => Self::parenthesize(&operator.lexeme, &[&**left, &**right]),

            // ── names ───────────────────────────────────────────────────
            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("super.{}", method.lexeme),

            Expr::Assign { name, value, .. } => {
                Self::parenthesize(&format!("= {}", name.lexeme), &[&**value])
            }

            // ── postfix chains ──────────────────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => Self::parenthesize(&format!(".{}", name.lexeme), &[&**object]),

            Expr::Index { object, index, .. } => Self::parenthesize("[]", &[&**object, &**index]),

            Expr::Set {
                object,
                target,
                value,
            } => {
                let target = match target {
                    SetTarget::Property(name) => {
                        Self::parenthesize(&format!(".{}", name.lexeme), &[&**object])
                    }
                    SetTarget::Index { index, .. } => Self::parenthesize("[]", &[&**object, &**index]),
                };
                format!("(= {} {})", target, Self::print(value))
            }
        }
    }

    /// Statements use the same shape, keyword first: `(var x 1)`,
    /// `(while c body)`, `(fn name (a b) ...)`.
    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => Self::print(expr),

            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => format!("(var {} {})", name.lexeme, Self::print(expr)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => Self::list("block", statements),

            Stmt::Break(_) => "(break)".into(),

            Stmt::Continue(_) => "(continue)".into(),

            Stmt::Return { value, .. } => match value {
                Some(expr) => format!("(return {})", Self::print(expr)),
                None => "(return)".into(),
            },

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::Import { path, .. } => format!("(import \"{}\")", path),

            Stmt::For {
                keyword,
                initializer,
                condition,
                body,
                increment,
            } => {
                let mut parts: Vec<String> = vec![keyword.lexeme.clone()];
                if let Some(initializer) = initializer {
                    parts.push(Self::print_stmt(initializer));
                }
                if let Some(condition) = condition {
                    parts.push(Self::print(condition));
                }
                if let Some(increment) = increment {
                    parts.push(Self::print(increment));
                }
                parts.push(Self::print_stmt(body));
                format!("({})", parts.join(" "))
            }

            Stmt::Function(declaration) => {
                let params: Vec<&str> = declaration.params.iter().map(|p| p.lexeme.as_str()).collect();
                let mut s = format!("(fn {} ({})", declaration.name.lexeme, params.join(" "));
                for stmt in &declaration.body {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(stmt));
                }
                s.push(')');
                s
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let mut s = format!("(class {}", name.lexeme);
                if let Some(superclass) = superclass {
                    s.push_str(" : ");
                    s.push_str(&Self::print(superclass));
                }
                for method in methods {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(&Stmt::Function(method.clone())));
                }
                s.push(')');
                s
            }
        }
    }

    /// One line per top-level statement.
    pub fn print_program(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(Self::print_stmt)
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
        let mut s = format!("({}", name);
        for expr in exprs {
            s.push(' ');
            s.push_str(&Self::print(expr));
        }
        s.push(')');
        s
    }

    fn list(name: &str, statements: &[Stmt]) -> String {
        let mut s = format!("({}", name);
        for stmt in statements {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }
}

use crate::expr::Expr;

/// Renders an expression as a parenthesized prefix form, e.g.
/// `(* (- 123) (group 45.67))`. Used for debug logging.
pub fn print_ast(expr: &Expr) -> String {
    match expr {
        Expr::Assign { name, value, .. } => {
            format!("(= {} {})", name, print_ast(value))
        }
        Expr::Binary {
            left,
            operator,
            right,
        } => {
            format!("({} {} {})", operator, print_ast(left), print_ast(right))
        }
        Expr::Call { callee, args, .. } => {
            let mut out = format!("(call {}", print_ast(callee));
            for arg in args {
                out.push(' ');
                out.push_str(&print_ast(arg));
            }
            out.push(')');
            out
        }
        Expr::Get { object, name } => {
            format!("(. {} {})", print_ast(object), name)
        }
        Expr::Grouping(inner) => {
            format!("(group {})", print_ast(inner))
        }
        Expr::Literal(literal) => literal.to_string(),
        Expr::Logical {
            left,
            operator,
            right,
        } => {
            format!("({} {} {})", operator, print_ast(left), print_ast(right))
        }
        Expr::Set {
            object,
            name,
            value,
        } => {
            format!("(= (. {} {}) {})", print_ast(object), name, print_ast(value))
        }
        Expr::This { .. } => "this".to_string(),
        Expr::Unary { operator, right } => {
            format!("({} {})", operator, print_ast(right))
        }
        Expr::Variable { name, .. } => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::print_ast;
    use crate::expr::Expr;
    use crate::scanner::{Literal, Token, TokenType};
    use std::sync::Arc;

    fn token(token_type: TokenType, lexeme: &str) -> Token {
        Token {
            token_type,
            lexeme: Arc::new(lexeme.to_string()),
            line: 1,
        }
    }

    #[test]
    fn prints_nested_expression() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: token(TokenType::Minus, "-"),
                right: Box::new(Expr::Literal(Literal::Number(123.0))),
            }),
            operator: token(TokenType::Star, "*"),
            right: Box::new(Expr::Grouping(Box::new(Expr::Literal(Literal::Number(
                45.67,
            ))))),
        };
        assert_eq!(print_ast(&expr), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn prints_property_assignment() {
        let expr = Expr::Set {
            object: Box::new(Expr::Variable {
                name: token(TokenType::Identifier, "cake"),
                id: 0,
            }),
            name: token(TokenType::Identifier, "flavor"),
            value: Box::new(Expr::Literal(Literal::String(Arc::new(
                "chocolate".to_string(),
            )))),
        };
        assert_eq!(print_ast(&expr), "(= (. cake flavor) chocolate)");
    }
}

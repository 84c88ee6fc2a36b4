pub mod error;
pub mod rpn;

pub use error::{Error, Result};
pub use rpn::{format_postfix, Converter, Evaluator, Lexer, Token};

use log::debug;

/// Evaluates an arithmetic expression such as `2 * (5 + 1) / 3 * (pi ^ 2)`.
///
/// The expression is tokenized, converted to postfix with the shunting-yard
/// algorithm and reduced on a value stack. Each call is independent.
pub fn evaluate(expression: &str) -> Result<f64> {
    let postfix = to_rpn(expression)?;
    let result = Evaluator::eval_postfix(&postfix)?;
    debug!("{} = {}", expression.trim(), result);
    Ok(result)
}

/// Tokenizes and converts an expression into postfix (reverse Polish) order.
pub fn to_rpn(expression: &str) -> Result<Vec<Token>> {
    Converter::compile_expression(expression.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::f64::consts::{E, PI};

    fn assert_close(expression: &str, expected: f64) {
        let result = evaluate(expression).unwrap();
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (result - expected).abs() <= tolerance,
            "{} = {}, expected {}",
            expression,
            result,
            expected
        );
    }

    // 1. Precedence and associativity
    #[test]
    fn test_standard_precedence() {
        assert_eq!(evaluate("2 + 5 * 10"), Ok(52.0));
        assert_eq!(evaluate("10 - 1 + 5 * 3 / 2 * 10 + 20 * 10"), Ok(284.0));
        assert_eq!(evaluate("10-1+5*3/2*10*10"), Ok(759.0));
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(evaluate("2 ^ 2 ^ 3"), Ok(256.0));
        assert_close("2 ^ 3 + 2 ^ 3 ^ 4", 2417851639229258349412352.0);
    }

    #[test]
    fn test_modulo_chains_left() {
        assert_eq!(evaluate("10 mod 3 mod 2"), Ok(1.0));
        assert_eq!(evaluate("10 % 3 % 2"), Ok(1.0));
        assert_eq!(evaluate("-7 mod 3"), Ok(2.0));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(evaluate("1 << 4"), Ok(16.0));
        assert_eq!(evaluate("1 << 2 + 2"), Ok(16.0));
        assert_eq!(evaluate("256 >> 2"), Ok(64.0));
        assert_eq!(evaluate("5.9 >> 1"), Ok(2.0));
    }

    // 2. Grouping, constants and functions
    #[test]
    fn test_grouping() {
        assert_eq!(evaluate("2 * 5 * (2 + 10)"), Ok(120.0));
        assert_close("2 * (5+1) / 3 * (pi ^ 2)", 39.478417604357432);
    }

    #[test]
    fn test_redundant_parentheses() {
        let plain = evaluate("2*5*(2+10)").unwrap();
        assert_eq!(plain, 120.0);
        assert_eq!(evaluate("((2*5)*(2+10))"), Ok(plain));
        assert_eq!(evaluate("(((2)*(5))*((2)+(10)))"), Ok(plain));
    }

    #[test]
    fn test_constants() {
        assert_eq!(evaluate("pi"), Ok(PI));
        assert_close("2 * e", 2.0 * E);
        assert_eq!(evaluate("-pi"), Ok(-PI));
    }

    #[test]
    fn test_functions() {
        assert_eq!(evaluate("sqrt(9)"), Ok(3.0));
        assert_eq!(evaluate("2 * sqrt(9)"), Ok(6.0));
        assert_eq!(evaluate("sqrt(9) + 5 * 2"), Ok(13.0));
        assert_eq!(evaluate("(sqrt(9) + 5) * 2"), Ok(16.0));
        assert_eq!(evaluate("floor(pi)"), Ok(3.0));
        assert_eq!(evaluate("ceil(2.1) + floor(-2.1)"), Ok(0.0));
    }

    // 3. Lexical special cases
    #[test]
    fn test_power_alias() {
        assert_eq!(evaluate("5 ** 5"), Ok(3125.0));
        assert_eq!(evaluate("5 ** 5"), evaluate("5 ^ 5"));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate("-2 + 5"), Ok(3.0));
        assert_eq!(evaluate("-2--5"), Ok(3.0));
        assert_eq!(evaluate("-1 - 1"), Ok(-2.0));
        assert_eq!(evaluate("2 * -3"), Ok(-6.0));
        assert_eq!(evaluate("(2)-3"), Ok(-1.0));
        assert_eq!(evaluate("--5"), Ok(5.0));
        assert_eq!(evaluate("---5"), Ok(-5.0));
        assert_eq!(evaluate("-(2 + 3) * 2"), Ok(-10.0));
    }

    #[test]
    fn test_unary_minus_and_power() {
        // the sign belongs to the operand, whether literal or group
        assert_eq!(evaluate("-2 ^ 2"), Ok(4.0));
        assert_eq!(evaluate("-(2) ^ 2"), Ok(4.0));
        assert_eq!(evaluate("-sqrt(4) ^ 2"), Ok(4.0));
        assert_eq!(evaluate("2 ^ -1"), Ok(0.5));
        assert_eq!(evaluate("2 ^ -(1 + 1)"), Ok(0.25));
        assert_close("-6.2-2^(3*pi)", -6.2 - 2f64.powf(3.0 * PI));
    }

    #[test]
    fn test_decimal_and_exponent_literals() {
        assert_close("2.6 * 5", 13.0);
        assert_close("1e-3 * 1000", 1.0);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(evaluate("  \t2 + 2\n"), Ok(4.0));
    }

    // 4. Errors
    #[test]
    fn test_syntax_errors() {
        assert!(matches!(evaluate("(2 + 3"), Err(Error::Syntax(_))));
        assert!(matches!(evaluate("2 + 3)"), Err(Error::Syntax(_))));
        assert!(matches!(evaluate("2 3"), Err(Error::Syntax(_))));
        assert!(matches!(evaluate(""), Err(Error::Syntax(_))));
    }

    #[test]
    fn test_arity_errors() {
        assert_eq!(evaluate("2 +"), Err(Error::insufficient_operands("+")));
        assert_eq!(evaluate("sqrt()"), Err(Error::insufficient_operands("sqrt")));
    }

    #[test]
    fn test_lexical_errors() {
        assert_eq!(evaluate("2 & 3"), Err(Error::invalid_operand("&")));
        assert_eq!(evaluate("x + 1"), Err(Error::invalid_operand("x")));
    }

    #[test]
    fn test_evaluation_errors() {
        assert!(matches!(evaluate("sqrt(-4)"), Err(Error::Eval(_))));
        assert!(matches!(evaluate("1 / 0"), Err(Error::Eval(_))));
        assert!(matches!(evaluate("5 mod 0"), Err(Error::Eval(_))));
        assert!(matches!(evaluate("(-8) ^ (1/3)"), Err(Error::Eval(_))));
        assert!(matches!(evaluate("1e308 * 10"), Err(Error::Eval(_))));
        assert!(matches!(evaluate("2 << -1"), Err(Error::Eval(_))));
    }

    // 5. Cross checks
    #[test]
    fn test_idempotent() {
        let expression = "2 * (5+1) / 3 * (pi ^ 2)";
        let first = evaluate(expression);
        for _ in 0..10 {
            assert_eq!(evaluate(expression), first);
        }
    }

    #[test]
    fn test_agrees_with_meval() {
        let expressions = [
            "2 + 5 * 10",
            "10 - 1 + 5 * 3 / 2 * 10 + 20 * 10",
            "2 ^ 2 ^ 3",
            "2 * (5 + 1) / 3 * (pi ^ 2)",
            "sqrt(9) + 5 * 2",
            "floor(pi) * ceil(e)",
            "10 % 3 % 2",
            "((2 * 5) * (2 + 10))",
        ];
        for expression in expressions {
            let expected = meval::eval_str(expression).unwrap();
            assert_close(expression, expected);
        }
    }

    fn random_expression(rng: &mut impl Rng, depth: u32) -> String {
        if depth == 0 || rng.random_bool(0.3) {
            return rng.random_range(1..100).to_string();
        }
        let op = ["+", "-", "*"][rng.random_range(0..3)];
        format!(
            "{} {} {}",
            random_expression(rng, depth - 1),
            op,
            random_expression(rng, depth - 1)
        )
    }

    #[test]
    fn test_random_expressions_ignore_redundant_parentheses() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let expression = random_expression(&mut rng, 4);
            let value = evaluate(&expression).unwrap();
            assert_eq!(evaluate(&format!("({})", expression)), Ok(value));
            assert_eq!(evaluate(&format!("((({})))", expression)), Ok(value));
            assert_eq!(evaluate(&expression), Ok(value));
        }
    }
}

use crate::error::{Error, Result};
use crate::rpn::{Applicable, Token};
use log::{debug, trace};

/// Reduces a postfix token sequence on a value stack.
pub struct Evaluator;

impl Evaluator {
    pub fn eval_postfix(postfix: &[Token]) -> Result<f64> {
        let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());

        for token in postfix {
            match token {
                Token::Number(value) => stack.push(*value),
                Token::Constant(constant) => stack.push(constant.value()),
                Token::Operator(operator) => Self::reduce(&mut stack, operator)?,
                Token::Function(function) => Self::reduce(&mut stack, function)?,
                Token::LeftParen | Token::RightParen | Token::Comma => {
                    return Err(Error::Syntax(format!(
                        "unexpected '{}' in postfix sequence",
                        token
                    )))
                }
            }
            trace!("{} stack: {:?}", token, stack);
        }

        match stack.as_slice() {
            [value] => {
                debug!("Result: {}", value);
                Ok(*value)
            }
            [] => Err(Error::Syntax("empty expression".to_string())),
            values => Err(Error::Syntax(format!(
                "malformed expression: {} values left on the stack",
                values.len()
            ))),
        }
    }

    /// Pops `arity` operands, oldest first, and pushes the result.
    fn reduce(stack: &mut Vec<f64>, operation: &impl Applicable) -> Result<()> {
        let arity = operation.arity();
        if stack.len() < arity {
            return Err(Error::insufficient_operands(operation.symbol()));
        }

        let operands = stack.split_off(stack.len() - arity);
        stack.push(operation.apply(&operands)?);
        Ok(())
    }
}

use crate::error::{Error, Result};
use crate::rpn::{format_postfix, Lexer, Token};
use log::{debug, trace};

/// Shunting-yard conversion of infix tokens into postfix order.
pub struct Converter;

impl Converter {
    /// Tokenizes and converts an expression string.
    pub fn compile_expression(expression: &str) -> Result<Vec<Token>> {
        let tokens = Lexer::tokenize(expression)?;
        Self::to_postfix(&tokens)
    }

    /// Reorders `tokens` into postfix. Constants are replaced by their values and
    /// parentheses and commas are consumed, so the result holds only numbers,
    /// operators and functions.
    pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>> {
        let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut operators: Vec<Token> = Vec::new();

        for token in tokens {
            match token {
                Token::Number(_) => output.push(token.clone()),
                Token::Constant(constant) => output.push(Token::Number(constant.value())),
                Token::Function(_) | Token::LeftParen => operators.push(token.clone()),
                Token::Comma => Self::pop_until_left_paren(&mut operators, &mut output),
                Token::RightParen => {
                    Self::pop_until_left_paren(&mut operators, &mut output);
                    if operators.pop().is_none() {
                        return Err(Error::unmatched_parenthesis());
                    }
                }
                Token::Operator(operator) if operator.is_prefix() => {
                    operators.push(token.clone())
                }
                Token::Operator(operator) => {
                    while let Some(top) = operators.last() {
                        let pop = match top {
                            Token::Operator(top) => operator.pops(*top),
                            Token::Function(_) => true,
                            _ => false,
                        };
                        if !pop {
                            break;
                        }
                        output.extend(operators.pop());
                    }
                    operators.push(token.clone());
                }
            }
            trace!(
                "{} out: [{}] ops: [{}]",
                token,
                format_postfix(&output),
                format_postfix(&operators)
            );
        }

        if operators
            .iter()
            .any(|token| matches!(token, Token::LeftParen | Token::RightParen))
        {
            return Err(Error::unmatched_parenthesis());
        }
        output.extend(operators.into_iter().rev());

        debug!("Postfix: {}", format_postfix(&output));
        Ok(output)
    }

    /// Moves operators to the output until a `(` is on top, leaving it there.
    fn pop_until_left_paren(operators: &mut Vec<Token>, output: &mut Vec<Token>) {
        while let Some(top) = operators.last() {
            if *top == Token::LeftParen {
                break;
            }
            output.extend(operators.pop());
        }
    }
}

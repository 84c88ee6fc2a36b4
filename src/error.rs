use thiserror::Error;

/// Failure categories of the evaluation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input text that is not a number, a known identifier or a known symbol.
    #[error("lexical error: {0}")]
    Lex(String),

    /// Unbalanced parentheses or a token sequence that does not reduce to one value.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An operator or function applied with fewer operands than it takes.
    #[error("arity error: {0}")]
    Arity(String),

    /// A numeric domain error or a non-finite result.
    #[error("evaluation error: {0}")]
    Eval(String),
}

impl Error {
    pub fn invalid_operand(token: &str) -> Self {
        Error::Lex(format!("invalid operand '{}'", token))
    }

    pub fn unmatched_parenthesis() -> Self {
        Error::Syntax("unmatched parenthesis".to_string())
    }

    pub fn insufficient_operands(symbol: &str) -> Self {
        Error::Arity(format!("insufficient operands for '{}' operator", symbol))
    }

    /// The message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Lex(message)
            | Error::Syntax(message)
            | Error::Arity(message)
            | Error::Eval(message) => message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_category() {
        let err = Error::invalid_operand("&");
        assert_eq!(err.to_string(), "lexical error: invalid operand '&'");
        assert_eq!(err.message(), "invalid operand '&'");
    }

    #[test]
    fn test_arity_message_names_symbol() {
        let err = Error::insufficient_operands("+");
        assert_eq!(
            err.to_string(),
            "arity error: insufficient operands for '+' operator"
        );
    }
}

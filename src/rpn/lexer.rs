use crate::error::{Error, Result};
use crate::rpn::{Constant, Function, Operator, Token};
use log::debug;

/// Splits an expression into [`Token`]s using shell-like word rules.
///
/// Words are runs of ASCII alphanumerics, `_` and `.`, or runs of `<` and `>`;
/// every other non-blank character stands on its own. Quotes group text into a
/// single word, a backslash escapes the next character and `#` comments out the
/// rest of the line.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    position: usize,
    pushback: Option<String>,
    previous: Option<Token>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CharClass {
    Word,
    Angle,
}

impl CharClass {
    fn of(c: char) -> Option<Self> {
        match c {
            '<' | '>' => Some(CharClass::Angle),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => Some(CharClass::Word),
            _ => None,
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            position: 0,
            pushback: None,
            previous: None,
        }
    }

    /// Tokenizes a whole expression, failing on the first unclassifiable word.
    pub fn tokenize(input: &str) -> Result<Vec<Token>> {
        debug!("Tokenizing expression: {}", input);
        let tokens = Lexer::new(input).collect::<Result<Vec<_>>>()?;
        debug!("Tokens: {:?}", tokens);
        Ok(tokens)
    }

    pub fn input(&self) -> &str {
        self.input
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(word) = self.next_word()? else {
            return Ok(None);
        };

        let token = if word == "-" && self.expects_operand() {
            self.fold_unary_minus()?
        } else if word == "*" {
            match self.next_word()? {
                Some(next) if next == "*" => Token::Operator(Operator::Power),
                next => {
                    self.pushback = next;
                    Token::Operator(Operator::Multiply)
                }
            }
        } else {
            classify(&word)?
        };

        self.previous = Some(token.clone());
        Ok(Some(token))
    }

    /// True at the start of input and wherever a binary operator could not appear.
    fn expects_operand(&self) -> bool {
        matches!(
            self.previous,
            None | Some(Token::Operator(_))
                | Some(Token::Function(_))
                | Some(Token::LeftParen)
                | Some(Token::Comma)
        )
    }

    /// Glues a unary minus onto the following literal or constant; anything else
    /// gets a prefix [`Operator::Negate`].
    fn fold_unary_minus(&mut self) -> Result<Token> {
        let Some(word) = self.next_word()? else {
            return Ok(Token::Operator(Operator::Negate));
        };

        if let Ok(constant) = Constant::try_from(word.as_str()) {
            return Ok(Token::Number(-constant.value()));
        }
        if let Some(value) = parse_number(&word) {
            return Ok(Token::Number(-value));
        }

        self.pushback = Some(word);
        Ok(Token::Operator(Operator::Negate))
    }

    fn next_word(&mut self) -> Result<Option<String>> {
        if let Some(word) = self.pushback.take() {
            return Ok(Some(word));
        }

        while let Some(c) = self.peek(0) {
            if c.is_whitespace() {
                self.position += 1;
            } else if c == '#' {
                while self.bump().is_some_and(|c| c != '\n') {}
            } else if CharClass::of(c).is_some() || matches!(c, '\'' | '"' | '\\') {
                return self.read_word().map(Some);
            } else {
                self.position += 1;
                return Ok(Some(c.to_string()));
            }
        }
        Ok(None)
    }

    fn read_word(&mut self) -> Result<String> {
        let mut word = String::new();
        let mut class = None;

        while let Some(c) = self.peek(0) {
            match c {
                '\'' | '"' => {
                    self.position += 1;
                    self.read_quoted(c, &mut word)?;
                }
                '\\' => {
                    self.position += 1;
                    let escaped = self
                        .bump()
                        .ok_or_else(|| Error::Lex("no escaped character".to_string()))?;
                    word.push(escaped);
                }
                c => {
                    let Some(current) = CharClass::of(c) else {
                        break;
                    };
                    if class.is_some_and(|class| class != current) {
                        break;
                    }
                    class = Some(current);
                    word.push(c);
                    self.position += 1;

                    if self.at_exponent_sign(&word) {
                        word.extend(self.bump());
                    }
                }
            }
        }
        Ok(word)
    }

    fn read_quoted(&mut self, quote: char, word: &mut String) -> Result<()> {
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(()),
                Some(c) => word.push(c),
                None => return Err(Error::Lex("no closing quotation".to_string())),
            }
        }
    }

    /// `1e` followed by `-3` or `+3` continues as a single numeric word.
    fn at_exponent_sign(&self, word: &str) -> bool {
        let Some(mantissa) = word.strip_suffix(['e', 'E']) else {
            return false;
        };
        mantissa.chars().any(|c| c.is_ascii_digit())
            && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
            && matches!(self.peek(0), Some('+' | '-'))
            && self.peek(1).is_some_and(|c| c.is_ascii_digit())
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.position += 1;
        Some(c)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Resolves a word against the constant, function and operator tables before
/// falling back to a numeric literal.
fn classify(word: &str) -> Result<Token> {
    if let Ok(constant) = Constant::try_from(word) {
        return Ok(Token::Constant(constant));
    }
    if let Ok(function) = Function::try_from(word) {
        return Ok(Token::Function(function));
    }
    match word {
        "(" => return Ok(Token::LeftParen),
        ")" => return Ok(Token::RightParen),
        "," => return Ok(Token::Comma),
        _ => {}
    }
    if let Ok(operator) = Operator::try_from(word) {
        return Ok(Token::Operator(operator));
    }

    parse_number(word)
        .map(Token::Number)
        .ok_or_else(|| Error::invalid_operand(word))
}

fn parse_number(word: &str) -> Option<f64> {
    word.parse::<f64>().ok().filter(|value| value.is_finite())
}

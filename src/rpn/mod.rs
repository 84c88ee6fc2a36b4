use crate::error::{Error, Result};
use std::f64::consts;
use std::fmt;

mod converter;
mod evaluator;
mod lexer;

pub use converter::Converter;
pub use evaluator::Evaluator;
pub use lexer::Lexer;

/// A lexical unit of an arithmetic expression.
///
/// Names are resolved to their table entry by the lexer, so later stages never
/// compare strings. Postfix sequences produced by the [`Converter`] only ever
/// contain `Number`, `Operator` and `Function` tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Constant(Constant),
    Function(Function),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{}", value),
            Token::Constant(constant) => f.write_str(constant.name()),
            Token::Function(function) => f.write_str(function.name()),
            Token::Operator(Operator::Negate) => f.write_str("neg"),
            Token::Operator(operator) => f.write_str(operator.symbol()),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

/// Renders a token sequence space separated, e.g. `2 5 10 * +`.
pub fn format_postfix(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Something the evaluator can reduce the value stack with.
pub trait Applicable {
    fn symbol(&self) -> &'static str;

    /// Number of operands taken off the value stack.
    fn arity(&self) -> usize;

    /// Applies the operation to `operands`, oldest operand first.
    fn apply(&self, operands: &[f64]) -> Result<f64>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
    /// Prefix minus in front of something that is not a literal, e.g. `-(1 + 2)`.
    Negate,
}

impl Operator {
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::ShiftLeft | Operator::ShiftRight => 1,
            Operator::Add | Operator::Subtract => 2,
            Operator::Multiply | Operator::Divide => 3,
            Operator::Power | Operator::Modulo => 4,
            Operator::Negate => 5,
        }
    }

    pub fn associativity(&self) -> Associativity {
        match self {
            Operator::Power | Operator::Negate => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    /// Prefix operators are pushed without resolving against the stack top.
    pub fn is_prefix(&self) -> bool {
        matches!(self, Operator::Negate)
    }

    /// Whether `self`, arriving at the converter, pops `top` off the operator stack first.
    pub fn pops(&self, top: Operator) -> bool {
        match self.associativity() {
            Associativity::Left => self.precedence() <= top.precedence(),
            Associativity::Right => self.precedence() < top.precedence(),
        }
    }
}

impl Applicable for Operator {
    fn symbol(&self) -> &'static str {
        match self {
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::Add => "+",
            Operator::Subtract | Operator::Negate => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Modulo => "%",
        }
    }

    fn arity(&self) -> usize {
        match self {
            Operator::Negate => 1,
            _ => 2,
        }
    }

    fn apply(&self, operands: &[f64]) -> Result<f64> {
        let value = match (self, operands) {
            (Operator::Negate, [x]) => -x,
            (Operator::Add, [a, b]) => a + b,
            (Operator::Subtract, [a, b]) => a - b,
            (Operator::Multiply, [a, b]) => a * b,
            (Operator::Divide, [a, b]) => {
                if *b == 0.0 {
                    return Err(Error::Eval("division by zero".to_string()));
                }
                a / b
            }
            (Operator::Modulo, [a, b]) => {
                if *b == 0.0 {
                    return Err(Error::Eval("modulo by zero".to_string()));
                }
                floored_remainder(*a, *b)
            }
            (Operator::Power, [a, b]) => a.powf(*b),
            (Operator::ShiftLeft, [a, b]) => shift(*a, *b, true)?,
            (Operator::ShiftRight, [a, b]) => shift(*a, *b, false)?,
            _ => return Err(Error::insufficient_operands(self.symbol())),
        };
        finite(value, self.symbol())
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "<<" => Ok(Operator::ShiftLeft),
            ">>" => Ok(Operator::ShiftRight),
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "^" => Ok(Operator::Power),
            "%" | "mod" => Ok(Operator::Modulo),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}

/// Remainder with the sign of the divisor, so `-7 mod 3 == 2`.
fn floored_remainder(a: f64, b: f64) -> f64 {
    let rem = a % b;
    if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
        rem + b
    } else {
        rem
    }
}

/// Arithmetic shift of the integer parts of `value` and `count`.
fn shift(value: f64, count: f64, left: bool) -> Result<f64> {
    let (value, count) = (value.trunc(), count.trunc());
    if count < 0.0 {
        return Err(Error::Eval("negative shift count".to_string()));
    }
    if value == 0.0 {
        return Ok(0.0);
    }

    let scale = 2f64.powf(count);
    if left {
        Ok(value * scale)
    } else if scale.is_infinite() {
        Ok(if value < 0.0 { -1.0 } else { 0.0 })
    } else {
        Ok((value / scale).floor())
    }
}

fn finite(value: f64, symbol: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Eval(format!("non-finite result from '{}'", symbol)))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    Floor,
    Ceil,
}

impl Function {
    pub fn name(&self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
        }
    }
}

impl Applicable for Function {
    fn symbol(&self) -> &'static str {
        self.name()
    }

    fn arity(&self) -> usize {
        1
    }

    fn apply(&self, operands: &[f64]) -> Result<f64> {
        let [x] = operands else {
            return Err(Error::insufficient_operands(self.name()));
        };
        let value = match self {
            Function::Sqrt if *x < 0.0 => {
                return Err(Error::Eval(format!("math domain error in '{}'", self.name())))
            }
            Function::Sqrt => x.sqrt(),
            Function::Floor => x.floor(),
            Function::Ceil => x.ceil(),
        };
        finite(value, self.name())
    }
}

impl TryFrom<&str> for Function {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "sqrt" => Ok(Function::Sqrt),
            "floor" => Ok(Function::Floor),
            "ceil" => Ok(Function::Ceil),
            _ => Err(format!("Unknown function: {}", value)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn name(&self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Constant::Pi => consts::PI,
            Constant::E => consts::E,
        }
    }
}

impl TryFrom<&str> for Constant {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "pi" => Ok(Constant::Pi),
            "e" => Ok(Constant::E),
            _ => Err(format!("Unknown constant: {}", value)),
        }
    }
}

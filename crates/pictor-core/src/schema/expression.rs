//! Constrained arithmetic expressions for dimension fields.
//!
//! A dimension field accepts either a positive literal or an expression of
//! the form `<token>_<op>_<operand>`:
//!
//! ```text
//! iw_div_2      half the image width
//! bh_mul_0.75   three quarters of the box height
//! cw_sub_40     canvas width minus 40
//! ```
//!
//! Exactly one operator is allowed. Anything else is rejected rather than
//! coerced.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::ValidationError;

/// Why a string is not a dimension expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("`{0}` is not of the form <token>_<op>_<operand>")]
    Shape(String),

    #[error("unknown dimension token `{0}`")]
    UnknownToken(String),

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("operand `{0}` is not a positive number")]
    BadOperand(String),

    #[error("operand of `{0}` must be non-zero")]
    ZeroOperand(&'static str),
}

/// Dimension the expression is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionToken {
    ImageWidth,
    ImageHeight,
    BoxWidth,
    BoxHeight,
    CanvasWidth,
    CanvasHeight,
}

impl DimensionToken {
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionToken::ImageWidth => "iw",
            DimensionToken::ImageHeight => "ih",
            DimensionToken::BoxWidth => "bw",
            DimensionToken::BoxHeight => "bh",
            DimensionToken::CanvasWidth => "cw",
            DimensionToken::CanvasHeight => "ch",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "iw" => DimensionToken::ImageWidth,
            "ih" => DimensionToken::ImageHeight,
            "bw" => DimensionToken::BoxWidth,
            "bh" => DimensionToken::BoxHeight,
            "cw" => DimensionToken::CanvasWidth,
            "ch" => DimensionToken::CanvasHeight,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl ArithOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Mod => "mod",
            ArithOp::Pow => "pow",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "add" => ArithOp::Add,
            "sub" => ArithOp::Sub,
            "mul" => ArithOp::Mul,
            "div" => ArithOp::Div,
            "mod" => ArithOp::Mod,
            "pow" => ArithOp::Pow,
            _ => return None,
        })
    }
}

/// A parsed `<token>_<op>_<operand>` expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionExpr {
    pub token: DimensionToken,
    pub op: ArithOp,
    pub operand: f64,
}

impl DimensionExpr {
    pub fn new(token: DimensionToken, op: ArithOp, operand: f64) -> Self {
        Self { token, op, operand }
    }
}

impl fmt::Display for DimensionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.token.as_str(),
            self.op.as_str(),
            self.operand
        )
    }
}

impl FromStr for DimensionExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('_');
        let (Some(token), Some(op), Some(operand), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ExprError::Shape(s.to_string()));
        };

        let token = DimensionToken::parse(token)
            .ok_or_else(|| ExprError::UnknownToken(token.to_string()))?;
        let op = ArithOp::parse(op).ok_or_else(|| ExprError::UnknownOperator(op.to_string()))?;
        let operand = parse_operand(operand)?;

        if matches!(op, ArithOp::Div | ArithOp::Mod) && operand == 0.0 {
            return Err(ExprError::ZeroOperand(op.as_str()));
        }

        Ok(DimensionExpr { token, op, operand })
    }
}

/// Digits with at most one decimal point; no sign, no exponent.
fn parse_operand(s: &str) -> Result<f64, ExprError> {
    let well_formed = !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|&c| c == '.').count() <= 1
        && s.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(ExprError::BadOperand(s.to_string()));
    }
    s.parse::<f64>()
        .map_err(|_| ExprError::BadOperand(s.to_string()))
}

/// A dimension field value: a positive literal or an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Literal(f64),
    Expr(DimensionExpr),
}

impl Dimension {
    /// Parse a textual dimension, as typed into a form field.
    pub fn parse(field: &str, s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if let Ok(value) = s.parse::<f64>() {
            return Self::literal(field, value);
        }
        s.parse::<DimensionExpr>()
            .map(Dimension::Expr)
            .map_err(|reason| ValidationError::field(field, reason.to_string()))
    }

    /// Accept a numeric literal if it is finite and positive.
    pub fn literal(field: &str, value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Dimension::Literal(value))
        } else {
            Err(ValidationError::field(field, "must be a positive number"))
        }
    }
}

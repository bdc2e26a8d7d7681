use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::record::{Record, Value, format_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `record[field] = record[field] <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub field: String,
    pub operator: ArithOp,
    pub value: f64,
}

impl RuleAction {
    pub fn new(field: impl Into<String>, operator: ArithOp, value: f64) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Apply the action, returning the updated copy of `record`.
    ///
    /// An absent or non-numeric field reads as `0`. Dividing by zero leaves
    /// the record untouched and reports [`EngineError::DivisionByZero`].
    pub fn apply(&self, record: &Record) -> Result<Record, EngineError> {
        let current = record
            .get(&self.field)
            .and_then(Value::as_number)
            .unwrap_or(0.0);
        let result = match self.operator {
            ArithOp::Add => current + self.value,
            ArithOp::Sub => current - self.value,
            ArithOp::Mul => current * self.value,
            ArithOp::Div => {
                if self.value == 0.0 {
                    return Err(EngineError::DivisionByZero {
                        field: self.field.clone(),
                    });
                }
                current / self.value
            }
        };
        Ok(record.with_field(&self.field, Value::Number(result)))
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{field} = {field} {op} {value}",
            field = self.field,
            op = self.operator,
            value = format_number(self.value)
        )
    }
}

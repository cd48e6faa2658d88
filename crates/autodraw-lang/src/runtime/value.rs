use std::fmt;

use crate::types::mat::Matrix;

/// Operand or variable value. Numbers are fixed-point centiunits (`1` = 0.01).
///
/// Only `Number`, `Transform` and `Text` are ever bound in a [`VarTable`].
/// `VariableRef` exists only as an unresolved operand and `Invalid` marks an
/// operand the producer could not classify.
///
/// [`VarTable`]: crate::runtime::env::VarTable
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i16),
    Transform(Matrix),
    Text(String),
    VariableRef(String),
    Invalid,
}

impl Value {
    pub fn var(name: impl Into<String>) -> Self { Self::VariableRef(name.into()) }

    pub fn text(s: impl Into<String>) -> Self { Self::Text(s.into()) }

    pub fn numbers(ns: &[i16]) -> Vec<Value> {
        ns.iter().copied().map(Value::Number).collect()
    }

    /// Whether this value may be stored in a variable table.
    pub fn is_bindable(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Transform(_) | Self::Text(_))
    }
}

pub fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Number(_)      => "number",
        Value::Transform(_)   => "transform",
        Value::Text(_)        => "text",
        Value::VariableRef(_) => "variable",
        Value::Invalid        => "invalid",
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n)      => write!(f, "{n}"),
            Value::Transform(m)   => write!(f, "{m}"),
            Value::Text(s)        => write!(f, "{s:?}"),
            Value::VariableRef(n) => f.write_str(n),
            Value::Invalid        => f.write_str("undefined"),
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// Read access to the variables and attributes of a NetCDF product.
pub trait AttributeSource {
    fn path(&self) -> &Path;
    fn variable_names(&self) -> Vec<String>;
    fn global_attributes(&self) -> Result<AttributeMap>;
    /// Attributes of one variable, `None` when the variable does not exist.
    fn variable_attributes(&self, variable: &str) -> Result<Option<AttributeMap>>;
}

pub type AttributeMap = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
}

impl Number {
    #[cfg(test)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::UInt(v) => v as f64,
            Number::Float(v) => v as f64,
            Number::Double(v) => v,
        }
    }
}

// Floats keep their decimal point (`1.0`, not `1`)
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::UInt(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{:?}", v),
            Number::Double(v) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(Number),
    NumberList(Vec<Number>),
    TextList(Vec<String>),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A datum carried by a fact. The identifier and attribute slots of a
/// fact always hold interned symbols; the value slot may hold any
/// variant. Equality is structural.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Symbol(u32),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bit equality keeps floats usable as hash keys
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Symbol(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Value::Str(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Bool(b) => {
                4u8.hash(state);
                b.hash(state);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(String),
    Constant(Value),
}

impl Term {
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(v) => Some(v),
            Term::Constant(_) => None,
        }
    }
}

/// Surface form of a datum before symbols are interned.
#[derive(Debug, Clone)]
pub enum RawValue {
    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Surface form of a condition field. A leading `?` in the literal
/// grammar marks a variable; the marker is stripped here.
#[derive(Debug, Clone)]
pub enum RawTerm {
    Var(String),
    Value(RawValue),
}

pub type RawCondition = (RawTerm, RawTerm, RawTerm);

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Symbol(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Symbol(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        RawValue::Int(i as i64)
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        RawValue::Float(f)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<&str> for RawTerm {
    fn from(s: &str) -> Self {
        match s.strip_prefix('?') {
            Some(name) => RawTerm::Var(name.to_string()),
            None => RawTerm::Value(RawValue::Symbol(s.to_string())),
        }
    }
}

impl From<i64> for RawTerm {
    fn from(i: i64) -> Self {
        RawTerm::Value(RawValue::Int(i))
    }
}

impl From<i32> for RawTerm {
    fn from(i: i32) -> Self {
        RawTerm::Value(RawValue::Int(i as i64))
    }
}

impl From<f64> for RawTerm {
    fn from(f: f64) -> Self {
        RawTerm::Value(RawValue::Float(f))
    }
}

impl From<bool> for RawTerm {
    fn from(b: bool) -> Self {
        RawTerm::Value(RawValue::Bool(b))
    }
}

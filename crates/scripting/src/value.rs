//! Runtime values

use crate::lang::ast::BinaryOp;
use crate::scriptable::ObjectHandle;
use std::fmt;
use std::sync::Arc;

/// Runtime value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Number(i64),
    Str(String),
    Bool(bool),
    /// Opaque reference to a host object handed out by a command
    Host(ObjectHandle),
}

impl Value {
    /// Check if value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Number(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Host(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&ObjectHandle> {
        match self {
            Value::Host(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Host(_) => "object",
        }
    }
}

impl BinaryOp {
    /// Apply the operator, `None` when the operands don't support it
    ///
    /// `+` concatenates display forms unless both sides are numbers.
    /// Integer overflow and division by zero are unsupported too.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> Option<Value> {
        use Value::{Number, Str};

        match (self, lhs, rhs) {
            (BinaryOp::Add, Number(a), Number(b)) => a.checked_add(*b).map(Number),
            (BinaryOp::Add, _, _) => Some(Str(format!("{}{}", lhs, rhs))),
            (BinaryOp::Sub, Number(a), Number(b)) => a.checked_sub(*b).map(Number),
            (BinaryOp::Mul, Number(a), Number(b)) => a.checked_mul(*b).map(Number),
            (BinaryOp::Div, Number(a), Number(b)) => a.checked_div(*b).map(Number),
            (BinaryOp::Equal, _, _) => Some(Value::Bool(lhs == rhs)),
            (op, Number(a), Number(b)) => compare(op, a, b),
            (op, Str(a), Str(b)) => compare(op, a, b),
            _ => None,
        }
    }
}

fn compare<T: Ord + ?Sized>(op: BinaryOp, a: &T, b: &T) -> Option<Value> {
    let result = match op {
        BinaryOp::Greater => a > b,
        BinaryOp::Less => a < b,
        BinaryOp::GreaterEqual => a >= b,
        BinaryOp::LessEqual => a <= b,
        _ => return None,
    };
    Some(Value::Bool(result))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            // The object may be locked by a running command
            Value::Host(handle) => match handle.try_lock() {
                Some(object) => write!(f, "<{}>", object.type_name()),
                None => f.write_str("<object>"),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Host(_) => write!(f, "Host({})", self),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ObjectHandle> for Value {
    fn from(handle: ObjectHandle) -> Self {
        Value::Host(handle)
    }
}

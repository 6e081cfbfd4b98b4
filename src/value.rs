use std::cmp::Ordering;
use std::fmt;

/// The kind of a [`Value`]. Wildcards in a pattern are declared with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Int,
    Float,
    Str,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Int => write!(f, "int"),
            Kind::Float => write!(f, "float"),
            Kind::Str => write!(f, "str"),
        }
    }
}

/// A single element of a tuple.
///
/// Values of different kinds are never equal. Values of the same kind compare
/// by value; floats use the IEEE total order so that `Value` is `Eq + Ord` and
/// can live in an ordered store, except that `-0.0` equals `0.0` as it does
/// under `==`.
#[derive(Debug, Clone)]
pub enum Value {
    I(i64),
    F(f64),
    S(String),
}

impl Value {
    pub fn str(value: &str) -> Value {
        Value::S(String::from(value))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::I(_) => Kind::Int,
            Value::F(_) => Kind::Float,
            Value::S(_) => Kind::Str,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::I(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::F(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::S(value) => Some(value),
            _ => None,
        }
    }
}

// Folds `-0.0` onto `0.0`; ordering and hashing go through this.
fn canonical(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::I(lhs), Value::I(rhs)) => lhs.cmp(rhs),
            (Value::F(lhs), Value::F(rhs)) => canonical(*lhs).total_cmp(&canonical(*rhs)),
            (Value::S(lhs), Value::S(rhs)) => lhs.cmp(rhs),
            (lhs, rhs) => lhs.kind().cmp(&rhs.kind()),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::I(value) => value.hash(state),
            Value::F(value) => canonical(*value).to_bits().hash(state),
            Value::S(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I(value) => write!(f, "{}", value),
            Value::F(value) => write!(f, "{}", value),
            Value::S(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::S(value)
    }
}

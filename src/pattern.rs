use std::fmt;

use crate::tuple::Tuple;
use crate::value::{Kind, Value};

/// One position of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Matches a stored value equal in kind and value.
    Literal(Value),
    /// Matches any stored value of the given kind and yields it back.
    Wildcard(Kind),
}

impl Field {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Field::Literal(expected) => expected == value,
            Field::Wildcard(kind) => *kind == value.kind(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Field::Wildcard(_))
    }
}

/// Diagnostic rendering. Parses back only for finite floats and for strings
/// whose escapes are limited to `\"`, `\\`, `\n` and `\t`; `NaN`, `inf` and
/// other control characters print but are not accepted by the lexer.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Literal(Value::S(value)) => write!(f, "{:?}", value),
            Field::Literal(Value::F(value)) => write!(f, "{:?}", value),
            Field::Literal(value) => write!(f, "{}", value),
            Field::Wildcard(kind) => write!(f, "?{}", kind),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Literal(value)
    }
}

impl From<Kind> for Field {
    fn from(kind: Kind) -> Self {
        Field::Wildcard(kind)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Literal(Value::from(value))
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Field::Literal(Value::from(value))
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Literal(Value::from(value))
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Literal(Value::from(value))
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Literal(Value::from(value))
    }
}

/// A template selecting tuples of the same arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pattern {
    fields: Vec<Field>,
}

/// Builds a [`Pattern`]. `?int`, `?float` and `?str` declare wildcards, any
/// other expression is a literal.
///
/// ```
/// use tuplespace::{pattern, tuple};
///
/// let p = pattern![?int, 1.2, "meow", 4];
/// assert!(p.matches(&tuple![3, 1.2, "meow", 4]));
/// assert!(!p.matches(&tuple![3, 1.2, "thiswillfail", 4]));
/// ```
#[macro_export]
macro_rules! pattern {
    (@acc [$($out:expr),*]) => {
        $crate::Pattern::from_vec(vec![$($out),*])
    };
    (@acc [$($out:expr),*] ?int $(, $($rest:tt)*)?) => {
        $crate::pattern!(@acc [$($out,)* $crate::Field::Wildcard($crate::Kind::Int)] $($($rest)*)?)
    };
    (@acc [$($out:expr),*] ?float $(, $($rest:tt)*)?) => {
        $crate::pattern!(@acc [$($out,)* $crate::Field::Wildcard($crate::Kind::Float)] $($($rest)*)?)
    };
    (@acc [$($out:expr),*] ?str $(, $($rest:tt)*)?) => {
        $crate::pattern!(@acc [$($out,)* $crate::Field::Wildcard($crate::Kind::Str)] $($($rest)*)?)
    };
    (@acc [$($out:expr),*] $value:expr $(, $($rest:tt)*)?) => {
        $crate::pattern!(@acc [$($out,)* $crate::Field::from($value)] $($($rest)*)?)
    };
    ($($tokens:tt)*) => {
        $crate::pattern!(@acc [] $($tokens)*)
    };
}

impl Pattern {
    pub fn new(fields: &[Field]) -> Pattern {
        Pattern {
            fields: fields.to_vec(),
        }
    }

    pub fn from_vec(fields: Vec<Field>) -> Pattern {
        Pattern { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// True when `tuple` has the same arity and every position is compatible.
    pub fn matches(&self, tuple: &Tuple) -> bool {
        if self.fields.len() != tuple.len() {
            return false;
        }
        self.fields
            .iter()
            .zip(tuple.iter())
            .all(|(field, value)| field.matches(value))
    }

    /// Values of `tuple` at the wildcard positions, in pattern order.
    ///
    /// Only meaningful for a tuple this pattern matched.
    pub fn bind(&self, tuple: &Tuple) -> Vec<Value> {
        self.fields
            .iter()
            .zip(tuple.iter())
            .filter(|(field, _)| field.is_wildcard())
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// The single tuple this pattern can match, if it has no wildcard.
    pub fn as_literal(&self) -> Option<Tuple> {
        self.fields
            .iter()
            .map(|field| match field {
                Field::Literal(value) => Some(value.clone()),
                Field::Wildcard(_) => None,
            })
            .collect::<Option<Vec<Value>>>()
            .map(Tuple::from_vec)
    }
}

impl From<Tuple> for Pattern {
    fn from(tuple: Tuple) -> Self {
        Pattern::from_vec(tuple.into_iter().map(Field::Literal).collect())
    }
}

/// `(f1, f2, ...)`, with fields rendered as described on [`Field`].
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let mut separator = "";
        for field in &self.fields {
            write!(f, "{}{}", separator, field)?;
            separator = ", ";
        }
        write!(f, ")")
    }
}

use std::fmt;
use std::ops::Index;

use crate::value::Value;

/// An ordered, fixed-length sequence of values.
///
/// Tuples order element by element. The store keeps one bucket per arity and
/// visits each bucket in this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Tuple {
    values: Vec<Value>,
}

/// Builds a [`Tuple`] from a list of expressions convertible into [`Value`].
///
/// ```
/// use tuplespace::{tuple, Value};
///
/// let t = tuple![3, 1.2, "meow", 4];
/// assert_eq!(t.len(), 4);
/// assert_eq!(t[2], Value::str("meow"));
/// ```
#[macro_export]
macro_rules! tuple {
    () => {
        $crate::Tuple::from_vec(::std::vec::Vec::new())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Tuple::from_vec(vec![$($crate::Value::from($value)),+])
    };
}

impl Tuple {
    pub fn new(values: &[Value]) -> Tuple {
        Tuple {
            values: values.to_vec(),
        }
    }

    pub fn from_vec(values: Vec<Value>) -> Tuple {
        Tuple { values }
    }

    /// Arity of the tuple.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl Index<usize> for Tuple {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Tuple::from_vec(values)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Tuple::from_vec(iter.into_iter().collect())
    }
}

impl IntoIterator for Tuple {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut separator = " ";
        for value in &self.values {
            write!(f, "{}{}", separator, value)?;
            separator = ", ";
        }
        write!(f, " }}")
    }
}

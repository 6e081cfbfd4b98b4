//! A Linda-style tuple space shared between threads.
//!
//! Producers [`put`](TupleSpace::put) tuples of integers, floats and strings;
//! consumers retrieve them with a [`Pattern`] whose positions are either
//! literals or typed wildcards. Retrieval copies or takes, and either returns
//! at once, blocks, blocks with a deadline, or awaits.
//!
//! ```
//! use tuplespace::{pattern, tuple, TupleSpace, Value};
//!
//! let space = TupleSpace::new();
//! space.put(tuple![3, 1.2, "meow", 4]);
//!
//! let p = pattern![?int, 1.2, "meow", 4];
//! let found = space.try_copy(&p).unwrap();
//! assert_eq!(p.bind(&found), vec![Value::I(3)]);
//! assert_eq!(space.len(), 1);
//! ```

#[macro_use]
extern crate error_chain;

pub mod errors;
pub mod lexing;
mod pattern;
pub mod repository;
mod store;
mod tuple;
mod tuple_space;
mod value;

pub use errors::{Error, ErrorKind, Result, ResultExt};
pub use pattern::{Field, Pattern};
pub use tuple::Tuple;
pub use tuple_space::{Retrieval, TupleSpace};
pub use value::{Kind, Value};

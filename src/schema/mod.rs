//! Runtime schema construction and representation

pub mod meta;
pub mod model;
mod name;

pub use self::name::{Name, NameParseError};

//! Data model and value types for expression graphs
//!
//! This module provides the concrete values nodes resolve to, including the
//! lazily forced sequence view.

#![warn(missing_docs)]

pub mod lazy;
pub mod value;

pub use lazy::{LazyListIter, LazyListValue};
pub use value::{Function, Mapping, Value};

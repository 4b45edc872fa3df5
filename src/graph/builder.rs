// Copyright 2024 Tracelang Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Named constructors for building graphs
//!
//! ```
//! use tracelang::bindings;
//! use tracelang::Value;
//! use tracelang::graph::builder::{context, sym};
//!
//! let program = context(bindings! {
//!     "n" => 2,
//!     "res" => sym("n") * 3,
//! });
//! assert_eq!(program.index("res").value().unwrap(), Value::from(6));
//! ```

use super::node::Node;
use super::operator::BinaryOperator;
use crate::error::Result;
use crate::model::{Function, Mapping, Value};

/// Node holding a raw value
pub fn literal(value: impl Into<Value>) -> Node {
    Node::literal(value)
}

/// Free symbol, bound by the enclosing context
pub fn sym(key: impl Into<Value>) -> Node {
    Node::symbol(key)
}

/// Lookup of `key` in an explicit scope
pub fn sym_in(key: impl Into<Value>, scope: impl Into<Value>) -> Node {
    Node::lookup(key, Some(scope.into()))
}

/// Deferred application of `function` to `args`
pub fn apply<I>(function: Function, args: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Node::apply(function, args.into_iter().map(Into::into))
}

/// List node forcing every element when resolved
pub fn eager_list<I>(items: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Node::eager_list(items.into_iter().map(Into::into))
}

/// List node forcing elements only on access
pub fn lazy_list<I>(items: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Node::lazy_list(items.into_iter().map(Into::into))
}

/// Context node over `bindings`
pub fn context(bindings: Mapping) -> Node {
    Node::context(bindings)
}

/// Deferred primitive binary operation
pub fn binary(op: BinaryOperator, left: impl Into<Value>, right: impl Into<Value>) -> Node {
    Node::binary(op, left, right)
}

/// Wrap a native closure as an opaque callable
pub fn function<F>(name: &str, body: F) -> Function
where
    F: Fn(&[Value]) -> Result<Value> + 'static,
{
    Function::new(name, body)
}

/// Build a [`Mapping`](crate::Mapping) from `key => value` pairs
///
/// Keys and values go through `Value::from`, so nodes, scalars and nested
/// mappings can be mixed freely.
#[macro_export]
macro_rules! bindings {
    () => {
        $crate::Mapping::default()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut mapping = $crate::Mapping::default();
        $(
            mapping.insert($crate::Value::from($key), $crate::Value::from($value));
        )+
        mapping
    }};
}

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

//! Core value types for expression graphs
//!
//! A [`Value`] is anything a node can resolve to, and anything a node can hold
//! as a payload. Graph handles ([`Node`], [`ContextValue`], [`Function`]) are
//! carried by reference and compared by identity; plain data is compared
//! structurally.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::lazy::LazyListValue;
use crate::context::ContextValue;
use crate::error::{EvalError, Result};
use crate::graph::Node;

/// Insertion-ordered key/value mapping used for contexts and map literals
pub type Mapping = IndexMap<Value, Value, FxBuildHasher>;

type NativeFn = dyn Fn(&[Value]) -> Result<Value>;

/// Opaque callable invoked with positionally resolved arguments
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    body: Rc<NativeFn>,
}

impl Function {
    /// Wrap a native closure under a diagnostic name
    pub fn new<F>(name: impl Into<Rc<str>>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self {
            name: name.into(),
            body: Rc::new(body),
        }
    }

    /// Diagnostic name of the function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function with already resolved arguments
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.body)(args)
    }

    /// Fail unless exactly `expected` arguments were passed
    pub fn check_arity(&self, args: &[Value], expected: usize) -> Result<()> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(EvalError::InvalidArgumentCount {
                function_name: self.name.to_string(),
                expected,
                actual: args.len(),
            })
        }
    }

    /// Whether both handles point at the same closure
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

/// Any value an expression graph can hold or resolve to
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Nil,

    /// Boolean value
    Boolean(bool),

    /// Integer value (64-bit signed)
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// String value
    String(Rc<str>),

    /// Ordered sequence; elements may still be unresolved nodes
    List(Rc<Vec<Value>>),

    /// Key/value mapping; values may still be unresolved nodes
    Map(Rc<Mapping>),

    /// Opaque callable
    Function(Function),

    /// Resolved scope
    Context(ContextValue),

    /// Sequence view that forces elements on access
    LazyList(LazyListValue),

    /// Unresolved graph node
    Node(Node),
}

impl Value {
    /// Create a list value
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(Rc::new(items.into_iter().collect()))
    }

    /// Create a map value
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(Rc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Force this value if it is a node, otherwise return it unchanged
    pub fn resolve(&self) -> Result<Value> {
        match self {
            Self::Node(node) => node.value(),
            other => Ok(other.clone()),
        }
    }

    /// Look `key` up in this value, returning the raw entry
    ///
    /// The entry is not forced; lookups chain through it by resolving the
    /// result afterwards.
    pub fn lookup(&self, key: &Value) -> Result<Value> {
        match self {
            Self::Context(context) => context.get(key),
            Self::Map(entries) => entries
                .get(key)
                .cloned()
                .ok_or_else(|| EvalError::key_not_found(key, Some(self.type_name().to_string()))),
            Self::List(items) => {
                let index = normalize_index(expect_index(key)?, items.len())?;
                Ok(items[index].clone())
            }
            Self::LazyList(list) => {
                let index = normalize_index(expect_index(key)?, list.len())?;
                Ok(list.items()[index].clone())
            }
            Self::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let index = normalize_index(expect_index(key)?, chars.len())?;
                Ok(Self::from(chars[index].to_string()))
            }
            other => Err(EvalError::NotIndexable {
                type_name: other.type_name(),
            }),
        }
    }

    /// Apply this value to a single resolved argument
    ///
    /// Functions are invoked, contexts are intervened upon with a mapping and
    /// lazy lists are intervened upon with an index mapping.
    pub fn call(&self, argument: &Value) -> Result<Value> {
        match self {
            Self::Function(function) => function.call(std::slice::from_ref(argument)),
            Self::Context(context) => {
                let updates = argument.as_map().ok_or_else(|| {
                    EvalError::type_mismatch_with_context(
                        "Map",
                        argument.type_name(),
                        "context intervention",
                    )
                })?;
                Ok(Self::Context(context.intervene(updates)))
            }
            Self::LazyList(list) => {
                let updates = argument.as_map().ok_or_else(|| {
                    EvalError::type_mismatch_with_context(
                        "Map",
                        argument.type_name(),
                        "list intervention",
                    )
                })?;
                Ok(Self::LazyList(list.intervene(updates)?))
            }
            other => Err(EvalError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    /// Truthiness used by conditional helpers
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Boolean(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(entries) => !entries.is_empty(),
            Self::LazyList(list) => !list.is_empty(),
            _ => true,
        }
    }

    /// Get the type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "Nil",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Function(_) => "Function",
            Self::Context(_) => "Context",
            Self::LazyList(_) => "LazyList",
            Self::Node(_) => "Node",
        }
    }

    /// Try to convert to an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to convert to a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to convert to a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert to a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to view as a mapping
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Try to view as a context
    pub fn as_context(&self) -> Option<&ContextValue> {
        match self {
            Self::Context(context) => Some(context),
            _ => None,
        }
    }

    /// Try to view as a lazy list
    pub fn as_lazy_list(&self) -> Option<&LazyListValue> {
        match self {
            Self::LazyList(list) => Some(list),
            _ => None,
        }
    }

    /// Try to view as a node
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Check if the value is an unresolved node
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    /// Integer a number compares equal to, if any
    ///
    /// Booleans count as 0 and 1; floats qualify only when finite and whole.
    fn integral_key(&self) -> Option<i64> {
        match self {
            Self::Boolean(b) => Some(i64::from(*b)),
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                Some(*f as i64)
            }
            _ => None,
        }
    }
}

const NUMERIC_HASH_TAG: u8 = 0xA5;

/// Coerce a sequence index, accepting booleans as 0 and 1
pub(crate) fn expect_index(key: &Value) -> Result<i64> {
    match key {
        Value::Integer(i) => Ok(*i),
        Value::Boolean(b) => Ok(i64::from(*b)),
        other => Err(EvalError::type_mismatch_with_context(
            "Integer",
            other.type_name(),
            "sequence index",
        )),
    }
}

/// Map a possibly negative index onto `0..len`
pub(crate) fn normalize_index(index: i64, len: usize) -> Result<usize> {
    let size = i64::try_from(len).unwrap_or(i64::MAX);
    let adjusted = if index < 0 { index + size } else { index };
    if (0..size).contains(&adjusted) {
        Ok(adjusted as usize)
    } else {
        Err(EvalError::IndexOutOfBounds { index, size: len })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            // bitwise so that floats can serve as mapping keys
            (Self::Float(a), Self::Float(b)) if a.to_bits() == b.to_bits() => true,
            (
                Self::Boolean(_) | Self::Integer(_) | Self::Float(_),
                Self::Boolean(_) | Self::Integer(_) | Self::Float(_),
            ) => match (self.integral_key(), other.integral_key()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Context(a), Self::Context(b)) => a.ptr_eq(b),
            (Self::LazyList(a), Self::LazyList(b)) => a.items() == b.items(),
            (Self::Node(a), Self::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // equal numbers of any kind share one hash
        if let Some(i) = self.integral_key() {
            NUMERIC_HASH_TAG.hash(state);
            return i.hash(state);
        }
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {}
            Self::Boolean(b) => b.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::List(items) => items.hash(state),
            // order independent equality, so only the size is hashed
            Self::Map(entries) => entries.len().hash(state),
            Self::Function(function) => Rc::as_ptr(&function.body).cast::<()>().hash(state),
            Self::Context(context) => context.id().hash(state),
            Self::LazyList(list) => list.len().hash(state),
            Self::Node(node) => node.id().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::List(items) => write_sequence(f, items),
            Self::Map(entries) => write_mapping(f, entries),
            Self::Function(function) => write!(f, "{function:?}"),
            Self::Context(context) => write!(f, "{context}"),
            Self::LazyList(list) => write!(f, "{list}"),
            Self::Node(node) => write!(f, "{node}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

pub(crate) fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

pub(crate) fn write_mapping(f: &mut fmt::Formatter<'_>, entries: &Mapping) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    write!(f, "}}")
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(Rc::new(items))
    }
}

impl From<Mapping> for Value {
    fn from(entries: Mapping) -> Self {
        Self::Map(Rc::new(entries))
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<ContextValue> for Value {
    fn from(context: ContextValue) -> Self {
        Self::Context(context)
    }
}

impl From<LazyListValue> for Value {
    fn from(list: LazyListValue) -> Self {
        Self::LazyList(list)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        Self::Node(node.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_in_map_and_list() {
        let map = Value::map([("x", 2)]);
        assert_eq!(map.lookup(&Value::from("x")).unwrap(), Value::Integer(2));
        assert!(matches!(
            map.lookup(&Value::from("y")),
            Err(EvalError::KeyNotFound { .. })
        ));

        let list = Value::list([Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(list.lookup(&Value::from(0)).unwrap(), Value::Integer(1));
        assert_eq!(list.lookup(&Value::from(-1)).unwrap(), Value::Integer(3));
        assert_eq!(
            list.lookup(&Value::from(3)).unwrap_err(),
            EvalError::IndexOutOfBounds { index: 3, size: 3 }
        );
    }

    #[test]
    fn test_lookup_on_scalar_fails() {
        assert_eq!(
            Value::Integer(4).lookup(&Value::from("x")).unwrap_err(),
            EvalError::NotIndexable {
                type_name: "Integer"
            }
        );
    }

    #[test]
    fn test_call_on_non_callable_fails() {
        assert_eq!(
            Value::from("f").call(&Value::Nil).unwrap_err(),
            EvalError::NotCallable { type_name: "String" }
        );
    }

    #[test]
    fn test_function_arity() {
        let id = Function::new("id", |args| Ok(args[0].clone()));
        assert!(id.check_arity(&[Value::Nil], 1).is_ok());
        assert_eq!(
            id.check_arity(&[], 1).unwrap_err(),
            EvalError::InvalidArgumentCount {
                function_name: "id".to_string(),
                expected: 1,
                actual: 0,
            }
        );
        assert_eq!(id.call(&[Value::from(5)]).unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_structural_equality_and_keys() {
        assert_eq!(Value::from("a"), Value::from("a".to_string()));
        assert_ne!(Value::Integer(1), Value::Float(1.5));
        assert_ne!(Value::from("1"), Value::Integer(1));

        let map = Value::map([(1, "one")]);
        assert_eq!(map.lookup(&Value::Float(1.0)).unwrap(), Value::from("one"));
        assert_eq!(map.lookup(&Value::Boolean(true)).unwrap(), Value::from("one"));
        assert!(map.lookup(&Value::Float(1.5)).is_err());

        let map = Value::map([(true, 1), (false, 0)]);
        assert_eq!(map.lookup(&Value::Boolean(false)).unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(6.0).to_string(), "6.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(
            Value::map([("x", Value::list([Value::from(1), Value::Nil]))]).to_string(),
            "{'x': [1, nil]}"
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::list([]).is_truthy());
    }
}

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

//! Expression graph nodes
//!
//! A [`Node`] is a shared, immutable handle to a deferred computation. The
//! only mutation a node ever sees is the one-time write of its memo cell the
//! first time it is forced; every later [`Node::value`] call returns that
//! cached result without recomputing.

use once_cell::unsync::OnceCell;
use std::fmt;
use std::rc::Rc;

use super::operator::BinaryOperator;
use crate::config::{DepthGuard, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::context::ContextValue;
use crate::error::{EvalError, Result};
use crate::model::value::{write_mapping, write_sequence};
use crate::model::{Function, LazyListValue, Mapping, Value};

/// The closed set of node kinds
#[derive(Clone)]
pub enum NodeKind {
    /// Raw value; resolves to the value itself
    Literal(Value),

    /// Lazy lookup of `key` in whatever `scope` resolves to
    Lookup {
        /// Key to look up, possibly itself a node
        key: Value,
        /// Scope to look in; `None` while the symbol is unbound
        scope: Option<Value>,
    },

    /// Lazy application of an opaque callable
    Apply {
        /// Callable invoked with the resolved arguments
        function: Function,
        /// Value resolving to the ordered argument sequence
        args: Value,
    },

    /// Sequence resolving with every element forced
    EagerList(Rc<Vec<Value>>),

    /// Sequence resolving to a view that forces elements on access
    LazyList(Rc<Vec<Value>>),

    /// Scope literal; resolves to its context without any computation
    Context(ContextValue),
}

struct NodeData {
    kind: NodeKind,
    value: OnceCell<Value>,
}

/// Shared handle to a lazily resolved graph node
///
/// Cloning is cheap and preserves identity.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    /// Create a node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        let value = match &kind {
            NodeKind::Context(context) => OnceCell::with_value(Value::Context(context.clone())),
            _ => OnceCell::new(),
        };
        Self(Rc::new(NodeData { kind, value }))
    }

    /// Create a node holding a raw value
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(NodeKind::Literal(value.into()))
    }

    /// Create a lookup of `key` in an optional scope
    pub fn lookup(key: impl Into<Value>, scope: Option<Value>) -> Self {
        Self::new(NodeKind::Lookup {
            key: key.into(),
            scope,
        })
    }

    /// Create a free symbol, to be bound by the enclosing context
    pub fn symbol(key: impl Into<Value>) -> Self {
        Self::lookup(key, None)
    }

    /// Create an application over a fixed argument list
    pub fn apply(function: Function, args: impl IntoIterator<Item = Value>) -> Self {
        Self::apply_to(function, Value::list(args))
    }

    /// Create an application over any value resolving to a sequence
    pub fn apply_to(function: Function, args: impl Into<Value>) -> Self {
        Self::new(NodeKind::Apply {
            function,
            args: args.into(),
        })
    }

    /// Create an eager list node
    pub fn eager_list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::new(NodeKind::EagerList(Rc::new(items.into_iter().collect())))
    }

    /// Create a lazy list node
    pub fn lazy_list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::new(NodeKind::LazyList(Rc::new(items.into_iter().collect())))
    }

    /// Create a context node, binding every free symbol in `bindings` to it
    pub fn context(bindings: Mapping) -> Self {
        Self::new(NodeKind::Context(ContextValue::new(bindings)))
    }

    /// Create an application of a primitive binary operator
    pub fn binary(op: BinaryOperator, left: impl Into<Value>, right: impl Into<Value>) -> Self {
        let operands = Self::eager_list([left.into(), right.into()]);
        Self::apply_to(op.function(), operands)
    }

    /// Build a lookup of `key` in whatever this node resolves to
    pub fn index(&self, key: impl Into<Value>) -> Self {
        Self::lookup(key, Some(Value::Node(self.clone())))
    }

    /// Build a deferred call of this node with `args`
    ///
    /// Calling a context intervenes on it; calling a function invokes it.
    pub fn call(&self, args: impl Into<Value>) -> Self {
        let operands = Self::eager_list([Value::Node(self.clone()), args.into()]);
        Self::apply_to(call_function(), operands)
    }

    /// Build `self < other`
    pub fn lt(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::LessThan, self, other)
    }

    /// Build `self <= other`
    pub fn le(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::LessThanOrEqual, self, other)
    }

    /// Build `self > other`
    pub fn gt(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::GreaterThan, self, other)
    }

    /// Build `self >= other`
    pub fn ge(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::GreaterThanOrEqual, self, other)
    }

    /// Build `self == other`
    pub fn equals(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::Equal, self, other)
    }

    /// Build `self != other`
    pub fn not_equals(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::NotEqual, self, other)
    }

    /// Build `divmod(self, other)`
    pub fn divmod(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::DivMod, self, other)
    }

    /// Build `self ** other`
    pub fn pow(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::Power, self, other)
    }

    /// Build `self // other`
    pub fn floor_div(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::FloorDivide, self, other)
    }

    /// Build `self @ other`
    pub fn matmul(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::MatMul, self, other)
    }

    /// Build `other @ self`
    pub fn rmatmul(&self, other: impl Into<Value>) -> Self {
        Self::binary(BinaryOperator::MatMul, other, self)
    }

    /// Force the node, computing it at most once
    pub fn value(&self) -> Result<Value> {
        if let Some(value) = self.0.value.get() {
            return Ok(value.clone());
        }
        let _guard = DepthGuard::enter()?;
        // grow the host stack on demand so the depth limit trips before it runs out
        let value = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.compute())?;
        // a re-entrant force may have filled the cell meanwhile; first write wins
        Ok(self.0.value.get_or_init(|| value).clone())
    }

    /// Whether the node has already been forced
    pub fn is_resolved(&self) -> bool {
        self.0.value.get().is_some()
    }

    fn compute(&self) -> Result<Value> {
        match &self.0.kind {
            NodeKind::Literal(value) => value.resolve(),
            NodeKind::Lookup { key, scope } => {
                let scope = scope
                    .as_ref()
                    .ok_or_else(|| EvalError::UnboundSymbol {
                        key: key.to_string(),
                    })?
                    .resolve()?;
                let key = key.resolve()?;
                log::trace!("lookup {key} in {}", scope.type_name());
                scope.lookup(&key)?.resolve()
            }
            NodeKind::Apply { function, args } => {
                let args = resolve_arguments(args)?;
                log::trace!("apply {} to {} arguments", function.name(), args.len());
                function.call(&args)
            }
            NodeKind::EagerList(items) => Ok(Value::list(
                items.iter().map(Value::resolve).collect::<Result<Vec<_>>>()?,
            )),
            NodeKind::LazyList(items) => Ok(Value::LazyList(LazyListValue::from_rc(items.clone()))),
            NodeKind::Context(context) => Ok(Value::Context(context.clone())),
        }
    }

    /// The node's kind and payload
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Unresolved elements of an eager or lazy list node
    pub fn items(&self) -> Option<&[Value]> {
        match &self.0.kind {
            NodeKind::EagerList(items) | NodeKind::LazyList(items) => Some(items),
            _ => None,
        }
    }

    /// The context of a context node
    pub fn as_context(&self) -> Option<&ContextValue> {
        match &self.0.kind {
            NodeKind::Context(context) => Some(context),
            _ => None,
        }
    }

    /// Whether both handles are the same node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the node, stable for its lifetime
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

/// Force `args` into a sequence and force every element
fn resolve_arguments(args: &Value) -> Result<Vec<Value>> {
    match args.resolve()? {
        Value::List(items) => items.iter().map(Value::resolve).collect(),
        Value::LazyList(list) => list.materialize(),
        other => Err(EvalError::type_mismatch_with_context(
            "List",
            other.type_name(),
            "application arguments",
        )),
    }
}

/// `call(callee, args)`: apply the first operand to the second
fn call_function() -> Function {
    Function::new("call", |args| match args {
        [callee, argument] => callee.call(argument),
        _ => Err(EvalError::InvalidArgumentCount {
            function_name: "call".to_string(),
            expected: 2,
            actual: args.len(),
        }),
    })
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            NodeKind::Literal(value) => write!(f, "Literal({value})"),
            NodeKind::Lookup { key, .. } => write!(f, "S({key})"),
            NodeKind::Apply { function, args } => write!(f, "E({}, {args})", function.name()),
            NodeKind::EagerList(items) => write_sequence(f, items),
            NodeKind::LazyList(items) => {
                write!(f, "LazyList(")?;
                write_sequence(f, items)?;
                write!(f, ")")
            }
            NodeKind::Context(context) => {
                write!(f, "Context(")?;
                write_mapping(f, context.literal())?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self}, resolved: {})", self.is_resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_lookup_in_plain_mapping() {
        let node = Node::lookup("x", Some(Value::map([("x", 2)])));
        assert_eq!(node.value().unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_unbound_symbol_fails() {
        assert_eq!(
            Node::symbol("x").value().unwrap_err(),
            EvalError::UnboundSymbol {
                key: "'x'".to_string()
            }
        );
    }

    #[test]
    fn test_apply_forces_arguments() {
        let inner = Node::binary(BinaryOperator::Add, 1, 2);
        let node = Node::binary(BinaryOperator::Multiply, &inner, 10);
        assert!(!inner.is_resolved());
        assert_eq!(node.value().unwrap(), Value::Integer(30));
        assert!(inner.is_resolved());
    }

    #[test]
    fn test_memoized_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let node = Node::apply(
            Function::new("count", move |_| {
                counter.set(counter.get() + 1);
                Ok(Value::from(counter.get() as i64))
            }),
            [],
        );

        assert_eq!(node.value().unwrap(), Value::Integer(1));
        assert_eq!(node.value().unwrap(), Value::Integer(1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_errors_are_not_memoized() {
        let node = Node::lookup("x", Some(Value::map([("y", 1)])));
        assert!(node.value().is_err());
        assert!(!node.is_resolved());
    }

    #[test]
    fn test_eager_and_lazy_lists() {
        let eager = Node::eager_list([Node::binary(BinaryOperator::Add, 1, 1).into(), Value::from(3)]);
        assert_eq!(
            eager.value().unwrap(),
            Value::list([Value::from(2), Value::from(3)])
        );
        assert_eq!(eager.items().map(<[Value]>::len), Some(2));

        let lazy = Node::lazy_list([Node::symbol("unbound").into(), Value::from(3)]);
        let view = lazy.value().unwrap();
        let view = view.as_lazy_list().unwrap();
        assert_eq!(view.get(1).unwrap(), Value::Integer(3));
        assert!(view.get(0).is_err());
    }

    #[test]
    fn test_call_builds_deferred_application() {
        let double = Function::new("double", |args| {
            BinaryOperator::Multiply.evaluate(&args[0], &Value::from(2))
        });
        let node = Node::literal(double).call(21);
        assert!(matches!(node.kind(), NodeKind::Apply { .. }));
        assert_eq!(node.value().unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_matmul_is_deferred_then_rejected() {
        let left = Node::literal(2);
        let node = left.matmul(3);
        assert!(matches!(node.kind(), NodeKind::Apply { .. }));
        assert!(node.to_string().starts_with("E(@, "));
        assert!(matches!(
            node.value(),
            Err(EvalError::InvalidOperandTypes { operator: "@", .. })
        ));
        assert!(matches!(
            left.rmatmul("m").value(),
            Err(EvalError::InvalidOperandTypes {
                left_type: "String",
                right_type: "Integer",
                ..
            })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Node::symbol("x").to_string(), "S('x')");
        assert_eq!(
            Node::binary(BinaryOperator::Add, Node::symbol("n"), 1).to_string(),
            "E(+, [S('n'), 1])"
        );
    }
}

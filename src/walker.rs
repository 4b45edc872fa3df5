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

//! Structure-preserving graph rewriting
//!
//! [`walk`] rebuilds a value bottom-up, handing every lookup node to a
//! [`Visitor`] so it can be rewritten. Collections are walked through a
//! uniform key/value view ([`CollectionShape`]) and rebuilt in their original
//! shape. Contexts, both resolved and as nodes, are returned as they are: their
//! own rebinding already happened when they were built.
//!
//! Nothing is ever forced while walking.

use crate::context::ContextValue;
use crate::graph::{Node, NodeKind};
use crate::model::{LazyListValue, Mapping, Value};

/// Rewrite hook for [`walk`]
pub trait Visitor {
    /// Side-channel payload threaded unchanged through the whole walk
    type Data;

    /// Rewrite a lookup node
    ///
    /// The default rebuilds the lookup with its key and scope walked.
    fn visit_lookup(&self, key: &Value, scope: Option<&Value>, data: &Self::Data) -> Value {
        walk_lookup(self, key, scope, data)
    }
}

/// Walk `value`, returning the rewritten copy
pub fn walk<V: Visitor + ?Sized>(visitor: &V, value: &Value, data: &V::Data) -> Value {
    match value {
        Value::Context(_) => value.clone(),
        Value::Node(node) => walk_node(visitor, node, data),
        Value::List(_) | Value::Map(_) | Value::LazyList(_) => match CollectionShape::unpack(value) {
            Some((shape, entries)) => shape.pack(walk_entries(visitor, &entries, data)),
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Rebuild a lookup with its key and scope walked
pub fn walk_lookup<V: Visitor + ?Sized>(
    visitor: &V,
    key: &Value,
    scope: Option<&Value>,
    data: &V::Data,
) -> Value {
    let key = walk(visitor, key, data);
    let scope = scope.map(|scope| walk(visitor, scope, data));
    Node::lookup(key, scope).into()
}

fn walk_node<V: Visitor + ?Sized>(visitor: &V, node: &Node, data: &V::Data) -> Value {
    let rebuilt = match node.kind() {
        NodeKind::Context(_) => return Value::Node(node.clone()),
        NodeKind::Lookup { key, scope } => return visitor.visit_lookup(key, scope.as_ref(), data),
        NodeKind::Literal(value) => Node::literal(walk(visitor, value, data)),
        NodeKind::Apply { function, args } => {
            Node::apply_to(function.clone(), walk(visitor, args, data))
        }
        NodeKind::EagerList(items) => Node::eager_list(walk_items(visitor, items, data)),
        NodeKind::LazyList(items) => Node::lazy_list(walk_items(visitor, items, data)),
    };
    Value::Node(rebuilt)
}

fn walk_items<V: Visitor + ?Sized>(visitor: &V, items: &[Value], data: &V::Data) -> Vec<Value> {
    items.iter().map(|item| walk(visitor, item, data)).collect()
}

fn walk_entries<'a, V: Visitor + ?Sized>(
    visitor: &V,
    entries: impl IntoIterator<Item = (&'a Value, &'a Value)>,
    data: &V::Data,
) -> Mapping {
    entries
        .into_iter()
        .map(|(key, value)| (key.clone(), walk(visitor, value, data)))
        .collect()
}

/// Collection shapes the walker descends into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// Ordered sequence
    List,
    /// Lazily forced sequence
    LazyList,
    /// Key/value mapping
    Map,
}

impl CollectionShape {
    /// View a collection as a key/value mapping
    ///
    /// Sequences are keyed by integer position.
    pub fn unpack(value: &Value) -> Option<(Self, Mapping)> {
        match value {
            Value::List(items) => Some((Self::List, positional(items))),
            Value::LazyList(list) => Some((Self::LazyList, positional(list.items()))),
            Value::Map(entries) => Some((Self::Map, entries.as_ref().clone())),
            _ => None,
        }
    }

    /// Rebuild a collection of this shape from its key/value view
    ///
    /// Sequence entries are taken in key order as produced by `unpack`.
    pub fn pack(self, entries: Mapping) -> Value {
        match self {
            Self::List => Value::list(entries.into_values()),
            Self::LazyList => Value::LazyList(LazyListValue::new(entries.into_values().collect())),
            Self::Map => Value::from(entries),
        }
    }
}

fn positional(items: &[Value]) -> Mapping {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (Value::Integer(i as i64), item.clone()))
        .collect()
}

/// Redirects lookups scoped to a template onto a target context
///
/// A template of `None` selects free symbols, which is how a new context
/// claims the unbound symbols in its mapping. A template of `Some(context)`
/// selects symbols owned by that exact context instance, which is how a copy
/// takes over its original's self-references.
#[derive(Debug, Clone)]
pub struct Rebinder {
    template: Option<ContextValue>,
    target: ContextValue,
}

impl Rebinder {
    /// Create a rebinder from `template` onto `target`
    pub fn new(template: Option<ContextValue>, target: ContextValue) -> Self {
        Self { template, target }
    }

    fn is_template(&self, scope: Option<&Value>) -> bool {
        match (&self.template, scope) {
            (None, None) => true,
            (Some(template), Some(Value::Context(context))) => template.ptr_eq(context),
            _ => false,
        }
    }

    /// Rebind a single value
    pub fn rebind(&self, value: &Value) -> Value {
        walk(self, value, &())
    }

    /// Rebind every value of a mapping, keeping its keys and order
    pub fn rebind_entries<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a Value, &'a Value)>,
    ) -> Mapping {
        walk_entries(self, entries, &())
    }
}

impl Visitor for Rebinder {
    type Data = ();

    fn visit_lookup(&self, key: &Value, scope: Option<&Value>, data: &()) -> Value {
        if !self.is_template(scope) {
            return walk_lookup(self, key, scope, data);
        }
        // the scope is replaced outright, so it is not walked
        let key = walk(self, key, data);
        Node::lookup(key, Some(Value::Context(self.target.clone()))).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::operator::BinaryOperator;

    fn scope_of(value: &Value) -> Option<Value> {
        match value.as_node()?.kind() {
            NodeKind::Lookup { scope, .. } => scope.clone(),
            _ => None,
        }
    }

    fn target() -> ContextValue {
        ContextValue::new(Mapping::default())
    }

    #[test]
    fn test_binds_free_symbols_in_collections() {
        let target = target();
        let rebinder = Rebinder::new(None, target.clone());
        let value = Value::list([
            Value::map([("a", Node::symbol("x"))]),
            Node::symbol("y").into(),
            Value::from(3),
        ]);

        let walked = rebinder.rebind(&value);
        let items = walked.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(scope_of(&items[1]), Some(Value::Context(target.clone())));
        let inner = items[0].as_map().unwrap().get(&Value::from("a")).unwrap();
        assert_eq!(scope_of(inner), Some(Value::Context(target)));
        assert_eq!(items[2], Value::Integer(3));
    }

    #[test]
    fn test_descends_into_expression_arguments() {
        let target = target();
        let rebinder = Rebinder::new(None, target.clone());
        let expr = Node::binary(BinaryOperator::Add, Node::symbol("n"), 1);

        let walked = rebinder.rebind(&expr.clone().into());
        let walked = walked.as_node().unwrap();
        assert!(!walked.ptr_eq(&expr));
        let NodeKind::Apply { args, .. } = walked.kind() else {
            panic!("expected an application");
        };
        let operands = args.as_node().and_then(Node::items).unwrap();
        assert_eq!(scope_of(&operands[0]), Some(Value::Context(target)));
        assert_eq!(operands[1], Value::Integer(1));
    }

    #[test]
    fn test_skips_nested_contexts() {
        let nested = Node::context(Mapping::default());
        let rebinder = Rebinder::new(None, target());

        let walked = rebinder.rebind(&nested.clone().into());
        assert_eq!(walked, Value::Node(nested));
    }

    #[test]
    fn test_leaves_foreign_scopes_in_place() {
        let template = target();
        let other = target();
        let new_target = target();
        let rebinder = Rebinder::new(Some(template.clone()), new_target.clone());

        let owned = Node::lookup("x", Some(Value::Context(template)));
        let foreign = Node::lookup("x", Some(Value::Context(other.clone())));
        let free = Node::symbol("x");

        assert_eq!(
            scope_of(&rebinder.rebind(&owned.into())),
            Some(Value::Context(new_target))
        );
        assert_eq!(
            scope_of(&rebinder.rebind(&foreign.into())),
            Some(Value::Context(other))
        );
        assert_eq!(scope_of(&rebinder.rebind(&free.into())), None);
    }

    #[test]
    fn test_collection_shapes() {
        let list = Value::list([Value::from("a"), Value::from("b")]);
        let (shape, entries) = CollectionShape::unpack(&list).unwrap();
        assert_eq!(shape, CollectionShape::List);
        assert_eq!(entries.get(&Value::from(1)), Some(&Value::from("b")));
        assert_eq!(shape.pack(entries), list);

        assert!(CollectionShape::unpack(&Value::from(1)).is_none());
    }

    /// Prefixes every string key it meets with the payload
    struct Prefixer;

    impl Visitor for Prefixer {
        type Data = String;

        fn visit_lookup(&self, key: &Value, scope: Option<&Value>, data: &String) -> Value {
            let key = match key.as_str() {
                Some(name) => Value::from(format!("{data}{name}")),
                None => walk(self, key, data),
            };
            let scope = scope.map(|scope| walk(self, scope, data));
            Node::lookup(key, scope).into()
        }
    }

    #[test]
    fn test_custom_visitor_with_payload() {
        let scope = Value::map([("ns.x", 5)]);
        let node = Node::lookup("x", Some(scope));

        let walked = walk(&Prefixer, &node.into(), &"ns.".to_string());
        assert_eq!(walked.resolve().unwrap(), Value::Integer(5));
    }
}

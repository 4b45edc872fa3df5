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

//! Scopes with self-binding and intervention
//!
//! A [`ContextValue`] wraps a mapping whose free symbols have been rebound to
//! the context itself, which is what lets a mapping refer to its own entries
//! (and so express recursion). Contexts are compared and hashed by identity.
//!
//! Intervening on a context never touches it: a fresh context is allocated,
//! every symbol owned by the original is redirected to the fresh one, and only
//! then are the overrides applied.

use once_cell::unsync::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{EvalError, Result};
use crate::model::value::write_mapping;
use crate::model::{Mapping, Value};
use crate::walker::Rebinder;

struct ContextData {
    /// Mapping as written by the user, before any rebinding
    literal: Rc<Mapping>,
    /// Rebound mapping; written exactly once during construction
    bindings: OnceCell<Mapping>,
}

/// Resolved scope value
#[derive(Clone)]
pub struct ContextValue(Rc<ContextData>);

impl ContextValue {
    /// Build a context, binding every free symbol in `literal` to it
    pub fn new(literal: Mapping) -> Self {
        let literal = Rc::new(literal);
        let source = literal.clone();
        Self::derive(literal, source.iter(), None, None)
    }

    fn derive<'a>(
        literal: Rc<Mapping>,
        source: impl IntoIterator<Item = (&'a Value, &'a Value)>,
        template: Option<&ContextValue>,
        updates: Option<&Mapping>,
    ) -> Self {
        let context = Self(Rc::new(ContextData {
            literal,
            bindings: OnceCell::new(),
        }));

        let rebinder = Rebinder::new(template.cloned(), context.clone());
        let mut bindings = rebinder.rebind_entries(source);
        if let Some(updates) = updates {
            for (key, value) in updates {
                bindings.insert(key.clone(), value.clone());
            }
        }
        log::debug!(
            "context {:#x} built with {} bindings",
            context.id(),
            bindings.len()
        );

        // freshly allocated above, so the cell is still empty
        let _ = context.0.bindings.set(bindings);
        context
    }

    /// Raw binding for `key`
    ///
    /// The entry is returned unresolved; lookups force it afterwards.
    pub fn get(&self, key: &Value) -> Result<Value> {
        self.0
            .bindings
            .get()
            .and_then(|bindings| bindings.get(key))
            .cloned()
            .ok_or_else(|| EvalError::key_not_found(key, Some("Context".to_string())))
    }

    /// Check whether `key` is bound
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0
            .bindings
            .get()
            .is_some_and(|bindings| bindings.contains_key(key))
    }

    /// Iterate over the rebound entries in insertion order
    pub fn bindings(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.bindings.get().into_iter().flatten()
    }

    /// Iterate over the bound keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.bindings().map(|(key, _)| key)
    }

    /// Number of bound keys
    pub fn len(&self) -> usize {
        self.0.bindings.get().map_or(0, Mapping::len)
    }

    /// Check if the context binds nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mapping this context (or the context it was copied from) was
    /// originally built from
    pub fn literal(&self) -> &Mapping {
        &self.0.literal
    }

    /// Copy this context, redirecting every symbol it owns to the copy
    pub fn copy(&self) -> Self {
        Self::derive(self.0.literal.clone(), self.bindings(), Some(self), None)
    }

    /// Copy this context and override `updates` on the copy
    ///
    /// The overrides are installed as given; symbols inside them keep the
    /// scope they already had.
    pub fn intervene(&self, updates: &Mapping) -> Self {
        log::debug!(
            "intervening on context {:#x} with {} updates",
            self.id(),
            updates.len()
        );
        Self::derive(
            self.0.literal.clone(),
            self.bindings(),
            Some(self),
            Some(updates),
        )
    }

    /// Whether both handles are the same context
    pub fn ptr_eq(&self, other: &ContextValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the context, stable for its lifetime
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for ContextValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ContextValue {}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context(")?;
        match self.0.bindings.get() {
            Some(bindings) => write_mapping(f, bindings)?,
            None => write!(f, "{{}}")?,
        }
        write!(f, ")")
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextValue({:#x}, {} bindings)", self.id(), self.len())
    }
}

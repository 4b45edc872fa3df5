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

//! Lazy sequence values
//!
//! A [`LazyListValue`] is what a lazy list node resolves to: a view over the
//! *unresolved* elements that forces each one only when it is indexed or
//! iterated. Forcing goes through the element's own memo, so repeated access
//! never recomputes.

use std::fmt;
use std::rc::Rc;

use super::value::{Mapping, Value, expect_index, normalize_index, write_sequence};
use crate::error::Result;

/// Sequence view that defers element evaluation until access
#[derive(Clone)]
pub struct LazyListValue {
    items: Rc<Vec<Value>>,
}

impl LazyListValue {
    /// Create a lazy view over the given elements
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(items),
        }
    }

    /// Create a lazy view sharing an existing element vector
    pub fn from_rc(items: Rc<Vec<Value>>) -> Self {
        Self { items }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw, possibly unresolved elements
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Force the element at `index`; negative indices count from the end
    pub fn get(&self, index: i64) -> Result<Value> {
        let index = normalize_index(index, self.items.len())?;
        self.items[index].resolve()
    }

    /// Iterate over forced elements
    pub fn iter(&self) -> LazyListIter<'_> {
        LazyListIter {
            items: self.items.iter(),
        }
    }

    /// Force every element into a concrete vector
    pub fn materialize(&self) -> Result<Vec<Value>> {
        self.iter().collect()
    }

    /// Return a new view with the given indices replaced
    ///
    /// Untouched elements are shared with `self` and stay unresolved; `self`
    /// is never modified.
    pub fn intervene(&self, updates: &Mapping) -> Result<Self> {
        let mut items: Vec<Value> = self.items.as_ref().clone();
        for (key, value) in updates {
            let slot = normalize_index(expect_index(key)?, items.len())?;
            items[slot] = value.clone();
        }
        log::trace!("lazy list intervened at {} indices", updates.len());
        Ok(Self::new(items))
    }
}

/// Iterator forcing lazy list elements one at a time
#[derive(Debug)]
pub struct LazyListIter<'a> {
    items: std::slice::Iter<'a, Value>,
}

impl Iterator for LazyListIter<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(Value::resolve)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<'a> IntoIterator for &'a LazyListValue {
    type Item = Result<Value>;
    type IntoIter = LazyListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for LazyListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyList(")?;
        write_sequence(f, &self.items)?;
        write!(f, ")")
    }
}

impl fmt::Debug for LazyListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyListValue({} items)", self.items.len())
    }
}

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

//! Lazy, context-scoped symbolic expression graphs
//!
//! Graphs are built from symbols, applications and contexts, and nothing runs
//! until [`Node::value`] forces a node. Free symbols bind to the context they
//! are written in; calling a context with a mapping produces an intervened
//! copy of it, which is how parameterized and recursive programs are written.
//!
//! ```
//! use tracelang::prelude::*;
//!
//! let program = context(bindings! {
//!     "x" => 2,
//!     "y" => sym("x") * 10,
//! });
//! let changed = program.call(bindings! { "x" => 5 });
//!
//! assert_eq!(program.index("y").value().unwrap(), Value::from(20));
//! assert_eq!(changed.index("y").value().unwrap(), Value::from(50));
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod programs;
pub mod walker;

// Re-export main types
pub use config::{DEFAULT_MAX_DEPTH, EvalConfig, EvalConfigBuilder, recursion_limit, set_recursion_limit};
pub use context::ContextValue;
pub use engine::Engine;
pub use error::{EvalError, Result};
pub use graph::{BinaryOperator, Node, NodeKind};
pub use model::{Function, LazyListValue, Mapping, Value};
pub use walker::{CollectionShape, Rebinder, Visitor, walk};

/// Everything needed to write programs
pub mod prelude {
    pub use crate::bindings;
    pub use crate::graph::builder::*;
    pub use crate::{ContextValue, Engine, EvalError, Function, Mapping, Node, Value};
}

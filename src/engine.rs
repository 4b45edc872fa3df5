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

//! Tracelang engine - forcing graphs under an explicit configuration

use crate::config::{EvalConfig, LimitScope};
use crate::error::Result;
use crate::graph::Node;
use crate::model::Value;

/// Forces nodes with a fixed recursion limit
///
/// Graph construction never needs an engine; [`Node::value`] works on its own
/// under the thread's current limit. The engine only pins the limit for the
/// duration of one forcing.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EvalConfig,
}

impl Engine {
    /// Create an engine with the given configuration
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Create an engine with a custom recursion limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self::new(EvalConfig::builder().max_depth(max_depth).build())
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Force `node` under this engine's recursion limit
    pub fn evaluate(&self, node: &Node) -> Result<Value> {
        let _limit = LimitScope::install(&self.config);
        log::debug!("evaluating {node} with max depth {}", self.config.max_depth);
        node.value()
    }

    /// Force `value` if it is a node, otherwise return it unchanged
    pub fn evaluate_value(&self, value: &Value) -> Result<Value> {
        let _limit = LimitScope::install(&self.config);
        value.resolve()
    }
}

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

//! Evaluation configuration and recursion accounting
//!
//! Resolution is a plain recursive call chain, so the only bound on a
//! non-terminating definition is a depth limit. The limit and the current
//! depth are tracked per thread; every node computation enters a
//! [`DepthGuard`] for as long as it runs.

use crate::error::{EvalError, Result};
use std::cell::Cell;

/// Default maximum nesting of node computations
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Remaining stack below which a node computation moves to a fresh segment
///
/// Must cover every host frame between two nested node forces.
pub(crate) const STACK_RED_ZONE: usize = 1024 * 1024;
/// Size of each stack segment allocated when the red zone is reached
pub(crate) const STACK_GROW_SIZE: usize = 8 * 1024 * 1024;

std::thread_local! {
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
    static EVAL_LIMIT: Cell<usize> = const { Cell::new(DEFAULT_MAX_DEPTH) };
}

/// Evaluation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum evaluation depth before resolution fails with
    /// [`EvalError::RecursionLimitExceeded`]
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvalConfig {
    /// Start building a configuration from the defaults
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::new()
    }
}

/// Builder for evaluation configuration with fluent API
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    config: EvalConfig,
}

impl EvalConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum evaluation depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Build the configuration
    pub fn build(self) -> EvalConfig {
        self.config
    }
}

/// Current recursion limit of this thread
pub fn recursion_limit() -> usize {
    EVAL_LIMIT.with(Cell::get)
}

/// Set the recursion limit of this thread, returning the previous one
pub fn set_recursion_limit(limit: usize) -> usize {
    EVAL_LIMIT.with(|cell| cell.replace(limit))
}

/// Number of node computations currently in flight on this thread
pub fn current_depth() -> usize {
    EVAL_DEPTH.with(Cell::get)
}

/// One level of node computation; released on drop
#[derive(Debug)]
pub(crate) struct DepthGuard {
    _private: (),
}

impl DepthGuard {
    pub(crate) fn enter() -> Result<Self> {
        let limit = recursion_limit();
        EVAL_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                log::warn!("recursion limit of {limit} exceeded");
                return Err(EvalError::recursion_limit_exceeded(limit));
            }
            depth.set(next);
            Ok(Self { _private: () })
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Installs a recursion limit for its lifetime and restores the previous one
#[derive(Debug)]
pub(crate) struct LimitScope {
    previous: usize,
}

impl LimitScope {
    pub(crate) fn install(config: &EvalConfig) -> Self {
        Self {
            previous: set_recursion_limit(config.max_depth),
        }
    }
}

impl Drop for LimitScope {
    fn drop(&mut self) {
        set_recursion_limit(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = EvalConfig::builder().max_depth(64).build();
        assert_eq!(config.max_depth, 64);
        assert_eq!(EvalConfig::default().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_depth_guard_counts_and_releases() {
        assert_eq!(current_depth(), 0);
        {
            let _outer = DepthGuard::enter().unwrap();
            let _inner = DepthGuard::enter().unwrap();
            assert_eq!(current_depth(), 2);
        }
        assert_eq!(current_depth(), 0);
    }

    #[test]
    fn test_depth_guard_enforces_limit() {
        let _scope = LimitScope::install(&EvalConfig::builder().max_depth(1).build());
        let _first = DepthGuard::enter().unwrap();
        let err = DepthGuard::enter().unwrap_err();
        assert_eq!(err, EvalError::RecursionLimitExceeded { limit: 1 });
        assert_eq!(current_depth(), 1);
    }

    #[test]
    fn test_limit_scope_restores_previous() {
        let before = recursion_limit();
        {
            let _scope = LimitScope::install(&EvalConfig::builder().max_depth(7).build());
            assert_eq!(recursion_limit(), 7);
        }
        assert_eq!(recursion_limit(), before);
    }
}

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

//! Reference programs
//!
//! Small programs exercising recursion through contexts. Each factorial
//! program is a context expecting an `n` binding and exposing the result
//! under `res`; [`factorial`] performs the call.

use std::fmt;
use std::str::FromStr;

use crate::bindings;
use crate::error::EvalError;
use crate::graph::Node;
use crate::graph::builder::{apply, context, sym, sym_in};
use crate::model::{Function, Value};

/// `tern(cond, when_true, when_false)`
///
/// Both branches arrive already forced, so this cannot guard a recursive
/// branch on its own.
pub fn tern() -> Function {
    Function::new("tern", |args| match args {
        [cond, when_true, when_false] => Ok(if cond.is_truthy() {
            when_true.clone()
        } else {
            when_false.clone()
        }),
        _ => Err(EvalError::InvalidArgumentCount {
            function_name: "tern".to_string(),
            expected: 3,
            actual: args.len(),
        }),
    })
}

/// `n * fact(n - 1).res`, with `fact` and `n` left free
fn recursive_step() -> Node {
    sym("n") * sym_in("res", sym("fact").call(bindings! { "n" => sym("n") - 1 }))
}

/// Factorial choosing the next context to call at run time
///
/// The base case is a context already holding `res`, so `n` must be at least 1.
pub fn factorial_dynamic_structure() -> Node {
    let fact_code = context(bindings! {
        "recursive_call" => apply(tern(), [
            sym("n").equals(1),
            context(bindings! { "res" => 1 }),
            sym("fact"),
        ]),
        "res" => sym("n") * sym_in(
            "res",
            sym("recursive_call").call(bindings! { "n" => sym("n") - 1 }),
        ),
    });

    context(bindings! {
        "fact_code" => fact_code,
        "fact" => sym("fact_code").call(bindings! { "fact" => sym("fact") }),
        "res" => sym_in("res", sym("fact").call(bindings! { "n" => sym("n") })),
    })
}

/// Factorial selecting its branch by looking up a computed key
///
/// Only the selected branch of the `{true: .., false: ..}` mapping is forced.
pub fn factorial_symbolic_literal() -> Node {
    let fact_code = context(bindings! {
        "res" => sym_in(sym("n").equals(0), bindings! {
            true => 1,
            false => recursive_step(),
        }),
    });

    context(bindings! {
        "fact_code" => fact_code,
        "fact" => sym("fact_code").call(bindings! { "fact" => sym("fact") }),
        "res" => sym_in("res", sym("fact").call(bindings! { "n" => sym("n") })),
    })
}

/// Factorial whose function context is intervened on in place
pub fn factorial_call_context() -> Node {
    let fact_code = context(bindings! {
        "res" => sym_in(sym("n").equals(0), bindings! {
            true => 1,
            false => recursive_step(),
        }),
    });

    context(bindings! {
        "fact" => fact_code.call(bindings! { "fact" => sym("fact") }),
        "res" => sym_in("res", sym("fact").call(bindings! { "n" => sym("n") })),
    })
}

/// Factorial that never terminates
///
/// `tern` forces the recursive branch even when `n == 0`.
pub fn bad_factorial() -> Node {
    let fact_code = context(bindings! {
        "res" => apply(tern(), [
            Value::from(sym("n").equals(0)),
            Value::from(1),
            Value::from(recursive_step()),
        ]),
    });

    context(bindings! {
        "fact_code" => fact_code,
        "fact" => sym("fact_code").call(bindings! { "fact" => sym("fact") }),
        "res" => sym_in("res", sym("fact").call(bindings! { "n" => sym("n") })),
    })
}

/// Context assembled from an intervention computed inside the same program
///
/// `res` resolves to `6`.
pub fn dynamic_context() -> Node {
    context(bindings! {
        "base" => context(bindings! {}),
        "intervention" => bindings! {
            "n" => 2,
            "res" => sym_in("n", sym("construct")) * 3,
        },
        "construct" => sym("base").call(sym("intervention")),
        "res" => sym_in("res", sym("construct")),
    })
}

/// The factorial program variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactorialVariant {
    /// [`factorial_dynamic_structure`]
    #[default]
    Dynamic,
    /// [`factorial_symbolic_literal`]
    Symbolic,
    /// [`factorial_call_context`]
    CallContext,
}

impl FactorialVariant {
    /// All variants
    pub const ALL: [Self; 3] = [Self::Dynamic, Self::Symbolic, Self::CallContext];

    /// Build the program for this variant
    pub fn program(self) -> Node {
        match self {
            Self::Dynamic => factorial_dynamic_structure(),
            Self::Symbolic => factorial_symbolic_literal(),
            Self::CallContext => factorial_call_context(),
        }
    }

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Symbolic => "symbolic",
            Self::CallContext => "call-context",
        }
    }
}

impl fmt::Display for FactorialVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FactorialVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == s)
            .ok_or_else(|| format!("unknown factorial variant '{s}'"))
    }
}

/// `program({'n': n})['res']`
pub fn factorial(program: &Node, n: i64) -> Node {
    program.call(bindings! { "n" => n }).index("res")
}

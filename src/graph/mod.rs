//! Lazy expression graph
//!
//! Nodes, the primitive operators they apply and the builders and operator
//! sugar used to construct them.

pub mod builder;
pub mod node;
pub mod operator;
mod sugar;

pub use node::{Node, NodeKind};
pub use operator::BinaryOperator;

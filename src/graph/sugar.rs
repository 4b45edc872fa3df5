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

//! Operator facade over [`Node::binary`]
//!
//! Arithmetic and bitwise operators on nodes build application nodes; nothing
//! is evaluated. Reflected forms (`3 * node`) keep the scalar on the left.

use std::ops;

use super::node::Node;
use super::operator::BinaryOperator;
use crate::model::Value;

macro_rules! binary_sugar {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {$(
        impl<T: Into<Value>> ops::$trait<T> for Node {
            type Output = Node;

            fn $method(self, rhs: T) -> Node {
                Node::binary(BinaryOperator::$op, self, rhs)
            }
        }

        impl<T: Into<Value>> ops::$trait<T> for &Node {
            type Output = Node;

            fn $method(self, rhs: T) -> Node {
                Node::binary(BinaryOperator::$op, self, rhs)
            }
        }

        binary_sugar!(@reflected $trait :: $method => $op, i32, i64, f64);
    )*};

    (@reflected $trait:ident :: $method:ident => $op:ident, $($scalar:ty),*) => {$(
        impl ops::$trait<Node> for $scalar {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                Node::binary(BinaryOperator::$op, self, rhs)
            }
        }

        impl ops::$trait<&Node> for $scalar {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                Node::binary(BinaryOperator::$op, self, rhs)
            }
        }
    )*};
}

binary_sugar! {
    Add::add => Add,
    Sub::sub => Subtract,
    Mul::mul => Multiply,
    Div::div => Divide,
    Rem::rem => Modulo,
    BitAnd::bitand => BitAnd,
    BitOr::bitor => BitOr,
    BitXor::bitxor => BitXor,
    Shl::shl => LeftShift,
    Shr::shr => RightShift,
}

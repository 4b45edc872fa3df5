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

//! Primitive binary operators
//!
//! Operators never run when an expression is built; building wraps them in an
//! application node. [`BinaryOperator::evaluate`] is what that node finally
//! invokes on the two resolved operands.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{EvalError, Result};
use crate::model::{Function, Value};

/// Binary operators available on graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Comparison operators
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Equality (==)
    Equal,
    /// Inequality (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,

    // Arithmetic operators
    /// Addition, string and list concatenation (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// True division, always a float (/)
    Divide,
    /// Floor division (//)
    FloorDivide,
    /// Modulo with the sign of the divisor (%)
    Modulo,
    /// Floor quotient and remainder as a two element list
    DivMod,
    /// Exponentiation (**)
    Power,
    /// Matrix multiplication (@); no built-in value supports it
    MatMul,

    // Bitwise operators
    /// Left shift (<<)
    LeftShift,
    /// Right shift (>>)
    RightShift,
    /// Bitwise or logical AND (&)
    BitAnd,
    /// Bitwise or logical XOR (^)
    BitXor,
    /// Bitwise or logical OR (|)
    BitOr,
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(Self::Int(*i)),
            Value::Boolean(b) => Some(Self::Int(i64::from(*b))),
            Value::Float(f) => Some(Self::Float(*f)),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl BinaryOperator {
    /// Get the string representation of this operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::FloorDivide => "//",
            Self::Modulo => "%",
            Self::DivMod => "divmod",
            Self::Power => "**",
            Self::MatMul => "@",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
        }
    }

    /// Check if this is a comparison operator
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::LessThanOrEqual
                | Self::Equal
                | Self::NotEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    /// The operator as a two argument function for application nodes
    pub fn function(self) -> Function {
        Function::new(self.symbol(), move |args| {
            match args {
                [left, right] => self.evaluate(left, right),
                _ => Err(EvalError::InvalidArgumentCount {
                    function_name: self.symbol().to_string(),
                    expected: 2,
                    actual: args.len(),
                }),
            }
        })
    }

    /// Apply the operator to two resolved operands
    pub fn evaluate(self, left: &Value, right: &Value) -> Result<Value> {
        match self {
            Self::Equal => Ok(Value::Boolean(loose_eq(left, right))),
            Self::NotEqual => Ok(Value::Boolean(!loose_eq(left, right))),
            Self::LessThan => self.compare(left, right, Ordering::is_lt),
            Self::LessThanOrEqual => self.compare(left, right, Ordering::is_le),
            Self::GreaterThan => self.compare(left, right, Ordering::is_gt),
            Self::GreaterThanOrEqual => self.compare(left, right, Ordering::is_ge),
            Self::Add => self.add(left, right),
            Self::Subtract => self.arithmetic(left, right, i64::checked_sub, |a, b| a - b),
            Self::Multiply => self.arithmetic(left, right, i64::checked_mul, |a, b| a * b),
            Self::Divide => self.divide(left, right),
            Self::FloorDivide => self.floor_divide(left, right),
            Self::Modulo => self.modulo(left, right),
            Self::DivMod => Ok(Value::list([
                self.floor_divide(left, right)?,
                self.modulo(left, right)?,
            ])),
            Self::Power => self.power(left, right),
            Self::MatMul => Err(self.invalid(left, right)),
            Self::LeftShift | Self::RightShift => self.shift(left, right),
            Self::BitAnd | Self::BitXor | Self::BitOr => self.bitwise(left, right),
        }
    }

    fn invalid(self, left: &Value, right: &Value) -> EvalError {
        EvalError::InvalidOperandTypes {
            operator: self.symbol(),
            left_type: left.type_name(),
            right_type: right.type_name(),
        }
    }

    fn numbers(self, left: &Value, right: &Value) -> Result<(Number, Number)> {
        match (Number::of(left), Number::of(right)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(self.invalid(left, right)),
        }
    }

    fn integers(self, left: &Value, right: &Value) -> Result<(i64, i64)> {
        match self.numbers(left, right)? {
            (Number::Int(a), Number::Int(b)) => Ok((a, b)),
            _ => Err(self.invalid(left, right)),
        }
    }

    fn compare(self, left: &Value, right: &Value, accept: fn(Ordering) -> bool) -> Result<Value> {
        let ordering = partial_compare(left, right).ok_or_else(|| self.invalid(left, right))?;
        // unordered floats compare false both ways
        Ok(Value::Boolean(ordering.is_some_and(accept)))
    }

    fn add(self, left: &Value, right: &Value) -> Result<Value> {
        match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::from(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                Ok(Value::list(a.iter().chain(b.iter()).cloned()))
            }
            _ => self.arithmetic(left, right, i64::checked_add, |a, b| a + b),
        }
    }

    fn arithmetic(
        self,
        left: &Value,
        right: &Value,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Value> {
        match self.numbers(left, right)? {
            (Number::Int(a), Number::Int(b)) => int_op(a, b)
                .map(Value::Integer)
                .ok_or(EvalError::ArithmeticOverflow {
                    operation: self.symbol(),
                }),
            (a, b) => Ok(Value::Float(float_op(a.to_f64(), b.to_f64()))),
        }
    }

    fn divide(self, left: &Value, right: &Value) -> Result<Value> {
        let (a, b) = self.numbers(left, right)?;
        let divisor = b.to_f64();
        if divisor == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Value::Float(a.to_f64() / divisor))
    }

    fn floor_divide(self, left: &Value, right: &Value) -> Result<Value> {
        match self.numbers(left, right)? {
            (Number::Int(_), Number::Int(0)) => Err(EvalError::DivisionByZero),
            (Number::Int(a), Number::Int(b)) => {
                let quotient = a.checked_div(b).ok_or(EvalError::ArithmeticOverflow {
                    operation: self.symbol(),
                })?;
                let floored = if a % b != 0 && ((a < 0) != (b < 0)) {
                    quotient - 1
                } else {
                    quotient
                };
                Ok(Value::Integer(floored))
            }
            (a, b) => {
                let divisor = b.to_f64();
                if divisor == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float((a.to_f64() / divisor).floor()))
            }
        }
    }

    fn modulo(self, left: &Value, right: &Value) -> Result<Value> {
        match self.numbers(left, right)? {
            (Number::Int(_), Number::Int(0)) => Err(EvalError::DivisionByZero),
            (Number::Int(a), Number::Int(b)) => {
                let remainder = a.checked_rem(b).ok_or(EvalError::ArithmeticOverflow {
                    operation: self.symbol(),
                })?;
                if remainder != 0 && ((remainder < 0) != (b < 0)) {
                    Ok(Value::Integer(remainder + b))
                } else {
                    Ok(Value::Integer(remainder))
                }
            }
            (a, b) => {
                let (a, b) = (a.to_f64(), b.to_f64());
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                let remainder = a % b;
                if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                    Ok(Value::Float(remainder + b))
                } else {
                    Ok(Value::Float(remainder))
                }
            }
        }
    }

    fn power(self, left: &Value, right: &Value) -> Result<Value> {
        match self.numbers(left, right)? {
            (Number::Int(a), Number::Int(b)) if b >= 0 => u32::try_from(b)
                .ok()
                .and_then(|exp| a.checked_pow(exp))
                .map(Value::Integer)
                .ok_or(EvalError::ArithmeticOverflow {
                    operation: self.symbol(),
                }),
            (a, b) => {
                let (a, b) = (a.to_f64(), b.to_f64());
                if a == 0.0 && b < 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(a.powf(b)))
            }
        }
    }

    fn shift(self, left: &Value, right: &Value) -> Result<Value> {
        let (value, count) = self.integers(left, right)?;
        if count < 0 {
            return Err(EvalError::type_mismatch_with_context(
                "non-negative shift count",
                count.to_string(),
                self.symbol(),
            ));
        }
        let shifted = if self == Self::LeftShift {
            let overflow = EvalError::ArithmeticOverflow {
                operation: self.symbol(),
            };
            if value == 0 {
                0
            } else if count >= 63 {
                return Err(overflow);
            } else {
                let shifted = value << count;
                if shifted >> count != value {
                    return Err(overflow);
                }
                shifted
            }
        } else if count >= 64 {
            if value < 0 { -1 } else { 0 }
        } else {
            value >> count
        };
        Ok(Value::Integer(shifted))
    }

    fn bitwise(self, left: &Value, right: &Value) -> Result<Value> {
        if let (Value::Boolean(a), Value::Boolean(b)) = (left, right) {
            let result = match self {
                Self::BitAnd => a & b,
                Self::BitXor => a ^ b,
                _ => a | b,
            };
            return Ok(Value::Boolean(result));
        }
        let (a, b) = self.integers(left, right)?;
        let result = match self {
            Self::BitAnd => a & b,
            Self::BitXor => a ^ b,
            _ => a | b,
        };
        Ok(Value::Integer(result))
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Equality with numeric coercion across integer, float and boolean
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| loose_eq(x, y))
        }
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
            (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
            _ => left == right,
        },
    }
}

/// Ordering of two comparable values
///
/// The outer `None` means the types cannot be ordered at all; the inner
/// `None` means they are comparable but unordered (NaN).
fn partial_compare(left: &Value, right: &Value) -> Option<Option<Ordering>> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match partial_compare(x, y)? {
                    Some(Ordering::Equal) => continue,
                    other => return Some(other),
                }
            }
            Some(Some(a.len().cmp(&b.len())))
        }
        _ => match (Number::of(left)?, Number::of(right)?) {
            (Number::Int(a), Number::Int(b)) => Some(Some(a.cmp(&b))),
            (a, b) => Some(a.to_f64().partial_cmp(&b.to_f64())),
        },
    }
}

//! Typing and coercion rules for unary/binary operators.
//!
//! Two implicit coercions exist: `Int -> Bool` (`0` is false, anything else
//! is true) and `Bool -> Int` (`false` is `0`, `true` is `1`). Each operator
//! below accepts a fixed set of operand-type patterns and, where the table
//! says so, applies exactly one of those coercions to make an operand match;
//! no other implicit conversion happens anywhere in the language.

use crate::ast::{BinOp, UnOp};
use crate::error::EvalError;
use crate::value::{Value, values_equal};

fn coerce_int_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(n) => Some(*n != 0),
        _ => None,
    }
}

fn coerce_bool_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Coerces a condition value (`if`/`while`) to `bool`. Accepts `Int` via
/// the `Int -> Bool` coercion and rejects everything else, including
/// `String` and `Object` — the condition site does not accept `any`.
pub(crate) fn coerce_condition(value: &Value) -> Result<bool, EvalError> {
    coerce_int_to_bool(value)
        .ok_or_else(|| EvalError::type_error(format!("expected bool inside condition but got {}", value.type_name())))
}

pub(crate) fn eval_unary(op: UnOp, operand: &Value) -> Result<Value, EvalError> {
    match op {
        UnOp::Neg => match operand {
            Value::Int(n) => Ok(Value::Int(-n)),
            other => Err(incompatible_unary("neg", other)),
        },
        UnOp::Not => coerce_int_to_bool(operand)
            .map(|b| Value::Bool(!b))
            .ok_or_else(|| incompatible_unary("!", operand)),
    }
}

pub(crate) fn eval_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => eval_add(lhs, rhs),
        BinOp::Sub => int_int(lhs, rhs, "-").map(|(a, b)| Value::Int(a - b)),
        BinOp::Mul => int_int(lhs, rhs, "*").map(|(a, b)| Value::Int(a * b)),
        BinOp::Div => {
            let (a, b) = int_int(lhs, rhs, "/")?;
            if b == 0 {
                return Err(EvalError::arithmetic("division by zero"));
            }
            // Truncates toward zero (Rust's native `/` for signed integers),
            // per the language spec — a deliberate divergence from
            // `interpreterv4.py`'s `//`, which floors toward negative
            // infinity.
            Ok(Value::Int(a / b))
        }
        BinOp::Eq => Ok(Value::Bool(eval_equals(lhs, rhs))),
        // `!=` only has the `(any, any)` pattern in the operator table — unlike
        // `==` it never applies the Int<->Bool coercion, so it is *not* simply
        // `!eval_equals(...)`: `1 != true` is `true` even though `1 == true` is
        // also `true`, matching `interpreterv4.py`'s `are_values_equal` used
        // directly (with no coercion step) for `!=`.
        BinOp::Ne => Ok(Value::Bool(!values_equal(lhs, rhs))),
        BinOp::Lt => strict_int_int(lhs, rhs, "<").map(|(a, b)| Value::Bool(a < b)),
        BinOp::Le => strict_int_int(lhs, rhs, "<=").map(|(a, b)| Value::Bool(a <= b)),
        BinOp::Gt => strict_int_int(lhs, rhs, ">").map(|(a, b)| Value::Bool(a > b)),
        BinOp::Ge => strict_int_int(lhs, rhs, ">=").map(|(a, b)| Value::Bool(a >= b)),
        BinOp::And => bool_bool(lhs, rhs, "&&").map(|(a, b)| Value::Bool(a && b)),
        BinOp::Or => bool_bool(lhs, rhs, "||").map(|(a, b)| Value::Bool(a || b)),
    }
}

/// `+` uniquely accepts `(String, String)` in addition to `(Int, Int)` with
/// `Bool -> Int` coercion; every other arithmetic operator is `Int`-only.
fn eval_add(lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        return Ok(Value::Str(format!("{a}{b}")));
    }
    let (a, b) = int_int(lhs, rhs, "+")?;
    Ok(Value::Int(a + b))
}

fn int_int(lhs: &Value, rhs: &Value, op: &str) -> Result<(i64, i64), EvalError> {
    match (coerce_bool_to_int(lhs), coerce_bool_to_int(rhs)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(incompatible_binary(op, lhs, rhs)),
    }
}

/// `<` `<=` `>` `>=` only accept `(Int, Int)` with no coercion column at
/// all — unlike the other arithmetic operators, a `Bool` operand never
/// matches here, so `true < 2` is a `TypeError`.
fn strict_int_int(lhs: &Value, rhs: &Value, op: &str) -> Result<(i64, i64), EvalError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        _ => Err(incompatible_binary(op, lhs, rhs)),
    }
}

fn bool_bool(lhs: &Value, rhs: &Value, op: &str) -> Result<(bool, bool), EvalError> {
    match (coerce_int_to_bool(lhs), coerce_int_to_bool(rhs)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(incompatible_binary(op, lhs, rhs)),
    }
}

/// `==`/`!=` equality: `(Int, Int)` and `(any, any)` compare directly;
/// `(Bool, Bool)` additionally coerces an `Int` operand to `Bool` first.
/// Differing types are unequal except through that one coercion.
fn eval_equals(lhs: &Value, rhs: &Value) -> bool {
    if lhs.type_name() == rhs.type_name() {
        return values_equal(lhs, rhs);
    }
    match (coerce_int_to_bool(lhs), coerce_int_to_bool(rhs)) {
        (Some(a), Some(b)) if matches!(lhs, Value::Int(_) | Value::Bool(_)) && matches!(rhs, Value::Int(_) | Value::Bool(_)) => a == b,
        _ => false,
    }
}

fn incompatible_binary(op: &str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::type_error(format!(
        "incompatible types {}, {} for operation {op}",
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn incompatible_unary(op: &str, operand: &Value) -> EvalError {
    EvalError::type_error(format!("incompatible type {} for operation {op}", operand.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_coerces_bool_operand_to_int() {
        let result = eval_binary(BinOp::Add, &Value::Int(1), &Value::Bool(true)).unwrap();
        assert!(matches!(result, Value::Int(2)));
    }

    #[test]
    fn string_concatenation_does_not_coerce() {
        let result = eval_binary(BinOp::Add, &Value::Str("a".into()), &Value::Str("b".into())).unwrap();
        match result {
            Value::Str(s) => assert_eq!(s, "ab"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_an_arithmetic_error() {
        let err = eval_binary(BinOp::Div, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert!(matches!(err, EvalError::Arithmetic(_)));
    }

    #[test]
    fn division_truncates_toward_zero() {
        // Spec-mandated truncation, not `interpreterv4.py`'s floor division
        // (`//`): `-7 / 2` is `-3` here, not `-4`.
        let result = eval_binary(BinOp::Div, &Value::Int(-7), &Value::Int(2)).unwrap();
        assert!(matches!(result, Value::Int(-3)));
    }

    #[test]
    fn equality_rejects_mixed_types_outside_int_bool_coercion() {
        let result = eval_binary(BinOp::Eq, &Value::Int(1), &Value::Str("1".into())).unwrap();
        assert!(matches!(result, Value::Bool(false)));
    }

    #[test]
    fn equality_allows_int_bool_coercion() {
        let result = eval_binary(BinOp::Eq, &Value::Int(1), &Value::Bool(true)).unwrap();
        assert!(matches!(result, Value::Bool(true)));
    }

    #[test]
    fn not_equal_does_not_apply_the_int_bool_coercion_equal_does() {
        // `==` coerces 1 to true here, so both comparisons report "equal".
        let eq = eval_binary(BinOp::Eq, &Value::Int(1), &Value::Bool(true)).unwrap();
        let ne = eval_binary(BinOp::Ne, &Value::Int(1), &Value::Bool(true)).unwrap();
        assert!(matches!(eq, Value::Bool(true)));
        assert!(matches!(ne, Value::Bool(true)));
    }

    #[test]
    fn condition_rejects_non_coercible_type() {
        assert!(coerce_condition(&Value::Str("s".into())).is_err());
    }

    #[test]
    fn relational_operators_reject_bool_operands_unlike_arithmetic() {
        // Unlike `+`/`-`/`*`/`/`, the relational table has no coercion column:
        // a `Bool` operand never matches `(Int, Int)` here.
        assert!(eval_binary(BinOp::Lt, &Value::Bool(true), &Value::Int(2)).is_err());
        assert!(eval_binary(BinOp::Le, &Value::Int(1), &Value::Bool(false)).is_err());
        assert!(eval_binary(BinOp::Gt, &Value::Bool(true), &Value::Bool(false)).is_err());
        assert!(eval_binary(BinOp::Ge, &Value::Int(1), &Value::Bool(true)).is_err());
    }
}

// Built-in calculator functions: SIN, COS, TAN, ASIN, ACOS, ATAN,
// SQRT, LN, LOG10, EXP, ABS

use super::eval::{evaluate, Value};
use super::parser::Expr;

/// Check if a function name is a known built-in function.
/// This is the single source of truth for supported functions.
/// Names are lowercase (as produced by the tokenizer).
pub fn is_known_function(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "asin" | "acos" | "atan"
            | "sqrt" | "ln" | "log10" | "exp" | "abs"
    )
}

pub(crate) fn evaluate_function(name: &str, args: &[Expr]) -> Value {
    match name {
        "sin" => unary(name, args, |n| Value::Number(n.sin())),
        "cos" => unary(name, args, |n| Value::Number(n.cos())),
        "tan" => unary(name, args, |n| Value::Number(n.tan())),
        "asin" => unary(name, args, |n| {
            if !(-1.0..=1.0).contains(&n) {
                Value::Error("#NUM!".to_string())
            } else {
                Value::Number(n.asin())
            }
        }),
        "acos" => unary(name, args, |n| {
            if !(-1.0..=1.0).contains(&n) {
                Value::Error("#NUM!".to_string())
            } else {
                Value::Number(n.acos())
            }
        }),
        "atan" => unary(name, args, |n| Value::Number(n.atan())),
        "sqrt" => unary(name, args, |n| {
            if n < 0.0 {
                Value::Error("#NUM!".to_string())
            } else {
                Value::Number(n.sqrt())
            }
        }),
        "ln" => unary(name, args, |n| {
            if n <= 0.0 {
                Value::Error("#NUM!".to_string())
            } else {
                Value::Number(n.ln())
            }
        }),
        "log10" => unary(name, args, |n| {
            if n <= 0.0 {
                Value::Error("#NUM!".to_string())
            } else {
                Value::Number(n.log10())
            }
        }),
        "exp" => unary(name, args, |n| Value::Number(n.exp())),
        "abs" => unary(name, args, |n| Value::Number(n.abs())),
        _ => Value::Error(format!("Unknown function: {}", name)),
    }
}

fn unary(name: &str, args: &[Expr], f: impl Fn(f64) -> Value) -> Value {
    if args.len() != 1 {
        return Value::Error(format!("{} requires exactly one argument", name));
    }
    match evaluate(&args[0]).to_number() {
        Ok(n) => f(n),
        Err(e) => Value::Error(e),
    }
}

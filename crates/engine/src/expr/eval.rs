// Expression evaluator - evaluates parsed expressions to scalar values

use serde::{Deserialize, Serialize};

use super::functions;
use super::parser::{Constant, Expr, Op};

/// Scalar outcome of evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Error(String),
}

impl Value {
    pub fn to_number(&self) -> Result<f64, String> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Error(e) => Err(e.clone()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

/// Evaluate an expression tree.
///
/// Pure: no lookups, no hidden state. Errors propagate bottom-up as
/// `Value::Error` and short-circuit the surrounding operation.
pub fn evaluate(expr: &Expr) -> Value {
    match expr {
        Expr::Number(n) => Value::Number(*n),
        Expr::Constant(Constant::Pi) => Value::Number(std::f64::consts::PI),
        Expr::Constant(Constant::E) => Value::Number(std::f64::consts::E),
        Expr::Function { name, args } => functions::evaluate_function(name, args),
        Expr::BinaryOp { op, left, right } => {
            let left_val = match evaluate(left).to_number() {
                Ok(n) => n,
                Err(e) => return Value::Error(e),
            };
            let right_val = match evaluate(right).to_number() {
                Ok(n) => n,
                Err(e) => return Value::Error(e),
            };
            match op {
                Op::Add => Value::Number(left_val + right_val),
                Op::Sub => Value::Number(left_val - right_val),
                Op::Mul => Value::Number(left_val * right_val),
                Op::Div => {
                    if right_val == 0.0 {
                        return Value::Error("#DIV/0!".to_string());
                    }
                    Value::Number(left_val / right_val)
                }
                Op::Pow => Value::Number(left_val.powf(right_val)),
            }
        }
    }
}

/// Round to 10 decimal places to suppress binary floating point noise.
pub fn round_result(value: f64) -> f64 {
    (value * 1e10).round() / 1e10
}

/// Format a numeric result as a plain decimal string.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

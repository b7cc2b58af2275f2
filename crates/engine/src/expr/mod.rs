// Expression normalization, parsing and evaluation

pub mod normalize;
pub mod parser;
pub mod eval;
pub mod functions;

/// Sentinel displayed in place of a numeric result when evaluation fails.
pub const ERROR_SENTINEL: &str = "Error";

/// Full display pipeline: rewrite keypad symbols, parse, evaluate, format.
///
/// Every failure mode — parse error, evaluation error, non-finite result —
/// collapses to [`ERROR_SENTINEL`]. Callers never see an Err.
pub fn calculate(raw: &str) -> String {
    let normalized = normalize::normalize(raw);
    let expr = match parser::parse(&normalized) {
        Ok(expr) => expr,
        Err(_) => return ERROR_SENTINEL.to_string(),
    };
    match eval::evaluate(&expr) {
        eval::Value::Number(n) => {
            let rounded = eval::round_result(n);
            if rounded.is_finite() {
                eval::format_number(rounded)
            } else {
                ERROR_SENTINEL.to_string()
            }
        }
        eval::Value::Error(_) => ERROR_SENTINEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(calculate("2+2"), "4");
        assert_eq!(calculate("2^10"), "1024");
        assert_eq!(calculate("10-4*2"), "2");
    }

    #[test]
    fn test_display_symbols() {
        assert_eq!(calculate("2×3÷4"), "1.5");
        assert_eq!(calculate("√(16)"), "4");
    }

    #[test]
    fn test_rounding_suppresses_float_noise() {
        // 0.1 + 0.2 is 0.30000000000000004 in binary floating point
        assert_eq!(calculate("0.1+0.2"), "0.3");
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(calculate("sin(0)"), "0");
        assert_eq!(calculate("cos(0)"), "1");
        assert_eq!(calculate("log(100)"), "2");
        assert_eq!(calculate("ln(e)"), "1");
        assert_eq!(calculate("π"), "3.1415926536");
    }

    #[test]
    fn test_division_by_zero_is_sentinel() {
        assert_eq!(calculate("1/0"), ERROR_SENTINEL);
    }

    #[test]
    fn test_overflow_is_sentinel() {
        assert_eq!(calculate("10^5000"), ERROR_SENTINEL);
    }

    #[test]
    fn test_malformed_input_is_sentinel() {
        assert_eq!(calculate("2+"), ERROR_SENTINEL);
        assert_eq!(calculate("5!"), ERROR_SENTINEL);
        assert_eq!(calculate("2π"), ERROR_SENTINEL);
        assert_eq!(calculate(""), ERROR_SENTINEL);
        assert_eq!(calculate("(1+2"), ERROR_SENTINEL);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let first = calculate("sin(1)+2^0.5");
        let second = calculate("sin(1)+2^0.5");
        assert_eq!(first, second);
    }

    #[test]
    fn test_percent_key_expansion() {
        // The % key appends "/100" to the input
        assert_eq!(calculate("50/100"), "0.5");
    }
}

// Symbol normalizer - rewrites keypad display symbols into parser vocabulary
//
// Substitutions are purely textual and the tokens do not overlap, so the
// order of the table is irrelevant. Malformed input is left untouched and
// rejected later by the parser.

/// Display symbol -> parser token substitutions.
///
/// `log(` is the base-10 logarithm key; `ln(`, `sin(`, `cos(`, `tan(`,
/// `log10(` and the constant `e` already match the parser vocabulary and
/// pass through unchanged.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("×", "*"),
    ("÷", "/"),
    ("π", "pi"),
    ("√", "sqrt"),
    ("log(", "log10("),
];

/// Rewrite calculator display symbols into the evaluator's vocabulary.
pub fn normalize(input: &str) -> String {
    let mut out = input.to_string();
    for (display, token) in SUBSTITUTIONS {
        if out.contains(display) {
            out = out.replace(display, token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_divide() {
        assert_eq!(normalize("2×3÷4"), "2*3/4");
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(normalize("√(16)"), "sqrt(16)");
    }

    #[test]
    fn test_trig_passes_through() {
        assert_eq!(normalize("sin(0)"), "sin(0)");
        assert_eq!(normalize("tan(π)"), "tan(pi)");
    }

    #[test]
    fn test_log_is_base_ten() {
        assert_eq!(normalize("log(100)"), "log10(100)");
    }

    #[test]
    fn test_log10_not_double_rewritten() {
        assert_eq!(normalize("log10(100)"), "log10(100)");
    }

    #[test]
    fn test_ln_untouched() {
        assert_eq!(normalize("ln(e)"), "ln(e)");
    }

    #[test]
    fn test_ascii_operators_untouched() {
        assert_eq!(normalize("2*3/4^2"), "2*3/4^2");
    }
}

// Keypad layout - labels, appended tokens, and key kinds
//
// Tokens are display symbols; the engine's normalizer rewrites them into
// parser vocabulary at evaluation time.

/// What pressing a key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Number,
    Operator,
    Function,
    Action,
    Clear,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyDef {
    pub label: &'static str,
    pub token: &'static str,
    pub kind: KeyKind,
}

const fn key(label: &'static str, token: &'static str, kind: KeyKind) -> KeyDef {
    KeyDef { label, token, kind }
}

/// Grid width shared by both layouts.
pub const KEYPAD_COLS: usize = 4;

/// Standard keypad, row-major.
pub const STANDARD_KEYS: &[KeyDef] = &[
    key("AC", "AC", KeyKind::Clear),
    key("DEL", "DEL", KeyKind::Clear),
    key("%", "/100", KeyKind::Operator),
    key("÷", "÷", KeyKind::Operator),
    key("7", "7", KeyKind::Number),
    key("8", "8", KeyKind::Number),
    key("9", "9", KeyKind::Number),
    key("×", "×", KeyKind::Operator),
    key("4", "4", KeyKind::Number),
    key("5", "5", KeyKind::Number),
    key("6", "6", KeyKind::Number),
    key("-", "-", KeyKind::Operator),
    key("1", "1", KeyKind::Number),
    key("2", "2", KeyKind::Number),
    key("3", "3", KeyKind::Number),
    key("+", "+", KeyKind::Operator),
    key("0", "0", KeyKind::Number),
    key(".", ".", KeyKind::Number),
    key("=", "=", KeyKind::Action),
];

/// Extra rows shown above the standard keys in scientific mode.
pub const SCIENTIFIC_KEYS: &[KeyDef] = &[
    key("sin", "sin(", KeyKind::Function),
    key("cos", "cos(", KeyKind::Function),
    key("tan", "tan(", KeyKind::Function),
    key("ln", "ln(", KeyKind::Function),
    key("log", "log(", KeyKind::Function),
    key("π", "π", KeyKind::Number),
    key("e", "e", KeyKind::Number),
    key("√", "√(", KeyKind::Function),
    key("^", "^", KeyKind::Operator),
    key("(", "(", KeyKind::Operator),
    key(")", ")", KeyKind::Operator),
    key("!", "!", KeyKind::Operator),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout_fills_rows() {
        // 4 full rows plus the final 0 . = row
        assert_eq!(STANDARD_KEYS.len(), 19);
    }

    #[test]
    fn test_scientific_layout_is_whole_rows() {
        assert_eq!(SCIENTIFIC_KEYS.len() % KEYPAD_COLS, 0);
    }

    #[test]
    fn test_function_keys_open_a_call() {
        for def in SCIENTIFIC_KEYS.iter().filter(|k| k.kind == KeyKind::Function) {
            assert!(def.token.ends_with('('), "{} should append an open call", def.label);
        }
    }
}

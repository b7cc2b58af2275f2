// Session state machine - current input, last result, keypad mode
//
// All transitions are synchronous and complete within one event-handling
// step. The only collaborator with latency (the AI solver) reports back
// through `ai_answered` without touching the live input/result.

use nebula_engine::expr;

use crate::history::{HistoryEntry, HistoryLog};

/// Result label recorded for AI-sourced history entries. The solved value
/// stays in the response panel; only the query is logged.
pub const AI_RESULT_LABEL: &str = "AI Solved";

/// Which keypad layout is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Standard,
    Scientific,
    /// Reserved for a dedicated AI-solver layout; no keys map to it yet.
    AiSolver,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Scientific => "scientific",
            Mode::AiSolver => "ai-solver",
        }
    }
}

/// One in-memory calculator session. Owns everything; nothing is shared
/// and nothing survives the process.
#[derive(Debug)]
pub struct Session {
    input: String,
    result: String,
    mode: Mode,
    history: HistoryLog,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            result: String::new(),
            mode: Mode::Standard,
            history: HistoryLog::new(),
        }
    }

    pub fn with_history_capacity(cap: usize) -> Self {
        Self {
            history: HistoryLog::with_capacity(cap),
            ..Self::new()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Concatenate a keypad or keyboard token onto the input.
    ///
    /// After a computed result this keeps extending the existing text
    /// rather than starting fresh - the shipped behavior, kept as-is.
    pub fn append(&mut self, token: &str) {
        self.input.push_str(token);
    }

    /// Evaluate the current input. No-op when the input is empty.
    ///
    /// Both numeric results and the error sentinel are stored and logged;
    /// the input stays put so a malformed expression can be corrected.
    pub fn equals(&mut self) {
        if self.input.is_empty() {
            return;
        }
        let result = expr::calculate(&self.input);
        self.result = result.clone();
        self.history.push(HistoryEntry::standard(&self.input, &result));
    }

    /// Wipe input and result from any state.
    pub fn clear_all(&mut self) {
        self.input.clear();
        self.result.clear();
    }

    /// Remove the last character of the input.
    pub fn delete_last(&mut self) {
        self.input.pop();
    }

    /// Load a logged entry's expression/result verbatim, no re-evaluation.
    /// Returns false if the index is out of range.
    pub fn select_history(&mut self, index: usize) -> bool {
        match self.history.get(index) {
            Some(entry) => {
                self.input = entry.expression.clone();
                self.result = entry.result.clone();
                true
            }
            None => false,
        }
    }

    /// Log a completed AI query without mutating the live input/result.
    pub fn ai_answered(&mut self, query: &str) {
        self.history.push(HistoryEntry::ai(query, AI_RESULT_LABEL));
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Flip between the standard and scientific keypads.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Standard => Mode::Scientific,
            _ => Mode::Standard,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::EntryKind;

    #[test]
    fn test_append_and_equals() {
        let mut session = Session::new();
        session.append("2");
        session.append("+");
        session.append("2");
        session.equals();
        assert_eq!(session.input(), "2+2");
        assert_eq!(session.result(), "4");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().entries()[0].kind, EntryKind::Standard);
    }

    #[test]
    fn test_equals_on_empty_input_is_noop() {
        let mut session = Session::new();
        session.equals();
        assert_eq!(session.result(), "");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_error_sentinel_is_logged_and_input_kept() {
        let mut session = Session::new();
        session.append("2+");
        session.equals();
        assert_eq!(session.result(), "Error");
        // Malformed expression remains for correction
        assert_eq!(session.input(), "2+");
        assert_eq!(session.history().entries()[0].result, "Error");
    }

    #[test]
    fn test_append_after_result_keeps_extending() {
        let mut session = Session::new();
        session.append("1+1");
        session.equals();
        session.append("7");
        assert_eq!(session.input(), "1+17");
    }

    #[test]
    fn test_clear_all_from_any_state() {
        let mut session = Session::new();
        session.append("9×9");
        session.equals();
        session.clear_all();
        assert_eq!(session.input(), "");
        assert_eq!(session.result(), "");
        // History survives clear_all
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_delete_last() {
        let mut session = Session::new();
        session.append("12");
        session.delete_last();
        assert_eq!(session.input(), "1");
        session.delete_last();
        session.delete_last();
        assert_eq!(session.input(), "");
    }

    #[test]
    fn test_delete_last_handles_multibyte_symbols() {
        let mut session = Session::new();
        session.append("2");
        session.append("×");
        session.delete_last();
        assert_eq!(session.input(), "2");
    }

    #[test]
    fn test_select_history_restores_without_reevaluation() {
        let mut session = Session::new();
        session.append("2+2");
        session.equals();
        session.clear_all();
        session.append("unrelated");

        assert!(session.select_history(0));
        assert_eq!(session.input(), "2+2");
        assert_eq!(session.result(), "4");
        // Selection did not log a new entry
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_select_history_out_of_range() {
        let mut session = Session::new();
        assert!(!session.select_history(0));
    }

    #[test]
    fn test_ai_answered_logs_query_with_fixed_label() {
        let mut session = Session::new();
        session.append("3×3");
        session.ai_answered("what is the derivative of x^2?");
        assert_eq!(session.input(), "3×3");
        assert_eq!(session.result(), "");
        let entry = &session.history().entries()[0];
        assert_eq!(entry.kind, EntryKind::Ai);
        assert_eq!(entry.expression, "what is the derivative of x^2?");
        assert_eq!(entry.result, AI_RESULT_LABEL);
    }

    #[test]
    fn test_history_cap_via_session() {
        let mut session = Session::with_history_capacity(2);
        for i in 0..4 {
            session.clear_all();
            session.append(&format!("{}+0", i));
            session.equals();
        }
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().entries()[0].expression, "3+0");
    }

    #[test]
    fn test_mode_toggle() {
        let mut session = Session::new();
        assert_eq!(session.mode(), Mode::Standard);
        session.toggle_mode();
        assert_eq!(session.mode(), Mode::Scientific);
        session.toggle_mode();
        assert_eq!(session.mode(), Mode::Standard);
    }

    #[test]
    fn test_repeated_equals_is_idempotent() {
        let mut session = Session::new();
        session.append("0.1+0.2");
        session.equals();
        let first = session.result().to_string();
        session.equals();
        assert_eq!(session.result(), first);
        assert_eq!(first, "0.3");
    }
}

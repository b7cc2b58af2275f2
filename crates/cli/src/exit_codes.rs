//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 10-19   | ai               | AI provider/keychain codes               |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// AI (10-19)
// =============================================================================

/// AI disabled (provider=none) — not an error, just informational.
pub const EXIT_AI_DISABLED: u8 = 10;

/// AI provider configured but API key missing.
pub const EXIT_AI_MISSING_KEY: u8 = 11;

/// Keychain error (cannot read/write credentials).
pub const EXIT_AI_KEYCHAIN_ERR: u8 = 12;

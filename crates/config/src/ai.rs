// AI configuration and secrets management
//
// API keys are stored securely using:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;

use crate::settings::{AiProvider, AiSettings};

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "nebulacalc";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Get the environment variable name for a provider
fn env_var_name(provider: &str) -> String {
    format!("NEBULACALC_{}_KEY", provider.to_uppercase())
}

/// Get the keychain account name for a provider
fn keychain_account(provider: &str) -> String {
    format!("ai/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (NEBULACALC_GEMINI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    // Fall back to environment variable
    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_provider: &str, _key: &str) -> Result<(), String> {
    Err("Keychain support not enabled. Set NEBULACALC_<PROVIDER>_KEY environment variable instead.".to_string())
}

/// Delete an API key from the system keychain
#[cfg(feature = "keychain")]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to access keychain entry: {}", e))?;

    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete key from keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key(_provider: &str) -> Result<(), String> {
    Err("Keychain support not enabled.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved AI Configuration (single source of truth)
// ============================================================================

/// The effective AI configuration, fully resolved from all sources.
/// This is the single source of truth for runtime AI behavior.
#[derive(Debug, Clone)]
pub struct ResolvedAiConfig {
    /// Effective provider (None, Gemini)
    pub provider: AiProvider,
    /// Effective model (resolved from settings or provider default)
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// API key (if available)
    pub api_key: Option<String>,
    /// Source of the API key
    pub key_source: KeySource,
    /// Overall status
    pub status: AiConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

/// Status of the AI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiConfigStatus {
    /// AI is disabled (provider = none)
    Disabled,
    /// Configuration is valid and usable
    Ready,
    /// Provider is configured but API key is missing
    MissingKey,
    /// Configuration error
    Error,
}

impl AiConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
            Self::Error => "error",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl ResolvedAiConfig {
    /// Resolve the effective AI configuration from settings.
    /// This is the single entry point for all AI config resolution.
    pub fn from_settings(settings: &AiSettings) -> Self {
        let provider = settings.provider;

        if !provider.is_enabled() {
            return Self {
                provider,
                model: String::new(),
                temperature: settings.temperature,
                api_key: None,
                key_source: KeySource::None,
                status: AiConfigStatus::Disabled,
                blocking_reason: Some("AI is disabled".to_string()),
            };
        }

        let model = settings.effective_model().to_string();

        let lookup = get_api_key(provider.name());
        let (api_key, key_source, status, blocking_reason) = match lookup.key {
            Some(key) => (Some(key), lookup.source, AiConfigStatus::Ready, None),
            None => (
                None,
                KeySource::None,
                AiConfigStatus::MissingKey,
                Some(format!(
                    "No API key found. Set via keychain or {}",
                    env_var_name(provider.name())
                )),
            ),
        };

        Self {
            provider,
            model,
            temperature: settings.temperature,
            api_key,
            key_source,
            status,
            blocking_reason,
        }
    }

    /// Load settings and resolve in one call (convenience method)
    pub fn load() -> Self {
        let settings = crate::settings::Settings::load();
        Self::from_settings(&settings.ai)
    }

    /// Provider display name
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

// ============================================================================
// Configuration Validation
// ============================================================================

/// Result of configuration validation
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Configuration is valid
    Valid(String),
    /// Configuration has issues
    Invalid(String),
    /// Validation was skipped (AI disabled)
    Skipped(String),
}

impl ValidationResult {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Valid(msg) => msg,
            Self::Invalid(msg) => msg,
            Self::Skipped(msg) => msg,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl ResolvedAiConfig {
    /// Validate the AI configuration.
    /// This checks credential presence, NOT network reachability;
    /// actual API validation happens on first use.
    pub fn validate_config(&self) -> ValidationResult {
        match self.status {
            AiConfigStatus::Disabled => ValidationResult::Skipped("AI is disabled".to_string()),
            AiConfigStatus::MissingKey => {
                ValidationResult::Invalid("No API key configured".to_string())
            }
            AiConfigStatus::Error => ValidationResult::Invalid(
                self.blocking_reason
                    .clone()
                    .unwrap_or_else(|| "Configuration error".to_string()),
            ),
            AiConfigStatus::Ready => ValidationResult::Valid(format!(
                "API key present ({})",
                self.key_source.as_str()
            )),
        }
    }
}

// ============================================================================
// Diagnostics (for CLI doctor and debugging)
// ============================================================================

/// Diagnostic information about AI configuration
#[derive(Debug)]
pub struct AiDiagnostics {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub status: AiConfigStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
}

impl AiDiagnostics {
    /// Create diagnostics from resolved config
    pub fn from_resolved(config: &ResolvedAiConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
        }
    }
}

impl std::fmt::Display for AiDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AI Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        writeln!(f, "Model:             {}", self.model)?;
        writeln!(f, "Temperature:       {}", self.temperature)?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("gemini"), "NEBULACALC_GEMINI_KEY");
        assert_eq!(env_var_name("Gemini"), "NEBULACALC_GEMINI_KEY");
    }

    #[test]
    fn test_keychain_account() {
        assert_eq!(keychain_account("gemini"), "ai/gemini");
        assert_eq!(keychain_account("Gemini"), "ai/gemini");
    }

    #[test]
    fn test_key_lookup_from_env() {
        env::set_var("NEBULACALC_TESTPROVIDER_KEY", "test-key-123");

        let lookup = get_api_key("testprovider");
        assert_eq!(lookup.source, KeySource::Environment);
        assert_eq!(lookup.key, Some("test-key-123".to_string()));

        env::remove_var("NEBULACALC_TESTPROVIDER_KEY");
    }

    #[test]
    fn test_key_lookup_missing() {
        let lookup = get_api_key("nonexistent_provider_xyz");
        assert_eq!(lookup.source, KeySource::None);
        assert!(lookup.key.is_none());
    }

    #[test]
    fn test_disabled_provider_resolves_to_disabled() {
        let settings = AiSettings {
            provider: AiProvider::None,
            ..AiSettings::default()
        };
        let config = ResolvedAiConfig::from_settings(&settings);
        assert_eq!(config.status, AiConfigStatus::Disabled);
        assert!(config.api_key.is_none());
        assert!(!config.validate_config().is_valid());
    }
}

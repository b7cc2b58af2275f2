// Application settings
// Loaded from ~/.config/nebulacalc/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// AI features disabled
    None,
    /// Google Gemini API (default)
    #[default]
    Gemini,
}

impl AiProvider {
    /// Returns true if AI features are enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AiProvider::None)
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::None => "",
            AiProvider::Gemini => "gemini-3-flash-preview",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AiProvider::None => "none",
            AiProvider::Gemini => "gemini",
        }
    }
}

/// AI-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Selected AI provider
    pub provider: AiProvider,

    /// Model identifier (empty = provider default)
    pub model: String,

    /// Sampling temperature; kept low for precise math output
    pub temperature: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            model: String::new(),
            temperature: 0.2,
        }
    }
}

impl AiSettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

/// Keypad layout shown at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupMode {
    #[default]
    Standard,
    Scientific,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // History
    #[serde(rename = "history.maxEntries")]
    pub history_max_entries: usize,

    // UI
    #[serde(rename = "ui.startupMode")]
    pub startup_mode: StartupMode,

    #[serde(rename = "ui.showStatusBar")]
    pub show_status_bar: bool,

    // AI
    #[serde(rename = "ai", default)]
    pub ai: AiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_max_entries: 50,
            startup_mode: StartupMode::default(),
            show_status_bar: true,
            ai: AiSettings::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nebulacalc");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        eprintln!("Error parsing settings.json: {}", e);
                        eprintln!("Using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading settings.json: {}", e);
                Self::default()
            }
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(&path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // History (memory only; lost on exit)
    "history.maxEntries": 50,

    // UI ("standard" or "scientific")
    "ui.startupMode": "standard",
    "ui.showStatusBar": true,

    // AI solver
    // Provider options: "none", "gemini"
    // The API key is stored in the system keychain or the
    // NEBULACALC_GEMINI_KEY environment variable, never in this file
    "ai": {
        "provider": "gemini",
        "model": "",
        "temperature": 0.2
    }
}
"#;

        if let Err(e) = fs::write(&path, default_config) {
            eprintln!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

// NebulaCalc CLI - one-shot calculator operations and the interactive TUI

mod exit_codes;
mod keys;
mod tui;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{
    EXIT_AI_DISABLED, EXIT_AI_KEYCHAIN_ERR, EXIT_AI_MISSING_KEY, EXIT_ERROR, EXIT_SUCCESS,
    EXIT_USAGE,
};
use nebula_config::ai::{self, AiConfigStatus, AiDiagnostics, ResolvedAiConfig};
use nebula_engine::expr::{self, ERROR_SENTINEL};
use nebula_gemini_client::GeminiClient;

#[derive(Parser)]
#[command(name = "nebulacalc")]
#[command(about = "Keypad calculator with history and an AI math solver")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a calculator expression and print the result
    #[command(after_help = "\
Examples:
  nebulacalc eval '2+2'
  nebulacalc eval '2×3÷4'
  nebulacalc eval 'sin(0)+√(16)' --json")]
    Eval {
        /// Expression in keypad vocabulary (display symbols accepted)
        expression: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a math question to the AI solver and print the answer
    #[command(after_help = "\
Examples:
  nebulacalc ask 'What is the derivative of x^2 * sin(x)?'
  nebulacalc ask 'Solve 3x + 7 = 19' --model gemini-3-pro-preview")]
    Ask {
        /// Free-form math question
        question: String,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },

    /// AI configuration and diagnostics
    Ai {
        #[command(subcommand)]
        command: AiCommands,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Check AI configuration (provider, model, key presence)
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Store the Gemini API key in the system keychain
    SetKey {
        /// The API key to store
        key: String,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// An exit code with no message (output already produced).
    fn silent(code: u8) -> Self {
        Self {
            code,
            message: String::new(),
            hint: None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => tui::run().map_err(|e| CliError::new(EXIT_ERROR, e)),
        Some(Commands::Eval { expression, json }) => cmd_eval(&expression, json),
        Some(Commands::Ask { question, model }) => cmd_ask(&question, model.as_deref()),
        Some(Commands::Ai { command }) => match command {
            AiCommands::Doctor { json } => cmd_ai_doctor(json),
            AiCommands::SetKey { key } => cmd_ai_set_key(&key),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_eval(expression: &str, json: bool) -> Result<(), CliError> {
    if expression.trim().is_empty() {
        return Err(CliError::new(EXIT_USAGE, "empty expression"));
    }

    let result = expr::calculate(expression);

    if json {
        let output = serde_json::json!({
            "expression": expression,
            "result": result,
            "ok": result != ERROR_SENTINEL,
        });
        println!("{}", output);
    } else {
        println!("{}", result);
    }

    if result == ERROR_SENTINEL {
        return Err(CliError::silent(EXIT_ERROR));
    }
    Ok(())
}

fn cmd_ask(question: &str, model_override: Option<&str>) -> Result<(), CliError> {
    if question.trim().is_empty() {
        return Err(CliError::new(EXIT_USAGE, "empty question"));
    }

    let config = ResolvedAiConfig::load();
    match config.status {
        AiConfigStatus::Disabled => {
            return Err(CliError::new(EXIT_AI_DISABLED, "AI is disabled")
                .with_hint("set \"ai\": { \"provider\": \"gemini\" } in settings.json"));
        }
        AiConfigStatus::MissingKey | AiConfigStatus::Error => {
            let reason = config
                .blocking_reason
                .unwrap_or_else(|| "AI is not configured".to_string());
            return Err(CliError::new(EXIT_AI_MISSING_KEY, reason)
                .with_hint("run `nebulacalc ai set-key <key>` or set NEBULACALC_GEMINI_KEY"));
        }
        AiConfigStatus::Ready => {}
    }

    let api_key = config.api_key.as_deref().unwrap_or_default();
    let model = model_override.unwrap_or(&config.model);
    let client = GeminiClient::new(api_key, model, config.temperature);

    let answer = client
        .solve(question.trim())
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    println!("{}", answer);
    Ok(())
}

fn cmd_ai_doctor(json: bool) -> Result<(), CliError> {
    let config = ResolvedAiConfig::load();
    let diagnostics = AiDiagnostics::from_resolved(&config);

    if json {
        let output = serde_json::json!({
            "provider": diagnostics.provider,
            "model": diagnostics.model,
            "temperature": diagnostics.temperature,
            "status": diagnostics.status.as_str(),
            "key_present": diagnostics.key_present,
            "key_source": diagnostics.key_source.as_str(),
            "keychain_available": diagnostics.keychain_available,
            "validation": config.validate_config().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        print!("{}", diagnostics);
        println!("Validation:        {}", config.validate_config().as_str());
    }

    match config.status {
        AiConfigStatus::MissingKey => Err(CliError::silent(EXIT_AI_MISSING_KEY)),
        AiConfigStatus::Disabled => Err(CliError::silent(EXIT_AI_DISABLED)),
        _ => Ok(()),
    }
}

fn cmd_ai_set_key(key: &str) -> Result<(), CliError> {
    if key.trim().is_empty() {
        return Err(CliError::new(EXIT_USAGE, "empty key"));
    }
    ai::set_api_key("gemini", key.trim())
        .map_err(|e| CliError::new(EXIT_AI_KEYCHAIN_ERR, e))?;
    println!("API key stored in keychain");
    Ok(())
}

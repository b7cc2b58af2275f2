// Gemini generateContent client for the math solver panel.
//
// Sends one natural-language math question per call and returns the
// prose/markdown answer. No retries, no streaming, no caching.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public Gemini API endpoint. Tests override this via `with_api_base`.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default model when settings leave it unspecified.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// System instruction sent with every solve request.
const SYSTEM_INSTRUCTION: &str = "You are a precise and helpful math tutor.";

/// Error from a solve call.
#[derive(Debug, Clone)]
pub enum SolveError {
    /// Network error (connect failure, timeout, TLS)
    Network(String),
    /// API error response
    Api { status: u16, message: String },
    /// Failed to parse response body
    Parse(String),
    /// Response contained no answer text
    EmptyResponse,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::Network(msg) => write!(f, "Unable to connect to AI service: {}", msg),
            SolveError::Api { status, message } => {
                write!(f, "AI service error ({}): {}", status, message)
            }
            SolveError::Parse(msg) => write!(f, "Failed to parse AI response: {}", msg),
            SolveError::EmptyResponse => write!(f, "Could not generate a solution."),
        }
    }
}

impl std::error::Error for SolveError {}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Gemini API client (blocking).
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new client with an explicit key and model.
    pub fn new(api_key: &str, model: &str, temperature: f32) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("nebulacalc/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        let model = if model.is_empty() { DEFAULT_MODEL } else { model };

        Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        }
    }

    /// Point the client at a different endpoint (mock server in tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one math question and return the answer text.
    ///
    /// This is a blocking call - run it on a background thread.
    pub fn solve(&self, problem: &str) -> Result<String, SolveError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(problem),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| SolveError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(SolveError::Api {
                    status: status.as_u16(),
                    message: error.error.message,
                });
            }
            return Err(SolveError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .map_err(|e| SolveError::Parse(e.to_string()))?;

        let text = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SolveError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Fixed prompt template embedding the user's raw question.
fn build_prompt(problem: &str) -> String {
    format!(
        "You are an expert mathematician and calculator assistant.\n\n\
         User Request: \"{}\"\n\n\
         Instructions:\n\
         1. Solve the math problem step-by-step.\n\
         2. If it is a simple arithmetic expression, just provide the result.\n\
         3. If it is a complex word problem or advanced calculus/algebra, explain the steps briefly and clearly.\n\
         4. Format the final answer clearly at the end.\n\
         5. Use Markdown for formatting (bold, code blocks for equations).",
        problem
    )
}

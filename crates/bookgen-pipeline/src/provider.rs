//! Text generation abstraction.
//!
//! Supports OpenAI-compatible *completions* APIs (`/v1/completions`, prompt in,
//! `choices[0].text` out). Uses blocking HTTP via `ureq` — the CLI has no async
//! runtime.

use serde::Serialize;
use serde_json::Value;

/// Errors from text generation calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The body was not JSON, or had no `choices[0].text`. `raw` is the body as
    /// received, for diagnosis.
    #[error("malformed response: {raw}")]
    MalformedResponse { raw: String },
    #[error("unknown provider: '{0}'")]
    UnknownProvider(String),
}

/// Sampling options. Unset fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
}

/// One completion request. Serializes to the JSON body the API expects:
/// `{model, prompt, max_tokens?, temperature?, stop?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// The generated text, untrimmed.
    pub text: String,
    /// Prompt tokens used (from API response, if reported).
    pub prompt_tokens: Option<u64>,
    /// Completion tokens used (from API response, if reported).
    pub completion_tokens: Option<u64>,
}

impl Generation {
    /// A generation with no usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }
}

/// Abstraction over text generation providers.
///
/// Each call is independent: providers keep no memory between calls, and the
/// same request may return different text every time.
pub trait TextGenerator: Send {
    /// Run one completion.
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, ProviderError>;

    /// The provider name (for display/logging).
    fn provider_name(&self) -> &str;

    /// Cost per million prompt tokens (USD).
    fn cost_per_mtok_input(&self) -> f64 {
        0.0
    }

    /// Cost per million completion tokens (USD).
    fn cost_per_mtok_output(&self) -> f64 {
        0.0
    }
}

// ---------------------------------------------------------------------------
// OpenAI Completions API
// ---------------------------------------------------------------------------

/// OpenAI-compatible completions provider (works with OpenAI and local proxies
/// that expose `/v1/completions`).
#[cfg(feature = "openai")]
pub struct OpenAiCompletions {
    api_key: String,
    base_url: String,
    agent: ureq::Agent,
    /// (input, output) USD per million tokens.
    rates: (f64, f64),
}

#[cfg(feature = "openai")]
impl OpenAiCompletions {
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

    pub fn new(api_key: String, base_url: Option<String>, timeout_secs: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            agent: ureq::Agent::new_with_config(
                ureq::config::Config::builder()
                    .timeout_global(Some(std::time::Duration::from_secs(timeout_secs)))
                    .http_status_as_error(false)
                    .build(),
            ),
            rates: (0.0, 0.0),
        }
    }

    /// Set the pricing used for cost estimates from a model name.
    #[must_use]
    pub fn with_model_rates(mut self, model: &str) -> Self {
        self.rates = completion_rates(model);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(feature = "openai")]
impl TextGenerator for OpenAiCompletions {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, ProviderError> {
        let mut response = self
            .agent
            .post(&self.endpoint())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .send_json(request)
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let raw = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        parse_completion(status, &raw)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn cost_per_mtok_input(&self) -> f64 {
        self.rates.0
    }

    fn cost_per_mtok_output(&self) -> f64 {
        self.rates.1
    }
}

/// Pricing (input, output) in USD per million tokens for completion models.
pub fn completion_rates(model: &str) -> (f64, f64) {
    if model.contains("instruct") {
        (1.50, 2.00)
    } else if model.contains("davinci") {
        (2.00, 2.00)
    } else if model.contains("babbage") {
        (0.40, 0.40)
    } else {
        (1.50, 2.00) // conservative default
    }
}

/// Decode a completions response body.
///
/// Non-2xx statuses and bodies carrying an `error` object are API errors; a body
/// that is not JSON or has no `choices[0].text` is a malformed response.
pub fn parse_completion(status: u16, raw: &str) -> Result<Generation, ProviderError> {
    let json: Option<Value> = serde_json::from_str(raw).ok();

    // Check for API error
    let api_error = json.as_ref().and_then(|j| j.get("error")).map(|err| {
        err.get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string()
    });
    if !(200..300).contains(&status) || api_error.is_some() {
        return Err(ProviderError::Api {
            status,
            message: api_error.unwrap_or_else(|| raw.trim().to_string()),
        });
    }

    let malformed = || ProviderError::MalformedResponse {
        raw: raw.to_string(),
    };
    let json = json.ok_or_else(malformed)?;

    // Extract text from choices
    let text = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(malformed)?
        .to_string();

    // Extract usage
    let prompt_tokens = json
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(|t| t.as_u64());
    let completion_tokens = json
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(|t| t.as_u64());

    Ok(Generation {
        text,
        prompt_tokens,
        completion_tokens,
    })
}

/// Create a generator from CLI arguments.
pub fn create_generator(
    provider_name: &str,
    api_key: &str,
    model: &str,
    base_url: Option<&str>,
    timeout_secs: u64,
) -> Result<Box<dyn TextGenerator>, ProviderError> {
    match provider_name {
        #[cfg(feature = "openai")]
        "openai" => Ok(Box::new(
            OpenAiCompletions::new(api_key.to_string(), base_url.map(String::from), timeout_secs)
                .with_model_rates(model),
        )),
        other => Err(ProviderError::UnknownProvider(format!(
            "{}. Available: {}",
            other,
            available_generators().join(", ")
        ))),
    }
}

/// List compiled-in provider names.
pub fn available_generators() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "openai")]
        "openai",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_omits_unset_options() {
        let request = GenerationRequest {
            model: "gpt-3.5-turbo-instruct".to_string(),
            prompt: "Name the book:".to_string(),
            options: GenerationOptions {
                max_tokens: Some(32),
                ..Default::default()
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "Name the book:",
                "max_tokens": 32
            })
        );
    }

    #[test]
    fn test_request_body_with_stop() {
        let request = GenerationRequest {
            model: "m".to_string(),
            prompt: "p".to_string(),
            options: GenerationOptions {
                max_tokens: Some(128),
                temperature: Some(1.5),
                stop: Some("Section 2.1".to_string()),
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["stop"], "Section 2.1");
        assert_eq!(body["temperature"], 1.5);
        assert_eq!(body["max_tokens"], 128);
    }

    #[test]
    fn test_parse_completion_extracts_text_and_usage() {
        let raw = r#"{"choices":[{"text":"\n\nMy Book","index":0}],"usage":{"prompt_tokens":20,"completion_tokens":4}}"#;
        let generation = parse_completion(200, raw).unwrap();
        assert_eq!(generation.text, "\n\nMy Book");
        assert_eq!(generation.prompt_tokens, Some(20));
        assert_eq!(generation.completion_tokens, Some(4));
    }

    #[test]
    fn test_parse_completion_without_usage() {
        let generation = parse_completion(200, r#"{"choices":[{"text":"x"}]}"#).unwrap();
        assert_eq!(generation, Generation::text("x"));
    }

    #[test]
    fn test_missing_choices_is_malformed() {
        let raw = r#"{"object":"text_completion"}"#;
        match parse_completion(200, raw) {
            Err(ProviderError::MalformedResponse { raw: body }) => assert_eq!(body, raw),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        assert!(matches!(
            parse_completion(200, r#"{"choices":[]}"#),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_completion(200, "<html>gateway</html>"),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_error_object_is_api_error() {
        let raw = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        match parse_completion(401, raw) {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_success_status_without_json() {
        match parse_completion(502, "Bad Gateway\n") {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        let err = create_generator("nope", "key", "m", None, 10)
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::UnknownProvider(_)));
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_openai_rates_and_endpoint() {
        let generator = OpenAiCompletions::new(
            "key".to_string(),
            Some("http://localhost:8080/".to_string()),
            5,
        )
        .with_model_rates("gpt-3.5-turbo-instruct");
        assert_eq!(generator.endpoint(), "http://localhost:8080/v1/completions");
        assert_eq!(generator.cost_per_mtok_input(), 1.50);
        assert_eq!(generator.cost_per_mtok_output(), 2.00);
        assert_eq!(generator.provider_name(), "openai");
    }
}

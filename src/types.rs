use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Instruction sent alongside every image.
pub const DEFAULT_IDENTIFY_PROMPT: &str = r#"You are an expert herpetologist. Analyze this snake image and provide identification in the following JSON format:

{
  "species": "exact species name",
  "isVenomous": true/false,
  "confidence": 0.0-1.0,
  "description": "detailed description including habitat, behavior, and key identifying features"
}

Be as accurate as possible. If you're not certain about the exact species, provide the most likely identification and adjust confidence accordingly. Focus on:
1. Body pattern and coloration
2. Head shape and size
3. Body proportions
4. Any distinctive features
5. Likely geographic region if identifiable

IMPORTANT: Respond ONLY with the JSON object, no additional text."#;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

const VENOM_WARNING: &str = "This snake is potentially dangerous. Keep a safe distance and contact local wildlife authorities if encountered.";

const DISCLAIMER: &str = "This identification is based on AI analysis and should not be used as the sole basis for determining if a snake is dangerous. Always exercise caution around unknown snakes and consult with local wildlife experts when in doubt.";

/// Configuration for the OpenRouter chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API base URL (e.g., "https://openrouter.ai/api/v1")
    pub endpoint: String,
    /// Bearer credential. Identification fails fast when unset.
    pub api_key: Option<String>,
    /// Vision-capable model id (e.g., "anthropic/claude-3.5-sonnet")
    pub model: String,
    /// Instruction text sent with the image
    pub prompt: String,
    /// Value for the `HTTP-Referer` attribution header
    pub referer: Option<String>,
    /// Value for the `X-Title` attribution header
    pub title: Option<String>,
    /// Request timeout (default: None, uses the HTTP client's default)
    pub timeout: Option<Duration>,
    /// Sampling options sent with every request
    pub options: CompletionOptions,
}

/// Sampling options controlling output length and randomness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Maximum tokens to generate (default: 500)
    pub max_tokens: u32,
    /// Temperature (default: 0.3, favours factual answers)
    pub temperature: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.3,
        }
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_IDENTIFY_PROMPT.to_string(),
            referer: Some("http://localhost:3000".to_string()),
            title: Some("Snake Species Identifier".to_string()),
            timeout: None,
            options: CompletionOptions::default(),
        }
    }
}

impl OpenRouterConfig {
    /// Create a new config with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Set the API base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model id.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replace the instruction prompt.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the `HTTP-Referer` attribution header.
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the `X-Title` attribution header.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the sampling options.
    pub fn options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// The configured key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Normalized identification returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationRecord {
    pub species: String,
    pub is_venomous: bool,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    pub description: String,
}

/// Coarse banding of a record's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceLevel::High
        } else if confidence > 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl IdentificationRecord {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    /// Confidence as a percentage with one decimal, e.g. `"85.0%"`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    /// Warning shown for venomous identifications.
    pub fn venom_warning(&self) -> Option<&'static str> {
        self.is_venomous.then_some(VENOM_WARNING)
    }

    /// Disclaimer that accompanies every identification.
    pub fn disclaimer() -> &'static str {
        DISCLAIMER
    }
}

impl std::fmt::Display for IdentificationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Species:     {}", self.species)?;
        writeln!(
            f,
            "Confidence:  {} ({:?})",
            self.confidence_percent(),
            self.confidence_level()
        )?;
        writeln!(
            f,
            "Status:      {}",
            if self.is_venomous { "Venomous" } else { "Non-venomous" }
        )?;
        if let Some(warning) = self.venom_warning() {
            writeln!(f, "Warning:     {}", warning)?;
        }
        writeln!(f, "Description: {}", self.description)?;
        write!(f, "Disclaimer:  {}", Self::disclaimer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(confidence: f64, is_venomous: bool) -> IdentificationRecord {
        IdentificationRecord {
            species: "Crotalus atrox".to_string(),
            is_venomous,
            confidence,
            description: "Western diamondback".to_string(),
        }
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(record(0.9, true)).unwrap();
        assert_eq!(json["isVenomous"], true);
        assert_eq!(json["species"], "Crotalus atrox");
        assert!(json.get("is_venomous").is_none());
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(ConfidenceLevel::from_confidence(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.61), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.6), ConfidenceLevel::Low);
    }

    #[test]
    fn venom_warning_only_when_venomous() {
        assert!(record(0.9, true).venom_warning().is_some());
        assert!(record(0.9, false).venom_warning().is_none());
    }

    #[test]
    fn confidence_percent_formatting() {
        assert_eq!(record(0.853, false).confidence_percent(), "85.3%");
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        assert!(OpenRouterConfig::with_api_key("   ").api_key().is_none());
        assert!(OpenRouterConfig::default().api_key().is_none());
        assert_eq!(OpenRouterConfig::with_api_key("sk-1").api_key(), Some("sk-1"));
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let config = OpenRouterConfig::default().endpoint("http://localhost:9000/");
        assert_eq!(config.endpoint, "http://localhost:9000");
    }
}

//! Mock backend for testing
//!
//! Answers prompts without a running LLM server. By default it recognizes the
//! chat, follow-up, fraud, recommendation, forecast and categorization prompts
//! and returns plausible replies; a fixed reply or a simulated failure can be
//! configured instead.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed reply for every prompt
    response: Option<String>,
    /// Every completion fails
    failing: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            response: None,
            failing: false,
        }
    }

    /// Create an unhealthy mock backend whose completions fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            response: None,
            failing: true,
        }
    }

    /// Reply with the same text to every prompt
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Self::new()
        }
    }

    /// Healthy, but every completion returns an error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.failing {
            return Err(Error::AIUnavailable("mock backend configured to fail".into()));
        }
        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        if prompt.trim_end().ends_with("Assistant:") {
            return Ok("Your recurring payments look under control. \
                       Consider setting aside a fixed amount each month."
                .to_string());
        }
        if prompt.contains("\"suggestions\"") {
            return Ok(r#"{"suggestions": ["What is due this week?", "How can I spend less on food?"]}"#
                .to_string());
        }
        if prompt.contains("\"riskLevel\"") {
            return Ok(
                r#"{"riskLevel": "low", "reasons": [], "recommendation": "No action needed", "confidence": 0.9}"#
                    .to_string(),
            );
        }
        if prompt.contains("\"recommendations\"") {
            return Ok(r#"{"recommendations": []}"#.to_string());
        }
        if prompt.contains("\"forecasts\"") {
            return Ok(r#"{"forecasts": []}"#.to_string());
        }

        let description = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Description:"))
            .unwrap_or("")
            .trim()
            .to_uppercase();

        // Simple mock: category from well-known merchants
        let category = match description.as_str() {
            d if d.contains("NETFLIX") || d.contains("SPOTIFY") || d.contains("CINE") => {
                "entertainment"
            }
            d if d.contains("UBER") || d.contains("GASOLINA") || d.contains("SHELL") => {
                "transport"
            }
            d if d.contains("SUPERMERCADO") || d.contains("RESTAURANT") || d.contains("MCDONALD") => {
                "food"
            }
            d if d.contains("FARMACIA") || d.contains("CLINICA") => "health",
            d if d.contains("CLARO") || d.contains("ALTICE") || d.contains("EDENORTE") => {
                "services"
            }
            d if d.contains("AMAZON") || d.contains("ZARA") => "shopping",
            _ => "other",
        };

        Ok(format!(
            r#"{{"category": "{}", "confidence": 0.9, "reasoning": "mock match on description"}}"#,
            category
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

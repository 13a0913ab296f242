//! Financial chat
//!
//! Answers free-form questions about the user's money. A `ChatSession` keeps a
//! bounded conversation history and an optional `FinancialContext`; every turn
//! is sent to the model as one prompt. After each answer the model is asked
//! for a few follow-up questions.

use serde::{Deserialize, Serialize};

use crate::ai::parsing::parse_json_response;
use crate::ai::{AIBackend, AIClient};
use crate::error::Result;

use super::context::FinancialContext;

/// Messages kept in a session's history
pub const MAX_HISTORY: usize = 20;

/// Reply when no model is configured
pub const UNAVAILABLE_MESSAGE: &str = "The AI assistant is not available right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub suggested_follow_ups: Vec<String>,
    pub confidence: f64,
}

impl ChatResponse {
    fn unavailable() -> Self {
        Self {
            message: UNAVAILABLE_MESSAGE.to_string(),
            suggested_follow_ups: Vec::new(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FollowUps {
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Conversation with the financial assistant
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: Vec<ChatMessage>,
    context: Option<FinancialContext>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: FinancialContext) -> Self {
        Self {
            history: Vec::new(),
            context: Some(context),
        }
    }

    pub fn set_context(&mut self, context: FinancialContext) {
        self.context = Some(context);
    }

    /// Replace the history, keeping only the last `MAX_HISTORY` messages
    pub fn load_history(&mut self, messages: Vec<ChatMessage>) {
        self.history = messages;
        self.trim_history();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Ask a question.
    ///
    /// Without a backend the reply is a fixed "not available" message with zero
    /// confidence and the history is left alone. Backend errors on the answer
    /// are returned; a failed follow-up request only loses the suggestions.
    pub async fn ask(&mut self, ai: Option<&AIClient>, question: &str) -> Result<ChatResponse> {
        let Some(ai) = ai else {
            tracing::warn!("AI unavailable, chat disabled");
            return Ok(ChatResponse::unavailable());
        };

        tracing::debug!(history = self.history.len(), "Sending chat question");
        let answer = ai.complete(&self.prompt(question)).await?;
        let answer = answer.trim().to_string();

        self.history.push(ChatMessage {
            role: ChatRole::User,
            content: question.to_string(),
        });
        self.history.push(ChatMessage {
            role: ChatRole::Assistant,
            content: answer.clone(),
        });
        self.trim_history();

        let suggested_follow_ups = follow_ups(ai, &answer).await;

        Ok(ChatResponse {
            message: answer,
            suggested_follow_ups,
            confidence: 0.9,
        })
    }

    fn trim_history(&mut self) {
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    fn prompt(&self, question: &str) -> String {
        let mut prompt = String::from(
            "You are a friendly, practical personal finance assistant. Base every \
             answer on the user's own numbers, suggest concrete actions, and do not \
             recommend specific investments or give legal or tax advice.\n\n",
        );

        if let Some(context) = &self.context {
            prompt.push_str("USER FINANCIAL CONTEXT:\n");
            prompt.push_str(&context.summary());
            prompt.push_str("\n\n");
        }

        for message in &self.history {
            prompt.push_str(&format!("{}: {}\n", message.role.label(), message.content));
        }
        prompt.push_str(&format!("User: {}\nAssistant:", question));
        prompt
    }
}

/// One-off question with an optional context and no history
pub async fn chat(
    ai: Option<&AIClient>,
    context: Option<&FinancialContext>,
    question: &str,
) -> Result<ChatResponse> {
    let mut session = match context {
        Some(context) => ChatSession::with_context(context.clone()),
        None => ChatSession::new(),
    };
    session.ask(ai, question).await
}

async fn follow_ups(ai: &AIClient, answer: &str) -> Vec<String> {
    let prompt = format!(
        "Based on this answer about personal finances, suggest 2-3 short, relevant \
         follow-up questions the user could ask.\n\n\
         Answer: {}\n\n\
         Respond with JSON in this format:\n\
         {{\"suggestions\": [\"Question 1\", \"Question 2\"]}}\n\n\
         Respond with the JSON only.",
        answer
    );

    let parsed = match ai.complete(&prompt).await {
        Ok(response) => parse_json_response::<FollowUps>(&response),
        Err(e) => Err(e),
    };

    match parsed {
        Ok(f) => f.suggestions,
        Err(e) => {
            tracing::warn!(error = %e, "Follow-up suggestions failed");
            Vec::new()
        }
    }
}

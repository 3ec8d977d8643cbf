/// Planning assistant chat client
///
/// Sends one user message to a generative language `generateContent`
/// endpoint and returns the first candidate's text. The message is prefixed
/// with an instruction that keeps the assistant on planning topics.
///
/// Failures are typed (`ChatError`) so callers can tell a reply from an
/// error; `ChatError::to_reply_text` renders the short message the chat view
/// shows in place of a reply.
///
/// # Example
///
/// ```no_run
/// use planner_app::chat::ChatClient;
/// use planner_app::config::Config;
///
/// # async fn example(config: Config) -> Result<(), planner_app::chat::ChatError> {
/// let client = ChatClient::new(config.chat.clone())?;
///
/// let text = match client.ask("Plan my Saturday morning").await {
///     Ok(reply) => reply,
///     Err(e) => e.to_reply_text(),
/// };
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ChatConfig;

/// Upper bound on one round trip to the model
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Prefix sent ahead of every user message
pub const SYSTEM_PROMPT: &str = "You are a strict daily-planning assistant. \
Your only purpose is to help the user build schedules and manage their time. \
If the message is not about planning, schedules, tasks or productivity, reply \
with exactly one sentence: 'I can only answer questions about your daily routine.' \
Do not discuss unrelated topics such as weather, politics or entertainment.\n\n\
User message: ";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The API answered with a non-success status
    #[error("Chat API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The request never completed
    #[error("Chat API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered 200 but without the expected text
    #[error("Chat API response was malformed: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    /// Short text for the chat transcript
    pub fn to_reply_text(&self) -> String {
        match self {
            ChatError::Status { status, .. } => format!("Server error: {}", status.as_u16()),
            ChatError::Transport(e) => format!("Connection error: {}", e),
            ChatError::MalformedResponse(_) => "The assistant sent an empty reply.".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the generative language API
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
}

impl ChatClient {
    /// # Errors
    ///
    /// `Transport` if the HTTP client cannot be built (TLS backend failure)
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(ChatClient { client, config })
    }

    /// `{endpoint}/models/{model}:generateContent`, without the key
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    /// Sends `message` with the planning prompt and returns the reply text
    ///
    /// # Errors
    ///
    /// - `Status` if the API does not answer 200
    /// - `Transport` if the request cannot be sent or read
    /// - `MalformedResponse` if the reply has no candidate text
    pub async fn ask(&self, message: &str) -> Result<String, ChatError> {
        let prompt = build_prompt(message);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        tracing::debug!(model = %self.config.model, chars = message.len(), "Sending chat request");

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key
                let e = e.without_url();
                tracing::warn!(error = %e, "Chat request failed");
                ChatError::Transport(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Chat API error");
            return Err(ChatError::Status { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.without_url().to_string()))?;

        extract_reply(parsed)
    }
}

fn build_prompt(message: &str) -> String {
    format!("{}{}", SYSTEM_PROMPT, message)
}

/// `candidates[0].content.parts[0].text`
fn extract_reply(response: GenerateResponse) -> Result<String, ChatError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| {
            ChatError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string())
        })
}

//! Grouping collaborators.
//!
//! A [`GroupingProposer`] turns a [`ProposalRequest`] into raw reply text.
//! The pipeline never builds one itself; the caller picks a strategy via
//! [`ProposerKind`] and hands the proposer in.

use std::path::PathBuf;
use std::time::Instant;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DeployConfig;
use crate::errors::{NbDeployError, NbResult};
use crate::grouping::prompt::{ProposalRequest, SYSTEM_PROMPT};

pub trait GroupingProposer {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Return the collaborator's reply verbatim. Shape checking happens later.
    fn propose(&self, request: &ProposalRequest) -> NbResult<String>;
}

/// Collaborator selection, set from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProposerKind {
    #[default]
    OpenAi,
    /// Re-use a grouping saved by an earlier run.
    Replay(PathBuf),
}

// ---------------------------------------------------------------------------
// OpenAI chat completions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    seed: i64,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn chat_body(request: &ProposalRequest) -> ChatCompletionRequest<'_> {
    ChatCompletionRequest {
        model: &request.model,
        seed: request.seed,
        response_format: ResponseFormat {
            kind: "json_object",
        },
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: &request.instructions,
            },
            ChatMessage {
                role: "user",
                content: &request.code,
            },
        ],
    }
}

fn first_choice_content(response: ChatCompletionResponse) -> NbResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| NbDeployError::Proposal("no choices in completion response".into()))?
        .message
        .content
        .ok_or_else(|| NbDeployError::ResponseFormat("completion has no message content".into()))
}

/// Blocking OpenAI chat-completions client. Build once and share for the
/// whole process.
#[derive(Clone)]
pub struct OpenAiProposer {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProposer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &DeployConfig) -> NbResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| NbDeployError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key).with_base_url(config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl GroupingProposer for OpenAiProposer {
    fn name(&self) -> &str {
        "openai"
    }

    fn propose(&self, request: &ProposalRequest) -> NbResult<String> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&chat_body(request))
            .send()
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                NbDeployError::Proposal(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(NbDeployError::Proposal(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .map_err(|e| NbDeployError::Proposal(format!("unreadable completion: {e}")))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "OpenAI chat completion"
        );

        first_choice_content(completion)
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Reads a grouping saved with `--save-grouping` instead of calling out.
#[derive(Clone, Debug)]
pub struct ReplayProposer {
    path: PathBuf,
}

impl ReplayProposer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GroupingProposer for ReplayProposer {
    fn name(&self) -> &str {
        "replay"
    }

    fn propose(&self, _request: &ProposalRequest) -> NbResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            NbDeployError::Proposal(format!(
                "failed to read saved grouping {}: {e}",
                self.path.display()
            ))
        })
    }
}

/// Build the proposer selected by `config`.
pub fn build_proposer(config: &DeployConfig) -> NbResult<Box<dyn GroupingProposer>> {
    match &config.proposer {
        ProposerKind::OpenAi => Ok(Box::new(OpenAiProposer::from_config(config)?)),
        ProposerKind::Replay(path) => Ok(Box::new(ReplayProposer::new(path.clone()))),
    }
}

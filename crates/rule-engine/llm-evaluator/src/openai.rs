//! OpenAI-compatible chat-completions backend for the `Judge` trait.
//!
//! Talks to any server implementing the `/chat/completions` contract
//! (OpenAI itself, or a compatible gateway reachable via `OPENAI_BASE_URL`).

use crate::env_config::OpenAiConfig;
use crate::error::JudgeAdapterError;
use async_trait::async_trait;
use ceval_core::{CoreError, Judge};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

pub struct OpenAiJudge {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiJudge {
    pub fn new(config: OpenAiConfig) -> Result<Self, JudgeAdapterError> {
        if config.api_key.is_none() {
            return Err(JudgeAdapterError::Config("OPENAI_API_KEY is not set".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JudgeAdapterError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn judge(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CoreError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| JudgeAdapterError::Config("OPENAI_API_KEY is not set".into()))?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| categorize_transport_error(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(JudgeAdapterError::rate_limit(format!("429: {}", response.text().await.unwrap_or_default())).into());
        }
        if status.is_server_error() {
            return Err(JudgeAdapterError::server_error(status.as_u16(), response.text().await.unwrap_or_default()).into());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(JudgeAdapterError::Api(format!("{status}: {text}")).into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgeAdapterError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| JudgeAdapterError::Parse("empty choices array".into()).into())
    }

    fn name(&self) -> &str {
        &self.config.model
    }

    fn is_ready(&self) -> bool {
        self.config.api_key.is_some()
    }
}

fn categorize_transport_error(e: &reqwest::Error) -> CoreError {
    if e.is_timeout() {
        JudgeAdapterError::timeout(e.to_string()).into()
    } else {
        JudgeAdapterError::network(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_api_key() {
        let config = OpenAiConfig { api_key: None, ..OpenAiConfig::default() };
        assert!(OpenAiJudge::new(config).is_err());
    }
}

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::GenerationError;
use crate::prompt::Prompt;
use crate::sanitize::{sanitize, truncate_chars};

/// Pipeline stage a request belongs to. Each stage has its own token budget
/// and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Titles,
    RelatedKeywords,
    Structure,
    Part,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageProfile {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Stage {
    pub fn profile(self) -> StageProfile {
        match self {
            Self::Titles | Self::RelatedKeywords => StageProfile {
                max_tokens: 1000,
                temperature: 0.7,
            },
            Self::Structure => StageProfile {
                max_tokens: 2000,
                temperature: 0.7,
            },
            Self::Part => StageProfile {
                max_tokens: 4000,
                temperature: 0.7,
            },
            Self::Score => StageProfile {
                max_tokens: 1000,
                temperature: 0.2,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Titles => "titles",
            Self::RelatedKeywords => "related_keywords",
            Self::Structure => "structure",
            Self::Part => "part",
            Self::Score => "score",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the external text-generation service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub stage: Stage,
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A provider able to answer a single generation request with raw text.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Builds the shared HTTP client used by the network backends.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| GenerationError::Transport(format!("build http client: {err}")))
}

/// Wraps one backend: stamps the model, logs the call, strips sentinel
/// markers and rejects blank output. Never retries.
pub struct GenerationClient {
    backend: Box<dyn TextGenerator>,
    model: String,
}

impl fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationClient")
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .finish()
    }
}

impl GenerationClient {
    pub fn new(backend: impl TextGenerator + 'static, model: impl Into<String>) -> Self {
        Self::from_boxed(Box::new(backend), model)
    }

    pub fn from_boxed(backend: Box<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Generates with the stage's default token budget and temperature.
    pub async fn generate(&self, stage: Stage, prompt: &Prompt) -> Result<String, GenerationError> {
        let profile = stage.profile();
        self.generate_with(stage, prompt, profile.max_tokens, profile.temperature)
            .await
    }

    pub async fn generate_with(
        &self,
        stage: Stage,
        prompt: &Prompt,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            stage,
            model: self.model.clone(),
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            max_tokens,
            temperature: temperature.clamp(0.0, 1.0),
        };

        tracing::debug!(
            backend = self.backend.name(),
            model = %self.model,
            stage = %stage,
            max_tokens,
            temperature = request.temperature,
            "generation request"
        );

        let started_at = Instant::now();
        let result = self.backend.complete(&request).await;
        let elapsed_ms = started_at.elapsed().as_millis() as u64;

        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(stage = %stage, elapsed_ms, error = %err, "generation failed");
                return Err(err);
            }
        };

        let text = sanitize(&raw);
        if text.trim().is_empty() {
            tracing::warn!(stage = %stage, elapsed_ms, "generation returned no content");
            return Err(GenerationError::EmptyResponse);
        }

        tracing::debug!(
            stage = %stage,
            elapsed_ms,
            chars = text.chars().count(),
            response = truncate_chars(&text, 200),
            "generation response"
        );
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Scripted backend: pops one canned outcome per call and records every
    /// request it receives.
    #[derive(Clone, Default)]
    pub struct ScriptedGenerator {
        outcomes: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
        pub requests: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    impl ScriptedGenerator {
        pub fn new(outcomes: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                outcomes: Arc::new(Mutex::new(outcomes.into())),
                requests: Arc::default(),
            }
        }

        pub fn recorded(&self) -> Vec<GenerationRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            let next = self
                .outcomes
                .lock()
                .ok()
                .and_then(|mut outcomes| outcomes.pop_front());
            next.unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".to_owned())))
        }
    }

    pub fn ok(text: &str) -> Result<String, GenerationError> {
        Ok(text.to_owned())
    }

    pub fn transport() -> Result<String, GenerationError> {
        Err(GenerationError::Transport("connection refused".to_owned()))
    }
}

use std::time::Duration;

use anyhow::Context as _;

use crate::cli::{EngineArgs, LlmEngine};
use crate::generation::{GenerationClient, http_client};
use crate::prompt::PromptBuilder;
use crate::{anthropic, noop, openai};

/// Resolved generation settings: CLI flag > environment > provider default.
#[derive(Clone)]
pub struct GeneratorConfig {
    pub engine: LlmEngine,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub language: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("engine", &self.engine)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("language", &self.language)
            .finish()
    }
}

impl GeneratorConfig {
    /// Fails when the selected engine needs an API key that is not set.
    pub fn from_args(args: &EngineArgs) -> anyhow::Result<Self> {
        let (key_var, default_base_url, default_model) = match args.engine {
            LlmEngine::Anthropic => (
                Some("ANTHROPIC_API_KEY"),
                anthropic::DEFAULT_BASE_URL,
                anthropic::DEFAULT_MODEL,
            ),
            LlmEngine::Openai => (
                Some("OPENAI_API_KEY"),
                openai::DEFAULT_BASE_URL,
                openai::DEFAULT_MODEL,
            ),
            LlmEngine::Noop => (None, "", noop::MODEL),
        };

        let api_key = match key_var {
            Some(var) => {
                let key = std::env::var(var)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| anyhow::anyhow!("{var} is not set"))?;
                Some(key)
            }
            None => None,
        };

        let base_url = args
            .base_url
            .clone()
            .or_else(|| env_nonempty("BLOGSMITH_BASE_URL"))
            .unwrap_or_else(|| default_base_url.to_owned());
        if args.engine != LlmEngine::Noop {
            let parsed = url::Url::parse(&base_url)
                .with_context(|| format!("invalid base url: {base_url}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("base url must be http/https: {base_url}");
            }
        }

        let model = args
            .model
            .clone()
            .or_else(|| env_nonempty("BLOGSMITH_MODEL"))
            .unwrap_or_else(|| default_model.to_owned());

        if args.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs must be > 0");
        }

        Ok(Self {
            engine: args.engine,
            base_url,
            model,
            api_key,
            timeout: Duration::from_secs(args.timeout_secs),
            language: args.language.clone(),
        })
    }

    pub fn prompts(&self) -> PromptBuilder {
        PromptBuilder::new(&self.language)
    }

    pub fn client(&self) -> anyhow::Result<GenerationClient> {
        let api_key = self.api_key.clone().unwrap_or_default();
        let client = match self.engine {
            LlmEngine::Anthropic => GenerationClient::new(
                anthropic::AnthropicGenerator::new(
                    http_client(self.timeout).context("build http client")?,
                    &self.base_url,
                    api_key,
                ),
                &self.model,
            ),
            LlmEngine::Openai => GenerationClient::new(
                openai::OpenAiGenerator::new(
                    http_client(self.timeout).context("build http client")?,
                    &self.base_url,
                    api_key,
                ),
                &self.model,
            ),
            LlmEngine::Noop => GenerationClient::new(noop::NoopGenerator, &self.model),
        };
        tracing::debug!(config = ?self, "generation client ready");
        Ok(client)
    }
}

fn env_nonempty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

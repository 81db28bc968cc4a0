use crate::error::ResponseError;
use crate::formats::{ScoreReport, SeoScore, metric_number};
use crate::generation::{GenerationClient, Stage};
use crate::prompt::PromptBuilder;
use crate::sanitize::{extract_json_object, truncate_chars};

/// Only this many leading characters of the article are sent for scoring.
pub const SCORE_EXCERPT_CHARS: usize = 3000;

/// Scores `article` for `keyword`. Never fails: any error yields the all-zero
/// score marked as unavailable.
pub async fn evaluate(
    client: &GenerationClient,
    prompts: &PromptBuilder,
    article: &str,
    keyword: &str,
) -> ScoreReport {
    match try_evaluate(client, prompts, article, keyword).await {
        Ok(score) => {
            tracing::info!(overall = score.overall_score, "seo score evaluated");
            ScoreReport::evaluated(score)
        }
        Err(err) => {
            tracing::warn!(error = %err, "seo scoring failed; using zero score");
            ScoreReport::unavailable(err.to_string())
        }
    }
}

async fn try_evaluate(
    client: &GenerationClient,
    prompts: &PromptBuilder,
    article: &str,
    keyword: &str,
) -> Result<SeoScore, ResponseError> {
    let excerpt = truncate_chars(article, SCORE_EXCERPT_CHARS);
    let prompt = prompts.score(excerpt, keyword);
    let raw = client.generate(Stage::Score, &prompt).await?;
    let json = extract_json_object(raw.trim())?;
    let value: serde_json::Value = serde_json::from_str(json)?;
    let has_metric = SeoScore::KEYS
        .iter()
        .any(|key| value.get(key).and_then(metric_number).is_some());
    if !has_metric {
        return Err(ResponseError::NoMetrics);
    }
    Ok(serde_json::from_value(value)?)
}

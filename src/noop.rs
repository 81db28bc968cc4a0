//! Offline backend that answers every stage with well-formed canned content.
//!
//! Useful for dry runs of the wizard and for exercising the pipeline without
//! network access or an API key.

use crate::error::GenerationError;
use crate::generation::{GenerationRequest, Stage, TextGenerator};

pub const MODEL: &str = "noop";

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGenerator;

#[async_trait::async_trait]
impl TextGenerator for NoopGenerator {
    fn name(&self) -> &str {
        "noop"
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let user = request.user.as_str();
        let keyword = field(user, "Keyword: ")
            .or_else(|| field(user, "Main keyword: "))
            .unwrap_or("the topic");

        let text = match request.stage {
            Stage::Titles => [
                format!("The Complete Guide to {keyword}"),
                format!("{keyword}: 7 Things Beginners Should Know"),
                format!("How to Choose the Right {keyword}"),
                format!("{keyword} Explained With Real Examples"),
                format!("Common {keyword} Mistakes and How to Avoid Them"),
            ]
            .join("\n"),
            Stage::RelatedKeywords => ["guide", "tips", "examples", "comparison", "pricing"]
                .iter()
                .map(|suffix| format!("{keyword} {suffix}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Stage::Structure => structure_json(field(user, "Title: ").unwrap_or(keyword), keyword),
            Stage::Part => part_text(user, keyword),
            Stage::Score => serde_json::json!({
                "keyword_density": 70,
                "title_optimization": 75,
                "headings": 80,
                "internal_links": 50,
                "content_quality": 65,
                "readability": 85,
                "overall_score": 70,
            })
            .to_string(),
        };
        Ok(text)
    }
}

fn field<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn structure_json(title: &str, keyword: &str) -> String {
    let sections = ["What it is", "Why it matters", "How to get started"]
        .iter()
        .map(|heading| {
            serde_json::json!({
                "heading": format!("{heading}: {keyword}"),
                "subheadings": ["Key points", "Examples"],
                "keywords": [keyword],
                "content_brief": format!("{heading} for readers new to {keyword}."),
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "meta": {
            "title": title,
            "keyword": keyword,
            "target_audience": "general audience",
            "word_count": 1500,
        },
        "introduction": format!("Introduce {keyword} and what the reader will learn."),
        "sections": sections,
        "conclusion": format!("Summarize {keyword} and suggest a next step."),
    })
    .to_string()
}

fn part_text(user: &str, keyword: &str) -> String {
    if let Some(heading) = field(user, "Section heading: ") {
        return format!(
            "## {heading}\n\n\
This section covers {heading} with practical notes on {keyword}.\n\n\
### Key points\n\nStart small and measure the results.\n\n\
### Examples\n\nA short worked example goes here."
        );
    }
    if user.contains("ONLY the conclusion") {
        return format!(
            "## Summary\n\n{keyword} rewards a deliberate approach. Pick one idea from this article and try it today."
        );
    }
    format!(
        "Choosing well starts with understanding {keyword}. This article walks through the essentials, \
the trade-offs, and a practical way to get started."
    )
}

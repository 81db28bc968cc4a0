use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;

/// The generated outline that guides per-part generation.
///
/// Every field carries a declared default so that loosely shaped model output
/// (missing `subheadings`, missing `keywords`, missing `meta`) is resolved once
/// at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleStructure {
    #[serde(default)]
    pub meta: StructureMeta,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "defaults::target_audience")]
    pub target_audience: String,
    #[serde(default = "defaults::word_count", deserialize_with = "lenient_word_count")]
    pub word_count: u32,
}

impl Default for StructureMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            keyword: String::new(),
            target_audience: defaults::target_audience(),
            word_count: defaults::word_count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub subheadings: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub content_brief: String,
}

impl ArticleStructure {
    /// Fills the gaps a model commonly leaves: blank meta fields and sections
    /// without keywords inherit the run's title and keyword, and unnamed
    /// sections get a numbered heading.
    pub fn resolve_defaults(mut self, title: &str, keyword: &str) -> Self {
        if self.meta.title.trim().is_empty() {
            self.meta.title = title.to_owned();
        }
        if self.meta.keyword.trim().is_empty() {
            self.meta.keyword = keyword.to_owned();
        }
        if self.meta.target_audience.trim().is_empty() {
            self.meta.target_audience = defaults::target_audience();
        }
        for (index, section) in self.sections.iter_mut().enumerate() {
            if section.heading.trim().is_empty() {
                section.heading = defaults::section_heading(index);
            }
            if section.keywords.is_empty() {
                section.keywords.push(keyword.to_owned());
            }
        }
        self
    }
}

// Models sometimes answer `"word_count": "1500"` or `"about 2000"`.
fn lenient_word_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => {
            let digits = s
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>();
            digits.parse().ok()
        }
        _ => None,
    };
    Ok(parsed.unwrap_or_else(defaults::word_count))
}

/// Identifies one addressable chunk of the article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKind {
    Introduction,
    /// Zero-based index into `ArticleStructure::sections`.
    Section(usize),
    Conclusion,
}

impl PartKind {
    /// The key under which the part is stored: `introduction`, `section_<n>`
    /// (1-based) or `conclusion`.
    pub fn part_id(self) -> String {
        match self {
            Self::Introduction => "introduction".to_owned(),
            Self::Section(index) => format!("section_{}", index + 1),
            Self::Conclusion => "conclusion".to_owned(),
        }
    }

    /// All parts of an article with `section_count` sections, in document order.
    pub fn sequence(section_count: usize) -> Vec<Self> {
        let mut parts = Vec::with_capacity(section_count + 2);
        parts.push(Self::Introduction);
        parts.extend((0..section_count).map(Self::Section));
        parts.push(Self::Conclusion);
        parts
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.part_id())
    }
}

/// Generated markdown keyed by part id, built up one part at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionContents {
    parts: BTreeMap<String, String>,
}

impl SectionContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, part: PartKind, text: String) {
        self.parts.insert(part.part_id(), text);
    }

    pub fn insert_id(&mut self, part_id: impl Into<String>, text: impl Into<String>) {
        self.parts.insert(part_id.into(), text.into());
    }

    pub fn get(&self, part_id: &str) -> Option<&str> {
        self.parts.get(part_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// True once every part implied by a structure of `section_count`
    /// sections is present.
    pub fn is_complete(&self, section_count: usize) -> bool {
        PartKind::sequence(section_count)
            .into_iter()
            .all(|part| self.parts.contains_key(&part.part_id()))
    }
}

/// Seven heuristic SEO metrics, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoScore {
    #[serde(default, deserialize_with = "metric")]
    pub keyword_density: u8,
    #[serde(default, deserialize_with = "metric")]
    pub title_optimization: u8,
    #[serde(default, deserialize_with = "metric")]
    pub headings: u8,
    #[serde(default, deserialize_with = "metric")]
    pub internal_links: u8,
    #[serde(default, deserialize_with = "metric")]
    pub content_quality: u8,
    #[serde(default, deserialize_with = "metric")]
    pub readability: u8,
    #[serde(default, deserialize_with = "metric")]
    pub overall_score: u8,
}

impl SeoScore {
    /// JSON keys of the seven metrics, in display order.
    pub const KEYS: [&'static str; 7] = [
        "keyword_density",
        "title_optimization",
        "headings",
        "internal_links",
        "content_quality",
        "readability",
        "overall_score",
    ];

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_all_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// `(label, value)` pairs in display order, overall score last.
    pub fn metrics(&self) -> [(&'static str, u8); 7] {
        [
            ("keyword density", self.keyword_density),
            ("title optimization", self.title_optimization),
            ("headings", self.headings),
            ("internal links", self.internal_links),
            ("content quality", self.content_quality),
            ("readability", self.readability),
            ("overall", self.overall_score),
        ]
    }
}

// Accepts integers, floats and numeric strings; clamps into 0..=100.
fn metric<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let Some(raw) = metric_number(&value) else {
        return Ok(0);
    };
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// The numeric reading of one metric value, if it has one.
pub fn metric_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }
}

/// Whether an `SeoScore` came back from the model or is the failure sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreStatus {
    Evaluated,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub score: SeoScore,
    #[serde(flatten)]
    pub status: ScoreStatus,
}

impl ScoreReport {
    pub fn evaluated(score: SeoScore) -> Self {
        Self {
            score,
            status: ScoreStatus::Evaluated,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            score: SeoScore::zero(),
            status: ScoreStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self.status, ScoreStatus::Evaluated)
    }
}

//! Fallback values substituted whenever a generation step fails.
//!
//! Every stage of the pipeline prefers forward progress over halting, so each
//! failure mode maps to exactly one placeholder defined here.

use crate::formats::{ArticleStructure, PartKind, Section, StructureMeta};

pub const TARGET_AUDIENCE: &str = "general audience";
pub const WORD_COUNT: u32 = 1500;
pub const CONTENT_BRIEF: &str = "content description";
pub const STRUCTURE_INTRODUCTION: &str = "introduction";
pub const STRUCTURE_CONCLUSION: &str = "conclusion";

pub const INTRODUCTION_TEXT: &str =
    "## Introduction\n\nThis article explains the key points of an important topic.";
pub const CONCLUSION_TEXT: &str = "## Summary\n\nThis article summarized the main points.";

pub fn target_audience() -> String {
    TARGET_AUDIENCE.to_owned()
}

pub fn word_count() -> u32 {
    WORD_COUNT
}

/// `Section <n>` for a zero-based section index.
pub fn section_heading(index: usize) -> String {
    format!("Section {}", index + 1)
}

/// Placeholder markdown for a part whose generation failed.
pub fn part_text(part: PartKind) -> String {
    match part {
        PartKind::Introduction => INTRODUCTION_TEXT.to_owned(),
        PartKind::Conclusion => CONCLUSION_TEXT.to_owned(),
        PartKind::Section(index) => format!(
            "## {}\n\nThis section provides important information.",
            section_heading(index)
        ),
    }
}

/// The one-section outline used when structure generation fails.
pub fn structure(title: &str, keyword: &str) -> ArticleStructure {
    ArticleStructure {
        meta: StructureMeta {
            title: title.to_owned(),
            keyword: keyword.to_owned(),
            target_audience: target_audience(),
            word_count: WORD_COUNT,
        },
        introduction: STRUCTURE_INTRODUCTION.to_owned(),
        sections: vec![Section {
            heading: section_heading(0),
            subheadings: Vec::new(),
            keywords: vec![keyword.to_owned()],
            content_brief: CONTENT_BRIEF.to_owned(),
        }],
        conclusion: STRUCTURE_CONCLUSION.to_owned(),
    }
}

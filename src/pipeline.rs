//! The four-step generation wizard as an explicit state machine.
//!
//! `PipelineController` owns a single `PipelineState` and advances it only in
//! response to explicit calls: keyword -> titles -> outline -> article. Every
//! per-call generation failure degrades to a fallback value so the run keeps
//! moving; the only hard stop is a title step that produced nothing to choose
//! from.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::assemble::assemble;
use crate::defaults;
use crate::error::{PipelineError, ResponseError};
use crate::export::ArticleSink;
use crate::formats::{ArticleStructure, PartKind, ScoreReport, SectionContents};
use crate::generation::{GenerationClient, Stage};
use crate::prompt::PromptBuilder;
use crate::sanitize::{extract_json_object, list_items};
use crate::score;

pub const MAX_TITLE_CANDIDATES: usize = 5;
pub const MAX_RELATED_KEYWORDS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    AwaitingKeyword,
    AwaitingTitleSelection,
    AwaitingStructureConfirmation,
    Editing,
}

impl Step {
    /// 1-based step number as shown to the user.
    pub fn number(self) -> u8 {
        match self {
            Self::AwaitingKeyword => 1,
            Self::AwaitingTitleSelection => 2,
            Self::AwaitingStructureConfirmation => 3,
            Self::Editing => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AwaitingKeyword => "enter a keyword",
            Self::AwaitingTitleSelection => "choose a title",
            Self::AwaitingStructureConfirmation => "review the outline",
            Self::Editing => "edit and save",
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::AwaitingKeyword | Self::AwaitingTitleSelection => Self::AwaitingKeyword,
            Self::AwaitingStructureConfirmation => Self::AwaitingTitleSelection,
            Self::Editing => Self::AwaitingStructureConfirmation,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

/// Everything a run has produced so far.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub step: Step,
    pub keyword: String,
    pub titles: Vec<String>,
    pub related_keywords: Vec<String>,
    pub selected_title: Option<String>,
    pub structure: Option<ArticleStructure>,
    /// Set when `structure` is the fallback outline rather than model output.
    pub structure_fallback: Option<String>,
    pub section_contents: SectionContents,
    /// Article generation progress in `0.0..=1.0`.
    pub progress: f64,
    pub article: String,
    pub edited_article: String,
    pub score: Option<ScoreReport>,
    /// The text `score` was computed from.
    pub scored_text: String,
    pub in_progress: bool,
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            step: Step::AwaitingKeyword,
            keyword: String::new(),
            titles: Vec::new(),
            related_keywords: Vec::new(),
            selected_title: None,
            structure: None,
            structure_fallback: None,
            section_contents: SectionContents::new(),
            progress: 0.0,
            article: String::new(),
            edited_article: String::new(),
            score: None,
            scored_text: String::new(),
            in_progress: false,
        }
    }

    /// True once the human edit diverges from the text that was scored.
    pub fn score_is_stale(&self) -> bool {
        self.score.is_some() && self.edited_article != self.scored_text
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Reported after each article part completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleProgress {
    pub part: PartKind,
    pub heading: Option<String>,
    pub completed: usize,
    pub total: usize,
    pub fraction: f64,
    pub fallback: bool,
}

/// Progress after `part` completes: 0.1 for the introduction, then evenly up
/// to 0.9 across the sections, 1.0 for the conclusion.
pub fn progress_after(part: PartKind, section_count: usize) -> f64 {
    match part {
        PartKind::Introduction => 0.1,
        PartKind::Section(index) => {
            0.1 + 0.8 * (index + 1) as f64 / section_count.max(1) as f64
        }
        PartKind::Conclusion => 1.0,
    }
}

/// An outline plus why it had to be replaced by the fallback, if it was.
#[derive(Debug, Clone)]
pub struct Outline {
    pub structure: ArticleStructure,
    pub fallback_reason: Option<String>,
}

/// Generates an outline for `title`, substituting the one-section fallback
/// on any generation, extraction or parse failure.
pub async fn outline(
    client: &GenerationClient,
    prompts: &PromptBuilder,
    title: &str,
    keyword: &str,
) -> Outline {
    let reason = match try_outline(client, prompts, title, keyword).await {
        Ok(structure) if !structure.sections.is_empty() => {
            return Outline {
                structure: structure.resolve_defaults(title, keyword),
                fallback_reason: None,
            };
        }
        Ok(_) => "outline has no sections".to_owned(),
        Err(err) => err.to_string(),
    };

    tracing::warn!(title, error = %reason, "structure generation failed; using fallback outline");
    Outline {
        structure: defaults::structure(title, keyword),
        fallback_reason: Some(reason),
    }
}

async fn try_outline(
    client: &GenerationClient,
    prompts: &PromptBuilder,
    title: &str,
    keyword: &str,
) -> Result<ArticleStructure, ResponseError> {
    let raw = client
        .generate(Stage::Structure, &prompts.structure(title, keyword))
        .await?;
    let json = extract_json_object(&raw)?;
    Ok(serde_json::from_str(json)?)
}

/// Drives a single run through the wizard's steps.
#[derive(Debug)]
pub struct PipelineController {
    client: GenerationClient,
    prompts: PromptBuilder,
    state: PipelineState,
}

impl PipelineController {
    pub fn new(client: GenerationClient, prompts: PromptBuilder) -> Self {
        Self {
            client,
            prompts,
            state: PipelineState::new(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    fn require_step(&self, expected: Step) -> Result<(), PipelineError> {
        if self.state.step != expected {
            return Err(PipelineError::WrongStep {
                expected,
                actual: self.state.step,
            });
        }
        Ok(())
    }

    /// Step 1 -> 2. Generates title candidates and related keywords.
    ///
    /// Leaves the pipeline at step 1 and returns `NoTitleCandidates` when the
    /// model produced nothing to choose from.
    pub async fn generate_titles(&mut self, keyword: &str) -> Result<&[String], PipelineError> {
        self.require_step(Step::AwaitingKeyword)?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(PipelineError::KeywordRequired);
        }

        tracing::info!(run_id = %self.state.run_id, keyword, "generating titles");
        self.state.in_progress = true;

        let titles = self
            .client
            .generate(Stage::Titles, &self.prompts.titles(keyword))
            .await
            .map(|raw| list_items(&raw, MAX_TITLE_CANDIDATES));
        let titles = match titles {
            Ok(titles) if !titles.is_empty() => titles,
            Ok(_) => {
                self.state.in_progress = false;
                tracing::warn!(run_id = %self.state.run_id, "title generation returned no candidates");
                return Err(PipelineError::NoTitleCandidates { source: None });
            }
            Err(err) => {
                self.state.in_progress = false;
                tracing::warn!(run_id = %self.state.run_id, error = %err, "title generation failed");
                return Err(PipelineError::NoTitleCandidates { source: Some(err) });
            }
        };

        let related_keywords = match self
            .client
            .generate(Stage::RelatedKeywords, &self.prompts.related_keywords(keyword))
            .await
        {
            Ok(raw) => list_items(&raw, MAX_RELATED_KEYWORDS),
            Err(err) => {
                tracing::warn!(run_id = %self.state.run_id, error = %err, "related keyword generation failed");
                Vec::new()
            }
        };

        self.state.keyword = keyword.to_owned();
        self.state.titles = titles;
        self.state.related_keywords = related_keywords;
        self.state.selected_title = None;
        self.clear_downstream_of_titles();
        self.state.in_progress = false;
        self.state.step = Step::AwaitingTitleSelection;

        tracing::info!(
            run_id = %self.state.run_id,
            titles = self.state.titles.len(),
            related_keywords = self.state.related_keywords.len(),
            "titles ready"
        );
        Ok(&self.state.titles)
    }

    /// Chooses candidate `index` (0-based) as the article title.
    pub fn select_title(&mut self, index: usize) -> Result<&str, PipelineError> {
        self.require_step(Step::AwaitingTitleSelection)?;
        let count = self.state.titles.len();
        let title = self
            .state
            .titles
            .get(index)
            .cloned()
            .ok_or(PipelineError::TitleOutOfRange { index, count })?;
        tracing::debug!(run_id = %self.state.run_id, index, title = %title, "title selected");
        Ok(self.state.selected_title.insert(title).as_str())
    }

    /// Step 2 -> 3. Always advances: a failed outline is replaced by the
    /// one-section fallback.
    pub async fn generate_structure(&mut self) -> Result<&ArticleStructure, PipelineError> {
        self.require_step(Step::AwaitingTitleSelection)?;
        let Some(title) = self.state.selected_title.clone() else {
            return Err(PipelineError::TitleSelectionRequired);
        };

        tracing::info!(run_id = %self.state.run_id, title = %title, "generating outline");
        self.state.in_progress = true;
        let outline = outline(&self.client, &self.prompts, &title, &self.state.keyword).await;

        self.clear_downstream_of_titles();
        self.state.structure_fallback = outline.fallback_reason;
        self.state.in_progress = false;
        self.state.step = Step::AwaitingStructureConfirmation;

        tracing::info!(
            run_id = %self.state.run_id,
            sections = outline.structure.sections.len(),
            fallback = self.state.structure_fallback.is_some(),
            "outline ready"
        );
        Ok(self.state.structure.insert(outline.structure))
    }

    /// Installs a human-edited outline. At step 3 it replaces the generated
    /// one; at step 2 it stands in for generation and advances to step 3.
    pub fn replace_structure(&mut self, structure: ArticleStructure) -> Result<(), PipelineError> {
        let advancing = match self.state.step {
            Step::AwaitingTitleSelection => true,
            Step::AwaitingStructureConfirmation => false,
            actual => {
                return Err(PipelineError::WrongStep {
                    expected: Step::AwaitingStructureConfirmation,
                    actual,
                });
            }
        };
        let Some(title) = self.state.selected_title.clone() else {
            return Err(PipelineError::TitleSelectionRequired);
        };
        if structure.sections.is_empty() {
            return Err(PipelineError::EmptyOutline);
        }
        if advancing {
            self.clear_downstream_of_titles();
            self.state.step = Step::AwaitingStructureConfirmation;
        }
        tracing::info!(
            run_id = %self.state.run_id,
            sections = structure.sections.len(),
            "outline replaced"
        );
        self.state.structure = Some(structure.resolve_defaults(&title, &self.state.keyword));
        self.state.structure_fallback = None;
        Ok(())
    }

    /// Step 3 -> 4. Writes every part in document order, assembles the
    /// article, scores it once and enters editing.
    ///
    /// A failed part is replaced by its placeholder and generation continues;
    /// a failed score becomes the zero sentinel.
    pub async fn generate_article<F>(&mut self, mut on_progress: F) -> Result<&str, PipelineError>
    where
        F: FnMut(&ArticleProgress),
    {
        self.require_step(Step::AwaitingStructureConfirmation)?;
        let Some(title) = self.state.selected_title.clone() else {
            return Err(PipelineError::TitleSelectionRequired);
        };
        let structure = match self.state.structure.clone() {
            Some(structure) if !structure.sections.is_empty() => structure,
            _ => defaults::structure(&title, &self.state.keyword),
        };
        let keyword = self.state.keyword.clone();
        let section_count = structure.sections.len();
        let parts = PartKind::sequence(section_count);
        let total = parts.len();

        tracing::info!(run_id = %self.state.run_id, parts = total, "generating article");
        self.state.in_progress = true;
        self.state.section_contents = SectionContents::new();
        self.state.progress = 0.0;

        for (idx, part) in parts.into_iter().enumerate() {
            let (text, fallback) = self.write_part(&title, &keyword, &structure, part).await;
            self.state.section_contents.insert(part, text);
            self.state.progress = progress_after(part, section_count);

            let heading = match part {
                PartKind::Section(index) => structure.sections.get(index).map(|s| s.heading.clone()),
                _ => None,
            };
            let update = ArticleProgress {
                part,
                heading,
                completed: idx + 1,
                total,
                fraction: self.state.progress,
                fallback,
            };
            tracing::info!(
                run_id = %self.state.run_id,
                part = %part,
                done = update.completed,
                total,
                fallback,
                "article part ready"
            );
            on_progress(&update);
        }

        let article = match assemble(&title, &self.state.section_contents, section_count) {
            Ok(article) => article,
            Err(err) => {
                self.state.in_progress = false;
                return Err(err.into());
            }
        };
        let report = score::evaluate(&self.client, &self.prompts, &article, &keyword).await;

        self.state.edited_article = article.clone();
        self.state.scored_text = article.clone();
        self.state.article = article;
        self.state.score = Some(report);
        self.state.in_progress = false;
        self.state.step = Step::Editing;

        Ok(&self.state.article)
    }

    async fn write_part(
        &self,
        title: &str,
        keyword: &str,
        structure: &ArticleStructure,
        part: PartKind,
    ) -> (String, bool) {
        let prompt = match self.prompts.part(title, keyword, structure, part) {
            Ok(prompt) => prompt,
            Err(err) => {
                tracing::warn!(part = %part, error = %err, "cannot build part prompt; using placeholder");
                return (defaults::part_text(part), true);
            }
        };
        match self.client.generate(Stage::Part, &prompt).await {
            Ok(text) => (text, false),
            Err(err) => {
                tracing::warn!(part = %part, error = %err, "part generation failed; using placeholder");
                (defaults::part_text(part), true)
            }
        }
    }

    /// Replaces the human-editable copy. The generated article and its score
    /// are left untouched.
    pub fn edit_article(&mut self, text: impl Into<String>) -> Result<(), PipelineError> {
        self.require_step(Step::Editing)?;
        self.state.edited_article = text.into();
        Ok(())
    }

    /// Re-scores the edited article on request. Editing never triggers this
    /// by itself.
    pub async fn rescore(&mut self) -> Result<&ScoreReport, PipelineError> {
        self.require_step(Step::Editing)?;
        self.state.in_progress = true;
        let report = score::evaluate(
            &self.client,
            &self.prompts,
            &self.state.edited_article,
            &self.state.keyword,
        )
        .await;
        self.state.scored_text = self.state.edited_article.clone();
        self.state.in_progress = false;
        Ok(self.state.score.insert(report))
    }

    /// Hands the edited article to `sink`.
    pub fn save(&self, sink: &dyn ArticleSink) -> Result<PathBuf, PipelineError> {
        self.require_step(Step::Editing)?;
        if self.state.edited_article.trim().is_empty() {
            return Err(PipelineError::EmptyArticle);
        }
        let title = self.state.selected_title.as_deref().unwrap_or_default();
        Ok(sink.save(title, &self.state.edited_article)?)
    }

    /// Moves one step back without discarding anything; the next forward
    /// transition regenerates and overwrites.
    pub fn go_back(&mut self) -> Step {
        self.state.step = self.state.step.previous();
        self.state.step
    }

    /// Discards the whole run and starts over at step 1.
    pub fn restart(&mut self) {
        let previous = self.state.run_id;
        self.state = PipelineState::new();
        tracing::info!(previous_run_id = %previous, run_id = %self.state.run_id, "pipeline restarted");
    }

    fn clear_downstream_of_titles(&mut self) {
        self.state.structure = None;
        self.state.structure_fallback = None;
        self.state.section_contents = SectionContents::new();
        self.state.progress = 0.0;
        self.state.article.clear();
        self.state.edited_article.clear();
        self.state.score = None;
        self.state.scored_text.clear();
    }
}

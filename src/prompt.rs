use crate::error::PromptError;
use crate::formats::{ArticleStructure, PartKind};

/// A system instruction paired with the user message sent alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Assembles request text for every generation stage.
///
/// Pure: the output depends only on the arguments and the output language.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("English")
    }
}

impl PromptBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn titles(&self, keyword: &str) -> Prompt {
        Prompt {
            system: format!(
                "You are an SEO expert. Propose five engaging, SEO-optimized blog titles \
for the given keyword. Reply in {language} with the list of titles only.",
                language = self.language
            ),
            user: format!(
                "Propose five engaging, SEO-optimized blog titles based on the keyword below.\n\
Return only the titles, one per line, with no commentary.\n\
\n\
Keyword: {keyword}\n"
            ),
        }
    }

    pub fn related_keywords(&self, keyword: &str) -> Prompt {
        Prompt {
            system: format!(
                "You are an SEO keyword research expert. Suggest effective keywords related \
to a main keyword. Reply in {language}.",
                language = self.language
            ),
            user: format!(
                "Suggest ten keywords related to the main keyword below.\n\
Return a simple list, one keyword per line.\n\
\n\
Main keyword: {keyword}\n"
            ),
        }
    }

    pub fn structure(&self, title: &str, keyword: &str) -> Prompt {
        Prompt {
            system: "You are an expert in SEO and blog article structure. Propose the best \
outline for the given title and keyword as JSON. Reply with JSON only."
                .to_owned(),
            user: format!(
                "Title: {title}\n\
Keyword: {keyword}\n\
\n\
Create an SEO-optimized blog article outline for the title and keyword above.\n\
Write every text value in {language}.\n\
\n\
Output:\n\
- Output ONLY a single JSON object (no markdown fences, no commentary).\n\
- Propose 4-6 sections.\n\
- Schema:\n\
  {{\"meta\":{{\"title\":\"article title\",\"keyword\":\"main keyword\",\"target_audience\":\"who the article is for\",\"word_count\":1500}},\
\"introduction\":\"what the introduction covers (about 100 characters)\",\
\"sections\":[{{\"heading\":\"H2 heading\",\"subheadings\":[\"H3 heading\"],\"keywords\":[\"keyword to include\"],\"content_brief\":\"what the section covers (about 100 characters)\"}}],\
\"conclusion\":\"what the conclusion covers (about 100 characters)\"}}\n",
                language = self.language
            ),
        }
    }

    /// Prompt for one article part. The whole outline is embedded in every
    /// part prompt so each part is written with full context.
    pub fn part(
        &self,
        title: &str,
        keyword: &str,
        structure: &ArticleStructure,
        part: PartKind,
    ) -> Result<Prompt, PromptError> {
        let structure_json = serde_json::to_string_pretty(structure)
            .map_err(|err| PromptError::Serialize(err.to_string()))?;
        let language = &self.language;

        let user = match part {
            PartKind::Introduction => format!(
                "Title: {title}\n\
Keyword: {keyword}\n\
\n\
Write ONLY the introduction of the article described by this outline:\n\
\n\
{structure_json}\n\
\n\
The introduction must include:\n\
1. An opening sentence that hooks the reader\n\
2. An overview of the article and the problem it solves\n\
3. The main keyword \"{keyword}\", used naturally\n\
4. What the reader gains from this article\n\
\n\
Write in {language}, in Markdown. Do not include a heading.\n"
            ),
            PartKind::Conclusion => format!(
                "Title: {title}\n\
Keyword: {keyword}\n\
\n\
Write ONLY the conclusion of the article described by this outline:\n\
\n\
{structure_json}\n\
\n\
The conclusion must include:\n\
1. A summary of the main points\n\
2. The main keyword \"{keyword}\", used naturally\n\
3. A call to action for the reader, if appropriate\n\
4. A memorable closing sentence\n\
\n\
Write in {language}, in Markdown. Include a heading such as \"Summary\" or \"Conclusion\".\n"
            ),
            PartKind::Section(index) => {
                let section =
                    structure
                        .sections
                        .get(index)
                        .ok_or(PromptError::SectionOutOfRange {
                            index,
                            len: structure.sections.len(),
                        })?;
                let section_keywords = if section.keywords.is_empty() {
                    keyword.to_owned()
                } else {
                    section.keywords.join(", ")
                };
                let subheadings = section
                    .subheadings
                    .iter()
                    .map(|s| format!("\"{s}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Title: {title}\n\
Main keyword: {keyword}\n\
Section heading: {heading}\n\
Section keywords: {section_keywords}\n\
Section brief: {brief}\n\
\n\
Write ONLY this section, as part of the article described by this outline:\n\
\n\
{structure_json}\n\
\n\
The section must:\n\
1. Use \"{heading}\" as an H2 heading (##)\n\
2. Use the subheadings {subheadings} as H3 headings (###), if any\n\
3. Include the section keywords naturally\n\
4. Give concrete examples, cases or statistics\n\
5. Offer practical information for the reader\n\
\n\
Write in {language}, in Markdown. Do not include any other section.\n",
                    heading = section.heading,
                    brief = section.content_brief,
                )
            }
        };

        Ok(Prompt {
            system: "You are a blog writer skilled in SEO and content. Write one high-quality \
part of a blog article from the given information. Reply in Markdown."
                .to_owned(),
            user,
        })
    }

    /// `article_excerpt` is expected to be already truncated by the caller.
    pub fn score(&self, article_excerpt: &str, keyword: &str) -> Prompt {
        Prompt {
            system: "You are an SEO analysis expert. Give an objective SEO analysis of the \
provided article and keyword."
                .to_owned(),
            user: format!(
                "Analyse the SEO of the article below for the given keyword.\n\
\n\
Keyword: {keyword}\n\
\n\
Article:\n\
{article_excerpt}...\n\
\n\
Score each item from 0 to 100:\n\
1. Keyword density\n\
2. Title optimization\n\
3. Use of headings\n\
4. Internal linking potential\n\
5. Content quality\n\
6. Readability\n\
7. Overall SEO score\n\
\n\
Return the result as JSON, for example:\n\
{{\"keyword_density\": 85, \"title_optimization\": 90, \"headings\": 80, \"internal_links\": 70, \"content_quality\": 85, \"readability\": 90, \"overall_score\": 83}}\n"
            ),
        }
    }
}

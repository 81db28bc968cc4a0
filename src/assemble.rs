use crate::error::AssembleError;
use crate::formats::{PartKind, SectionContents};

const SEPARATOR: &str = "\n\n";

/// Concatenates `# {title}`, the introduction, each section in outline order
/// and the conclusion, separated by blank lines. No trailing separator.
pub fn assemble(
    title: &str,
    contents: &SectionContents,
    section_count: usize,
) -> Result<String, AssembleError> {
    let mut article = format!("# {title}{SEPARATOR}");
    let parts = PartKind::sequence(section_count);
    let last = parts.len() - 1;

    for (idx, part) in parts.into_iter().enumerate() {
        let part_id = part.part_id();
        let text = contents
            .get(&part_id)
            .ok_or(AssembleError::MissingPart(part_id))?;
        article.push_str(text);
        if idx != last {
            article.push_str(SEPARATOR);
        }
    }

    Ok(article)
}

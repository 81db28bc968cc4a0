//! Line-oriented front end for the four-step pipeline.
//!
//! Reads one command per line and renders the current step after every
//! command. Generation failures are printed and the wizard keeps running;
//! only a broken output stream ends it early.

use std::io::{BufRead, Write};

use anyhow::Context as _;

use crate::commands::{print_report, read_outline};
use crate::export::FileSink;
use crate::formats::ArticleStructure;
use crate::pipeline::{PipelineController, Step};

enum Flow {
    Continue,
    Quit,
}

pub struct Wizard<R, W> {
    controller: PipelineController,
    sink: FileSink,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(controller: PipelineController, sink: FileSink, input: R, output: W) -> Self {
        Self {
            controller,
            sink,
            input,
            output,
        }
    }

    pub fn controller(&self) -> &PipelineController {
        &self.controller
    }

    /// Runs until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "SEO blog wizard. Type 'quit' to leave at any time.")?;
        loop {
            self.render_prompt()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            match self.handle(line.trim()).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => writeln!(self.output, "error: {err:#}")?,
            }
        }
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("read input")?;
        Ok((read > 0).then_some(line))
    }

    fn render_prompt(&mut self) -> anyhow::Result<()> {
        let step = self.controller.step();
        writeln!(self.output, "\n== Step {step} ==")?;
        let hint = match step {
            Step::AwaitingKeyword => "Enter the main keyword:",
            Step::AwaitingTitleSelection => "Choose a title by number, or 'back' / 'restart':",
            Step::AwaitingStructureConfirmation => {
                "'write' to generate the article, 'show' the outline, 'load <file>' an edited outline, or 'back' / 'restart':"
            }
            Step::Editing => {
                "'show', 'edit <file>', 'rescore', 'save', or 'back' / 'restart':"
            }
        };
        writeln!(self.output, "{hint}")?;
        self.output.flush()?;
        Ok(())
    }

    async fn handle(&mut self, line: &str) -> anyhow::Result<Flow> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" => return Ok(Flow::Quit),
            "restart" => {
                self.controller.restart();
                writeln!(self.output, "Started over.")?;
            }
            "back" => {
                let step = self.controller.go_back();
                writeln!(self.output, "Back to step {step}.")?;
            }
            _ => match self.controller.step() {
                Step::AwaitingKeyword => self.enter_keyword(line).await?,
                Step::AwaitingTitleSelection => self.choose_title(line).await?,
                Step::AwaitingStructureConfirmation => self.review_outline(command, rest).await?,
                Step::Editing => self.edit(command, rest).await?,
            },
        }
        Ok(Flow::Continue)
    }

    async fn enter_keyword(&mut self, keyword: &str) -> anyhow::Result<()> {
        writeln!(self.output, "Generating title ideas...")?;
        self.controller.generate_titles(keyword).await?;
        self.show_titles()
    }

    fn show_titles(&mut self) -> anyhow::Result<()> {
        let state = self.controller.state();
        writeln!(self.output, "Title candidates:")?;
        for (idx, title) in state.titles.iter().enumerate() {
            writeln!(self.output, "  {}. {title}", idx + 1)?;
        }
        if !state.related_keywords.is_empty() {
            writeln!(self.output, "Related keywords: {}", state.related_keywords.join(", "))?;
        }
        Ok(())
    }

    async fn choose_title(&mut self, choice: &str) -> anyhow::Result<()> {
        let count = self.controller.state().titles.len();
        let number = choice
            .parse::<usize>()
            .ok()
            .filter(|number| (1..=count).contains(number))
            .ok_or_else(|| anyhow::anyhow!("enter a title number between 1 and {count}"))?;
        let title = self.controller.select_title(number - 1)?.to_owned();
        writeln!(self.output, "Selected: {title}\nGenerating the outline...")?;
        self.controller.generate_structure().await?;
        self.show_outline()
    }

    fn show_outline(&mut self) -> anyhow::Result<()> {
        let state = self.controller.state();
        let Some(structure) = &state.structure else {
            return Ok(());
        };
        if let Some(reason) = &state.structure_fallback {
            writeln!(self.output, "Outline generation failed ({reason}); using a basic outline.")?;
        }
        write_outline(&mut self.output, structure)
    }

    async fn review_outline(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "show" => self.show_outline(),
            "load" => {
                if rest.is_empty() {
                    anyhow::bail!("usage: load <outline.yaml>");
                }
                let structure = read_outline(rest)?;
                self.controller.replace_structure(structure)?;
                writeln!(self.output, "Outline replaced.")?;
                self.show_outline()
            }
            "write" | "" => self.write_article().await,
            other => anyhow::bail!("unknown command: {other}"),
        }
    }

    async fn write_article(&mut self) -> anyhow::Result<()> {
        let output = &mut self.output;
        let mut write_error = None;
        self.controller
            .generate_article(|progress| {
                let label = match &progress.heading {
                    Some(heading) => format!("{} ({heading})", progress.part),
                    None => progress.part.to_string(),
                };
                let note = if progress.fallback { " [placeholder]" } else { "" };
                let percent = (progress.fraction * 100.0).round() as u32;
                if let Err(err) = writeln!(output, "[{percent:>3}%] {label}{note}") {
                    write_error.get_or_insert(err);
                }
            })
            .await?;
        if let Some(err) = write_error {
            return Err(err.into());
        }

        writeln!(self.output, "\n{}", self.controller.state().article)?;
        self.show_score()
    }

    fn show_score(&mut self) -> anyhow::Result<()> {
        let state = self.controller.state();
        let Some(report) = &state.score else {
            return Ok(());
        };
        writeln!(self.output, "\nSEO score:")?;
        print_report(&mut self.output, report)?;
        if state.score_is_stale() {
            writeln!(self.output, "(score reflects the generated text; 'rescore' to update)")?;
        }
        Ok(())
    }

    async fn edit(&mut self, command: &str, rest: &str) -> anyhow::Result<()> {
        match command {
            "show" => {
                writeln!(self.output, "{}", self.controller.state().edited_article)?;
                self.show_score()
            }
            "edit" => {
                if rest.is_empty() {
                    anyhow::bail!("usage: edit <file>");
                }
                let text = std::fs::read_to_string(rest)
                    .with_context(|| format!("read edited article: {rest}"))?;
                self.controller.edit_article(text)?;
                writeln!(self.output, "Article text replaced from {rest}.")?;
                Ok(())
            }
            "rescore" => {
                self.controller.rescore().await?;
                self.show_score()
            }
            "save" => {
                let path = self.controller.save(&self.sink)?;
                writeln!(self.output, "Saved to {}", path.display())?;
                Ok(())
            }
            other => anyhow::bail!("unknown command: {other}"),
        }
    }
}

fn write_outline(out: &mut impl Write, structure: &ArticleStructure) -> anyhow::Result<()> {
    let meta = &structure.meta;
    writeln!(out, "Title: {}", meta.title)?;
    writeln!(out, "Keyword: {}", meta.keyword)?;
    writeln!(out, "Audience: {}", meta.target_audience)?;
    writeln!(out, "Target length: {} words", meta.word_count)?;
    writeln!(out, "Introduction: {}", structure.introduction)?;
    for (idx, section) in structure.sections.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, section.heading)?;
        for sub in &section.subheadings {
            writeln!(out, "   - {sub}")?;
        }
        if !section.content_brief.is_empty() {
            writeln!(out, "   {}", section.content_brief)?;
        }
    }
    writeln!(out, "Conclusion: {}", structure.conclusion)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::generation::GenerationClient;
    use crate::noop::{self, NoopGenerator};
    use crate::prompt::PromptBuilder;

    fn wizard(script: &str, dir: &std::path::Path) -> Wizard<Cursor<Vec<u8>>, Vec<u8>> {
        let client = GenerationClient::new(NoopGenerator, noop::MODEL);
        Wizard::new(
            PipelineController::new(client, PromptBuilder::default()),
            FileSink::new(dir),
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    fn saved_files(dir: &std::path::Path) -> anyhow::Result<Vec<std::path::PathBuf>> {
        let mut files = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        files.sort();
        Ok(files)
    }

    #[tokio::test]
    async fn full_session_saves_article() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut wizard = wizard("rust\n2\nwrite\nsave\nquit\n", dir.path());
        wizard.run().await?;

        let output = String::from_utf8(wizard.output.clone())?;
        assert!(output.contains("1. The Complete Guide to rust"), "{output}");
        assert!(output.contains("Related keywords: rust guide"), "{output}");
        assert!(output.contains("[ 10%] introduction"), "{output}");
        assert!(output.contains("[100%] conclusion"), "{output}");
        assert!(output.contains("overall: 70/100"), "{output}");
        assert!(output.contains("Saved to"), "{output}");

        let files = saved_files(dir.path())?;
        assert_eq!(files.len(), 1);
        let text = std::fs::read_to_string(&files[0])?;
        assert!(text.starts_with("# rust: 7 Things Beginners Should Know\n\n"));
        assert_eq!(wizard.controller().step(), Step::Editing);
        Ok(())
    }

    #[tokio::test]
    async fn errors_are_reported_and_the_session_continues() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut wizard = wizard("rust\n9\nabc\nback\n", dir.path());
        wizard.run().await?;

        let output = String::from_utf8(wizard.output.clone())?;
        assert_eq!(
            output.matches("error: enter a title number between 1 and 5").count(),
            2,
            "{output}"
        );
        assert!(output.contains("Back to step 1 (enter a keyword)."), "{output}");
        assert_eq!(wizard.controller().step(), Step::AwaitingKeyword);
        assert!(saved_files(dir.path())?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn edits_mark_the_score_stale_until_rescored() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let edited = dir.path().join("edited.md");
        std::fs::write(&edited, "# Mine\n\nhand written")?;
        let out_dir = dir.path().join("out");

        let script = format!("rust\n1\nwrite\nedit {}\nshow\nrescore\nsave\n", edited.display());
        let mut wizard = wizard(&script, &out_dir);
        wizard.run().await?;

        let output = String::from_utf8(wizard.output.clone())?;
        assert!(output.contains("'rescore' to update"), "{output}");
        assert!(!wizard.controller().state().score_is_stale());

        let files = saved_files(&out_dir)?;
        assert_eq!(std::fs::read_to_string(&files[0])?, "# Mine\n\nhand written");
        Ok(())
    }

    #[tokio::test]
    async fn restart_returns_to_keyword_step() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut wizard = wizard("rust\n1\nrestart\n", dir.path());
        wizard.run().await?;

        let state = wizard.controller().state();
        assert_eq!(state.step, Step::AwaitingKeyword);
        assert!(state.titles.is_empty());
        assert!(state.structure.is_none());
        Ok(())
    }
}

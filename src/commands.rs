use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::{GenerateArgs, OutlineArgs, ScoreArgs, TitlesArgs};
use crate::config::GeneratorConfig;
use crate::export::FileSink;
use crate::formats::{ArticleStructure, ScoreReport};
use crate::pipeline::{self, PipelineController};
use crate::score;

pub async fn titles(config: &GeneratorConfig, args: TitlesArgs) -> anyhow::Result<()> {
    let mut controller = PipelineController::new(config.client()?, config.prompts());
    let titles = controller
        .generate_titles(&args.keyword)
        .await
        .context("generate titles")?
        .to_vec();

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Titles:")?;
    for (idx, title) in titles.iter().enumerate() {
        writeln!(stdout, "{}. {title}", idx + 1)?;
    }
    let related = &controller.state().related_keywords;
    if !related.is_empty() {
        writeln!(stdout, "\nRelated keywords:")?;
        for keyword in related {
            writeln!(stdout, "- {keyword}")?;
        }
    }
    Ok(())
}

pub async fn outline(config: &GeneratorConfig, args: OutlineArgs) -> anyhow::Result<()> {
    let out_path = PathBuf::from(&args.out);
    if out_path.exists() && !args.force {
        anyhow::bail!("outline output already exists: {}", out_path.display());
    }

    let client = config.client()?;
    let outline = pipeline::outline(&client, &config.prompts(), &args.title, &args.keyword).await;
    if let Some(reason) = &outline.fallback_reason {
        tracing::warn!(reason = %reason, "wrote fallback outline");
    }

    let yaml = serde_yaml::to_string(&outline.structure).context("serialize outline yaml")?;
    write_output(&out_path, &yaml, args.force)?;
    tracing::info!(
        out = %out_path.display(),
        sections = outline.structure.sections.len(),
        "outline written"
    );
    Ok(())
}

pub async fn generate(config: &GeneratorConfig, args: GenerateArgs) -> anyhow::Result<()> {
    if args.title_index == 0 {
        anyhow::bail!("--title-index is 1-based");
    }
    let edited_outline = args
        .outline
        .as_deref()
        .map(read_outline)
        .transpose()?;

    let mut controller = PipelineController::new(config.client()?, config.prompts());
    controller
        .generate_titles(&args.keyword)
        .await
        .context("generate titles")?;
    let title = controller
        .select_title(args.title_index - 1)
        .context("select title")?
        .to_owned();
    tracing::info!(title = %title, "title selected");

    match edited_outline {
        Some(structure) => controller
            .replace_structure(structure)
            .context("apply outline")?,
        None => {
            controller.generate_structure().await.context("generate outline")?;
        }
    }

    controller
        .generate_article(|progress| {
            tracing::info!(
                part = %progress.part,
                progress_percent = (progress.fraction * 100.0).round() as u32,
                "writing"
            );
        })
        .await
        .context("generate article")?;

    let path = controller
        .save(&FileSink::new(&args.out_dir))
        .context("save article")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", path.display())?;
    if let Some(report) = &controller.state().score {
        print_report(&mut stdout, report)?;
    }
    Ok(())
}

pub async fn score(config: &GeneratorConfig, args: ScoreArgs) -> anyhow::Result<()> {
    let article = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read article: {}", args.input))?;
    if article.trim().is_empty() {
        anyhow::bail!("article is empty: {}", args.input);
    }

    let client = config.client()?;
    let report = score::evaluate(&client, &config.prompts(), &article, &args.keyword).await;
    let json = serde_json::to_string_pretty(&report).context("serialize score")?;
    println!("{json}");
    Ok(())
}

pub fn print_report(out: &mut impl std::io::Write, report: &ScoreReport) -> anyhow::Result<()> {
    if !report.is_evaluated() {
        writeln!(out, "SEO score unavailable (all metrics zero)")?;
    }
    for (label, value) in report.score.metrics() {
        writeln!(out, "{label}: {value}/100")?;
    }
    Ok(())
}

pub fn read_outline(path: &str) -> anyhow::Result<ArticleStructure> {
    let yaml = std::fs::read_to_string(path).with_context(|| format!("read outline: {path}"))?;
    serde_yaml::from_str(&yaml).with_context(|| format!("parse outline: {path}"))
}

fn write_output(path: &Path, contents: &str, force: bool) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("open output: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write output: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush output: {}", path.display()))?;
    Ok(())
}

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Guided SEO blog article generator")]
pub struct Cli {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Log output format (stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive four-step wizard: keyword, title, outline, edit and save.
    Wizard(WizardArgs),
    /// Print title candidates and related keywords for a keyword.
    Titles(TitlesArgs),
    /// Generate an outline and write it as editable YAML.
    Outline(OutlineArgs),
    /// Run the whole pipeline without prompting and save the article.
    Generate(GenerateArgs),
    /// Score an existing article.
    Score(ScoreArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LlmEngine {
    Anthropic,
    Openai,
    /// Offline canned responses; needs no API key.
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Text-generation provider.
    #[arg(long, value_enum, default_value_t = LlmEngine::Anthropic, global = true)]
    pub engine: LlmEngine,

    /// API base URL (default: the provider's public endpoint, or
    /// `BLOGSMITH_BASE_URL`).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Model identifier (default: the provider's default, or `BLOGSMITH_MODEL`).
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Per-request timeout.
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Language the article is written in.
    #[arg(long, default_value = "English", global = true)]
    pub language: String,
}

#[derive(Debug, Args)]
pub struct WizardArgs {
    /// Directory the saved article is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

#[derive(Debug, Args)]
pub struct TitlesArgs {
    /// Main keyword.
    #[arg(long)]
    pub keyword: String,
}

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Main keyword.
    #[arg(long)]
    pub keyword: String,

    /// Article title.
    #[arg(long)]
    pub title: String,

    /// Output file path for the outline YAML.
    #[arg(long)]
    pub out: String,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Main keyword.
    #[arg(long)]
    pub keyword: String,

    /// Which title candidate to use (1-based).
    #[arg(long, default_value_t = 1)]
    pub title_index: usize,

    /// Use this outline YAML (created by `outline`) instead of generating one.
    #[arg(long)]
    pub outline: Option<String>,

    /// Directory the article is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Main keyword.
    #[arg(long)]
    pub keyword: String,

    /// Markdown article to score.
    #[arg(long)]
    pub input: String,
}

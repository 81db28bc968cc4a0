use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = blogsmith::cli::Cli::parse();
    blogsmith::logging::init(cli.log_format).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let config = blogsmith::config::GeneratorConfig::from_args(&cli.engine)
        .context("load generator config")?;

    match cli.command {
        blogsmith::cli::Command::Wizard(args) => {
            let controller = blogsmith::pipeline::PipelineController::new(
                config.client()?,
                config.prompts(),
            );
            let mut wizard = blogsmith::wizard::Wizard::new(
                controller,
                blogsmith::export::FileSink::new(&args.out_dir),
                std::io::stdin().lock(),
                std::io::stdout().lock(),
            );
            wizard.run().await.context("wizard")?;
        }
        blogsmith::cli::Command::Titles(args) => {
            blogsmith::commands::titles(&config, args)
                .await
                .context("titles")?;
        }
        blogsmith::cli::Command::Outline(args) => {
            blogsmith::commands::outline(&config, args)
                .await
                .context("outline")?;
        }
        blogsmith::cli::Command::Generate(args) => {
            blogsmith::commands::generate(&config, args)
                .await
                .context("generate")?;
        }
        blogsmith::cli::Command::Score(args) => {
            blogsmith::commands::score(&config, args)
                .await
                .context("score")?;
        }
    }

    Ok(())
}

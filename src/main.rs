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
    og_preview::logging::init().context("init logging")?;

    let cli = og_preview::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        og_preview::cli::Command::Encoding(args) => {
            og_preview::encoding::run(args).context("encoding")?;
        }
        og_preview::cli::Command::Extract(args) => {
            og_preview::extract::run(args).context("extract")?;
        }
        og_preview::cli::Command::Summarize(args) => {
            og_preview::summarize::run(args).context("summarize")?;
        }
        og_preview::cli::Command::Preview(args) => {
            og_preview::fetch::run(args).await.context("preview")?;
        }
    }

    Ok(())
}

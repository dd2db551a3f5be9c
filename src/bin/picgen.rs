//! CLI for picgen - prompt-to-image generation.

use clap::{Args, Parser, Subcommand};
use picgen::bot::{BotConfig, SignalBot};
use picgen::image::DEFAULT_MODEL;
use picgen::{
    Cardinality, Credential, Destination, ImagenProvider, PicGenError, PromptSource, RunConfig,
    Runner,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picgen")]
#[command(about = "Generate a picture from a text prompt with Google Imagen")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Imagen model identifier
    #[arg(long, global = true, env = "PICGEN_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Override the API root (for proxies and local testing)
    #[arg(long, global = true, env = "PICGEN_API_BASE")]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one picture and write its raw bytes
    Generate(GenerateArgs),

    /// Answer `/pic <prompt>` in Signal groups via signal-cli
    Bot(BotArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Prompt text; the built-in prompt is used when omitted
    prompt: Option<String>,

    /// Destination: `-` for stdout, otherwise a file path (e.g. picture.png)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Fail unless the service returns exactly one image
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct BotArgs {
    /// Signal account the bot runs as
    account: String,

    /// Group ids allowed to request pictures
    group_ids: Vec<String>,

    /// Path to the signal-cli executable
    #[arg(long, default_value = "signal-cli")]
    signal_cli: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Stdout may carry image bytes, so logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("picgen=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = |cardinality| RunConfig {
        model: cli.model.clone(),
        cardinality,
    };
    let api_base = cli.api_base.clone();
    let connect = move |credential: Credential| {
        let mut builder = ImagenProvider::builder().credential(credential);
        if let Some(url) = api_base {
            builder = builder.base_url(url);
        }
        builder.build()
    };

    match cli.command {
        Commands::Generate(args) => {
            let cardinality = if args.strict {
                Cardinality::ExactlyOne
            } else {
                Cardinality::FirstOnly
            };
            let runner = Runner::connect(Credential::from_env(), config(cardinality), connect)?;
            let prompt = PromptSource::from_arg(args.prompt);
            let destination = Destination::parse(&args.output);

            let report = runner.run(prompt.prompt(), &destination).await?;
            tracing::info!(
                destination = %destination,
                images = report.images_received,
                bytes = report.bytes_written,
                "done"
            );
        }
        Commands::Bot(args) => {
            if args.group_ids.is_empty() {
                tracing::warn!("no group ids given, every picture request will be ignored");
            }
            let runner = Runner::connect(
                Credential::from_env(),
                config(Cardinality::FirstOnly),
                connect,
            )?;
            let bot_config = BotConfig {
                account: args.account,
                group_ids: args.group_ids,
                signal_cli: args.signal_cli,
            };
            SignalBot::new(runner, bot_config).run().await?;
        }
    }

    Ok(())
}

/// Prints a one-line diagnostic and picks the exit code for `err`.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<PicGenError>() {
        Some(e) => {
            eprintln!("picgen: {}: {}", e.kind(), e);
            ExitCode::from(e.kind().exit_code())
        }
        None => {
            eprintln!("picgen: {err:#}");
            ExitCode::FAILURE
        }
    }
}

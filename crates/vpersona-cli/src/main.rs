use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vpersona_core::settings::{ImageBackend, ImageStyle};

use crate::commands::settings::parse_identifier;

mod bootstrap;
mod commands;

#[derive(Parser)]
#[command(name = "vpersona")]
#[command(about = "vpersona - generate virtual persons for a website project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new virtual persons for a project
    Generate {
        /// Project website; its hostname is the project name used in prompts
        #[arg(long)]
        website: String,
        #[arg(long)]
        project_id: String,
        #[arg(long)]
        owner_id: String,
        /// Minimum number of persons (inclusive); defaults to `[generation].min`
        #[arg(long)]
        min: Option<usize>,
        /// Maximum number of persons (exclusive); defaults to `[generation].max`
        #[arg(long)]
        max: Option<usize>,
        /// Path to config.toml (defaults to ~/.config/vpersona/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Edit the `[headshot]` settings and print the resulting change event
    Settings {
        /// Image backend (`dall_e3`, `dall_e2`)
        #[arg(long, value_parser = parse_identifier::<ImageBackend>)]
        backend: Option<ImageBackend>,
        #[arg(long)]
        aspect_ratio: Option<String>,
        /// Image style, repeatable (`vivid`, `natural`, `photographic`, `cinematic`, `studio`)
        #[arg(long = "style", value_parser = parse_identifier::<ImageStyle>)]
        styles: Vec<ImageStyle>,
        #[arg(long, conflicts_with = "clear_heading")]
        heading: Option<String>,
        #[arg(long)]
        clear_heading: bool,
        #[arg(long)]
        repeat: Option<bool>,
        /// Custom headshot prompt; `{name}` is replaced by the person's name
        #[arg(long, conflicts_with = "generated_prompt")]
        prompt: Option<String>,
        /// Go back to the built-in headshot prompt
        #[arg(long)]
        generated_prompt: bool,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the lookup key of a display name
    Encode { name: String },
    /// Print the display name behind a lookup key
    Decode { key: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            website,
            project_id,
            owner_id,
            min,
            max,
            config,
        } => {
            commands::generate::run(commands::generate::GenerateArgs {
                website,
                project_id,
                owner_id,
                min,
                max,
                config,
            })
            .await?
        }
        Commands::Settings {
            backend,
            aspect_ratio,
            styles,
            heading,
            clear_heading,
            repeat,
            prompt,
            generated_prompt,
            config,
        } => commands::settings::run(commands::settings::SettingsArgs {
            backend,
            aspect_ratio,
            styles,
            heading,
            clear_heading,
            repeat,
            prompt,
            generated_prompt,
            config,
        })?,
        Commands::Encode { name } => println!("{}", commands::naming::encode(&name)),
        Commands::Decode { key } => println!("{}", commands::naming::decode(&key)?),
    }

    Ok(())
}

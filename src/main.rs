use clap::{Parser, Subcommand};
use shufflepic::{config, resolver, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "shufflepic")]
#[command(about = "Serve a random image from a directory tree over HTTP")]
#[command(long_about = "\
Serve a random image from a directory tree over HTTP

Your filesystem is the data source. Point --root at any directory and every
visit to / redirects to a fresh page showing one image picked uniformly at
random from the tree (jpg, jpeg, png, gif, webp, bmp — matched
case-insensitively, any nesting depth).

Routes:

  /                    redirect to a fresh /view/ URL
  /view/<slug>         page with a random image and a 'New image' button
  /image/<filename>    the image bytes (anti-cache headers, traversal-safe)
  /settings            per-browser display settings (localStorage)
  /health              JSON liveness probe

The image tree is re-scanned on every pick, so files added or removed take
effect immediately without a restart.

Run 'shufflepic gen-config' to generate a documented shufflepic.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "shufflepic.toml", global = true)]
    config: PathBuf,

    /// Image root directory (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Enumerate the image root and report what would be served
    Check,
    /// Print a stock shufflepic.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = config::load_config(&cli.config)?;
    if let Some(root) = cli.root {
        config.image_root = root;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    config.validate()?;

    match cli.command {
        Command::Serve => {
            server::run(config).await?;
        }
        Command::Check => {
            println!("==> Checking {}", config.image_root.display());
            let candidates = resolver::enumerate_images(&config.image_root)?;
            if candidates.is_empty() {
                println!("==> No servable images found");
            } else {
                println!("==> {} servable images", candidates.len());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

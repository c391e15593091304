//! Binary entrypoint for the gamehall CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml`
//! - `validate <game>` - dry-run a resource load and report what it finds
//! - `open <game>` - open an instance, print its binding, then tear it down
//! - `list [--json]` - list the registered game types
//! - `status` - show config summary and the recovered instance id counter
//!
//! See the library crate docs for module-level details: `gamehall::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use gamehall::config::Config;
use gamehall::game::registry::GameRegistry;
use gamehall::game::resource::GameResource;

#[derive(Parser)]
#[command(name = "gamehall")]
#[command(about = "Game-instance and resource registry core for minigame servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new gamehall configuration
    Init,
    /// Dry-run the resource load for a game type
    Validate {
        /// Game type name as registered under [games]
        game: String,
    },
    /// Open one instance of a game type and print its binding
    Open {
        /// Game type name as registered under [games]
        game: String,
    },
    /// List registered game types
    List {
        /// Emit machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show configuration summary and the recovered id counter
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            if tokio::fs::metadata(&cli.config).await.is_ok() {
                return Err(anyhow!("{} already exists; refusing to overwrite", cli.config));
            }
            Config::create_default(&cli.config).await?;
            println!("Wrote {}", cli.config);
            println!("Register game types under [games.<name>] and re-run.");
        }
        Commands::Validate { game } => {
            let config = require_config(pre_config, &cli.config)?;
            let resource = GameResource::load(&config, &game).await?;
            println!("Game type '{}' is loadable:", game);
            println!("  lobby map:  {}", resource.maps.lobby().id);
            println!(
                "  maps:       {} ({} playable)",
                resource.maps.len(),
                resource.maps.iter().filter(|m| !m.lobby).count()
            );
            println!("  scripts:    {}", resource.scripts.len());
            println!("  tags:       {}", resource.tags.iter().count());
            println!("  snapshots:  {} pending restoration", resource.restore.len());
        }
        Commands::Open { game } => {
            let config = require_config(pre_config, &cli.config)?;
            let mut registry = GameRegistry::new(config).await?;
            let instance = registry.open_new(&game).await?;
            let id = instance.id;
            println!("Opened game #{} of type '{}'", id, game);
            println!("  working dir: {}", registry.instance_dir_name(id));
            if let Some(instance) = registry.get_by_id(id) {
                println!("  active map:  {}", instance.active_map().id);
                println!("  joinable:    {}", instance.can_join());
            }
            // This process owns no long-running host; tear the instance
            // down before exiting so its restoration data is flushed.
            registry.shutdown()?;
            info!("Instance #{} closed", id);
        }
        Commands::List { json } => {
            let config = require_config(pre_config, &cli.config)?;
            let mut names: Vec<&String> = config.games.keys().collect();
            names.sort();
            if json {
                let listing: Vec<serde_json::Value> = names
                    .iter()
                    .map(|name| {
                        serde_json::json!({
                            "name": name,
                            "layout": config.games[*name].layout.clone(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else if names.is_empty() {
                println!("No game types registered in {}", cli.config);
            } else {
                for name in names {
                    println!("{:<20} {}", name, config.games[name].layout);
                }
            }
        }
        Commands::Status => {
            let config = require_config(pre_config, &cli.config)?;
            let registry = GameRegistry::new(config.clone()).await?;
            println!("gamehall v{}", env!("CARGO_PKG_VERSION"));
            println!("  config:      {}", cli.config);
            println!("  data dir:    {}", config.data_dir);
            println!("  worlds dir:  {}", config.worlds.directory);
            println!("  game types:  {}", config.games.len());
            println!("  live games:  {}", registry.len());
            println!(
                "  next id:     {} (recovered from '{}_*' directories)",
                registry.next_id(),
                config.worlds.directory_label
            );
        }
    }

    Ok(())
}

fn require_config(config: Option<Config>, path: &str) -> Result<Config> {
    config.ok_or_else(|| anyhow!("could not load {}; run 'gamehall init' first", path))
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file.and_then(|f| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(f)
            .ok()
    }) {
        let sink = std::sync::Arc::new(std::sync::Mutex::new(file));
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = sink.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            writeln!(fmt, "{}", line)
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}

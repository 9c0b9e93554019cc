use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use term_snake::game::GameConfig;
use term_snake::modes::HumanMode;
use term_snake::score::BestScoreStore;

#[derive(Parser)]
#[command(name = "term_snake")]
#[command(version, about = "Grid snake for the terminal")]
struct Cli {
    /// Game mode (currently only 'human' is implemented)
    #[arg(long, default_value = "human")]
    mode: Mode,

    /// Grid width
    #[arg(long, default_value = "10")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "10")]
    height: usize,

    /// Starting tick interval in milliseconds
    #[arg(long, default_value = "500")]
    tick_ms: u64,

    /// Number of apples kept on the board
    #[arg(long, default_value = "2")]
    apples: usize,

    /// Where the best score is stored
    #[arg(long, default_value = "snake_scores.json")]
    score_file: PathBuf,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play snake with keyboard controls
    Human,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Create game configuration from CLI arguments
    let mut config = GameConfig::new(cli.width, cli.height);
    config.tick_interval_ms = cli.tick_ms;
    config.initial_apple_count = cli.apples;
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    let score_store = BestScoreStore::load(cli.score_file)?;

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Human => {
            let mut human_mode = HumanMode::new(config, score_store);
            human_mode.run().await?;
        }
    }

    Ok(())
}

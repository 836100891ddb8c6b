use clap::Parser;
use piebot_datagen::selfplay::{config::DatagenConfig, generate};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "piebot-datagen",
    about = "Generate self-play training positions",
    after_help = "Options are `key value` tokens in any order, e.g.\n  piebot-datagen nodes 8000 games 400 book book_moves.txt out core1.binpack"
)]
struct Args {
    /// Fixed RNG seed (overrides a `seed` token)
    #[arg(long)]
    seed: Option<u64>,
    /// Output file (overrides an `out` token)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
    /// Write the run summary as JSON to this path
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Option tokens: nodes, games, out, book, seed, flush, format, epsilon, gap, opening, progress
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    options: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let a = Args::parse();
    let mut config = DatagenConfig::from_options(&a.options.join(" "));
    if a.seed.is_some() { config.seed = a.seed; }
    if let Some(out) = a.out { config.out = out; }
    if a.quiet { config.progress = false; }
    log::info!("config {}", serde_json::to_string(&config)?);

    let summary = generate(&config)?;
    if let Some(path) = a.summary {
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        log::info!("summary written to {}", path.display());
    }
    Ok(())
}

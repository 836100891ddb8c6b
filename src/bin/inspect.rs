use clap::Parser;
use piebot_datagen::selfplay::codec::{self, RecordFormat};
use piebot_datagen::selfplay::writer::read_records;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "piebot-inspect", about = "Summarise a self-play corpus file")]
struct Args {
    file: PathBuf,
    #[arg(long, default_value = "packed")]
    format: RecordFormat,
    /// Print the first N records
    #[arg(long, default_value_t = 0)]
    show: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let a = Args::parse();
    let recs = read_records(&a.file, a.format)?;
    let mut results = [0usize; 3];
    for r in &recs { results[(r.result.clamp(-1, 1) + 1) as usize] += 1; }
    println!("{}: {} records ({} bytes each)", a.file.display(), recs.len(), a.format.record_size());
    println!("white wins {} | draws {} | black wins {}", results[2], results[1], results[0]);

    for (i, r) in recs.iter().take(a.show).enumerate() {
        let side = if r.side == 0 { 'w' } else { 'b' };
        let board = match a.format {
            RecordFormat::Packed => codec::placement(&codec::decode(&r.board, r.side).0),
            RecordFormat::Hash => format!("{:016x}", r.key),
        };
        println!("{i:>6} {board} {side} score {:>6} move {:#06x} result {:>2}", r.score, r.mv, r.result);
    }
    Ok(())
}

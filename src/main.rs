mod cli;
mod fasta;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use spliced_rs::{AlignConfig, AlignParams, DinucleotideModel};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            if args.quiet {
                EnvFilter::new("warn")
            } else {
                EnvFilter::new("info")
            }
        });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = if args.strict {
        AlignConfig::strict()
    } else {
        AlignConfig::relaxed()
    };
    config.cutout.mode = args.cutout.into();
    config.rescue.enabled = !args.no_rescue;

    let model = DinucleotideModel::default();
    let params = AlignParams::new(&config, &model);

    let genomic = fasta::load_records(&args.genomic)?;
    let references = fasta::load_records(&args.reference)?;

    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(sink);
    let stats = pipeline::run(&args, &params, &genomic, &references, &mut writer)?;
    writer.flush()?;

    tracing::info!(
        genomic = genomic.len(),
        references = references.len(),
        pairs = stats.pairs,
        reported = stats.reported,
        filtered = stats.filtered,
        failed = stats.failed,
        "spliced-rs: processing complete"
    );
    Ok(())
}

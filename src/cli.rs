use clap::{Parser, ValueEnum};
use spliced_rs::CutoutMode;
use spliced_rs::Strand;
use std::ops::Range;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spliced-rs",
    about = "Spliced alignment of genomic sequences against cDNA or protein references",
    version
)]
pub struct Args {
    /// Genomic sequences (FASTA)
    pub genomic: PathBuf,

    /// Reference cDNA/EST or protein sequences (FASTA)
    pub reference: PathBuf,

    /// Output path (default: stdout)
    #[arg(short = 'o', long = "out", value_name = "TSV")]
    pub out: Option<PathBuf>,

    /// References are protein sequences
    #[arg(long)]
    pub protein: bool,

    /// Genomic strand(s) to align against
    #[arg(long, value_enum, default_value_t = StrandArg::Both)]
    pub strand: StrandArg,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: u8,

    /// Genomic region to search, 1-based inclusive, in every genomic
    /// sequence (repeatable). Default: the whole sequence
    #[arg(short = 'r', long = "range", value_name = "START-END", value_parser = parse_range)]
    pub ranges: Vec<Range<usize>>,

    /// When to excise the gaps between --range regions from the DP matrix.
    /// With a single region there is nothing to excise
    #[arg(long, value_enum, default_value_t = CutoutArg::Auto)]
    pub cutout: CutoutArg,

    /// Disable small-exon rescue at the reference ends
    #[arg(long)]
    pub no_rescue: bool,

    /// Trim short terminal exons
    #[arg(long)]
    pub strict: bool,

    /// Do not report alignments below this coverage
    #[arg(long, default_value_t = 0.0, value_name = "F")]
    pub min_coverage: f64,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrandArg {
    Forward,
    Reverse,
    Both,
}

impl StrandArg {
    pub fn strands(self) -> &'static [Strand] {
        match self {
            StrandArg::Forward => &[Strand::Forward],
            StrandArg::Reverse => &[Strand::Reverse],
            StrandArg::Both => &[Strand::Forward, Strand::Reverse],
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutoutArg {
    Disabled,
    Always,
    Auto,
}

impl From<CutoutArg> for CutoutMode {
    fn from(arg: CutoutArg) -> Self {
        match arg {
            CutoutArg::Disabled => CutoutMode::Disabled,
            CutoutArg::Always => CutoutMode::Always,
            CutoutArg::Auto => CutoutMode::Auto,
        }
    }
}

/// Parses `START-END` (1-based, inclusive) into a 0-based half-open range.
pub fn parse_range(s: &str) -> Result<Range<usize>, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{s}'"))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid start '{start}': {e}"))?;
    let end: usize = end.trim().parse().map_err(|e| format!("invalid end '{end}': {e}"))?;
    if start == 0 || start > end {
        return Err(format!("range {start}-{end} must satisfy 1 <= START <= END"));
    }
    Ok(start - 1..end)
}

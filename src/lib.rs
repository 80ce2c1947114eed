//! spliced-rs: spliced alignment of genomic DNA against cDNA/EST or protein
//! references.
//!
//! The aligner finds the exon/intron structure that best explains a
//! reference sequence as a concatenation of exons taken from a genomic
//! region, scoring introns with donor/acceptor splice-site probabilities.
//!
//! # Library usage
//!
//! ```no_run
//! use spliced_rs::{AlignConfig, AlignParams, AlignmentMode, DinucleotideModel, align};
//!
//! let config = AlignConfig::strict();
//! let model = DinucleotideModel::default();
//! let params = AlignParams::new(&config, &model);
//!
//! let genomic = std::fs::read("locus.txt").unwrap_or_default();
//! let protein = b"MKTAYIAKQRQISFVKSHFSRQ";
//! let result = align(&[0..genomic.len()], &genomic, protein, AlignmentMode::Protein, &params)?;
//! println!("{} exons, score {:.3}", result.exon_count(), result.score());
//! # Ok::<(), spliced_rs::AlignError>(())
//! ```

// Internal modules.
pub(crate) mod backtrace;
pub(crate) mod dp;
pub(crate) mod rescue;

// Public modules.
pub mod alphabet;
pub mod config;
pub mod cutoffs;
pub mod cutout;
pub mod editop;
pub mod error;
pub mod params;
pub mod path;
pub mod polya;
pub mod result;
pub mod scorer;
pub mod types;

mod api;

// Flat re-exports for the most commonly used public types.
pub use alphabet::GeneticCode;
pub use api::{AlignParams, PreparedGenomic, align, align_prepared, align_strand};
pub use config::{AlignConfig, CutoffPolicy, CutoutMode};
pub use editop::EditOp;
pub use error::{AlignError, Result};
pub use params::{Blosum62, DinucleotideModel, DpParameters, SpliceSiteModel, SubstitutionMatrix};
pub use path::BacktracePath;
pub use polya::PolyATail;
pub use result::AlignmentResult;
pub use scorer::{CoverageSide, ExonRecord, IntronRecord};
pub use types::{AlignmentMode, Strand};

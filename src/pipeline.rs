use crate::cli::Args;
use crate::fasta::FastaRecord;
use anyhow::Result;
use crossfire::mpmc;
use spliced_rs::{
    AlignError, AlignParams, AlignmentMode, AlignmentResult, CoverageSide, PreparedGenomic, Strand, align_prepared,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::ops::Range;
use std::thread;

#[derive(Debug, Default)]
pub struct Stats {
    pub pairs: u64,
    pub reported: u64,
    pub filtered: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy)]
struct Job {
    genomic: usize,
    reference: usize,
    strand: Strand,
}

struct WorkItem {
    idx: usize,
    job: Job,
}

struct ResultItem {
    idx: usize,
    result: Result<Outcome>,
}

#[derive(Debug)]
enum Outcome {
    Reported(String),
    Filtered,
    Failed,
}

struct Context<'a> {
    genomic: &'a [FastaRecord],
    prepared: &'a [PreparedGenomic],
    ranges: &'a [Range<usize>],
    references: &'a [FastaRecord],
    mode: AlignmentMode,
    params: &'a AlignParams<'a>,
    min_coverage: f64,
}

pub fn run(
    args: &Args,
    params: &AlignParams<'_>,
    genomic: &[FastaRecord],
    references: &[FastaRecord],
    writer: &mut dyn Write,
) -> Result<Stats> {
    let prepared: Vec<PreparedGenomic> = genomic.iter().map(|r| PreparedGenomic::new(&r.seq)).collect();
    let ctx = Context {
        genomic,
        prepared: &prepared,
        ranges: &args.ranges,
        references,
        mode: if args.protein {
            AlignmentMode::Protein
        } else {
            AlignmentMode::Nucleotide
        },
        params,
        min_coverage: args.min_coverage,
    };
    let jobs: Vec<Job> = references
        .iter()
        .enumerate()
        .flat_map(|(reference, _)| {
            (0..genomic.len()).flat_map(move |g| {
                args.strand.strands().iter().map(move |&strand| Job {
                    genomic: g,
                    reference,
                    strand,
                })
            })
        })
        .collect();

    writeln!(
        writer,
        "#alignment\treference\tgenomic\tstrand\tmode\tgenomic_start\tgenomic_end\tscore\tcoverage\tcoverage_side\tpath"
    )?;

    let mut stats = Stats::default();

    if args.threads > 1 {
        crossfire::detect_backoff_cfg();
        let worker_count = args.threads as usize;
        let cap = worker_count.saturating_mul(4).max(8);
        let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
        let (tx_res, rx_res) = mpmc::unbounded_blocking::<ResultItem>();

        let ctx_ref = &ctx;
        thread::scope(|scope| -> Result<()> {
            let tx_work = tx_work;
            for _ in 0..worker_count {
                let rx_work = rx_work.clone();
                let tx_res = tx_res.clone();
                scope.spawn(move || {
                    while let Ok(item) = rx_work.recv() {
                        let result = process_job(ctx_ref, item.job);
                        let _ = tx_res.send(ResultItem { idx: item.idx, result });
                    }
                });
            }
            drop(tx_res);

            for (idx, &job) in jobs.iter().enumerate() {
                tx_work.send(WorkItem { idx, job })?;
            }
            drop(tx_work);

            let total = jobs.len();
            let mut pending: BTreeMap<usize, Result<Outcome>> = BTreeMap::new();
            let mut next_idx = 0usize;

            while next_idx < total {
                let res = rx_res
                    .recv()
                    .map_err(|_| anyhow::anyhow!("worker result channel closed"))?;
                pending.insert(res.idx, res.result);
                while let Some(result) = pending.remove(&next_idx) {
                    record(&mut stats, writer, result?)?;
                    next_idx += 1;
                }
            }

            Ok(())
        })?;

        return Ok(stats);
    }

    for job in jobs {
        let outcome = process_job(&ctx, job)?;
        record(&mut stats, writer, outcome)?;
    }
    Ok(stats)
}

fn record(stats: &mut Stats, writer: &mut dyn Write, outcome: Outcome) -> Result<()> {
    stats.pairs += 1;
    match outcome {
        Outcome::Reported(text) => {
            stats.reported += 1;
            writer.write_all(text.as_bytes())?;
        }
        Outcome::Filtered => stats.filtered += 1,
        Outcome::Failed => stats.failed += 1,
    }
    Ok(())
}

fn process_job(ctx: &Context<'_>, job: Job) -> Result<Outcome> {
    let genomic = &ctx.genomic[job.genomic];
    let prepared = &ctx.prepared[job.genomic];
    let reference = &ctx.references[job.reference];
    let whole = [0..prepared.len()];
    let ranges = if ctx.ranges.is_empty() { &whole[..] } else { ctx.ranges };
    match align_prepared(ranges, prepared, &reference.seq, ctx.mode, job.strand, ctx.params) {
        Ok(result) => {
            if result.is_empty() || result.coverage() < ctx.min_coverage {
                tracing::debug!(
                    reference = %reference.name,
                    genomic = %genomic.name,
                    strand = %job.strand,
                    exons = result.exon_count(),
                    coverage = result.coverage(),
                    "alignment not reported"
                );
                return Ok(Outcome::Filtered);
            }
            Ok(Outcome::Reported(format_result(&reference.name, &genomic.name, &result)?))
        }
        Err(e) if e.is_recoverable() => {
            tracing::warn!(
                reference = %reference.name,
                genomic = %genomic.name,
                strand = %job.strand,
                error = %e,
                "alignment skipped"
            );
            Ok(Outcome::Failed)
        }
        Err(e @ AlignError::InvalidInput(_)) => {
            tracing::warn!(
                reference = %reference.name,
                genomic = %genomic.name,
                error = %e,
                "invalid input, skipped"
            );
            Ok(Outcome::Failed)
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "aligning {} against {} ({} strand)",
            reference.name, genomic.name, job.strand
        ))),
    }
}

/// 1-based inclusive forward-strand span of aligned-strand positions
/// `left..=right`.
fn forward_span(result: &AlignmentResult, left: usize, right: usize) -> (usize, usize) {
    let a = result.forward_position(left);
    let b = result.forward_position(right);
    (a.min(b) + 1, a.max(b) + 1)
}

pub(crate) fn format_result(reference: &str, genomic: &str, result: &AlignmentResult) -> Result<String> {
    let mut out = String::new();
    let path = result.path();
    let (start, end) = forward_span(result, path.gen_dp_start(), path.gen_dp_end() - 1);
    let mode = match result.mode() {
        AlignmentMode::Nucleotide => "cdna",
        AlignmentMode::Protein => "protein",
    };
    let side = match result.coverage_side() {
        CoverageSide::Genomic => 'G',
        CoverageSide::Reference => 'R',
    };
    writeln!(
        out,
        "alignment\t{reference}\t{genomic}\t{}\t{mode}\t{start}\t{end}\t{:.4}\t{:.4}\t{side}\t{path}",
        result.strand(),
        result.score(),
        result.coverage(),
    )?;
    for (i, exon) in result.exons().iter().enumerate() {
        let (left, right) = forward_span(result, exon.left_genomic, exon.right_genomic);
        writeln!(
            out,
            "exon\t{}\t{left}\t{right}\t{}\t{}\t{:.4}",
            i + 1,
            exon.left_reference + 1,
            exon.right_reference + 1,
            exon.score
        )?;
    }
    for (i, intron) in result.introns().iter().enumerate() {
        let (left, right) = forward_span(result, intron.left_genomic, intron.right_genomic);
        writeln!(
            out,
            "intron\t{}\t{left}\t{right}\t{:.3e}\t{:.3e}\t{:.4}\t{:.4}",
            i + 1,
            intron.donor_probability,
            intron.acceptor_probability,
            intron.donor_site_score,
            intron.acceptor_site_score
        )?;
    }
    if let Some(tail) = result.poly_a() {
        writeln!(
            out,
            "polya\t{}\t{}\t{}",
            tail.start + 1,
            tail.end + 1,
            tail.base as char
        )?;
    }
    Ok(out)
}

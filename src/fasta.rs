use anyhow::Result;
use needletail::parse_fastx_file;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

/// Reads all records of a FASTA (or FASTQ) file in file order. Names stop at
/// the first whitespace.
pub fn load_records(path: &Path) -> Result<Vec<FastaRecord>> {
    let mut reader = parse_fastx_file(path)
        .map_err(|e| anyhow::anyhow!("failed to open FASTA {}: {}", path.display(), e))?;
    let mut records = Vec::new();

    while let Some(result) = reader.next() {
        let record = result
            .map_err(|e| anyhow::anyhow!("failed to parse FASTA record in {}: {}", path.display(), e))?;
        let id = String::from_utf8_lossy(record.id());
        let name = id.split_whitespace().next().unwrap_or("").to_string();
        records.push(FastaRecord {
            name,
            seq: record.seq().to_vec(),
        });
    }

    tracing::debug!(path = %path.display(), records = records.len(), "loaded FASTA");
    Ok(records)
}

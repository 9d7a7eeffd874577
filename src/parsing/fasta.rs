//! FASTA reading using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.faa`, `.fna` (uncompressed)
//! - any of the above followed by `.gz` or `.bgz` (compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::model::store::Model;
use crate::parsing::ParseError;
use crate::utils::validation::check_sequence_limit;

/// A FASTA record as (name, sites)
pub type FastaRecord = (String, String);

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let stem = path_str
        .strip_suffix(".gz")
        .or_else(|| path_str.strip_suffix(".bgz"))
        .unwrap_or(&path_str);

    matches!(
        Path::new(stem)
            .extension()
            .and_then(OsStr::to_str),
        Some("fa" | "fasta" | "faa" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read every record of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidFormat` if no records are found, or
/// `ParseError::TooManySequences` if the limit is exceeded.
pub fn read_fasta_file(path: &Path) -> Result<Vec<FastaRecord>, ParseError> {
    let file = std::fs::File::open(path)?;

    if is_gzipped(path) {
        let reader = BufReader::new(GzDecoder::new(file));
        read_fasta_reader(&mut fasta::io::Reader::new(reader))
    } else {
        let reader = BufReader::new(file);
        read_fasta_reader(&mut fasta::io::Reader::new(reader))
    }
}

/// Read every record of FASTA text, such as a stored alignment.
///
/// # Errors
///
/// As [`read_fasta_file`], without I/O errors.
pub fn read_fasta_text(text: &str) -> Result<Vec<FastaRecord>, ParseError> {
    read_fasta_reader(&mut fasta::io::Reader::new(text.as_bytes()))
}

fn read_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<FastaRecord>, ParseError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_sequence_limit(records.len()).is_some() {
            return Err(ParseError::TooManySequences(records.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sites = String::from_utf8_lossy(record.sequence().as_ref()).to_string();
        records.push((name, sites));
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA".to_string(),
        ));
    }

    Ok(records)
}

/// Add FASTA records to a model, creating sequences as needed and loading
/// their sites. Returns the number of records imported. Either every record
/// is imported or the model is unchanged.
///
/// # Errors
///
/// Returns `ParseError::Model` if a sequence cannot be added or its sites
/// are shorter than ranges already referencing it.
pub fn import_fasta(model: &mut Model, records: &[FastaRecord]) -> Result<usize, ParseError> {
    let mut staged = model.clone();
    for (name, sites) in records {
        let id = staged.find_or_add_sequence(name)?;
        staged.set_site_array(id, sites)?;
        debug!("Loaded {} sites for {name}", sites.len());
    }

    *model = staged;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("genes.fa")));
        assert!(is_fasta_file(Path::new("genes.faa")));
        assert!(is_fasta_file(Path::new("genes.fasta.gz")));
        assert!(is_fasta_file(Path::new("/path/to/Genes.FNA.bgz")));

        assert!(!is_fasta_file(Path::new("edges.tsv")));
        assert!(!is_fasta_file(Path::new("tree.nwk")));
        assert!(!is_fasta_file(Path::new("genes.gz")));
    }

    #[test]
    fn test_read_fasta_text() {
        let records = read_fasta_text(">A some description\nMKV\nLLA\n>B\nMK--V\n").unwrap();
        assert_eq!(
            records,
            vec![
                ("A".to_string(), "MKVLLA".to_string()),
                ("B".to_string(), "MK--V".to_string()),
            ]
        );
    }

    #[test]
    fn test_read_empty_fasta() {
        assert!(matches!(
            read_fasta_text(""),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_read_gzipped_file() {
        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">A\nACGT\n").unwrap();
        temp.write_all(&encoder.finish().unwrap()).unwrap();
        temp.flush().unwrap();

        let records = read_fasta_file(temp.path()).unwrap();
        assert_eq!(records, vec![("A".to_string(), "ACGT".to_string())]);
    }

    #[test]
    fn test_import_fasta_loads_sites() {
        let mut model = Model::new();
        let existing = model.add_sequence("B").unwrap();
        model.make_subsequence(existing, 1, 4).unwrap();

        let records = read_fasta_text(">A\nMKVL\n>B\nMKVLAA\n").unwrap();
        assert_eq!(import_fasta(&mut model, &records).unwrap(), 2);

        assert_eq!(model.sequences.len(), 2);
        let b = model.sequences.get(existing).unwrap();
        assert_eq!(b.length, 6);
        assert_eq!(b.site_array(), Some("MKVLAA"));
    }

    #[test]
    fn test_import_fasta_rejects_short_sites() {
        let mut model = Model::new();
        let id = model.add_sequence("A").unwrap();
        model.make_subsequence(id, 1, 10).unwrap();

        let records = read_fasta_text(">A\nMKV\n").unwrap();
        assert!(matches!(
            import_fasta(&mut model, &records),
            Err(ParseError::Model(_))
        ));
    }

    #[test]
    fn test_failed_import_leaves_model_unchanged() {
        let mut model = Model::new();
        let z = model.add_sequence("Z").unwrap();
        model.make_subsequence(z, 1, 20).unwrap();

        let records = read_fasta_text(">A\nMK\n>Z\nMK\n").unwrap();
        assert!(matches!(
            import_fasta(&mut model, &records),
            Err(ParseError::Model(_))
        ));

        assert_eq!(model.sequences.len(), 1);
        assert!(model.find_sequence_by_accession("A").is_err());
        let z = model.sequences.get(z).unwrap();
        assert_eq!(z.length, 20);
        assert_eq!(z.site_array(), None);
    }
}

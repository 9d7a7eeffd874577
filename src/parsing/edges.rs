use std::path::Path;

use tracing::debug;

use crate::model::store::Model;
use crate::parsing::ParseError;
use crate::utils::validation::check_edge_limit;

/// One row of an edge table: a similarity between two 1-based inclusive ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub left_accession: String,
    pub left_start: u32,
    pub left_end: u32,
    pub right_accession: String,
    pub right_start: u32,
    pub right_end: u32,
}

/// Parse an edge table file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_edges_file(path: &Path) -> Result<Vec<EdgeRecord>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_edges_text(&content)
}

/// Parse edge table text.
///
/// Lines with at least 12 tab-separated fields are read as BLAST tabular
/// output; lines with exactly 6 fields as a plain table. Self hits are
/// skipped and reverse-strand coordinates are put in ascending order.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has an unexpected number of
/// fields or a bad coordinate, or if no edges are found, or
/// `ParseError::TooManyEdges` if the limit is exceeded.
pub fn parse_edges_text(text: &str) -> Result<Vec<EdgeRecord>, ParseError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let fields: Vec<&str> = if line.contains('\t') {
            line.split('\t').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };

        let [left, left_start, left_end, right, right_start, right_end] = match fields.len() {
            n if n >= 12 => [fields[0], fields[6], fields[7], fields[1], fields[8], fields[9]],
            6 => [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]],
            n => {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {line_num} has {n} fields; expected 6, or at least 12 for BLAST output"
                )))
            }
        };

        if left == right {
            debug!("Skipping self hit for {left} on line {line_num}");
            continue;
        }

        if check_edge_limit(records.len()).is_some() {
            return Err(ParseError::TooManyEdges(records.len()));
        }

        let (left_start, left_end) = parse_range(left_start, left_end, line_num)?;
        let (right_start, right_end) = parse_range(right_start, right_end, line_num)?;

        records.push(EdgeRecord {
            left_accession: left.to_string(),
            left_start,
            left_end,
            right_accession: right.to_string(),
            right_start,
            right_end,
        });
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No edges found in file".to_string(),
        ));
    }

    Ok(records)
}

fn parse_range(start: &str, end: &str, line_num: usize) -> Result<(u32, u32), ParseError> {
    let parse = |value: &str| {
        value.parse::<u32>().ok().filter(|&v| v > 0).ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Invalid position on line {line_num}: '{value}'"
            ))
        })
    };

    let (start, end) = (parse(start)?, parse(end)?);
    Ok((start.min(end), start.max(end)))
}

/// Add edges to a model, creating sequences as needed. Returns the number of
/// edges added. Either every record is imported or the model is unchanged.
///
/// # Errors
///
/// Returns `ParseError::Model` if a sequence cannot be added, a range lies
/// beyond loaded sites, or components already exist.
pub fn import_edges(model: &mut Model, records: &[EdgeRecord]) -> Result<usize, ParseError> {
    let mut staged = model.clone();
    for record in records {
        let left = staged.find_or_add_sequence(&record.left_accession)?;
        let right = staged.find_or_add_sequence(&record.right_accession)?;
        let left = staged.make_subsequence(left, record.left_start, record.left_end)?;
        let right = staged.make_subsequence(right, record.right_start, record.right_end)?;
        staged.add_edge(left, right)?;
    }

    *model = staged;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blast_output() {
        let blast = "\
A\tB\t98.5\t100\t1\t0\t1\t100\t201\t300\t1e-50\t200
A\tA\t100.0\t300\t0\t0\t1\t300\t1\t300\t0.0\t600
C\tB\t75.0\t80\t20\t1\t10\t90\t180\t100\t1e-20\t120
";
        let records = parse_edges_text(blast).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            EdgeRecord {
                left_accession: "A".to_string(),
                left_start: 1,
                left_end: 100,
                right_accession: "B".to_string(),
                right_start: 201,
                right_end: 300,
            }
        );
        // Reverse strand hit
        assert_eq!((records[1].right_start, records[1].right_end), (100, 180));
    }

    #[test]
    fn test_parse_six_column_table() {
        let table = "# a comment\nA 1 50 B 10 60\n\nB\t1\t20\tC\t5\t25\n";
        let records = parse_edges_text(table).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].left_accession, "B");
        assert_eq!(records[1].right_end, 25);
    }

    #[test]
    fn test_parse_bad_lines() {
        assert!(matches!(
            parse_edges_text("A 1 50 B 10\n"),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_edges_text("A 0 50 B 10 60\n"),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_edges_text("A x 50 B 10 60\n"),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_edges_text("# nothing\n"),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_import_edges_creates_sequences() {
        let mut model = Model::new();
        let records = parse_edges_text("A 1 50 B 10 60\nB 1 20 C 5 25\n").unwrap();
        assert_eq!(import_edges(&mut model, &records).unwrap(), 2);

        assert_eq!(model.sequences.len(), 3);
        assert_eq!(model.edges.len(), 2);
        let b = model.find_sequence_by_accession("B").unwrap();
        assert_eq!(b.length, 60);
        assert_eq!(model.edges.find_sequence(b.id).count(), 2);
    }

    #[test]
    fn test_failed_import_leaves_model_unchanged() {
        let mut model = Model::new();
        let b = model.add_sequence("B").unwrap();
        model.set_site_array(b, "MKVL").unwrap();

        let records = parse_edges_text("A 1 4 C 1 4\nA 1 4 B 1 40\n").unwrap();
        assert!(matches!(
            import_edges(&mut model, &records),
            Err(ParseError::Model(_))
        ));

        assert_eq!(model.sequences.len(), 1);
        assert!(model.edges.is_empty());
        assert!(model.find_sequence_by_accession("A").is_err());
    }
}

//! Centralized validation helpers.

/// Maximum number of sequences allowed in a single model (DOS protection)
pub const MAX_SEQUENCES: usize = 100_000;

/// Maximum number of edges read from a single file
pub const MAX_EDGES: usize = 10_000_000;

/// Maximum nesting depth of a Newick tree; parsing recurses once per level
pub const MAX_NEWICK_DEPTH: usize = 256;

/// Characters that would break Newick or FASTA output
const RESERVED_CHARACTERS: &[char] = &['(', ')', ',', ':', ';', '[', ']', '>', '\''];

/// Check whether an accession can be written to FASTA headers and Newick leaves.
///
/// # Examples
///
/// ```
/// use lego_fusion::utils::validation::is_valid_accession;
///
/// assert!(is_valid_accession("sp|P12345|KIN1_YEAST"));
/// assert!(!is_valid_accession(""));
/// assert!(!is_valid_accession("two words"));
/// assert!(!is_valid_accession("a,b"));
/// ```
#[must_use]
pub fn is_valid_accession(accession: &str) -> bool {
    !accession.is_empty()
        && !accession
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || RESERVED_CHARACTERS.contains(&c))
}

/// Check if adding another sequence would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new sequence.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_sequence_limit(count: usize) -> Option<String> {
    if count >= MAX_SEQUENCES {
        Some(format!(
            "Too many sequences: adding another would exceed maximum of {MAX_SEQUENCES}"
        ))
    } else {
        None
    }
}

/// As [`check_sequence_limit`], for edges
#[must_use]
pub fn check_edge_limit(count: usize) -> Option<String> {
    if count >= MAX_EDGES {
        Some(format!(
            "Too many edges: adding another would exceed maximum of {MAX_EDGES}"
        ))
    } else {
        None
    }
}

/// Check a Newick tree's nesting depth before it is parsed.
///
/// Returns an error message if the depth exceeds the limit, None if safe to parse.
#[must_use]
pub fn check_newick_depth(depth: usize) -> Option<String> {
    if depth > MAX_NEWICK_DEPTH {
        Some(format!(
            "Newick tree nested {depth} levels deep exceeds maximum of {MAX_NEWICK_DEPTH}"
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_accession() {
        assert!(is_valid_accession("A"));
        assert!(is_valid_accession("XP_001234.1"));
        assert!(is_valid_accession("sp|P12345|KIN1_YEAST"));
        assert!(!is_valid_accession(""));
        assert!(!is_valid_accession("a b"));
        assert!(!is_valid_accession("a\tb"));
        assert!(!is_valid_accession("(a)"));
        assert!(!is_valid_accession("a:0.1"));
        assert!(!is_valid_accession(">a"));
    }

    #[test]
    fn test_check_sequence_limit() {
        assert!(check_sequence_limit(0).is_none());
        assert!(check_sequence_limit(MAX_SEQUENCES - 1).is_none());
        assert!(check_sequence_limit(MAX_SEQUENCES).is_some());
        assert!(check_sequence_limit(MAX_SEQUENCES + 1).is_some());
    }

    #[test]
    fn test_check_newick_depth() {
        assert!(check_newick_depth(0).is_none());
        assert!(check_newick_depth(MAX_NEWICK_DEPTH).is_none());
        assert!(check_newick_depth(MAX_NEWICK_DEPTH + 1).is_some());
    }

    #[test]
    fn test_check_edge_limit() {
        assert!(check_edge_limit(10).is_none());
        assert!(check_edge_limit(MAX_EDGES).is_some());
    }
}

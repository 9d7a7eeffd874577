//! Legacy accessions.
//!
//! Several external tools still read fixed-width (Phylip-style) names, and some
//! mistake bare numbers for line counts. Internally numbered entities are
//! therefore given a prefixed accession when they leave the model:
//!
//! | Entity    | Format                               |
//! |-----------|--------------------------------------|
//! | Sequence  | `GrtS{id}`                           |
//! | Formation | `GrtF{event}F{formation}`            |
//! | Point     | `GrtP{event}P{formation}P{point}`    |
//!
//! User accessions may never look like a sequence legacy accession.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::LegoError;

/// Prefix shared by all legacy accessions
pub const LEGACY_PREFIX: &str = "Grt";

lazy_static! {
    static ref SEQUENCE_PATTERN: Regex = Regex::new(r"^GrtS([0-9]+)$").unwrap();
    static ref FORMATION_PATTERN: Regex = Regex::new(r"^GrtF([0-9]+)F([0-9]+)$").unwrap();
    static ref POINT_PATTERN: Regex = Regex::new(r"^GrtP([0-9]+)P([0-9]+)P([0-9]+)$").unwrap();
}

#[must_use]
pub fn format_sequence(id: u32) -> String {
    format!("{LEGACY_PREFIX}S{id}")
}

#[must_use]
pub fn format_formation(event: usize, formation: usize) -> String {
    format!("{LEGACY_PREFIX}F{event}F{formation}")
}

#[must_use]
pub fn format_point(event: usize, formation: usize, point: usize) -> String {
    format!("{LEGACY_PREFIX}P{event}P{formation}P{point}")
}

/// Does `name` look like a sequence legacy accession?
#[must_use]
pub fn is_sequence(name: &str) -> bool {
    SEQUENCE_PATTERN.is_match(name)
}

#[must_use]
pub fn is_formation(name: &str) -> bool {
    FORMATION_PATTERN.is_match(name)
}

#[must_use]
pub fn is_point(name: &str) -> bool {
    POINT_PATTERN.is_match(name)
}

/// Parse a sequence legacy accession back into the sequence ID
///
/// # Errors
///
/// Returns `LegoError::NotFound` if `name` is not a sequence legacy accession.
pub fn parse_sequence(name: &str) -> Result<u32, LegoError> {
    let caps = SEQUENCE_PATTERN
        .captures(name)
        .ok_or_else(|| LegoError::not_found(format!("'{name}' is not a sequence legacy accession")))?;
    parse_group(name, &caps[1])
}

/// Parse a formation legacy accession into `(event, formation)`
///
/// # Errors
///
/// Returns `LegoError::NotFound` if `name` is not a formation legacy accession.
pub fn parse_formation(name: &str) -> Result<(usize, usize), LegoError> {
    let caps = FORMATION_PATTERN.captures(name).ok_or_else(|| {
        LegoError::not_found(format!("'{name}' is not a formation legacy accession"))
    })?;
    Ok((parse_group(name, &caps[1])?, parse_group(name, &caps[2])?))
}

/// Parse a point legacy accession into `(event, formation, point)`
///
/// # Errors
///
/// Returns `LegoError::NotFound` if `name` is not a point legacy accession.
pub fn parse_point(name: &str) -> Result<(usize, usize, usize), LegoError> {
    let caps = POINT_PATTERN
        .captures(name)
        .ok_or_else(|| LegoError::not_found(format!("'{name}' is not a point legacy accession")))?;
    Ok((
        parse_group(name, &caps[1])?,
        parse_group(name, &caps[2])?,
        parse_group(name, &caps[3])?,
    ))
}

// Digits matched by the pattern can still overflow the target type
fn parse_group<T: std::str::FromStr>(name: &str, digits: &str) -> Result<T, LegoError> {
    digits
        .parse()
        .map_err(|_| LegoError::not_found(format!("'{name}' has an out-of-range legacy index")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_round_trip() {
        for id in [0, 1, 9999] {
            let name = format_sequence(id);
            assert!(is_sequence(&name));
            assert_eq!(parse_sequence(&name).unwrap(), id);
        }
        assert_eq!(format_sequence(5), "GrtS5");
    }

    #[test]
    fn test_formation_round_trip() {
        for event in [0, 1, 9999] {
            for formation in [0, 1, 9999] {
                let name = format_formation(event, formation);
                assert!(is_formation(&name));
                assert_eq!(parse_formation(&name).unwrap(), (event, formation));
            }
        }
    }

    #[test]
    fn test_point_round_trip() {
        for i in [0, 1, 9999] {
            let name = format_point(i, i + 1, i + 2);
            assert!(is_point(&name));
            assert_eq!(parse_point(&name).unwrap(), (i, i + 1, i + 2));
        }
        assert_eq!(format_point(1, 2, 3), "GrtP1P2P3");
    }

    #[test]
    fn test_recognisers_are_exclusive() {
        assert!(!is_sequence("GrtF1F2"));
        assert!(!is_formation("GrtS1"));
        assert!(!is_point("GrtF1F2"));
        assert!(!is_sequence("G5"));
        assert!(!is_sequence("GrtS"));
        assert!(!is_sequence("xGrtS5"));
        assert!(!is_sequence("GrtS5x"));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(matches!(parse_sequence("G5"), Err(LegoError::NotFound(_))));
        assert!(matches!(parse_formation("GrtS5"), Err(LegoError::NotFound(_))));
        assert!(matches!(parse_point("GrtP1P2"), Err(LegoError::NotFound(_))));
        assert!(matches!(
            parse_sequence("GrtS99999999999999999999"),
            Err(LegoError::NotFound(_))
        ));
    }
}

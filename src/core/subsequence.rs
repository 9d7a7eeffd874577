use serde::{Deserialize, Serialize};

use crate::core::error::LegoError;
use crate::core::sequence::Sequence;
use crate::core::types::SequenceId;

/// A portion of a sequence.
///
/// Positions are 1-based and inclusive, so `start <= end` always holds and
/// the smallest subsequence has length 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subsequence {
    /// Owning sequence
    pub sequence: SequenceId,
    start: u32,
    end: u32,
}

impl Subsequence {
    /// Create a subsequence.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` if `start` is zero or `start > end`.
    pub fn new(sequence: SequenceId, start: u32, end: u32) -> Result<Self, LegoError> {
        if start == 0 {
            return Err(LegoError::InvalidRange(format!(
                "Subsequence of sequence {sequence} must start at 1 or later, not {start}"
            )));
        }

        if start > end {
            return Err(LegoError::InvalidRange(format!(
                "Attempt to create a subsequence in sequence {sequence} where start ({start}) > end ({end})"
            )));
        }

        Ok(Self {
            sequence,
            start,
            end,
        })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Move the start position. Must stay within `(0, end]`.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` when the value is out of bounds.
    pub fn set_start(&mut self, value: u32) -> Result<(), LegoError> {
        if value == 0 || value > self.end {
            return Err(LegoError::InvalidRange(format!(
                "Attempt to set `start` to an out-of-bounds value {value} in '{self}'"
            )));
        }

        self.start = value;
        Ok(())
    }

    /// Move the end position. Must not fall below `start`.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` when the value is out of bounds.
    pub fn set_end(&mut self, value: u32) -> Result<(), LegoError> {
        if value < self.start {
            return Err(LegoError::InvalidRange(format!(
                "Attempt to set `end` to an out-of-bounds value {value} in '{self}'"
            )));
        }

        self.end = value;
        Ok(())
    }

    /// Number of sites covered
    pub fn length(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Do the two ranges share at least one site?
    pub fn has_overlap(&self, other: &Subsequence) -> bool {
        self.sequence == other.sequence && self.start <= other.end && other.start <= self.end
    }

    /// Does this range cover the whole of `other`?
    pub fn has_encompass(&self, other: &Subsequence) -> bool {
        self.sequence == other.sequence && self.start <= other.start && self.end >= other.end
    }

    /// Are the two ranges directly adjacent, `self` first?
    pub fn is_adjacent_to(&self, other: &Subsequence) -> bool {
        self.sequence == other.sequence && self.end.checked_add(1) == Some(other.start)
    }

    /// Range spanning both subsequences.
    ///
    /// The result covers any gap between them; callers should only use this
    /// on overlapping or adjacent ranges.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvariantViolation` if the two are on different sequences.
    pub fn union(&self, other: &Subsequence) -> Result<Subsequence, LegoError> {
        self.assert_same_sequence(other)?;

        Ok(Subsequence {
            sequence: self.sequence,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }

    /// Range covered by both subsequences.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if the ranges do not overlap, or
    /// `LegoError::InvariantViolation` if they are on different sequences.
    pub fn intersection(&self, other: &Subsequence) -> Result<Subsequence, LegoError> {
        self.assert_same_sequence(other)?;

        let start = self.start.max(other.start);
        let end = self.end.min(other.end);

        if start > end {
            return Err(LegoError::not_found(format!(
                "Cannot create `intersection` for non-overlapping ranges '{self}' and '{other}'"
            )));
        }

        Ok(Subsequence {
            sequence: self.sequence,
            start,
            end,
        })
    }

    /// Merge adjacent subsequences on the same sequence until none remain.
    ///
    /// Adjacency merging is confluent, so the resulting set of ranges does not
    /// depend on the input order.
    pub fn merge_list(mut source: Vec<Subsequence>) -> Vec<Subsequence> {
        while let Some((i, j)) = find_adjacent_pair(&source) {
            let (first, second) = (source[i].clone(), source[j].clone());
            source.remove(i.max(j));
            source.remove(i.min(j));
            source.push(Subsequence {
                sequence: first.sequence,
                start: first.start,
                end: second.end,
            });
        }

        source
    }

    /// Fold `union` over the list.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` for an empty list, or
    /// `LegoError::InvariantViolation` if the list spans several sequences.
    pub fn list_union(options: &[Subsequence]) -> Result<Subsequence, LegoError> {
        let (first, rest) = options.split_first().ok_or_else(|| {
            LegoError::not_found("Cannot obtain a union of subsequences for an empty list")
        })?;

        rest.iter().try_fold(first.clone(), |acc, next| acc.union(next))
    }

    /// Slice of the owning sequence's sites covered by this range
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvalidRange` if the site array is too short for the range.
    pub fn site_array<'a>(&self, sequence: &'a Sequence) -> Result<Option<&'a str>, LegoError> {
        sequence.sub_sites(self.start, self.end)
    }

    /// Display form using the owning sequence's accession, e.g. `G1[1:5(5)]`
    pub fn describe(&self, accession: &str) -> String {
        format!(
            "{}[{}:{}({})]",
            accession,
            self.start,
            self.end,
            self.length()
        )
    }

    fn assert_same_sequence(&self, other: &Subsequence) -> Result<(), LegoError> {
        if self.sequence == other.sequence {
            Ok(())
        } else {
            Err(LegoError::invariant(format!(
                "Subsequences '{self}' and '{other}' are on different sequences"
            )))
        }
    }
}

fn find_adjacent_pair(source: &[Subsequence]) -> Option<(usize, usize)> {
    for (i, a) in source.iter().enumerate() {
        for (j, b) in source.iter().enumerate() {
            if i != j && a.is_adjacent_to(b) {
                return Some((i, j));
            }
        }
    }
    None
}

impl std::fmt::Display for Subsequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}[{}:{}]", self.sequence, self.start, self.end)
    }
}

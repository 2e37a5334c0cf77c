//! Anchor Resolver Module
//!
//! Finds the precise approximate occurrence of a probe inside one read
//! and extracts the codon candidate anchored to the match.
//!
//! Unlike the locator pre-filter, matching here is true edit distance:
//! at most one substitution, insertion, or deletion between probe and
//! read subsequence. The first (leftmost) match wins, and the codon of
//! interest starts at `match_end + anchor_position - 1` with the anchor
//! position being 1-based.

use crate::catalog::Probe;
use crate::seqio::ReadRecord;

// ============================================================================
// Near Matching
// ============================================================================

/// An approximate occurrence of a pattern in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMatch {
    /// Start offset of the occurrence (0-based, inclusive).
    pub start: usize,
    /// End offset of the occurrence (0-based, exclusive).
    pub end: usize,
    /// Edit distance of the occurrence (0 or 1).
    pub dist: usize,
}

/// Finds the leftmost occurrence of `pattern` in `text` with edit
/// distance at most 1.
///
/// At each candidate start the variants are tried cheapest first:
/// exact, one substitution, one deletion (pattern base absent from the
/// text), one insertion (extra base in the text). The end offset of the
/// chosen variant is what anchors the codon, so a deletion shortens the
/// occupied window by one and an insertion lengthens it by one.
pub fn find_near_match(pattern: &[u8], text: &[u8]) -> Option<NearMatch> {
    let m = pattern.len();
    if m == 0 {
        return None;
    }

    for start in 0..text.len() {
        let rest = &text[start..];

        if rest.len() >= m {
            let window = &rest[..m];
            if window == pattern {
                return Some(NearMatch {
                    start,
                    end: start + m,
                    dist: 0,
                });
            }
            if matches_with_substitution(pattern, window) {
                return Some(NearMatch {
                    start,
                    end: start + m,
                    dist: 1,
                });
            }
        }

        if m >= 2 && rest.len() >= m - 1 && matches_with_deletion(pattern, &rest[..m - 1]) {
            return Some(NearMatch {
                start,
                end: start + m - 1,
                dist: 1,
            });
        }

        if rest.len() >= m + 1 && matches_with_insertion(pattern, &rest[..m + 1]) {
            return Some(NearMatch {
                start,
                end: start + m + 1,
                dist: 1,
            });
        }
    }

    None
}

/// True if `window` (same length as `pattern`) differs in exactly one
/// position.
fn matches_with_substitution(pattern: &[u8], window: &[u8]) -> bool {
    let mut mismatches = 0;
    for (p, w) in pattern.iter().zip(window) {
        if p != w {
            mismatches += 1;
            if mismatches > 1 {
                return false;
            }
        }
    }
    mismatches == 1
}

/// True if deleting one base from `pattern` yields `window`
/// (`window.len() == pattern.len() - 1`).
fn matches_with_deletion(pattern: &[u8], window: &[u8]) -> bool {
    debug_assert_eq!(window.len() + 1, pattern.len());
    let split = pattern
        .iter()
        .zip(window)
        .position(|(p, w)| p != w)
        .unwrap_or(window.len());
    pattern[split + 1..] == window[split..]
}

/// True if deleting one base from `window` yields `pattern`
/// (`window.len() == pattern.len() + 1`).
fn matches_with_insertion(pattern: &[u8], window: &[u8]) -> bool {
    debug_assert_eq!(window.len(), pattern.len() + 1);
    let split = pattern
        .iter()
        .zip(window)
        .position(|(p, w)| p != w)
        .unwrap_or(pattern.len());
    pattern[split..] == window[split + 1..]
}

// ============================================================================
// Codon Extraction
// ============================================================================

/// A resolved anchor within one read: the probe occurrence plus the codon
/// candidate and quality slice aligned to it.
///
/// `codon` is empty when fewer than 3 bases remain after the anchor; the
/// classifier discards such candidates downstream. `quality_slice` is
/// absent whenever the codon is absent or the quality string is too short
/// to cover the codon window.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// End offset of the probe occurrence in the read (0-based, exclusive).
    pub anchor_end: usize,
    /// 3-base codon candidate, or empty when the read ends too soon.
    pub codon: String,
    /// Full read sequence the anchor was found in.
    pub read: String,
    /// Quality characters aligned with the codon window.
    pub quality_slice: Option<String>,
}

/// Resolves a probe against one read.
///
/// Returns `None` when the read contains no occurrence within edit
/// distance 1 - the read is simply dropped, never an error.
pub fn resolve_anchor(probe: &Probe, record: &ReadRecord) -> Option<MatchResult> {
    let near = find_near_match(probe.sequence.as_bytes(), record.sequence.as_bytes())?;

    // anchor_position is 1-based, so position 1 is the base right after
    // the probe occurrence
    let codon_start = near.end + probe.anchor_position - 1;

    let codon = record
        .sequence
        .get(codon_start..codon_start + 3)
        .unwrap_or("")
        .to_string();

    let quality_slice = if codon.is_empty() {
        None
    } else {
        record
            .quality
            .get(codon_start..codon_start + 3)
            .map(|s| s.to_string())
    };

    Some(MatchResult {
        anchor_end: near.end,
        codon,
        read: record.sequence.clone(),
        quality_slice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(sequence: &str, anchor_position: usize) -> Probe {
        Probe {
            gene: "rpoB".to_string(),
            gene_position_id: "rpoB-531".to_string(),
            sequence: sequence.to_string(),
            anchor_position,
            reference_codons: vec![],
            gene_aa: String::new(),
            mutation_type: String::new(),
            mutated_codon: String::new(),
            reference_aa: String::new(),
            mutated_aa: String::new(),
            drug_resistance: String::new(),
            notes: String::new(),
            extra: vec![],
        }
    }

    fn record(sequence: &str) -> ReadRecord {
        ReadRecord {
            sequence: sequence.to_string(),
            quality: "I".repeat(sequence.len()),
        }
    }

    #[test]
    fn test_exact_match() {
        let m = find_near_match(b"ACGT", b"TTACGTTT").unwrap();
        assert_eq!((m.start, m.end, m.dist), (2, 6, 0));
    }

    #[test]
    fn test_substitution_match() {
        let m = find_near_match(b"ACGT", b"TTACCTTT").unwrap();
        assert_eq!((m.start, m.end, m.dist), (2, 6, 1));
    }

    #[test]
    fn test_deletion_match() {
        // Pattern base missing from the text: ACGT occurs as ACT
        let m = find_near_match(b"ACGT", b"GGACTGG").unwrap();
        assert_eq!((m.start, m.end, m.dist), (2, 5, 1));
    }

    #[test]
    fn test_insertion_match() {
        // Extra base in the text: ACGT occurs as ACAGT
        let m = find_near_match(b"ACGT", b"GGACAGTGG").unwrap();
        assert_eq!((m.start, m.end, m.dist), (2, 7, 1));
    }

    #[test]
    fn test_leftmost_match_wins() {
        // Both an exact and an earlier one-substitution occurrence exist;
        // the earlier one anchors
        let m = find_near_match(b"ACGT", b"ACCTacgtACGT").unwrap();
        assert_eq!(m.start, 0);
        assert_eq!(m.dist, 1);
    }

    #[test]
    fn test_no_match() {
        assert!(find_near_match(b"ACGT", b"GGGGGGGG").is_none());
        assert!(find_near_match(b"ACGT", b"").is_none());
        assert!(find_near_match(b"", b"ACGT").is_none());
    }

    #[test]
    fn test_two_edits_rejected() {
        assert!(find_near_match(b"ACGTACGT", b"TTAGGTAGGTTT").is_none());
    }

    #[test]
    fn test_resolve_anchor_position_one() {
        // Anchor position 1: codon immediately after the probe
        let p = probe("ACGTACGT", 1);
        let r = record("ACGTACGTCGATTT");
        let m = resolve_anchor(&p, &r).unwrap();
        assert_eq!(m.anchor_end, 8);
        assert_eq!(m.codon, "CGA");
        assert_eq!(m.quality_slice.as_deref(), Some("III"));
    }

    #[test]
    fn test_resolve_anchor_offset() {
        // Anchor position 4: codon starts 3 bases past the match end
        let p = probe("ACGTACGT", 4);
        let r = record("ACGTACGTTTTCGAGG");
        let m = resolve_anchor(&p, &r).unwrap();
        assert_eq!(m.anchor_end, 8);
        assert_eq!(m.codon, "CGA");
    }

    #[test]
    fn test_resolve_anchor_short_read() {
        // Read ends before a full codon: candidate is empty, not an error
        let p = probe("ACGTACGT", 1);
        let r = record("ACGTACGTCG");
        let m = resolve_anchor(&p, &r).unwrap();
        assert_eq!(m.codon, "");
        assert!(m.quality_slice.is_none());
    }

    #[test]
    fn test_resolve_anchor_no_occurrence() {
        let p = probe("ACGTACGT", 1);
        let r = record("GGGGGGGGGGGG");
        assert!(resolve_anchor(&p, &r).is_none());
    }

    #[test]
    fn test_resolve_anchor_with_substitution_in_probe_region() {
        // One substitution inside the probe occurrence still anchors, and
        // codon extraction proceeds identically
        let p = probe("ACGTACGT", 1);
        let r = record("ACGTACCTCGATTT");
        let m = resolve_anchor(&p, &r).unwrap();
        assert_eq!(m.anchor_end, 8);
        assert_eq!(m.codon, "CGA");
    }
}

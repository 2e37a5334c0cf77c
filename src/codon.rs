//! Codon Classification Module
//!
//! Quality-filters the extracted codon window and classifies the codon
//! candidate against the probe's known reference alleles.
//!
//! # Quality Filter
//! The 3-character quality slice aligned with the codon is accepted only
//! when every character lies in the allowed Phred alphabet: `@`, `?`, and
//! uppercase `A`-`Z`. Any other character anywhere in the slice rejects
//! the read before aggregation.
//!
//! # Classification
//! Only the *first* reference codon of a gene-position is consulted; any
//! alternate alleles ride along as report metadata. This mirrors the
//! established screening behavior and is kept as-is pending confirmation
//! with the domain owners.

use std::fmt;

// ============================================================================
// Quality Filter
// ============================================================================

/// Accepts a quality slice when every character is in the allowed Phred
/// alphabet (`@`, `?`, `A`-`Z`).
pub fn quality_accepted(slice: &str) -> bool {
    !slice.is_empty()
        && slice
            .bytes()
            .all(|b| b == b'@' || b == b'?' || b.is_ascii_uppercase())
}

// ============================================================================
// Codon Pair
// ============================================================================

/// A classified codon observation: the extracted (possibly mutated) codon
/// over the reference codon it was compared against.
///
/// The reference half is empty when the gene-position has no known
/// reference allele; a wild-type observation carries the same codon in
/// both halves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodonPair {
    /// Codon extracted from the read.
    pub mutated: String,
    /// Reference codon compared against, or empty.
    pub reference: String,
}

impl CodonPair {
    /// True when the observation is the known wild type.
    pub fn is_wild_type(&self) -> bool {
        !self.reference.is_empty() && self.mutated == self.reference
    }
}

impl fmt::Display for CodonPair {
    /// Renders the pair in `MUTATED/REFERENCE` report notation, e.g.
    /// `TTG/CGA`, or `TTG/` when no reference allele exists.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mutated, self.reference)
    }
}

/// Classifies a codon candidate against a gene-position's reference
/// codons.
///
/// # Rules
/// - Empty or non-3-character candidate: discarded (`None`).
/// - Reference present, candidate equal to the first reference codon:
///   wild type, reported as `codon/codon`.
/// - Reference present, candidate different: `candidate/reference`.
/// - No reference allele: `candidate/` with an empty reference half.
pub fn classify(candidate: &str, reference_codons: &[String]) -> Option<CodonPair> {
    if candidate.is_empty() || candidate.len() != 3 {
        return None;
    }

    let reference = reference_codons
        .first()
        .map(|r| r.as_str())
        .unwrap_or("");

    Some(CodonPair {
        mutated: candidate.to_string(),
        reference: reference.to_string(),
    })
}

//! Approximate Locator Module
//!
//! Fast pre-filter that selects, for one probe, every raw read block
//! containing an occurrence of the probe within Hamming distance 1.
//!
//! # Method
//! For a probe of length `n`, build a pattern set of `n + 1` alternatives:
//! the exact probe plus, for each position, the probe with that position
//! replaced by a single-character wildcard. The disjunction compiles to
//! one regex, so detecting any one-substitution variant is a single
//! substring scan per block.
//!
//! This is deliberately looser than the anchor resolver's true
//! edit-distance match: substitutions only, no insertions or deletions.
//! Blocks that pass here are re-matched exactly downstream, so the only
//! cost of the approximation is a few extra candidate blocks.

use anyhow::{Context, Result};
use regex::Regex;

/// Builds the masked-pattern alternatives for a probe: the exact sequence
/// first, then one variant per position with that position wildcarded.
pub fn masked_patterns(probe: &str) -> Vec<String> {
    let mut patterns = Vec::with_capacity(probe.len() + 1);
    patterns.push(regex::escape(probe));

    for (i, c) in probe.char_indices() {
        let prefix = &probe[..i];
        let suffix = &probe[i + c.len_utf8()..];
        patterns.push(format!(
            "{}.{}",
            regex::escape(prefix),
            regex::escape(suffix)
        ));
    }

    patterns
}

/// Compiles the one-substitution disjunction for a probe.
///
/// `.` does not match newlines, so a wildcarded position can never bridge
/// two lines of a raw block.
pub fn compile_probe_pattern(probe: &str) -> Result<Regex> {
    let alternation = masked_patterns(probe).join("|");
    Regex::new(&alternation)
        .with_context(|| format!("Failed to compile search pattern for probe {}", probe))
}

/// Returns the corpus blocks containing a Hamming-distance-<=-1 occurrence
/// of the probe, verbatim and in corpus order.
///
/// A probe with zero matching blocks yields an empty vector, not an
/// error; downstream aggregation simply drops it.
pub fn locate<'c>(probe: &str, corpus: &'c [String]) -> Result<Vec<&'c str>> {
    let pattern = compile_probe_pattern(probe)?;

    Ok(corpus
        .iter()
        .filter(|block| pattern.is_match(block))
        .map(|block| block.as_str())
        .collect())
}

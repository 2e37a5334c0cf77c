//! Variant Aggregation Module
//!
//! Groups one gene-position's classified observations by codon pair,
//! counts them, and converts counts to percentage frequencies over the
//! gene-position batch.
//!
//! Duplicate handling follows the established screening behavior: exact
//! whole-row duplicates (same read, codon pair, and anchor end) are
//! detected so they are not treated as independent anchors, but their
//! tally stays in the codon-pair count. Reads that are biologically
//! identical yet textually distinct remain distinct rows.

use rustc_hash::FxHashMap;

use crate::codon::CodonPair;

// ============================================================================
// Observations
// ============================================================================

/// One classified, quality-accepted codon observation from a single read.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Classified codon pair.
    pub codon_pair: CodonPair,
    /// Read sequence the observation came from.
    pub read: String,
    /// End offset of the probe occurrence in the read.
    pub anchor_end: usize,
}

/// One aggregated codon-pair row for a gene-position.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedVariant {
    /// Gene-position identifier the group belongs to.
    pub gene_position_id: String,
    /// The codon pair shared by every observation in the group.
    pub codon_pair: CodonPair,
    /// Number of observations in the group (duplicates tally).
    pub count: usize,
    /// Percentage frequency over the gene-position batch, in [0, 100].
    pub frequency: f64,
    /// Read sequence of the first observation, kept for the report.
    pub read: String,
    /// Anchor end of the first observation.
    pub anchor_end: usize,
    /// How many observations in the group were exact whole-row duplicates
    /// of an earlier observation.
    pub duplicates: usize,
}

// ============================================================================
// Aggregation
// ============================================================================

/// Aggregates one gene-position's observations into codon-pair groups.
///
/// Groups appear in first-observation order; callers must not rely on any
/// other ordering. Frequencies are percentages of the batch total, so
/// they sum to 100 across the returned rows (up to float rounding).
/// An empty observation set yields an empty result.
pub fn aggregate(gene_position_id: &str, observations: &[Observation]) -> Vec<AggregatedVariant> {
    if observations.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<AggregatedVariant> = Vec::new();
    let mut group_index: FxHashMap<String, usize> = FxHashMap::default();
    let mut seen_rows: FxHashMap<(String, String, usize), usize> = FxHashMap::default();

    for obs in observations {
        let row_key = (
            obs.codon_pair.to_string(),
            obs.read.clone(),
            obs.anchor_end,
        );
        let occurrences = seen_rows.entry(row_key).or_insert(0);
        *occurrences += 1;
        let is_duplicate = *occurrences > 1;

        let pair_key = obs.codon_pair.to_string();
        match group_index.get(&pair_key) {
            Some(&idx) => {
                groups[idx].count += 1;
                if is_duplicate {
                    groups[idx].duplicates += 1;
                }
            }
            None => {
                group_index.insert(pair_key, groups.len());
                groups.push(AggregatedVariant {
                    gene_position_id: gene_position_id.to_string(),
                    codon_pair: obs.codon_pair.clone(),
                    count: 1,
                    frequency: 0.0,
                    read: obs.read.clone(),
                    anchor_end: obs.anchor_end,
                    duplicates: 0,
                });
            }
        }
    }

    let total: usize = groups.iter().map(|g| g.count).sum();
    for group in &mut groups {
        group.frequency = group.count as f64 * 100.0 / total as f64;
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(mutated: &str, reference: &str, read: &str, anchor_end: usize) -> Observation {
        Observation {
            codon_pair: CodonPair {
                mutated: mutated.to_string(),
                reference: reference.to_string(),
            },
            read: read.to_string(),
            anchor_end,
        }
    }

    #[test]
    fn test_aggregate_counts_and_frequencies() {
        let observations = vec![
            obs("CGA", "CGA", "READ1", 8),
            obs("CGA", "CGA", "READ2", 8),
            obs("TTG", "CGA", "READ3", 8),
            obs("CGA", "CGA", "READ4", 8),
        ];

        let groups = aggregate("rpoB-531", &observations);
        assert_eq!(groups.len(), 2);

        let wild = groups
            .iter()
            .find(|g| g.codon_pair.to_string() == "CGA/CGA")
            .unwrap();
        assert_eq!(wild.count, 3);
        assert!((wild.frequency - 75.0).abs() < 1e-9);

        let mutated = groups
            .iter()
            .find(|g| g.codon_pair.to_string() == "TTG/CGA")
            .unwrap();
        assert_eq!(mutated.count, 1);
        assert!((mutated.frequency - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequencies_sum_to_100() {
        let observations = vec![
            obs("CGA", "CGA", "R1", 5),
            obs("TTG", "CGA", "R2", 6),
            obs("TGG", "CGA", "R3", 7),
        ];
        let groups = aggregate("rpoB-531", &observations);
        let sum: f64 = groups.iter().map(|g| g.frequency).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_rows_still_tally() {
        // Identical (pair, read, end) rows are marked as duplicates but
        // keep contributing to the group count
        let observations = vec![
            obs("CGA", "CGA", "READ1", 8),
            obs("CGA", "CGA", "READ1", 8),
            obs("CGA", "CGA", "READ1", 8),
        ];
        let groups = aggregate("rpoB-531", &observations);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].duplicates, 2);
        assert!((groups[0].frequency - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_textually_distinct_reads_stay_distinct() {
        let observations = vec![
            obs("CGA", "CGA", "AAACGA", 3),
            obs("CGA", "CGA", "TTTCGA", 3),
        ];
        let groups = aggregate("rpoB-531", &observations);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].duplicates, 0);
    }

    #[test]
    fn test_empty_observations() {
        assert!(aggregate("rpoB-531", &[]).is_empty());
    }

    #[test]
    fn test_representative_read_is_first() {
        let observations = vec![
            obs("TTG", "CGA", "FIRST", 4),
            obs("TTG", "CGA", "SECOND", 9),
        ];
        let groups = aggregate("rpoB-531", &observations);
        assert_eq!(groups[0].read, "FIRST");
        assert_eq!(groups[0].anchor_end, 4);
    }
}

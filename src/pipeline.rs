//! Pipeline Module
//!
//! Wires the per-probe stage chain over the loaded corpus:
//! Locate -> Split -> Resolve -> Filter -> Classify -> Aggregate ->
//! Translate.
//!
//! Probe searches are independent, so the pipeline runs them across the
//! rayon pool; within one probe the stages are strictly sequential. A
//! probe whose search fails is logged and skipped - missing data degrades
//! the report, it never aborts the run. Results merge back in catalog
//! order, so two runs over identical inputs produce identical output.

use anyhow::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::aggregate::{self, Observation};
use crate::anchor;
use crate::catalog::{Probe, ProbeCatalog};
use crate::codon;
use crate::locator;
use crate::seqio;
use crate::translate;

// ============================================================================
// Run Context
// ============================================================================

/// Immutable per-run state shared by every probe search: the loaded probe
/// catalog and the read corpus as raw blocks.
pub struct RunContext<'a> {
    /// Probe definitions for this run.
    pub catalog: &'a ProbeCatalog,
    /// Raw four-line read blocks, concatenated over all input files.
    pub corpus: &'a [String],
    /// Emit per-probe progress to stderr.
    pub verbose: bool,
}

/// A fully processed variant row, ready for the report join.
///
/// Every field is filled; absent values are empty strings so the report
/// composer never has to interpret partial rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedVariant {
    /// Gene-position identifier.
    pub gene_position_id: String,
    /// Extracted codon.
    pub mutated_codon: String,
    /// Reference codon compared against, or empty.
    pub reference_codon: String,
    /// Observation count for this codon pair.
    pub count: usize,
    /// Percentage frequency within the gene-position batch.
    pub frequency: f64,
    /// Representative read sequence.
    pub read: String,
    /// Anchor end offset within the representative read.
    pub anchor_end: usize,
    /// Amino acid of the reference codon (empty when no reference).
    pub reference_aa: String,
    /// Amino acid of the extracted codon.
    pub mutated_aa: String,
}

/// Per-probe stage tallies, reported in verbose mode.
#[derive(Debug, Default, Clone, Copy)]
struct ProbeStats {
    blocks: usize,
    reads: usize,
    anchored: usize,
    quality_rejected: usize,
    classified: usize,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs the full pipeline for every probe in the catalog.
///
/// Per-probe failures are absorbed: the error is printed and the probe
/// contributes nothing to the result. Only catalog loading (done by the
/// caller) can fail terminally.
pub fn run(ctx: &RunContext) -> Vec<TranslatedVariant> {
    // Shared ignore lookup: classification compares against the first
    // table row's reference alleles even when a gene-position repeats
    let ignore = ctx.catalog.ignore_lookup();

    let per_probe: Vec<Vec<TranslatedVariant>> = ctx
        .catalog
        .probes()
        .par_iter()
        .map(|probe| match process_probe(probe, ctx.corpus, &ignore, ctx.verbose) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("ERROR processing probe {}: {}", probe.gene_position_id, e);
                Vec::new()
            }
        })
        .collect();

    per_probe.into_iter().flatten().collect()
}

/// Runs the stage chain for one probe over the whole corpus.
fn process_probe(
    probe: &Probe,
    corpus: &[String],
    ignore: &FxHashMap<String, Vec<String>>,
    verbose: bool,
) -> Result<Vec<TranslatedVariant>> {
    let mut stats = ProbeStats::default();
    let reference_codons: &[String] = ignore
        .get(&probe.gene_position_id)
        .map(|v| v.as_slice())
        .unwrap_or(&[]);

    // Pre-filter: blocks with a Hamming-distance-<=-1 probe occurrence
    let blocks = locator::locate(&probe.sequence, corpus)?;
    stats.blocks = blocks.len();

    let mut observations = Vec::new();

    for block in blocks {
        // Split: corrupted blocks are dropped silently
        let record = match seqio::split_block(block) {
            Some(r) => r,
            None => continue,
        };
        stats.reads += 1;

        // Resolve: true edit-distance re-match, first occurrence wins
        let matched = match anchor::resolve_anchor(probe, &record) {
            Some(m) => m,
            None => continue,
        };
        stats.anchored += 1;

        // Filter: the quality slice aligned with the codon window
        let quality_ok = matched
            .quality_slice
            .as_deref()
            .is_some_and(codon::quality_accepted);
        if !quality_ok {
            stats.quality_rejected += 1;
            continue;
        }

        // Classify against the gene-position's reference alleles
        let pair = match codon::classify(&matched.codon, reference_codons) {
            Some(p) => p,
            None => continue,
        };
        stats.classified += 1;

        observations.push(Observation {
            codon_pair: pair,
            read: matched.read,
            anchor_end: matched.anchor_end,
        });
    }

    let groups = aggregate::aggregate(&probe.gene_position_id, &observations);

    if verbose {
        eprintln!(
            "  [{}] blocks: {}, reads: {}, anchored: {}, quality-rejected: {}, counted: {}, codon pairs: {}",
            probe.gene_position_id,
            stats.blocks,
            stats.reads,
            stats.anchored,
            stats.quality_rejected,
            stats.classified,
            groups.len()
        );
    }

    Ok(groups
        .into_iter()
        .map(|g| TranslatedVariant {
            gene_position_id: g.gene_position_id,
            reference_aa: translate::translate_half(&g.codon_pair.reference),
            mutated_aa: translate::translate_half(&g.codon_pair.mutated),
            mutated_codon: g.codon_pair.mutated,
            reference_codon: g.codon_pair.reference,
            count: g.count,
            frequency: g.frequency,
            read: g.read,
            anchor_end: g.anchor_end,
        })
        .collect())
}

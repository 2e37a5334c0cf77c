//! Probe Catalog Module
//!
//! Loads probe definitions from the probe table CSV and produces the
//! ignore-lookup used during codon classification.
//!
//! # Probe Table Format
//! One row per (gene, genomic position) pair. Required columns:
//! `Gene`, `Gene-Position`, `Probe`, `Position`. The Position column is a
//! string-encoded range (e.g. `[511-513]`) collapsed to its first integer.
//! The Reference Codon column may carry multiple alleles separated by
//! `/`, `,`, `;` or whitespace; the first listed allele is the one codon
//! classification compares against.
//!
//! # Row Filtering
//! - Missing `Gene-Position` key: hard parse error, aborts the run.
//! - Missing probe sequence: row excluded (nothing to anchor a search).
//! - Probe sequence with characters outside `ACGT` (either case): row
//!   excluded with a warning.
//! - Missing reference codon: row retained with an empty ignore set.
//! - Unparseable anchor position: row excluded with a warning.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Columns with a fixed meaning in the probe table. Anything else is
/// carried through to the merged report as a passthrough annotation.
const KNOWN_COLUMNS: &[&str] = &[
    "Gene",
    "Gene-Position",
    "Gene AA",
    "Mutation Type",
    "Probe",
    "Position",
    "Reference Codon",
    "Mutated Codon",
    "Reference Aminoacid",
    "Mutated Aminoacid",
    "Drug Resistance",
    "Notes",
];

// ============================================================================
// Probe
// ============================================================================

/// A probe definition: a short marker sequence anchoring a known genomic
/// position, plus the reference metadata carried through to the report.
///
/// Immutable after catalog load.
#[derive(Debug, Clone)]
pub struct Probe {
    /// Gene name (e.g., "rpoB").
    pub gene: String,
    /// Gene-position identifier, the grouping key for all downstream stages.
    pub gene_position_id: String,
    /// Probe nucleotide sequence (non-empty).
    pub sequence: String,
    /// 1-based offset from a probe match's end to the codon of interest.
    pub anchor_position: usize,
    /// Known reference codon alleles, in table order. The first entry is
    /// the comparator used by codon classification; alternates are report
    /// metadata only.
    pub reference_codons: Vec<String>,
    /// Gene amino-acid annotation (report passthrough).
    pub gene_aa: String,
    /// Mutation type annotation (report passthrough).
    pub mutation_type: String,
    /// Mutated codon placeholder from the table (report passthrough).
    pub mutated_codon: String,
    /// Reference amino-acid placeholder (report passthrough).
    pub reference_aa: String,
    /// Mutated amino-acid placeholder (report passthrough).
    pub mutated_aa: String,
    /// Drug-resistance annotation (static reference data, never computed).
    pub drug_resistance: String,
    /// Free-text notes.
    pub notes: String,
    /// Values of any extra table columns, parallel to
    /// [`ProbeCatalog::extra_headers`].
    pub extra: Vec<String>,
}

// ============================================================================
// Probe Catalog
// ============================================================================

/// The loaded probe set for one run.
///
/// Owns the probes for the run's lifetime; all downstream stages borrow.
#[derive(Debug, Clone)]
pub struct ProbeCatalog {
    probes: Vec<Probe>,
    extra_headers: Vec<String>,
    excluded: usize,
}

impl ProbeCatalog {
    /// Loads the probe table from a CSV file.
    ///
    /// # Errors
    /// Fails when the file cannot be read, a required column is missing,
    /// or a row is missing its gene-position key. These are the only
    /// terminal failures in the pipeline; everything downstream degrades
    /// per read or per probe instead of aborting.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open probe table: {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read probe table header: {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let col = |name: &str| headers.iter().position(|h| h == name);

        let gene_idx = col("Gene")
            .ok_or_else(|| anyhow::anyhow!("Probe table missing required column: Gene"))?;
        let gp_idx = col("Gene-Position")
            .ok_or_else(|| anyhow::anyhow!("Probe table missing required column: Gene-Position"))?;
        let probe_idx = col("Probe")
            .ok_or_else(|| anyhow::anyhow!("Probe table missing required column: Probe"))?;
        let pos_idx = col("Position")
            .ok_or_else(|| anyhow::anyhow!("Probe table missing required column: Position"))?;

        let opt_cols: FxHashMap<&str, Option<usize>> = KNOWN_COLUMNS
            .iter()
            .map(|&name| (name, col(name)))
            .collect();

        let extra_indices: Vec<usize> = (0..headers.len())
            .filter(|i| !KNOWN_COLUMNS.contains(&headers[*i].as_str()))
            .collect();
        let extra_headers: Vec<String> = extra_indices
            .iter()
            .map(|&i| headers[i].clone())
            .collect();

        let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
            idx.and_then(|i| record.get(i))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let mut probes = Vec::new();
        let mut excluded = 0usize;

        for (row_num, result) in reader.records().enumerate() {
            let record = result
                .with_context(|| format!("Failed to parse probe table row {}", row_num + 2))?;

            let gene_position_id = field(&record, Some(gp_idx));
            if gene_position_id.is_empty() {
                anyhow::bail!(
                    "Probe table row {} is missing its Gene-Position key",
                    row_num + 2
                );
            }

            let sequence = field(&record, Some(probe_idx));
            if sequence.is_empty() {
                // No probe sequence, nothing to anchor a search
                excluded += 1;
                continue;
            }
            if !is_nucleotide_sequence(&sequence) {
                eprintln!(
                    "WARNING: probe {} contains characters outside ACGT, row excluded",
                    gene_position_id
                );
                excluded += 1;
                continue;
            }

            let anchor_position = match parse_anchor_position(&field(&record, Some(pos_idx))) {
                Some(p) => p,
                None => {
                    eprintln!(
                        "WARNING: probe {} has no usable anchor position, row excluded",
                        gene_position_id
                    );
                    excluded += 1;
                    continue;
                }
            };

            let reference_codons =
                parse_reference_codons(&field(&record, opt_cols["Reference Codon"]));

            probes.push(Probe {
                gene: field(&record, Some(gene_idx)),
                gene_position_id,
                sequence,
                anchor_position,
                reference_codons,
                gene_aa: field(&record, opt_cols["Gene AA"]),
                mutation_type: field(&record, opt_cols["Mutation Type"]),
                mutated_codon: field(&record, opt_cols["Mutated Codon"]),
                reference_aa: field(&record, opt_cols["Reference Aminoacid"]),
                mutated_aa: field(&record, opt_cols["Mutated Aminoacid"]),
                drug_resistance: field(&record, opt_cols["Drug Resistance"]),
                notes: field(&record, opt_cols["Notes"]),
                extra: extra_indices
                    .iter()
                    .map(|&i| record.get(i).unwrap_or("").trim().to_string())
                    .collect(),
            });
        }

        Ok(Self {
            probes,
            extra_headers,
            excluded,
        })
    }

    /// Builds a catalog directly from probe values.
    ///
    /// The CSV loader is the normal entry point; this constructor exists
    /// for callers that assemble probe sets programmatically.
    pub fn from_probes(probes: Vec<Probe>, extra_headers: Vec<String>) -> Self {
        Self {
            probes,
            extra_headers,
            excluded: 0,
        }
    }

    /// The retained probes, in table order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Headers of passthrough annotation columns, in table order.
    pub fn extra_headers(&self) -> &[String] {
        &self.extra_headers
    }

    /// Number of table rows excluded during load.
    pub fn excluded_rows(&self) -> usize {
        self.excluded
    }

    /// Looks up a probe by its gene-position identifier.
    pub fn get(&self, gene_position_id: &str) -> Option<&Probe> {
        self.probes
            .iter()
            .find(|p| p.gene_position_id == gene_position_id)
    }

    /// Builds the ignore-lookup: gene-position id to its reference codons.
    ///
    /// Used during classification to decide whether an extracted codon is
    /// the known wild type. First row wins when a gene-position repeats.
    pub fn ignore_lookup(&self) -> FxHashMap<String, Vec<String>> {
        let mut lookup = FxHashMap::default();
        for probe in &self.probes {
            lookup
                .entry(probe.gene_position_id.clone())
                .or_insert_with(|| probe.reference_codons.clone());
        }
        lookup
    }
}

// ============================================================================
// Field Parsing
// ============================================================================

/// True when every character is a plain nucleotide base (`ACGT`, either
/// case). Probe cells sometimes pick up stray spreadsheet characters;
/// such a sequence can never occur in a read, so its row is excluded.
pub fn is_nucleotide_sequence(s: &str) -> bool {
    s.bytes()
        .all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't'))
}

/// Collapses a string-encoded anchor range to a single 1-based offset.
///
/// The table encodes Position as `[511-513]`, `[4]`, or a bare integer;
/// the first integer in the range is the anchor offset. Zero is rejected
/// because the offset is 1-based.
pub fn parse_anchor_position(raw: &str) -> Option<usize> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .split('-')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .find(|&p| p > 0)
}

/// Splits a reference-codon field into its allele list, table order kept.
pub fn parse_reference_codons(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == '/' || c == ',' || c == ';' || c.is_whitespace())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_uppercase())
        .collect()
}

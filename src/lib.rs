//! hetscreen - Heteroresistance screening of M. tuberculosis reads
//!
//! Screens a FASTQ read corpus for low-frequency (heteroresistant) codon
//! variants at probe-anchored genomic positions and reports allele
//! frequencies with translated amino acids.
//!
//! # Modules
//! - `seqio`: FASTQ corpus loading with gzip support
//! - `catalog`: Probe table loading and the reference-codon ignore lookup
//! - `locator`: Masked-pattern pre-filter (Hamming distance <= 1)
//! - `anchor`: Edit-distance-<=-1 anchor resolution and codon extraction
//! - `codon`: Phred quality filtering and codon classification
//! - `aggregate`: Codon-pair grouping, counts, and frequencies
//! - `translate`: Standard genetic code translation
//! - `pipeline`: Per-run context and the per-probe stage chain
//! - `report`: Merged, unmerged, and reference CSV reports

pub mod aggregate;
pub mod anchor;
pub mod catalog;
pub mod codon;
pub mod locator;
pub mod pipeline;
pub mod report;
pub mod seqio;
pub mod translate;

//! Report Module
//!
//! Serializes the three run reports, each stamped with a run identifier:
//! - **Merged report**: aggregated variants joined back onto probe
//!   metadata, fixed column order, empty-string fill for missing fields.
//! - **Unmerged report**: the raw aggregated variant rows before the
//!   metadata join.
//! - **Reference report**: the filtered probe table actually searched.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::catalog::ProbeCatalog;
use crate::pipeline::TranslatedVariant;

/// Fixed column order of the merged report, before passthrough columns.
const MERGED_COLUMNS: &[&str] = &[
    "Gene",
    "Gene-Position",
    "Gene AA",
    "Mutation Type",
    "Probe",
    "Position",
    "Read",
    "Reference Codon",
    "Mutated Codon",
    "Counts",
    "Frequencies",
    "Reference Aminoacid",
    "Mutated Aminoacid",
    "Drug Resistance",
    "Notes",
];

/// Builds the run identifier stamped into every report filename.
pub fn run_id() -> String {
    chrono::Local::now().format("%Y-%m-%d-%H-%M").to_string()
}

/// Paths of the three reports written for one run.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub merged: PathBuf,
    pub unmerged: PathBuf,
    pub reference: PathBuf,
}

/// Writes all three reports into `outdir`, creating it if needed.
pub fn write_reports(
    outdir: &Path,
    run_id: &str,
    catalog: &ProbeCatalog,
    variants: &[TranslatedVariant],
) -> Result<ReportPaths> {
    std::fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create output directory: {}", outdir.display()))?;

    let paths = ReportPaths {
        merged: outdir.join(format!("Merged_Report_{}.csv", run_id)),
        unmerged: outdir.join(format!("Unmerged_Report_{}.csv", run_id)),
        reference: outdir.join(format!("Reference_Report_{}.csv", run_id)),
    };

    write_merged(&paths.merged, catalog, variants)?;
    write_unmerged(&paths.unmerged, variants)?;
    write_reference(&paths.reference, catalog)?;

    Ok(paths)
}

/// Writes the merged report: one row per aggregated variant, joined onto
/// its probe's metadata by gene-position id. Probe fields default to the
/// empty string when the gene-position is not in the catalog.
fn write_merged(
    path: &Path,
    catalog: &ProbeCatalog,
    variants: &[TranslatedVariant],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;

    let mut header: Vec<&str> = MERGED_COLUMNS.to_vec();
    header.extend(catalog.extra_headers().iter().map(|h| h.as_str()));
    writer.write_record(&header)?;

    for variant in variants {
        let probe = catalog.get(&variant.gene_position_id);

        let mut row: Vec<String> = vec![
            probe.map(|p| p.gene.clone()).unwrap_or_default(),
            variant.gene_position_id.clone(),
            probe.map(|p| p.gene_aa.clone()).unwrap_or_default(),
            probe.map(|p| p.mutation_type.clone()).unwrap_or_default(),
            probe.map(|p| p.sequence.clone()).unwrap_or_default(),
            probe
                .map(|p| p.anchor_position.to_string())
                .unwrap_or_default(),
            variant.read.clone(),
            variant.reference_codon.clone(),
            variant.mutated_codon.clone(),
            variant.count.to_string(),
            format!("{:.4}", variant.frequency),
            variant.reference_aa.clone(),
            variant.mutated_aa.clone(),
            probe.map(|p| p.drug_resistance.clone()).unwrap_or_default(),
            probe.map(|p| p.notes.clone()).unwrap_or_default(),
        ];

        match probe {
            Some(p) => row.extend(p.extra.iter().cloned()),
            None => row.extend(
                std::iter::repeat(String::new()).take(catalog.extra_headers().len()),
            ),
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the unmerged report of raw aggregated variant rows.
fn write_unmerged(path: &Path, variants: &[TranslatedVariant]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;

    writer.write_record([
        "Gene-Position",
        "Read",
        "Ends",
        "Mutated Codon",
        "Reference Codon",
        "Counts",
        "Frequencies",
        "Reference Aminoacid",
        "Mutated Aminoacid",
    ])?;

    for variant in variants {
        writer.write_record(&[
            variant.gene_position_id.clone(),
            variant.read.clone(),
            variant.anchor_end.to_string(),
            variant.mutated_codon.clone(),
            variant.reference_codon.clone(),
            variant.count.to_string(),
            format!("{:.4}", variant.frequency),
            variant.reference_aa.clone(),
            variant.mutated_aa.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the reference report: the probe table rows that were actually
/// searched, after catalog filtering.
fn write_reference(path: &Path, catalog: &ProbeCatalog) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;

    let mut header = vec![
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
    header.extend(catalog.extra_headers().iter().map(|h| h.as_str()));
    writer.write_record(&header)?;

    for probe in catalog.probes() {
        let mut row = vec![
            probe.gene.clone(),
            probe.gene_position_id.clone(),
            probe.gene_aa.clone(),
            probe.mutation_type.clone(),
            probe.sequence.clone(),
            probe.anchor_position.to_string(),
            probe.reference_codons.join("/"),
            probe.mutated_codon.clone(),
            probe.reference_aa.clone(),
            probe.mutated_aa.clone(),
            probe.drug_resistance.clone(),
            probe.notes.clone(),
        ];
        row.extend(probe.extra.iter().cloned());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Probe;

    fn test_catalog() -> ProbeCatalog {
        ProbeCatalog::from_probes(
            vec![Probe {
                gene: "rpoB".to_string(),
                gene_position_id: "rpoB-531".to_string(),
                sequence: "ACGTACGT".to_string(),
                anchor_position: 1,
                reference_codons: vec!["CGA".to_string()],
                gene_aa: "S531L".to_string(),
                mutation_type: "SNP".to_string(),
                mutated_codon: "TTG".to_string(),
                reference_aa: "R".to_string(),
                mutated_aa: "L".to_string(),
                drug_resistance: "Rifampicin".to_string(),
                notes: "primary, high confidence".to_string(),
                extra: vec![],
            }],
            vec![],
        )
    }

    fn test_variant() -> TranslatedVariant {
        TranslatedVariant {
            gene_position_id: "rpoB-531".to_string(),
            mutated_codon: "TTG".to_string(),
            reference_codon: "CGA".to_string(),
            count: 3,
            frequency: 75.0,
            read: "ACGTACGTTTGTTT".to_string(),
            anchor_end: 8,
            reference_aa: "R".to_string(),
            mutated_aa: "L".to_string(),
        }
    }

    fn temp_outdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hetscreen_report_test_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_write_reports() {
        let outdir = temp_outdir();
        let catalog = test_catalog();
        let variants = vec![test_variant()];

        let paths = write_reports(&outdir, "2026-01-01-00-00", &catalog, &variants).unwrap();
        assert!(paths.merged.exists());
        assert!(paths.unmerged.exists());
        assert!(paths.reference.exists());

        let merged = std::fs::read_to_string(&paths.merged).unwrap();
        let mut lines = merged.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Gene,Gene-Position,Gene AA"));
        let row = lines.next().unwrap();
        assert!(row.contains("rpoB-531"));
        assert!(row.contains("TTG"));
        assert!(row.contains("75.0000"));
        assert!(row.contains("Rifampicin"));
        // The quoted free-text field survives the round trip
        assert!(row.contains("\"primary, high confidence\""));

        let unmerged = std::fs::read_to_string(&paths.unmerged).unwrap();
        assert!(unmerged.contains("rpoB-531"));
        assert!(unmerged.contains("ACGTACGTTTGTTT"));

        let _ = std::fs::remove_dir_all(&outdir);
    }

    #[test]
    fn test_merged_report_fills_missing_probe_with_empty() {
        let outdir = temp_outdir();
        let catalog = ProbeCatalog::from_probes(vec![], vec![]);
        let variants = vec![test_variant()];

        let paths = write_reports(&outdir, "2026-01-01-00-01", &catalog, &variants).unwrap();
        let merged = std::fs::read_to_string(&paths.merged).unwrap();
        let row = merged.lines().nth(1).unwrap();
        // Gene column empty, gene-position id still present
        assert!(row.starts_with(",rpoB-531,"));

        let _ = std::fs::remove_dir_all(&outdir);
    }

    #[test]
    fn test_run_id_format() {
        let id = run_id();
        // %Y-%m-%d-%H-%M
        assert_eq!(id.len(), 16);
        assert_eq!(id.matches('-').count(), 4);
    }
}

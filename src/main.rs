mod aggregate;
mod anchor;
mod catalog;
mod codon;
mod locator;
mod pipeline;
mod report;
mod seqio;
mod translate;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use catalog::ProbeCatalog;
use pipeline::RunContext;

#[derive(Parser)]
#[command(name = "hetscreen")]
#[command(version)]
#[command(about = "Heteroresistance screening of M. tuberculosis sequencing reads")]
#[command(long_about = r#"
hetscreen - low-frequency variant screening at probe-anchored positions

For each probe in the probe table, the pipeline:
  1. Pre-filters the read corpus with a one-substitution pattern search
  2. Re-matches candidates at true edit distance <= 1 and anchors a codon
  3. Quality-filters the codon window (Phred alphabet @, ?, A-Z)
  4. Classifies each codon against the probe's reference allele
  5. Aggregates codon pairs into counts and percentage frequencies
  6. Translates both codon halves to amino acids

WORKFLOW:
  Probe table -> corpus pre-filter -> anchor resolution -> quality filter
  -> classification -> aggregation -> translation -> reports

OUTPUT FILES (stamped with the run timestamp):
  Merged_Report_{run}.csv      Variants joined onto probe metadata
  Unmerged_Report_{run}.csv    Raw aggregated variant rows
  Reference_Report_{run}.csv   The filtered probe table searched

EXAMPLES:
  # Screen a directory of FASTQ files (plain or .gz)
  hetscreen -p Probes_MTB.csv -d ./fastq/ -o reports/

  # Explicit input files
  hetscreen -p Probes_MTB.csv sample1.fastq sample2.fastq.gz -o reports/
"#)]
struct Args {
    #[arg(short = 'p', long, value_name = "FILE", help_heading = "Input")]
    probes: PathBuf,

    #[arg(short = 'd', long = "fastq-dir", value_name = "DIR", help_heading = "Input")]
    fastq_dir: Option<PathBuf>,

    #[arg(value_name = "FASTQ", help_heading = "Input")]
    fastq_files: Vec<PathBuf>,

    #[arg(short = 'o', long, value_name = "DIR", default_value = ".", help_heading = "Output")]
    outdir: PathBuf,

    #[arg(short = 'v', long, help_heading = "Output")]
    verbose: bool,

    #[arg(short = 't', long, value_name = "NUM", default_value = "0", help_heading = "Runtime")]
    threads: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let start_time = Instant::now();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .ok();

    // Catalog problems are the only terminal failure; everything after
    // this point degrades per probe or per read
    let catalog = ProbeCatalog::load(&args.probes)?;
    if catalog.probes().is_empty() {
        anyhow::bail!(
            "No usable probes in {} ({} rows excluded)",
            args.probes.display(),
            catalog.excluded_rows()
        );
    }
    if args.verbose {
        eprintln!(
            "Loaded {} probes ({} rows excluded)",
            catalog.probes().len(),
            catalog.excluded_rows()
        );
    }

    let fastq_files = match &args.fastq_dir {
        Some(dir) => seqio::find_fastq_files(dir)?,
        None => {
            if args.fastq_files.is_empty() {
                anyhow::bail!("No FASTQ input. Use --fastq-dir or pass files as arguments");
            }
            args.fastq_files.clone()
        }
    };

    if args.verbose {
        eprintln!("Reading {} FASTQ file(s)", fastq_files.len());
    }
    let corpus = seqio::load_corpus(&fastq_files)?;
    if args.verbose {
        eprintln!("Corpus: {} reads", corpus.len());
    }

    let ctx = RunContext {
        catalog: &catalog,
        corpus: &corpus,
        verbose: args.verbose,
    };
    let variants = pipeline::run(&ctx);

    let run_id = report::run_id();
    let paths = report::write_reports(&args.outdir, &run_id, &catalog, &variants)?;

    let positions_with_findings = {
        let mut ids: Vec<&str> = variants.iter().map(|v| v.gene_position_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    };

    eprintln!(
        "Screened {} probes against {} reads: {} variant rows at {} gene-positions",
        catalog.probes().len(),
        corpus.len(),
        variants.len(),
        positions_with_findings
    );
    eprintln!(
        "Reports written to {} (run {})",
        args.outdir.display(),
        run_id
    );

    if args.verbose {
        eprintln!("  {}", paths.merged.display());
        eprintln!("  {}", paths.unmerged.display());
        eprintln!("  {}", paths.reference.display());
        eprintln!("Total time: {:.1}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    ConversionSummary, DirectoryConfig, ThreadCount, convert_directory, convert_file,
    report::BatchReport,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert single-sample STR VCF files to CSV tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of worker threads (-1 uses all available CPUs)
    #[arg(short, long, global = true, default_value_t = -1, allow_negative_numbers = true)]
    threads: i64,

    /// Logging verbosity (e.g. error, warn, info, debug)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a single VCF file
    File {
        /// Input VCF (plain or gzip/BGZF compressed)
        #[arg(short, long, value_name = "PATH")]
        vcf: PathBuf,

        /// Output CSV path
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },
    /// Convert every VCF file in a directory
    Dir {
        /// Directory to search for *.vcf and *.vcf.gz files
        #[arg(short, long, value_name = "DIR")]
        directory: PathBuf,

        /// Directory that receives one CSV per input
        #[arg(short, long, value_name = "DIR")]
        outdir: PathBuf,

        /// Also search subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Write a JSON report of every job to this path
        #[arg(long, value_name = "JSON")]
        report: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let threads = ThreadCount::from_requested(cli.threads)?;

    match cli.command {
        Command::File { vcf, output } => {
            let summary = convert_file(&vcf, &output)
                .with_context(|| format!("failed to convert {}", vcf.display()))?;
            print_summary(&summary);
        }
        Command::Dir {
            directory,
            outdir,
            recursive,
            report,
        } => {
            let config = DirectoryConfig {
                source_dir: directory,
                output_dir: outdir,
                recursive,
                threads,
                report,
            };
            let report = convert_directory(&config)?;
            print_batch(&report);
            report.ensure_success()?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
    Ok(())
}

fn print_summary(summary: &ConversionSummary) {
    println!(
        "Processed {total} records; wrote {rows} rows.",
        total = summary.total_records,
        rows = summary.emitted_rows,
    );

    if summary.filtered_records > 0 {
        println!(
            "Dropped {count} loci with an uncallable filter tag.",
            count = summary.filtered_records
        );
    }

    if summary.skipped_records > 0 {
        println!(
            "Skipped {count} records without a readable copy number or depth.",
            count = summary.skipped_records
        );
    }
}

fn print_batch(report: &BatchReport) {
    println!(
        "Converted {ok} of {total} files using {workers} threads.",
        ok = report.succeeded,
        total = report.total(),
        workers = report.workers,
    );
    print_summary(&report.totals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_subcommand_with_defaults() {
        let cli = Cli::parse_from(["vcfconv", "file", "--vcf", "in.vcf", "--output", "out.csv"]);
        assert_eq!(cli.threads, -1);
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::File { vcf, output } => {
                assert_eq!(vcf, PathBuf::from("in.vcf"));
                assert_eq!(output, PathBuf::from("out.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_dir_subcommand_with_global_threads() {
        let cli = Cli::parse_from([
            "vcfconv",
            "dir",
            "--directory",
            "vcfs",
            "--outdir",
            "csvs",
            "-r",
            "--threads",
            "4",
            "--report",
            "run.json",
        ]);
        assert_eq!(cli.threads, 4);
        match cli.command {
            Command::Dir {
                directory,
                outdir,
                recursive,
                report,
            } => {
                assert_eq!(directory, PathBuf::from("vcfs"));
                assert_eq!(outdir, PathBuf::from("csvs"));
                assert!(recursive);
                assert_eq!(report, Some(PathBuf::from("run.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn accepts_negative_thread_count() {
        let cli = Cli::parse_from(["vcfconv", "-t", "-1", "file", "--vcf", "a", "--output", "b"]);
        assert_eq!(cli.threads, -1);
        assert!(ThreadCount::from_requested(cli.threads).is_ok());
    }

    #[test]
    fn parses_short_flags() {
        let cli = Cli::parse_from(["vcfconv", "file", "-v", "in.vcf.gz", "-o", "out.csv"]);
        assert!(matches!(
            cli.command,
            Command::File { ref vcf, ref output }
                if vcf == &PathBuf::from("in.vcf.gz") && output == &PathBuf::from("out.csv")
        ));

        let cli = Cli::parse_from(["vcfconv", "dir", "-d", "vcfs", "-o", "csvs", "-r"]);
        match cli.command {
            Command::Dir {
                directory,
                outdir,
                recursive,
                ..
            } => {
                assert_eq!(directory, PathBuf::from("vcfs"));
                assert_eq!(outdir, PathBuf::from("csvs"));
                assert!(recursive);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_output() {
        assert!(Cli::try_parse_from(["vcfconv", "file", "--vcf", "in.vcf"]).is_err());
    }
}

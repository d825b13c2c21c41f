//! Command-line interface for rust_powsim

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_powsim")]
#[command(version)]
#[command(about = "Simulate RNA-seq counts for differential expression power analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of worker threads (0 = all cores)
    #[arg(short, long, global = true, default_value_t = 0)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate one count matrix per replicate
    #[command(
        long_about = "Simulate one count matrix per replicate\n\n\
            Reads a JSON simulation config, draws the DE truth and per-replicate\n\
            seeds from the master seed and writes, for every replicate, the count\n\
            matrix at the largest sample sizes of the sweep plus its ground truth.\n\
            Smaller configurations are prefixes of these matrices.",
        after_long_help = "\
Examples:
  # Write replicate_<r>_counts.tsv and replicate_<r>_truth.tsv to sim/
  rust_powsim simulate -c config.json -o sim

  # Comma separated output on four threads
  rust_powsim simulate -c config.json -o sim --format csv -t 4"
    )]
    Simulate {
        /// Path to the JSON simulation config
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory, created if missing
        #[arg(short, long, default_value = "simulation")]
        output: PathBuf,

        /// Output table format: tsv or csv
        #[arg(short, long, default_value = "tsv")]
        format: String,
    },

    /// Validate a config and summarize the derived setup
    Check {
        /// Path to the JSON simulation config
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::parse_from([
            "rust_powsim", "-v", "simulate", "-c", "cfg.json", "-o", "out", "-t", "2",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.threads, 2);
        match cli.command {
            Commands::Simulate { config, output, format } => {
                assert_eq!(config, PathBuf::from("cfg.json"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(format, "tsv");
            }
            Commands::Check { .. } => panic!("expected simulate"),
        }
    }
}

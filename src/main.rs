use std::fs::File;
use std::io::Write;

use clap::{ArgAction, Parser, Subcommand};
use log::{info, Level};

use covalign::align::find_alignment;
use covalign::dups::{analyze_duplicates, format_duplicate_report};
use covalign::io::{read_sequence, InputError};
use covalign::logger;
use covalign::segment::format_segments;

#[derive(Parser, Debug)]
#[command(version, about = "DNA sequence alignment and tandem duplicate discovery", long_about = None)]
struct Args {
    /// Number of threads
    #[arg(short, default_value_t = 1)]
    threads: usize,

    /// Verbose output (repeat for more detail)
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align a query to a reference and report segments covering the whole query
    Align {
        /// Path to the query sequence (plain text or FASTA, optionally gzipped)
        query_path: String,

        /// Path to the reference sequence
        ref_path: String,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Report tandem repeats of the query that occur in the reference
    Dups {
        /// Path to the query sequence
        query_path: String,

        /// Path to the reference sequence
        ref_path: String,
    },
}

fn main() -> Result<(), InputError> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    logger::init(level).unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .unwrap();

    match args.command {
        Command::Align {
            query_path,
            ref_path,
            output,
        } => {
            let query = read_sequence(&query_path)?;
            let reference = read_sequence(&ref_path)?;
            info!(
                "Query length: {}, Reference length: {}",
                query.len(),
                reference.len()
            );
            let segments = find_alignment(&query, &reference);
            let line = format_segments(&segments);
            match output {
                Some(path) => {
                    let mut f = File::create(path)?;
                    writeln!(f, "{}", line)?;
                }
                None => println!("{}", line),
            }
        }
        Command::Dups {
            query_path,
            ref_path,
        } => {
            let query = read_sequence(&query_path)?;
            let reference = read_sequence(&ref_path)?;
            let duplicates = analyze_duplicates(&query, &reference);
            print!("{}", format_duplicate_report(&duplicates));
        }
    }

    Ok(())
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Args::command().debug_assert()
}

//! wrap2xml - Extract structured records from a segment document
//!
//! A command line tool that applies a wrapper definition to a page
//! segment document and writes the extracted records as XML to a file or
//! stdout.

use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use trellis_core::cluster::SegParams;
use trellis_core::convert::XmlResultWriter;
use trellis_core::error::{ExtractError, Result};
use trellis_core::facade::DocumentInput;
use trellis_core::graph::GraphParams;
use trellis_core::matcher::SearchBudget;
use trellis_core::pipeline::{ExtractOptions, process_document};
use trellis_core::wrapper::parse_wrapper;

/// A command line tool for applying a wrapper definition to a page
/// segment document and writing the extracted records as XML.
#[derive(Parser, Debug)]
#[command(name = "wrap2xml")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the segment document (JSON produced by the extraction facade)
    file: PathBuf,

    /// Path to the wrapper definition XML
    #[arg(short = 'w', long)]
    wrapper: PathBuf,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// A comma-separated list of page numbers to process (1-indexed)
    #[arg(short = 'p', long = "pagenos")]
    pagenos: Option<String>,

    /// Text encoding declared in the output XML
    #[arg(short = 'c', long, default_value = "utf-8")]
    codec: String,

    /// Remove control characters from XML output
    #[arg(short = 'S', long = "strip-control", action = ArgAction::SetTrue)]
    strip_control: bool,

    /// Search budget in assignments per wrapper application
    #[arg(long = "max-steps", default_value = "200000")]
    max_steps: usize,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// Parse page numbers from the -p option.
fn parse_page_numbers(args: &Args) -> Option<Vec<usize>> {
    let pagenos = args.pagenos.as_ref()?;
    let nums: Vec<usize> = pagenos
        .split(',')
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .collect();
    if nums.is_empty() { None } else { Some(nums) }
}

fn process_file<W: Write>(path: &PathBuf, writer: &mut W, args: &Args) -> Result<()> {
    let wrapper_xml = std::fs::read_to_string(&args.wrapper)?;
    let wrapper = parse_wrapper(&wrapper_xml)?;

    let data = std::fs::read_to_string(path)?;
    let input: DocumentInput =
        serde_json::from_str(&data).map_err(|e| ExtractError::SegmentDocument(e.to_string()))?;

    let options = ExtractOptions {
        pages: parse_page_numbers(args),
        seg_params: SegParams::default(),
        graph_params: GraphParams::default(),
        budget: SearchBudget {
            max_steps: args.max_steps,
        },
    };

    let results = process_document(&input, &wrapper, &options)?;

    let mut converter = XmlResultWriter::with_options(writer, &args.codec, args.strip_control);
    for page in &results {
        converter.write_page(page);
    }
    converter.close();

    Ok(())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // Help and version are not usage errors.
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if args.debug {
        eprintln!("Debug mode enabled");
    }

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        match File::create(&args.outfile) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Failed to create output file {}: {}", args.outfile, e);
                std::process::exit(1);
            }
        }
    };

    if !args.file.exists() {
        eprintln!("Error: File not found: {}", args.file.display());
        std::process::exit(1);
    }

    if let Err(e) = process_file(&args.file, &mut output, &args) {
        eprintln!("Error processing {}: {}", args.file.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = output.flush() {
        eprintln!("Error flushing output: {}", e);
        std::process::exit(1);
    }
}

//! dumpgraph - Dump a page's document graph as XML
//!
//! A debugging aid for wrapper authoring: shows the nodes and derived
//! edges a wrapper would be matched against at a given granularity.

use clap::{ArgAction, Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use trellis_core::convert::{enc_attr, enc_text};
use trellis_core::error::{ExtractError, Result};
use trellis_core::facade::DocumentInput;
use trellis_core::geom::bbox2str;
use trellis_core::graph::DocumentGraph;
use trellis_core::pipeline::{ExtractOptions, build_page_graph};
use trellis_core::wrapper::{Granularity, Wrapper};

/// Segment granularity for graph construction.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum GranularityArg {
    /// Raw text segments as delivered by the facade
    RawLine,
    /// Raw segments merged into logical lines
    Line,
    /// Lines clustered into blocks (default)
    #[default]
    Block,
}

impl From<GranularityArg> for Granularity {
    fn from(value: GranularityArg) -> Self {
        match value {
            GranularityArg::RawLine => Granularity::RawLine,
            GranularityArg::Line => Granularity::Line,
            GranularityArg::Block => Granularity::Block,
        }
    }
}

/// Dump the document graph of each page of a segment document as XML.
#[derive(Parser, Debug)]
#[command(name = "dumpgraph")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the segment document (JSON produced by the extraction facade)
    file: PathBuf,

    /// Granularity for graph construction
    #[arg(short = 'g', long, value_enum, default_value = "block")]
    granularity: GranularityArg,

    /// A comma-separated list of page numbers to dump (1-indexed)
    #[arg(short = 'p', long = "pagenos")]
    pagenos: Option<String>,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Drop whitespace-only segments
    #[arg(long = "skip-spaces", action = ArgAction::SetTrue)]
    skip_spaces: bool,
}

fn write_graph<W: Write>(writer: &mut W, page: usize, graph: &DocumentGraph) -> io::Result<()> {
    writeln!(writer, "<page id=\"{}\">", page)?;
    for (id, node) in graph.nodes() {
        let seg = &node.seg;
        writeln!(
            writer,
            "<node id=\"{}\" bbox=\"{}\" font=\"{}\" size=\"{:.1}\">{}</node>",
            id.0,
            bbox2str((seg.x0, seg.y0, seg.x1, seg.y1)),
            enc_attr(seg.font_name.as_deref().unwrap_or("")),
            seg.size(),
            enc_text(seg.text_str()),
        )?;
    }
    for (_, edge) in graph.edges() {
        writeln!(
            writer,
            "<edge from=\"{}\" to=\"{}\" relation=\"{}\" weight=\"{:.3}\" crosses-ruling=\"{}\"/>",
            edge.from.0,
            edge.to.0,
            edge.relation.as_str(),
            edge.weight,
            edge.crosses_ruling,
        )?;
    }
    writeln!(writer, "</page>")?;
    Ok(())
}

fn process_file<W: Write>(path: &PathBuf, writer: &mut W, args: &Args) -> Result<()> {
    let data = std::fs::read_to_string(path)?;
    let input: DocumentInput =
        serde_json::from_str(&data).map_err(|e| ExtractError::SegmentDocument(e.to_string()))?;

    let wanted: Option<Vec<usize>> = args.pagenos.as_ref().map(|p| {
        p.split(',')
            .filter_map(|s| s.trim().parse::<usize>().ok())
            .collect()
    });

    // The graph builder takes its granularity and filter flags from a
    // wrapper; a bare one stands in for wrapper-less dumping.
    let mut probe = Wrapper::new("dump", DocumentGraph::new());
    probe.granularity = args.granularity.into();
    probe.process_spaces = !args.skip_spaces;

    let options = ExtractOptions::default();

    writeln!(writer, "<?xml version=\"1.0\" encoding=\"utf-8\" ?>")?;
    writeln!(writer, "<document-graph>")?;
    for page in &input.pages {
        if wanted.as_ref().is_some_and(|w| !w.contains(&page.page)) {
            continue;
        }
        let graph = build_page_graph(page, &probe, &options);
        write_graph(writer, page.page, &graph)?;
    }
    writeln!(writer, "</document-graph>")?;
    Ok(())
}

fn main() {
    let args = Args::parse();

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

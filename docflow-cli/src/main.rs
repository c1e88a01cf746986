//! docflow: lay out a styled document for a paginated emitter.
//!
//! Reads a JSON document description (see `docflow_dom::document`), resolves
//! styles, box geometry, margin collapsing and table columns, and prints the
//! resulting layout tree either as JSON for an emitter or as an indented
//! outline for inspection. Diagnostics go to stderr.
//!
//! ```text
//! docflow page.json                     # outline
//! docflow page.json --format json       # layout tree for an emitter
//! docflow - --page-width 500 < page.json
//! ```

use std::fmt::Write as _;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;

use docflow_common::{Diagnostic, DiagnosticKind};
use docflow_css::layout::{BoxKind, EdgeSizes, LayoutBox};
use docflow_css::{LayoutConfig, LayoutOutput, build};
use docflow_dom::StyledTree;

/// docflow: styled HTML to paginated document layout
#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the layout outline
    docflow report.json

    # Emit the layout tree as JSON
    docflow report.json --format json > layout.json

    # Narrower page, custom configuration
    docflow report.json --config a5.json --page-width 420

    # Read the document from stdin and show debug logging
    cat report.json | docflow - -vv
"#)]
struct Cli {
    /// JSON document description, or `-` for stdin
    #[arg(value_name = "FILE")]
    document: PathBuf,

    /// JSON layout configuration; missing fields take their defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page body width in px (overrides the configuration file)
    #[arg(short = 'w', long, value_name = "PX")]
    page_width: Option<f32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Outline)]
    format: Format,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// More logging (-v warnings, -vv debug, -vvv trace); `RUST_LOG` wins
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not print the diagnostics report
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented box outline with geometry
    Outline,
    /// The full layout tree and diagnostics as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let tree = load_document(&cli.document)?;
    let output = build(&tree, &config, None);

    match cli.format {
        Format::Json => {
            let json = if cli.compact {
                serde_json::to_string(&output)
            } else {
                serde_json::to_string_pretty(&output)
            }
            .context("failed to serialize the layout tree")?;
            println!("{json}");
        }
        Format::Outline => print_outline(&output, &config),
    }

    if !cli.quiet {
        print_diagnostics(&output.diagnostics);
    }
    Ok(())
}

/// Diagnostics are mirrored to `warn`, so the default level stays below it
/// to avoid printing each one twice.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn load_config(cli: &Cli) -> Result<LayoutConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            LayoutConfig::from_json(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => LayoutConfig::default(),
    };
    if let Some(width) = cli.page_width {
        config = config.with_page_width(width);
        config.validate().context("invalid --page-width")?;
    }
    log::debug!(target: "docflow::cli", "configuration: {config:?}");
    Ok(config)
}

fn load_document(path: &Path) -> Result<StyledTree> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        let _ = std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read the document from stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document {}", path.display()))?
    };
    let tree = StyledTree::from_json(&text)
        .with_context(|| format!("invalid document {}", path.display()))?;
    log::info!(target: "docflow::cli", "loaded {} nodes from {}", tree.len(), path.display());
    Ok(tree)
}

fn print_outline(output: &LayoutOutput, config: &LayoutConfig) {
    println!(
        "=== Layout Tree (page width: {:.1}px) ===\n",
        config.page_content_width
    );
    let mut out = String::new();
    write_layout_box(&mut out, &output.root, 0);
    print!("{out}");
}

/// One box per entry: label and content width, then any non-zero spacing,
/// margins and padding, then the role-specific details.
fn write_layout_box(out: &mut String, layout_box: &LayoutBox, depth: usize) {
    let indent = "  ".repeat(depth);
    let dims = &layout_box.dimensions;

    let _ = write!(out, "{indent}[{}] w={:.1}", layout_box.label(), dims.content_width);
    if let Some(height) = dims.content_height {
        let _ = write!(out, " h={height:.1}");
    }
    out.push('\n');

    let spacing = layout_box.spacing;
    if spacing.before != 0.0 || spacing.after != 0.0 {
        let _ = writeln!(
            out,
            "{indent}  spacing: before={:.1} after={:.1}",
            spacing.before, spacing.after
        );
    }
    write_edges(out, &indent, "margin", &dims.margin);
    write_edges(out, &indent, "padding", &dims.padding);
    write_edges(out, &indent, "border", &dims.border);
    if !layout_box.breaks.is_auto() {
        let _ = writeln!(
            out,
            "{indent}  page-break: before={} after={}",
            layout_box.breaks.before, layout_box.breaks.after
        );
    }

    match &layout_box.kind {
        BoxKind::Table(table) => {
            let widths: Vec<String> = table
                .geometry
                .column_widths
                .iter()
                .map(|w| format!("{w:.1}"))
                .collect();
            let _ = writeln!(out, "{indent}  columns: [{}]", widths.join(", "));
            if let Some(caption) = &table.caption {
                let _ = writeln!(out, "{indent}  caption:");
                write_layout_box(out, caption, depth + 2);
            }
        }
        BoxKind::TableCell { placement, .. } => {
            let _ = writeln!(
                out,
                "{indent}  slot: row={} col={} span={}x{}",
                placement.row, placement.column, placement.colspan, placement.rowspan
            );
        }
        BoxKind::Image(image) => {
            let what = if image.placeholder {
                "placeholder".to_string()
            } else if let Some(raster) = &image.raster {
                format!("raster {}x{} {}", raster.width, raster.height, raster.media_type)
            } else {
                image.source.clone().unwrap_or_default()
            };
            let _ = writeln!(
                out,
                "{indent}  image: {what} at {:.1}x{:.1}",
                image.target.width, image.target.height
            );
        }
        BoxKind::List(marker) => {
            let _ = writeln!(
                out,
                "{indent}  marker: {} #{} level {}",
                marker.style_type, marker.ordinal, marker.level
            );
        }
        BoxKind::InlineRun(run) => {
            if let Some(link) = &run.link {
                let _ = writeln!(out, "{indent}  link: {link}");
            }
        }
        BoxKind::Block { .. } | BoxKind::TableRow { .. } => {}
    }

    for child in &layout_box.children {
        write_layout_box(out, child, depth + 1);
    }
}

fn write_edges(out: &mut String, indent: &str, name: &str, edges: &EdgeSizes) {
    if edges.top == 0.0 && edges.right == 0.0 && edges.bottom == 0.0 && edges.left == 0.0 {
        return;
    }
    let _ = writeln!(
        out,
        "{indent}  {name}: t={:.1} r={:.1} b={:.1} l={:.1}",
        edges.top, edges.right, edges.bottom, edges.left
    );
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    let color = std::io::stderr().is_terminal();
    if diagnostics.is_empty() {
        if color {
            eprintln!("{}", "no diagnostics".green());
        } else {
            eprintln!("no diagnostics");
        }
        return;
    }

    eprintln!("\n=== Diagnostics ({}) ===", diagnostics.len());
    for diagnostic in diagnostics {
        let tag = format!("[{} {}]", diagnostic.component, diagnostic.kind);
        if color {
            let tag = match diagnostic.kind {
                DiagnosticKind::StyleParse => tag.yellow().to_string(),
                DiagnosticKind::LayoutInconsistency => tag.magenta().to_string(),
                DiagnosticKind::UnsupportedNodeKind => tag.cyan().to_string(),
                DiagnosticKind::ExternalServiceFailure => tag.red().to_string(),
            };
            eprintln!("  {tag} {}", diagnostic.message);
        } else {
            eprintln!("  {tag} {}", diagnostic.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_shows_geometry_and_details() {
        let tree = StyledTree::from_json(
            r#"{ "tag": "body", "children": [
                { "tag": "ol", "children": [ { "tag": "li", "children": [ { "text": "item" } ] } ] },
                { "tag": "table", "children": [ { "tag": "tr", "children": [
                    { "tag": "td", "children": [ { "text": "a" } ] },
                    { "tag": "td", "children": [ { "text": "b" } ] }
                ] } ] }
            ] }"#,
        )
        .expect("valid document");
        let output = build(&tree, &LayoutConfig::default().with_page_width(200.0), None);
        let mut out = String::new();
        write_layout_box(&mut out, &output.root, 0);

        assert!(out.starts_with("[Block <body>] w=200.0\n"));
        assert!(out.contains("marker: decimal #1 level 0"));
        assert!(out.contains("columns: [100.0, 100.0]"));
        assert!(out.contains("[Run(\"item\")]"));
        assert!(out.contains("slot: row=0 col=1 span=1x1"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "docflow",
            "doc.json",
            "--format",
            "json",
            "--compact",
            "-w",
            "480",
            "-vv",
        ])
        .expect("valid arguments");
        assert_eq!(cli.format, Format::Json);
        assert!(cli.compact);
        assert_eq!(cli.page_width, Some(480.0));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_page_width_override_is_validated() {
        let cli = Cli::try_parse_from(["docflow", "doc.json", "--page-width", "0"])
            .expect("valid arguments");
        assert!(load_config(&cli).is_err());
    }
}

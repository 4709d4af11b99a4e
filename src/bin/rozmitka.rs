//! rozmitka - NER review CLI
//!
//! Takes recorded token-classification output (spans with `LABEL_n` codes,
//! character offsets, confidence scores), runs it through the review
//! pipeline, and prints whichever view the reviewer needs.
//!
//! # Capabilities
//!
//! - **Filtering**: category mapping, confidence threshold, bounds checks
//! - **BIO labeling**: whitespace tokens reconciled against entity spans
//! - **Highlighting**: annotated terminal output or self-contained HTML
//! - **Export**: `word,label` CSV for annotation handoff
//!
//! # Usage
//!
//! ```bash
//! # Analyze with recorded pipeline JSON
//! rozmitka analyze -f article.txt --spans model_output.json
//!
//! # Inline spans, character offsets
//! rozmitka analyze -t "Зустріч у Києві" --span "Києві:LABEL_5:10:15"
//!
//! # Tighten the confidence threshold, render the HTML review page
//! rozmitka analyze -f article.txt -s spans.json --threshold 0.8 --format html -o review.html
//!
//! # Export word,label CSV
//! rozmitka export -f article.txt -s spans.json --save
//!
//! # Show the label scheme and defaults
//! rozmitka info
//! ```

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;

use rozmitka::{
    Analyzer, Category, EntitySpan, LabelConfig, MockExtractor, OverlapPolicy, Review, Segment,
    TagPolicy, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};

// ============================================================================
// CLI Structure
// ============================================================================

/// NER review CLI - filter, label, highlight, export
#[derive(Parser)]
#[command(name = "rozmitka")]
#[command(
    version,
    about = "Review NER model output over Ukrainian text",
    long_about = r#"
rozmitka - a review toolkit for NER model output

Model inference happens elsewhere. This tool takes the recorded output
(spans with LABEL_n codes, character offsets, confidence scores) and
turns it into reviewable views.

PIPELINE:
  filter     : drop unmapped codes, sub-threshold scores, bad offsets
  resolve    : one winner per overlapping region, by policy
  reconcile  : whitespace tokens labeled B-/I-/O against the spans
  summarize  : deduplicated surface forms per category (PER, ORG, LOC)

EXAMPLES:
  rozmitka analyze -f article.txt --spans model_output.json
  rozmitka analyze -t "Зустріч у Києві" --span "Києві:LABEL_5:10:15"
  rozmitka export -f article.txt -s spans.json --save
  rozmitka info
"#
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text to analyze (shorthand for `rozmitka analyze`)
    #[arg(trailing_var_arg = true)]
    text: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the review pipeline and print a chosen view
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Write the word,label CSV for a text
    #[command(visible_alias = "x")]
    Export(ExportArgs),

    /// Show the label scheme, categories, and defaults
    #[command(visible_alias = "i")]
    Info,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Input text to analyze
    #[arg(short, long)]
    text: Option<String>,

    /// Read input text from file
    #[arg(short, long, value_name = "PATH")]
    file: Option<String>,

    /// Recorded model output: a JSON array of spans
    ///
    /// Accepts the raw JSON of a Hugging Face token-classification
    /// pipeline as-is (`entity_group` and `word` field names work).
    #[arg(short, long, value_name = "PATH")]
    spans: Option<String>,

    /// Inline span in "text:code:start:end" form (repeatable)
    ///
    /// Offsets are characters. Inline spans carry full confidence; use
    /// --spans with recorded JSON to exercise the threshold.
    /// Example: --span "Києві:LABEL_5:10:15"
    #[arg(long = "span", value_name = "SPEC")]
    span_specs: Vec<String>,

    /// Minimum confidence for a span to survive filtering
    #[arg(long, value_name = "SCORE")]
    threshold: Option<f64>,

    /// Tag policy for token labeling
    #[arg(long, default_value = "wellformed")]
    tags: TagMode,

    /// Overlap resolution policy
    #[arg(long, default_value = "score")]
    overlaps: OverlapMode,

    /// Output format
    #[arg(long, default_value = "human")]
    format: OutputFormat,

    /// Write output to file instead of stdout (non-human formats)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Show accepted spans with scores and BIO diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Minimal output (suppress non-essential messages)
    #[arg(short, long)]
    quiet: bool,

    /// Positional text argument
    #[arg(trailing_var_arg = true)]
    positional: Vec<String>,
}

#[derive(Parser)]
struct ExportArgs {
    /// Input text to analyze
    #[arg(short, long)]
    text: Option<String>,

    /// Read input text from file
    #[arg(short, long, value_name = "PATH")]
    file: Option<String>,

    /// Recorded model output: a JSON array of spans
    #[arg(short, long, value_name = "PATH")]
    spans: Option<String>,

    /// Inline span in "text:code:start:end" form (repeatable)
    #[arg(long = "span", value_name = "SPEC")]
    span_specs: Vec<String>,

    /// Minimum confidence for a span to survive filtering
    #[arg(long, value_name = "SCORE")]
    threshold: Option<f64>,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Write to the conventional export file name in the current directory
    #[arg(long, conflicts_with = "output")]
    save: bool,

    /// Minimal output (suppress non-essential messages)
    #[arg(short, long)]
    quiet: bool,

    /// Positional text argument
    #[arg(trailing_var_arg = true)]
    positional: Vec<String>,
}

/// Unified output format selection
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output (default)
    #[default]
    Human,
    /// Full review as pretty-printed JSON
    Json,
    /// Tab-separated word/label lines
    Tsv,
    /// Self-contained HTML review page
    Html,
}

/// Token labeling policy
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum TagMode {
    /// Structurally valid BIO derived from span runs (default)
    #[default]
    Wellformed,
    /// Raw id2label codes passed through, warts and all
    Verbatim,
}

impl TagMode {
    fn to_policy(self) -> TagPolicy {
        match self {
            Self::Wellformed => TagPolicy::WellFormed,
            Self::Verbatim => TagPolicy::Verbatim,
        }
    }
}

/// Overlap resolution policy
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OverlapMode {
    /// Keep the higher-scoring span; ties go to the earlier one (default)
    #[default]
    Score,
    /// Keep whichever span was accepted first
    First,
    /// Keep the longer span; ties go to the higher score
    Longest,
}

impl OverlapMode {
    fn to_policy(self) -> OverlapPolicy {
        match self {
            Self::Score => OverlapPolicy::HighestScore,
            Self::First => OverlapPolicy::KeepFirst,
            Self::Longest => OverlapPolicy::LongestSpan,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<(), String> = match cli.command {
        Some(Commands::Analyze(args)) => cmd_analyze(args),
        Some(Commands::Export(args)) => cmd_export(args),
        Some(Commands::Info) => cmd_info(),
        None => {
            // No subcommand: treat positional args as text to analyze
            if cli.text.is_empty() {
                eprintln!("No input provided. Run `rozmitka --help` for usage.");
                return ExitCode::FAILURE;
            }
            let text = cli.text.join(" ");
            cmd_analyze(AnalyzeArgs {
                text: Some(text),
                file: None,
                spans: None,
                span_specs: Vec::new(),
                threshold: None,
                tags: TagMode::default(),
                overlaps: OverlapMode::default(),
                format: OutputFormat::default(),
                output: None,
                verbose: false,
                quiet: false,
                positional: Vec::new(),
            })
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", color("31", "error:"), e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let text = get_input_text(&args.text, args.file.as_deref(), &args.positional)?;
    let spans = collect_spans(args.spans.as_deref(), &args.span_specs)?;

    let analyzer = build_analyzer(spans, args.threshold)
        .with_tag_policy(args.tags.to_policy())
        .with_overlap_policy(args.overlaps.to_policy());

    let review = analyzer
        .analyze(&text)
        .map_err(|e| format_error("analyze text", &e.to_string()))?;

    match args.format {
        OutputFormat::Human => {
            let segments =
                rozmitka::highlight_segments(&review.text, &review.spans, analyzer.config());
            print_review(&review, &segments, args.verbose, args.quiet);
            Ok(())
        }
        OutputFormat::Json => {
            let json = review
                .to_json()
                .map_err(|e| format_error("render JSON", &e.to_string()))?;
            write_output(&json, args.output.as_deref())
        }
        OutputFormat::Tsv => {
            let mut out = String::new();
            for token in &review.tokens {
                out.push_str(&format!("{}\t{}\n", token.text, token.tag.label()));
            }
            write_output(&out, args.output.as_deref())
        }
        OutputFormat::Html => write_output(&review.to_html(), args.output.as_deref()),
    }
}

fn cmd_export(args: ExportArgs) -> Result<(), String> {
    let text = get_input_text(&args.text, args.file.as_deref(), &args.positional)?;
    let spans = collect_spans(args.spans.as_deref(), &args.span_specs)?;

    let review = build_analyzer(spans, args.threshold)
        .analyze(&text)
        .map_err(|e| format_error("analyze text", &e.to_string()))?;

    let csv = review
        .to_csv()
        .map_err(|e| format_error("render CSV", &e.to_string()))?;

    let path = if args.save {
        Some(EXPORT_FILE_NAME)
    } else {
        args.output.as_deref()
    };
    write_output(&csv, path)?;

    if let Some(p) = path {
        log_success(
            &format!("wrote {} ({}, {} rows)", p, EXPORT_CONTENT_TYPE, review.tokens.len()),
            args.quiet,
        );
    }
    Ok(())
}

fn cmd_info() -> Result<(), String> {
    let config = LabelConfig::default();

    println!();
    println!("{}", color("1;36", "rozmitka"));
    println!("  NER review: span filtering, BIO labeling, highlighting, CSV export");
    println!();
    println!("{}:", color("1;33", "Version"));
    println!("  {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("{}:", color("1;33", "Categories"));
    for category in Category::ALL {
        let col = type_color(category.as_label());
        println!(
            "  {}  {} (highlight {})",
            color(col, category.as_label()),
            category.name(),
            category.color()
        );
    }
    println!();

    println!("{}:", color("1;33", "Label Codes"));
    for (id, label) in config.label_entries() {
        let note = if label.eq_ignore_ascii_case("o") {
            "outside any entity".to_string()
        } else {
            match config.category_of(&format!("LABEL_{id}")) {
                Some(c) => c.name().to_string(),
                None => "dropped at filtering".to_string(),
            }
        };
        println!("  LABEL_{:<2} {:<6} {}", id, label, note);
    }
    println!();

    println!("{}:", color("1;33", "Defaults"));
    println!("  score threshold   {}", config.threshold());
    println!("  tag policy        wellformed");
    println!("  overlap policy    score");
    println!();
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn get_input_text(
    text: &Option<String>,
    file: Option<&str>,
    positional: &[String],
) -> Result<String, String> {
    // Check explicit text arg
    if let Some(t) = text {
        return Ok(t.clone());
    }

    // Check file arg
    if let Some(f) = file {
        return read_input_file(f);
    }

    // Check positional args
    if !positional.is_empty() {
        return Ok(positional.join(" "));
    }

    // Try stdin
    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format_error("read stdin", &e.to_string()))?;
        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    Err("No input text provided. Use -t 'text' or -f file or pipe via stdin".to_string())
}

/// Read a file with consistent error handling
fn read_input_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format_error("read file", &format!("{}: {}", path, e)))
}

/// Gather spans from a recorded JSON file and/or inline specs
fn collect_spans(path: Option<&str>, specs: &[String]) -> Result<Vec<EntitySpan>, String> {
    let mut spans = Vec::new();

    if let Some(p) = path {
        let json = read_input_file(p)?;
        let mut recorded: Vec<EntitySpan> = serde_json::from_str(&json)
            .map_err(|e| format_error("parse span JSON", &format!("{}: {}", p, e)))?;
        spans.append(&mut recorded);
    }

    for spec in specs {
        match parse_span_spec(spec) {
            Some(span) => spans.push(span),
            None => {
                return Err(format!(
                    "Invalid span spec '{}'. Expected text:code:start:end",
                    spec
                ));
            }
        }
    }

    Ok(spans)
}

/// Parse an inline span with format: "text:code:start:end"
/// Uses rsplit so the text portion may itself contain colons
fn parse_span_spec(s: &str) -> Option<EntitySpan> {
    let parts: Vec<&str> = s.rsplitn(4, ':').collect();
    if parts.len() < 4 {
        return None;
    }

    let end: usize = parts[0].parse().ok()?;
    let start: usize = parts[1].parse().ok()?;
    let code = parts[2].to_string();
    let text = parts[3].to_string();

    Some(EntitySpan::new(code, start, end, 1.0, text))
}

fn build_analyzer(spans: Vec<EntitySpan>, threshold: Option<f64>) -> Analyzer {
    let mut config = LabelConfig::default();
    if let Some(t) = threshold {
        config = config.with_threshold(t);
    }
    Analyzer::new(MockExtractor::new("recorded").with_spans(spans)).with_config(config)
}

/// Write output to file or stdout with consistent error handling
fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(output_path) = path {
        // Ensure parent directory exists
        if let Some(parent) = std::path::Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    format_error("create directory", &format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        fs::write(output_path, content)
            .map_err(|e| format_error("write output", &format!("{}: {}", output_path, e)))?;
    } else {
        print!("{}", content);
    }
    Ok(())
}

/// Format error message consistently
fn format_error(operation: &str, details: &str) -> String {
    format!("Failed to {}: {}", operation, details)
}

/// Log info message (respects quiet flag)
fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Log success message with color (respects quiet flag)
fn log_success(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{} {}", color("32", "✓"), msg);
    }
}

fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

fn type_color(label: &str) -> &'static str {
    match label.to_lowercase().as_str() {
        "person" | "per" => "1;34",
        "organization" | "org" => "1;32",
        "location" | "loc" => "1;33",
        _ => "1;37",
    }
}

// ============================================================================
// Human Output
// ============================================================================

fn print_review(review: &Review, segments: &[Segment], verbose: bool, quiet: bool) {
    log_info(&format!("{} span(s) accepted", review.spans.len()), quiet);

    print_annotated(segments);

    println!();
    for line in review.summary.lines() {
        println!("  {}", line);
    }

    if verbose && !review.spans.is_empty() {
        println!();
        for span in &review.spans {
            println!(
                "  {:<24} {:<8} {:>5.2}  {}..{}",
                span.text, span.label, span.score, span.start, span.end
            );
        }
    }

    let issues = review.validation();
    if verbose && !issues.is_empty() {
        println!();
        for issue in &issues {
            println!("  {} {}", color("33", "warn:"), issue);
        }
    }
}

fn print_annotated(segments: &[Segment]) {
    let mut result = String::new();

    for segment in segments {
        match segment {
            Segment::Text(t) => result.push_str(t),
            Segment::Entity { text, category, .. } => {
                let label = category.map(|c| c.as_label()).unwrap_or("???");
                let col = type_color(label);
                result.push_str(&color(col, &format!("[{}: {}]", label, text)));
            }
        }
    }

    println!();
    for line in result.lines() {
        println!("  {}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

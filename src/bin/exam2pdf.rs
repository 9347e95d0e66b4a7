//! CLI binary for exam2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `DocumentConfig`, runs the pipeline and prints one outcome line.

use anyhow::{Context, Result};
use clap::Parser;
use exam2pdf::{
    convert_to_file, render_html, Exam2PdfError, Extensions, Profile, ProgressCallback,
    RenderProgressCallback, RunOutcome, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the running stage, plus one
/// log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        let step = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0) + 1;
        self.bar.set_prefix(format!("{step}/{}", Stage::ALL.len()));
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<22} {}",
            green("✓"),
            stage.label(),
            dim(&format!("{elapsed_ms}ms")),
        ));
        if stage == Stage::Pdf {
            self.bar.finish_and_clear();
        }
    }

    fn on_engine_error(&self, error: &str) {
        // Keep the line readable; the full detail is in the outcome message.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.finish_and_clear();
        eprintln!("  {} {}", red("✗"), red(&msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Exam paper with the built-in header block
  exam2pdf paper.md

  # Study notes; 📘/🔹/✅ lines become headings
  exam2pdf --profile syllabus-topics notes.md -o topics.pdf

  # Read Markdown from stdin
  cat paper.md | exam2pdf --profile consolidated-paper -

  # Own header strings
  exam2pdf --title "MID-TERM EXAMINATION" --course "CS101" \
           --info "Time: 2 Hours" --info "Maximum: 50 Marks" paper.md

  # Inspect the HTML handed to the PDF engine
  exam2pdf --html-only paper.md > paper.html

  # Machine-readable report
  exam2pdf --json paper.md

PROFILES:
  exam-paper          A4, header block, floated (N marks)   → exam_paper_formatted.pdf
  consolidated-paper  tables only, no header                 → consolidated_paper.pdf
  syllabus-topics     letter, emoji section markers          → important_topics.pdf
  field-table         one bordered table, Times New Roman    → final_clean_table.pdf

ENVIRONMENT VARIABLES:
  EXAM2PDF_PROFILE, EXAM2PDF_OUTPUT, EXAM2PDF_STYLESHEET, EXAM2PDF_TITLE,
  EXAM2PDF_COURSE, EXAM2PDF_INFO (';'-separated), EXAM2PDF_EXTENSIONS, …
  RUST_LOG overrides the log filter chosen by --verbose/--quiet.
"#;

/// Render Markdown exam papers and study notes to styled PDF.
#[derive(Parser, Debug)]
#[command(
    name = "exam2pdf",
    version,
    about = "Render Markdown exam papers and study notes to styled PDF",
    long_about = "Render Markdown exam papers and study notes to styled PDF. The Markdown is \
rendered to HTML, wrapped with a profile stylesheet and header block, then laid out with Typst.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown source file. `-` or omitted reads stdin.
    input: Option<PathBuf>,

    /// Document profile: stylesheet, header, extensions and prefix rules.
    #[arg(short, long, env = "EXAM2PDF_PROFILE", value_enum, default_value = "exam-paper")]
    profile: ProfileArg,

    /// Write the PDF here. Default: the profile's output file name.
    #[arg(short, long, env = "EXAM2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// CSS file that replaces the profile stylesheet.
    #[arg(long, env = "EXAM2PDF_STYLESHEET")]
    stylesheet: Option<PathBuf>,

    /// Header title (`<h1>`).
    #[arg(long, env = "EXAM2PDF_TITLE")]
    title: Option<String>,

    /// Header course or paper name.
    #[arg(long, env = "EXAM2PDF_COURSE")]
    course: Option<String>,

    /// Header metadata line; repeat for several. Replaces the profile's lines.
    #[arg(long = "info", env = "EXAM2PDF_INFO", value_delimiter = ';')]
    info: Vec<String>,

    /// Drop the profile's header block.
    #[arg(long, env = "EXAM2PDF_NO_HEADER")]
    no_header: bool,

    /// Text of the HTML `<title>` and the PDF title metadata.
    #[arg(long, env = "EXAM2PDF_PAGE_TITLE")]
    page_title: Option<String>,

    /// Markdown extensions: all, none, or a list of tables,fenced-code,line-breaks.
    #[arg(long, env = "EXAM2PDF_EXTENSIONS")]
    extensions: Option<String>,

    /// Print the assembled HTML document to stdout instead of writing a PDF.
    #[arg(long, env = "EXAM2PDF_HTML_ONLY")]
    html_only: bool,

    /// Print the render report as JSON on stdout.
    #[arg(long, env = "EXAM2PDF_JSON")]
    json: bool,

    /// List the built-in profiles and exit.
    #[arg(long)]
    list_profiles: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "EXAM2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXAM2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress everything except the outcome line and errors.
    #[arg(short, long, env = "EXAM2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    ExamPaper,
    ConsolidatedPaper,
    SyllabusTopics,
    FieldTable,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::ExamPaper => Profile::ExamPaper,
            ProfileArg::ConsolidatedPaper => Profile::ConsolidatedPaper,
            ProfileArg::SyllabusTopics => Profile::SyllabusTopics,
            ProfileArg::FieldTable => Profile::FieldTable,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.html_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List profiles ────────────────────────────────────────────────────
    if cli.list_profiles {
        for profile in Profile::ALL {
            println!(
                "{:<20} {:<26} {}",
                bold(profile.name()),
                profile.default_output(),
                dim(profile.description())
            );
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let profile: Profile = cli.profile.into();
    let source = read_source(cli.input.as_deref())?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RenderProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, profile, source, progress_cb)?;

    // ── HTML only ────────────────────────────────────────────────────────
    if cli.html_only {
        let html = render_html(&config);
        io::stdout()
            .lock()
            .write_all(html.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    // ── Render ───────────────────────────────────────────────────────────
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(profile.default_output()));

    let result = convert_to_file(&config, &output);
    let outcome = RunOutcome::from_result(&result);

    if cli.json {
        if let Ok(ref report) = result {
            let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
            println!("{json}");
        }
        eprintln!("{}", outcome.message());
    } else {
        println!("{}", outcome.message());
        if let Ok(ref report) = result {
            if !cli.quiet {
                for warning in &report.warnings {
                    eprintln!("  {} {}", dim("warning:"), dim(warning));
                }
                if outcome.is_success() {
                    eprintln!(
                        "   {}  {}ms total",
                        dim(&format!("{} bytes", report.bytes_written)),
                        report.timings.total_ms
                    );
                }
            }
        }
    }

    Ok(())
}

/// Read the Markdown source from a file, or from stdin for `-` / no path.
fn read_source(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path).map_err(|source| {
                Exam2PdfError::InputReadFailed {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Ok(text)
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| Exam2PdfError::InputReadFailed {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(text)
        }
    }
}

/// Map CLI args onto the profile's defaults.
fn build_config(
    cli: &Cli,
    profile: Profile,
    source: String,
    progress: Option<ProgressCallback>,
) -> Result<exam2pdf::DocumentConfig> {
    let mut builder = profile.config_builder(source);

    if let Some(ref path) = cli.stylesheet {
        let css = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet from {:?}", path))?;
        builder = builder.stylesheet(css);
    }

    let mut header = if cli.no_header {
        Default::default()
    } else {
        profile.header()
    };
    if let Some(ref title) = cli.title {
        header.title = Some(title.clone());
    }
    if let Some(ref course) = cli.course {
        header.course = Some(course.clone());
    }
    if !cli.info.is_empty() {
        header.info_lines = cli.info.clone();
    }
    builder = builder.header(header);

    if let Some(ref title) = cli.page_title {
        builder = builder.page_title(title.clone());
    }
    if let Some(ref list) = cli.extensions {
        builder = builder.extensions(Extensions::parse(list)?);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

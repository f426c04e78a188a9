mod reports;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use grindcalc_engine::{Catalog, CycleRequest, GrindReport, StepSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for a terminal
    Console,
    /// Machine-readable report
    Json,
    /// Tables for pasting into notes
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "grindcalc", version)]
#[command(about = "Solve a game-economy grind and report the best step ratios")]
struct Args {
    /// Cycle request file (JSON)
    #[arg(long, required_unless_present = "list_steps")]
    request: Option<PathBuf>,

    /// List the standard catalog's steps and exit
    #[arg(long)]
    list_steps: bool,

    /// Step to express ratios against (defaults to the first step)
    #[arg(long)]
    anchor: Option<String>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log solver details at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_steps(&args)? {
        return Ok(());
    }

    let Some(path) = args.request.as_deref() else {
        anyhow::bail!("--request is required unless --list-steps is given");
    };
    let report = solve_request(path, args.anchor.as_deref())?;
    write_report(&args, path, &report)?;

    if !report.is_usable() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn maybe_list_steps(args: &Args) -> Result<bool> {
    if !args.list_steps {
        return Ok(false);
    }
    let catalog = Catalog::standard();
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available steps:")?;
    for name in catalog.names() {
        writeln!(output_target.writer(), "  {name}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn load_request(path: &Path) -> Result<CycleRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CycleRequest::from_json(&text).with_context(|| format!("invalid request {}", path.display()))
}

fn solve_request(path: &Path, anchor: Option<&str>) -> Result<GrindReport> {
    let request = load_request(path)?;
    log::debug!(
        "solving {} steps from {}",
        request.step_names().len(),
        path.display()
    );
    let grind = request
        .solve()
        .with_context(|| format!("failed to solve {}", path.display()))?;
    match anchor {
        Some(anchor) => GrindReport::anchored(&grind, anchor)
            .with_context(|| format!("cannot anchor ratios on `{anchor}`")),
        None => Ok(GrindReport::from_grind(&grind)),
    }
}

fn write_report(args: &Args, path: &Path, report: &GrindReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let title = path
        .file_stem()
        .map_or_else(|| "request".into(), |stem| stem.to_string_lossy());

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, report)?,
        ReportFormat::Markdown => {
            reports::generate_markdown_report(&mut output_target, &title, report)?;
        }
        ReportFormat::Console => {
            reports::generate_console_report(&mut output_target, &title, report)?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "grindcalc-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn write_request(label: &str, body: &str) -> PathBuf {
        let path = temp_path(label).with_extension("json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn args_parse_report_format_and_anchor() {
        let args = Args::try_parse_from([
            "grindcalc",
            "--request",
            "cycle.json",
            "--report",
            "markdown",
            "--anchor",
            "Painting",
        ])
        .unwrap();
        assert_eq!(args.report, ReportFormat::Markdown);
        assert_eq!(args.anchor.as_deref(), Some("Painting"));
        assert!(!args.list_steps);
    }

    #[test]
    fn request_is_required_unless_listing() {
        assert!(Args::try_parse_from(["grindcalc"]).is_err());
        let args = Args::try_parse_from(["grindcalc", "--list-steps"]).unwrap();
        assert!(args.list_steps);
        assert!(args.request.is_none());
    }

    #[test]
    fn output_target_writes_file() {
        let path = temp_path("target");
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[test]
    fn solve_request_surfaces_missing_stats() {
        let path = write_request(
            "necks",
            r#"{"stats": {"Persuasive": 200}, "steps": ["Painting", "Get 7Necks"],
                "params": {"Get 7Necks": ["hasty"]}}"#,
        );
        let err = solve_request(&path, None).unwrap_err();
        assert!(format!("{err:#}").contains("missing stat `aPoC`"));
    }

    #[test]
    fn solve_request_reports_missing_file() {
        let err = solve_request(Path::new("/nonexistent/grind.json"), None).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn unbalanced_request_reports_but_is_not_usable() {
        // Painting consumes Moonlit and nothing produces it.
        let path = write_request(
            "moonlit",
            r#"{"stats": {"Persuasive": 200}, "steps": ["Painting"]}"#,
        );
        let report = solve_request(&path, None).unwrap();
        assert!(!report.is_usable());
        assert_eq!(report.outcome, "no self-sustaining cycle");
        let err = solve_request(&path, Some("Juggle")).unwrap_err();
        assert!(err.to_string().contains("cannot anchor ratios"));
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use runlog_viz::grammar::Registry;
use runlog_viz::log::{LogReader, ReadStats};
use runlog_viz::model::{RunSummary, TimeSeries};
use runlog_viz::render::{self, ChartSpec};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "runlog-viz")]
#[command(about = "Solver run-log chart renderer", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

/// Where the log comes from and how to read it.
#[derive(clap::Args)]
struct Source {
    #[arg(long)]
    log: PathBuf,

    /// Solver variant (see `variants`).
    #[arg(long)]
    variant: String,

    /// Extra grammar definitions (JSON).
    #[arg(long)]
    grammars: Option<PathBuf>,

    /// Stop after this many records (defaults to the variant's cap, if any).
    #[arg(long)]
    cap: Option<usize>,

    /// Fail on the first malformed telemetry line instead of skipping it.
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the cost / handled chart.
    Report {
        #[command(flatten)]
        source: Source,

        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Output format; inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        format: Option<Format>,

        #[arg(long, default_value_t = 1280)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,

        #[arg(long)]
        title: Option<String>,

        /// Thousands-group the handled-count ticks too.
        #[arg(long)]
        group_right_ticks: bool,

        #[arg(long)]
        no_legend: bool,
    },

    /// Print the run summary as JSON.
    Summary {
        #[command(flatten)]
        source: Source,
    },

    /// List registered solver variants.
    Variants {
        #[arg(long)]
        grammars: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Report {
            source,
            out,
            format,
            width,
            height,
            title,
            group_right_ticks,
            no_legend,
        } => {
            let (series, summary) = load(&source)?;

            let mut spec = ChartSpec {
                width,
                height,
                right_integer_ticks: group_right_ticks,
                legend: !no_legend,
                ..ChartSpec::default()
            };
            if let Some(title) = title {
                spec.title = title;
            }

            let svg = render::render_svg(&series, &spec)?;
            let body = match format.unwrap_or_else(|| infer_format(&out)) {
                Format::Svg => svg,
                Format::Html => render::render_html_report(&summary, &svg)?,
            };
            std::fs::write(&out, body).with_context(|| format!("write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
        Commands::Summary { source } => {
            let (_, summary) = load(&source)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Variants { grammars } => {
            let registry = registry(grammars.as_deref())?;
            for g in registry.grammars() {
                let cap = g
                    .default_cap()
                    .map(|c| format!(" (cap {})", c))
                    .unwrap_or_default();
                println!("{}\tselect: {}{}", g.name(), g.select_markers().join(" | "), cap);
            }
        }
    }

    Ok(())
}

fn registry(grammars: Option<&Path>) -> Result<Registry> {
    let mut registry = Registry::builtin();
    if let Some(path) = grammars {
        registry.load_file(path)?;
    }
    Ok(registry)
}

/// Resolve the grammar, stream the log, and build the series.
fn load(source: &Source) -> Result<(TimeSeries, RunSummary)> {
    let registry = registry(source.grammars.as_deref())?;
    let grammar = registry.resolve(&source.variant)?;
    let cap = source.cap.or(grammar.default_cap());
    debug!("variant {} with cap {:?}", grammar.name(), cap);

    let mut reader = LogReader::open(&source.log, grammar)?
        .with_cap(cap)
        .strict(source.strict);
    let series = TimeSeries::collect(grammar, reader.by_ref())
        .with_context(|| format!("parse log {}", source.log.display()))?;
    let stats: ReadStats = reader.stats();

    if series.is_empty() {
        warn!(
            "no telemetry records in {} for variant {}",
            source.log.display(),
            grammar.name()
        );
    }

    let summary = RunSummary::new(grammar.name(), &series, stats);
    Ok((series, summary))
}

fn infer_format(out: &Path) -> Format {
    match out.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
            Format::Html
        }
        _ => Format::Svg,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("runlog_viz={}", default)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

//! Vantage CLI - preview bins, check and run saved reports
//!
//! Usage:
//!   vantage preview <values.json> [--mode <mode>] [--bins <n>]
//!   vantage validate <report.json> --catalog <catalog.json> [--relations <relations.json>]
//!   vantage run <report.json> --catalog <catalog.json> [--page <n>]
//!
//! Examples:
//!   vantage preview amounts.json --mode quantiles --bins 4
//!   vantage validate sales.report.json --catalog catalog.json --relations fks.json
//!   vantage run sales.report.json --catalog catalog.json --page 2

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use vantage::binning::{BinMode, BinParams, HistogramPreview, Interval, DEFAULT_BINS};
use vantage::builder::rebuild;
use vantage::cache::ReportCache;
use vantage::catalog::FieldCatalog;
use vantage::config::Settings;
use vantage::execute::RenderedTable;
use vantage::join::{Evaluation, JoinPathResolver, JoinState, RelationGraph};
use vantage::query::QueryModel;
use vantage::service::WorkerReportService;
use vantage::session::{ReportDocument, ReportSession};
use vantage::worker::WorkerClient;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Vantage - ad-hoc report configuration and execution")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the standard search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bin a JSON array of numbers and print a histogram
    Preview {
        /// Path to a JSON array of numbers (nulls allowed)
        file: PathBuf,

        /// Binning mode
        #[arg(short, long, default_value = "auto")]
        mode: ModeArg,

        /// Number of bins for auto, equal-width and quantile modes
        #[arg(short, long, default_value_t = DEFAULT_BINS)]
        bins: usize,

        /// Bin width for step mode
        #[arg(long)]
        step: Option<f64>,

        /// Comma-separated boundaries for custom mode
        #[arg(long, value_delimiter = ',')]
        edges: Vec<f64>,

        /// Leave zero values out of the sample
        #[arg(long)]
        exclude_zeros: bool,

        /// Clamp outliers before computing bins
        #[arg(long)]
        cap_outliers: bool,

        /// Abbreviate thousands in labels (1.5K)
        #[arg(long)]
        k_format: bool,

        /// Bracket notation: "[)", "[]", "(]" or "()"
        #[arg(long, default_value = "[)")]
        interval: String,

        /// Width of the longest bar in characters
        #[arg(long, default_value_t = 40)]
        width: usize,
    },

    /// Rebuild a saved report against a catalog and report what changed
    Validate {
        /// Path to the saved report
        file: PathBuf,

        /// Catalog snapshot (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// Foreign-key relations used to answer the join check locally
        #[arg(long)]
        relations: Option<PathBuf>,
    },

    /// Execute a saved report through the configured executor
    Run {
        /// Path to the saved report
        file: PathBuf,

        /// Catalog snapshot (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// Result page to fetch
        #[arg(short, long)]
        page: Option<u32>,
    },
}

#[derive(Clone, ValueEnum)]
enum ModeArg {
    Auto,
    EqualWidth,
    Quantiles,
    Step,
    Custom,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = vantage::logging::init(&settings.logging.filter) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match cli.command {
        Commands::Preview {
            file,
            mode,
            bins,
            step,
            edges,
            exclude_zeros,
            cap_outliers,
            k_format,
            interval,
            width,
        } => {
            let mode = match mode {
                ModeArg::Auto => BinMode::Auto { bins },
                ModeArg::EqualWidth => BinMode::EqualWidth {
                    bins,
                    from: None,
                    to: None,
                },
                ModeArg::Quantiles => BinMode::Quantiles { bins },
                ModeArg::Step => match step {
                    Some(width) => BinMode::Step { width },
                    None => {
                        eprintln!("Error: --step is required for step mode");
                        return ExitCode::FAILURE;
                    }
                },
                ModeArg::Custom => BinMode::CustomEdges { edges },
            };
            let Some(interval) = Interval::parse(&interval) else {
                eprintln!("Error: unknown interval '{}'", interval);
                return ExitCode::FAILURE;
            };

            let mut params = BinParams::new(mode).with_interval(interval);
            if exclude_zeros {
                params = params.with_exclude_zeros();
            }
            if cap_outliers {
                params = params.with_cap_outliers();
            }
            if k_format {
                params = params.with_k_format();
            }
            cmd_preview(file, params, settings.preview.sample_size, width)
        }
        Commands::Validate {
            file,
            catalog,
            relations,
        } => cmd_validate(file, catalog, relations),
        Commands::Run {
            file,
            catalog,
            page,
        } => cmd_run(settings, file, catalog, page),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, vantage::config::SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn cmd_preview(file: PathBuf, params: BinParams, sample_size: usize, width: usize) -> ExitCode {
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut sample: Vec<Option<f64>> = match serde_json::from_str(&source) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error: expected a JSON array of numbers: {}", e);
            return ExitCode::FAILURE;
        }
    };
    sample.truncate(sample_size);

    match HistogramPreview::build(&sample, &params) {
        Ok(preview) => {
            println!("{}", preview.render(width));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Binning error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_report(file: &Path, catalog: &Path) -> Result<(ReportDocument, FieldCatalog), String> {
    let document = ReportDocument::from_file(file)
        .map_err(|e| format!("Error reading report '{}': {}", file.display(), e))?;
    let catalog = FieldCatalog::from_json_file(catalog)
        .map_err(|e| format!("Error reading catalog '{}': {}", catalog.display(), e))?;
    Ok((document, catalog))
}

fn cmd_validate(file: PathBuf, catalog: PathBuf, relations: Option<PathBuf>) -> ExitCode {
    let (document, catalog) = match load_report(&file, &catalog) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut model = QueryModel::new();
    let report = rebuild(&document.composition, &catalog, &mut model);

    println!("Report: {}", document.name);
    println!(
        "  {} columns, {} filters, {} groups, {} joins",
        model.columns.len(),
        model.filters.len(),
        model.groups.len(),
        model.joins.len()
    );

    if !report.dropped.is_empty() {
        println!();
        println!("Dropped:");
        for dropped in &report.dropped {
            println!("  - {:?} {}", dropped.kind, dropped.reference);
        }
    }
    if !report.adjusted.is_empty() {
        println!();
        println!("Adjusted:");
        for adjusted in &report.adjusted {
            println!(
                "  - {:?} {}: {}",
                adjusted.kind, adjusted.field, adjusted.detail
            );
        }
    }

    let mut resolver = JoinPathResolver::new();
    if let Evaluation::NeedsCatalog(check) = resolver.evaluate(&model, &catalog) {
        match &relations {
            Some(path) => match RelationGraph::from_json_file(path) {
                Ok(graph) => {
                    resolver.apply_response(check.token, graph.check(&check.request));
                }
                Err(e) => {
                    eprintln!("Error reading relations '{}': {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            },
            None => {
                println!();
                println!(
                    "Joins: tables {} need a catalog check (pass --relations)",
                    check.request.tables.join(", ")
                );
                return ExitCode::SUCCESS;
            }
        }
    }

    println!();
    match resolver.state() {
        JoinState::Allowed => {
            println!("Joins: OK");
            ExitCode::SUCCESS
        }
        JoinState::Blocked(reason) => {
            println!("Joins: blocked: {}", reason);
            ExitCode::FAILURE
        }
        JoinState::Checking { .. } => {
            println!("Joins: unresolved");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(settings: Settings, file: PathBuf, catalog: PathBuf, page: Option<u32>) -> ExitCode {
    let (document, catalog) = match load_report(&file, &catalog) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let client = match WorkerClient::spawn_with_settings(&settings).await {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error starting executor: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let service = Arc::new(WorkerReportService::new(Arc::new(client)));
        let mut session = ReportSession::new(service, catalog, settings.session_settings());

        if settings.cache.enabled {
            match settings.cache_path() {
                Ok(Some(path)) => match ReportCache::open(&path) {
                    Ok(cache) => session = session.with_cache(cache),
                    Err(e) => tracing::warn!(error = %e, "lookup cache unavailable"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "lookup cache unavailable"),
            }
        }

        if let Some(check) = session.load(document) {
            session.resolve_join_check(check).await;
        }
        let sync = session.sync_report();
        for dropped in &sync.dropped {
            eprintln!("Warning: dropped {:?} {}", dropped.kind, dropped.reference);
        }

        let result = match page {
            Some(page) => session.go_to_page(page).await.map(|_| ()),
            None => session.run().await.map(|_| ()),
        };
        if let Err(e) = result {
            eprintln!("Execution error: {}", e);
            return ExitCode::FAILURE;
        }

        let Some(view) = session.view() else {
            return ExitCode::FAILURE;
        };
        println!("{}", RenderedTable::build(view, session.model()).to_text());
        if let Some(total) = view.total_pages() {
            println!();
            println!("Page {} of {}", view.current_page(), total);
        }
        ExitCode::SUCCESS
    })
}

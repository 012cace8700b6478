//! sfl - spectrum-based fault localization CLI
//!
//! Entry point for ranking, fusing and evaluating program spectra.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use sfl_config::{
    load_config, validate_config, ConfigSnapshot, FusionTechnique, LoadedConfig, LocalizerConfig,
    SelectionTechnique,
};
use sfl_core::exit_codes::ExitCode;
use sfl_core::localizer::{FaultLocalizer, FusingLocalizer, LevelLocalizer, LocalizeError};
use sfl_core::log_event;
use sfl_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use sfl_core::metrics;
use sfl_core::output::{envelope, ranking_value, score_value, OutputFormat};
use sfl_core::ranking::{
    NormalizationStrategy, NormalizedRanking, Ranking, RankingError, RankingView,
};
use sfl_math::Formula;
use sfl_spectra::{
    HierarchicalSpectraProvider, JsonSpectraProvider, Spectra, SpectraError, SpectraProvider,
    Spectrum,
};

/// Spectrum-based fault localization
#[derive(Parser)]
#[command(name = "sfl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to an sfl.json configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log level (overrides SFL_LOG)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format (overrides SFL_LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available suspiciousness formulas
    Formulas,

    /// Rank the nodes of a spectra dump with one formula
    Rank(RankArgs),

    /// Rank with a fusion of several formulas
    Fuse(FuseArgs),

    /// Rank the leaves of a hierarchical spectra dump level by level
    Levels(LevelsArgs),

    /// Print per-node evaluation metrics rows
    Metrics(MetricsArgs),

    /// Show positional metrics of one node in a saved ranking dump
    Inspect(InspectArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Spectra dump (JSON)
    spectra: PathBuf,

    /// Formula to rank with (defaults to the configured formula)
    #[arg(long)]
    formula: Option<Formula>,

    /// Report normalized scores
    #[arg(long, value_enum)]
    normalize: Option<NormalizationArg>,

    /// Also save the ranking dump to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FuseArgs {
    /// Spectra dump (JSON)
    spectra: PathBuf,

    #[arg(long, value_enum)]
    normalization: Option<NormalizationArg>,

    #[arg(long, value_enum)]
    selection: Option<SelectionArg>,

    #[arg(long, value_enum)]
    technique: Option<TechniqueArg>,

    /// Base formulas (repeatable; defaults to the configured pool)
    #[arg(long = "formula")]
    formulas: Vec<Formula>,

    /// Also save the ranking dump to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LevelsArgs {
    /// Spectra dump with a `levels` section (JSON)
    spectra: PathBuf,

    /// Formula per level, outermost first (repeatable)
    #[arg(long = "formula")]
    formulas: Vec<Formula>,

    /// Also save the ranking dump to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    /// Spectra dump (JSON)
    spectra: PathBuf,

    /// Identifier written in the BugID column
    #[arg(long)]
    bug_id: String,

    /// Formula to rank with (defaults to the configured formula)
    #[arg(long)]
    formula: Option<Formula>,

    /// Nodes to report (repeatable; defaults to every node)
    #[arg(long = "node")]
    nodes: Vec<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Ranking dump written by `rank --out`
    ranking: PathBuf,

    /// Node to look up
    node: String,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the resolved configuration)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NormalizationArg {
    ZeroOne,
    ReciprocalRank,
}

impl From<NormalizationArg> for NormalizationStrategy {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::ZeroOne => NormalizationStrategy::ZeroOne,
            NormalizationArg::ReciprocalRank => NormalizationStrategy::ReciprocalRank,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SelectionArg {
    OverlapRate,
    BiasRate,
}

impl From<SelectionArg> for SelectionTechnique {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::OverlapRate => SelectionTechnique::OverlapRate,
            SelectionArg::BiasRate => SelectionTechnique::BiasRate,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TechniqueArg {
    CombSum,
    CombAnz,
    CombMnz,
}

impl From<TechniqueArg> for FusionTechnique {
    fn from(arg: TechniqueArg) -> Self {
        match arg {
            TechniqueArg::CombSum => FusionTechnique::CombSum,
            TechniqueArg::CombAnz => FusionTechnique::CombAnz,
            TechniqueArg::CombMnz => FusionTechnique::CombMnz,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let mut ctx = LogContext::new(generate_run_id());
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "starting sfl");

    let exit_code = match &cli.command {
        Commands::Formulas => run_formulas(&cli.global),
        Commands::Rank(args) => run_rank(&cli.global, &mut ctx, args),
        Commands::Fuse(args) => run_fuse(&cli.global, &mut ctx, args),
        Commands::Levels(args) => run_levels(&cli.global, &mut ctx, args),
        Commands::Metrics(args) => run_metrics(&cli.global, &mut ctx, args),
        Commands::Inspect(args) => run_inspect(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, &mut ctx, args),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "sfl finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json(doc: &Value) -> ExitCode {
    match serde_json::to_string_pretty(doc) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("sfl: failed to serialize output: {}", e);
            ExitCode::InternalError
        }
    }
}

/// Report an error on stderr and, in JSON mode, as a payload on stdout.
fn fail(global: &GlobalOpts, code: ExitCode, message: impl std::fmt::Display) -> ExitCode {
    let message = message.to_string();
    if code.is_internal_error() {
        tracing::error!(target: event_names::INTERNAL_ERROR, code = %code, "{}", message);
    } else {
        tracing::error!(code = %code, "{}", message);
    }
    match global.format {
        OutputFormat::Json => {
            let doc = envelope(
                "error",
                json!({
                    "error": {
                        "code": code.code_name(),
                        "exit_code": code.as_i32(),
                        "message": message,
                    }
                }),
            );
            print_json(&doc);
        }
        OutputFormat::Text => eprintln!("sfl: {}", message),
    }
    code
}

fn fail_spectra(global: &GlobalOpts, err: &SpectraError) -> ExitCode {
    fail(global, ExitCode::from(err), err)
}

fn fail_localize(global: &GlobalOpts, err: &LocalizeError) -> ExitCode {
    fail(global, ExitCode::from(err), err)
}

fn save_dump(global: &GlobalOpts, ranking: &Ranking<String>, out: Option<&Path>) -> Option<ExitCode> {
    let path = out?;
    match ranking.save(path) {
        Ok(()) => {
            tracing::info!(
                target: event_names::REPORT_WRITTEN,
                path = %path.display(),
                nodes = ranking.len(),
                "saved ranking dump"
            );
            None
        }
        Err(e) => Some(fail(
            global,
            ExitCode::IoError,
            format!("failed to write {}: {}", path.display(), e),
        )),
    }
}

fn log_finished(ctx: &LogContext, localizer: &str, nodes: usize) {
    log_event!(
        ctx,
        INFO,
        event_names::LOCALIZE_FINISHED,
        Stage::Localize,
        "ranking ready",
        localizer = localizer,
        nodes = nodes
    );
}

/// Print a ranking as a dump (text) or a JSON payload stamped with the
/// configuration id.
fn emit_ranking(
    global: &GlobalOpts,
    ctx: &LogContext,
    command: &str,
    localizer: &str,
    ranking: &dyn RankingView<String>,
    extra: Value,
) -> ExitCode {
    match global.format {
        OutputFormat::Text => {
            for (node, score) in ranking.ordered() {
                println!("{}: {}", node, score);
            }
            ExitCode::Clean
        }
        OutputFormat::Json => {
            let nodes = match ranking_value(ranking) {
                Ok(nodes) => nodes,
                Err(e) => return fail(global, ExitCode::InternalError, e),
            };
            let mut payload = json!({
                "config_id": ctx.config_label(),
                "localizer": localizer,
                "node_count": ranking.len(),
                "ranking": nodes,
            });
            if let (Value::Object(payload), Value::Object(extra)) = (&mut payload, extra) {
                payload.extend(extra);
            }
            print_json(&envelope(command, payload))
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

fn load_settings(global: &GlobalOpts, ctx: &mut LogContext) -> Result<LoadedConfig, ExitCode> {
    match load_config(global.config.as_deref()) {
        Ok(loaded) => {
            let snapshot = ConfigSnapshot::new(&loaded.config, &loaded.paths, loaded.raw.as_deref());
            ctx.attach_config(snapshot.short_id());
            let source = tracing::field::display(&loaded.paths.source);
            match loaded.paths.config {
                Some(_) => log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_LOADED,
                    Stage::Init,
                    "configuration loaded",
                    source = source
                ),
                None => log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_DEFAULT_USED,
                    Stage::Init,
                    "no configuration file, using defaults",
                    source = source
                ),
            }
            Ok(loaded)
        }
        Err(e) => {
            log_event!(
                ctx,
                WARN,
                event_names::CONFIG_ERROR,
                Stage::Init,
                "configuration rejected",
                code = e.code()
            );
            Err(fail(global, ExitCode::from(&e), e))
        }
    }
}

fn load_spectra(global: &GlobalOpts, ctx: &LogContext, path: &Path) -> Result<Spectra<String>, ExitCode> {
    let provider = JsonSpectraProvider::new(path);
    match provider.load_spectra() {
        Ok(spectra) => {
            log_event!(
                ctx,
                INFO,
                event_names::SPECTRA_LOADED,
                Stage::Load,
                "spectra loaded",
                nodes = spectra.node_count(),
                traces = spectra.trace_count()
            );
            Ok(spectra)
        }
        Err(e) => Err(fail_spectra(global, &e)),
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_formulas(global: &GlobalOpts) -> ExitCode {
    match global.format {
        OutputFormat::Text => {
            for formula in Formula::ALL {
                println!("{}", formula);
            }
            ExitCode::Clean
        }
        OutputFormat::Json => {
            let names: Vec<&str> = Formula::ALL.iter().map(|f| Formula::name(*f)).collect();
            print_json(&envelope("formulas", json!({ "formulas": names })))
        }
    }
}

fn run_rank(global: &GlobalOpts, ctx: &mut LogContext, args: &RankArgs) -> ExitCode {
    let loaded = match load_settings(global, ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let spectra = match load_spectra(global, ctx, &args.spectra) {
        Ok(spectra) => spectra,
        Err(code) => return code,
    };

    let formula = args.formula.unwrap_or(loaded.config.formula);
    log_event!(
        ctx,
        INFO,
        event_names::LOCALIZE_STARTED,
        Stage::Localize,
        "ranking spectra",
        formula = formula.name()
    );
    let ranking = match FaultLocalizer::<String>::localize(&formula, &spectra) {
        Ok(ranking) => ranking,
        Err(e) => return fail_localize(global, &e),
    };
    log_finished(ctx, formula.name(), ranking.len());

    if let Some(code) = save_dump(global, &ranking, args.out.as_deref()) {
        return code;
    }

    let normalization = args
        .normalize
        .map(NormalizationStrategy::from)
        .or(loaded.config.normalization.map(NormalizationStrategy::from));
    match normalization {
        Some(strategy) => {
            let normalized = NormalizedRanking::from_ranking(ranking, strategy);
            emit_ranking(
                global,
                ctx,
                "rank",
                formula.name(),
                &normalized,
                json!({ "normalization": strategy.to_string() }),
            )
        }
        None => emit_ranking(global, ctx, "rank", formula.name(), &ranking, json!({})),
    }
}

fn run_fuse(global: &GlobalOpts, ctx: &mut LogContext, args: &FuseArgs) -> ExitCode {
    let loaded = match load_settings(global, ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let spectra = match load_spectra(global, ctx, &args.spectra) {
        Ok(spectra) => spectra,
        Err(code) => return code,
    };

    let mut fusion = loaded.config.fusion.clone();
    if let Some(n) = args.normalization {
        fusion.normalization = match n {
            NormalizationArg::ZeroOne => sfl_config::NormalizationKind::ZeroOne,
            NormalizationArg::ReciprocalRank => sfl_config::NormalizationKind::ReciprocalRank,
        };
    }
    if let Some(s) = args.selection {
        fusion.selection = s.into();
    }
    if let Some(t) = args.technique {
        fusion.technique = t.into();
    }
    if !args.formulas.is_empty() {
        fusion.formulas = args.formulas.clone();
    }

    let localizer: FusingLocalizer<String> = FusingLocalizer::from_config(&fusion);
    let name = localizer.name();
    log_event!(
        ctx,
        INFO,
        event_names::LOCALIZE_STARTED,
        Stage::Fuse,
        "fusing rankings",
        localizer = name.as_str(),
        pool = fusion.formula_pool().len()
    );
    let outcome = match localizer.fuse(&spectra) {
        Ok(outcome) => outcome,
        Err(e) => return fail_localize(global, &e),
    };
    log_finished(ctx, &name, outcome.ranking.len());

    if let Some(code) = save_dump(global, &outcome.ranking, args.out.as_deref()) {
        return code;
    }

    let scores: Vec<Value> = outcome
        .scores
        .iter()
        .map(|(name, score)| json!({ "localizer": name, "score": score_value(*score) }))
        .collect();
    emit_ranking(
        global,
        ctx,
        "fuse",
        &name,
        &outcome.ranking,
        json!({
            "selected": outcome.selected,
            "selection_scores": scores,
        }),
    )
}

fn run_levels(global: &GlobalOpts, ctx: &mut LogContext, args: &LevelsArgs) -> ExitCode {
    let loaded = match load_settings(global, ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let provider = JsonSpectraProvider::new(&args.spectra);
    let hierarchy = match provider.load_hierarchical_spectra() {
        Ok(hierarchy) => hierarchy,
        Err(e) => return fail_spectra(global, &e),
    };
    let depth = hierarchy.depth();
    log_event!(
        ctx,
        INFO,
        event_names::SPECTRA_LOADED,
        Stage::Load,
        "hierarchical spectra loaded",
        levels = depth,
        traces = hierarchy.leaf.trace_count()
    );

    // CLI formulas, then configured levels, then the configured formula everywhere
    let formulas = if !args.formulas.is_empty() {
        args.formulas.clone()
    } else if let Some(levels) = &loaded.config.levels {
        levels.clone()
    } else {
        vec![loaded.config.formula; depth]
    };

    let localizer: LevelLocalizer<String> = LevelLocalizer::from_formulas(formulas);
    let name = localizer.name();
    log_event!(
        ctx,
        INFO,
        event_names::LOCALIZE_STARTED,
        Stage::Localize,
        "ranking hierarchy",
        localizer = name.as_str()
    );
    let ranking = match localizer.localize(&*hierarchy.top) {
        Ok(ranking) => ranking,
        Err(e) => return fail_localize(global, &e),
    };
    log_finished(ctx, &name, ranking.len());

    if let Some(code) = save_dump(global, &ranking, args.out.as_deref()) {
        return code;
    }
    emit_ranking(global, ctx, "levels", &name, &ranking, json!({ "levels": depth }))
}

fn run_metrics(global: &GlobalOpts, ctx: &mut LogContext, args: &MetricsArgs) -> ExitCode {
    let loaded = match load_settings(global, ctx) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let spectra = match load_spectra(global, ctx, &args.spectra) {
        Ok(spectra) => spectra,
        Err(code) => return code,
    };

    let formula = args.formula.unwrap_or(loaded.config.formula);
    log_event!(
        ctx,
        INFO,
        event_names::LOCALIZE_STARTED,
        Stage::Localize,
        "ranking spectra",
        formula = formula.name()
    );
    let ranking = match FaultLocalizer::<String>::localize(&formula, &spectra) {
        Ok(ranking) => ranking,
        Err(e) => return fail_localize(global, &e),
    };
    log_finished(ctx, formula.name(), ranking.len());

    let nodes = if args.nodes.is_empty() {
        ranking.nodes().cloned().collect()
    } else {
        args.nodes.clone()
    };
    let rows = match metrics::collect_rows(&args.bug_id, &spectra, &ranking, &nodes) {
        Ok(rows) => rows,
        Err(e @ RankingError::NodeNotRanked(_)) => {
            return fail(global, ExitCode::NodeNotRanked, e);
        }
        Err(e) => return fail(global, ExitCode::InternalError, e),
    };

    match global.format {
        OutputFormat::Text => {
            let stdout = std::io::stdout();
            match metrics::write_metrics(stdout.lock(), &rows) {
                Ok(()) => ExitCode::Clean,
                Err(e) => fail(global, ExitCode::IoError, e),
            }
        }
        OutputFormat::Json => print_json(&envelope(
            "metrics",
            json!({
                "config_id": ctx.config_label(),
                "formula": formula.name(),
                "header": metrics::CSV_HEADER,
                "rows": rows,
            }),
        )),
    }
}

fn run_inspect(global: &GlobalOpts, args: &InspectArgs) -> ExitCode {
    let text = match std::fs::read_to_string(&args.ranking) {
        Ok(text) => text,
        Err(e) => {
            return fail(
                global,
                ExitCode::IoError,
                format!("failed to read {}: {}", args.ranking.display(), e),
            )
        }
    };
    let ranking: Ranking<String> = match Ranking::parse_dump(&text) {
        Ok(ranking) => ranking,
        Err(e) => return fail(global, ExitCode::InputError, e),
    };
    let metric = match ranking.ranking_metrics(&args.node) {
        Ok(metric) => metric,
        Err(e) => return fail(global, ExitCode::NodeNotRanked, e),
    };

    match global.format {
        OutputFormat::Text => {
            println!(
                "{}: rank {}-{} of {} (suspiciousness {}, wasted effort {}-{})",
                metric.node,
                metric.best_ranking,
                metric.worst_ranking,
                metric.total,
                metric.suspiciousness,
                metric.min_wasted_effort(),
                metric.max_wasted_effort()
            );
            ExitCode::Clean
        }
        OutputFormat::Json => print_json(&envelope(
            "inspect",
            json!({
                "node": metric.node,
                "best_ranking": metric.best_ranking,
                "worst_ranking": metric.worst_ranking,
                "total": metric.total,
                "suspiciousness": score_value(metric.suspiciousness),
                "min_wasted_effort": metric.min_wasted_effort(),
                "max_wasted_effort": metric.max_wasted_effort(),
            }),
        )),
    }
}

fn run_config(global: &GlobalOpts, ctx: &mut LogContext, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => {
            let loaded = match load_settings(global, ctx) {
                Ok(loaded) => loaded,
                Err(code) => return code,
            };
            let snapshot = ConfigSnapshot::new(&loaded.config, &loaded.paths, loaded.raw.as_deref());
            match global.format {
                OutputFormat::Text => {
                    println!("Source: {}", loaded.paths.source);
                    if let Some(path) = &loaded.paths.config {
                        println!("Path: {}", path.display());
                    }
                    println!("Snapshot: {}", snapshot.short_id());
                    println!("Formula: {}", snapshot.summary.formula);
                    println!("Fusion: {}", snapshot.summary.fusion);
                    println!("Fusion pool: {}", snapshot.summary.fusion_pool_size);
                    ExitCode::Clean
                }
                OutputFormat::Json => print_json(&envelope(
                    "config show",
                    json!({
                        "config": loaded.config,
                        "snapshot": snapshot,
                    }),
                )),
            }
        }
        ConfigCommands::Validate { path } => {
            let result = match path {
                Some(path) => LocalizerConfig::from_file(path)
                    .and_then(|config| validate_config(&config).map(|()| config)),
                None => load_config(global.config.as_deref()).map(|loaded| loaded.config),
            };
            match result {
                Ok(config) => match global.format {
                    OutputFormat::Text => {
                        println!("Configuration valid (schema {})", config.schema_version);
                        ExitCode::Clean
                    }
                    OutputFormat::Json => print_json(&envelope(
                        "config validate",
                        json!({ "valid": true, "schema_version": config.schema_version }),
                    )),
                },
                Err(e) => fail(global, ExitCode::from(&e), format!("{} (code {})", e, e.code())),
            }
        }
    }
}

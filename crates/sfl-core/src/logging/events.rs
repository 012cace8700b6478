//! Event names, pipeline stages and the per-run logging context.
//!
//! Events are plain `tracing` events whose target is one of the dotted
//! [`event_names`]; the JSON layer in [`super::init_logging`] turns them into
//! JSON lines.

/// Stages of one `sfl` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading spectra or rankings from disk.
    Load,
    /// Running a localizer.
    Localize,
    /// Selecting and combining base rankings.
    Fuse,
    /// Writing rankings and metrics.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Localize => "localize",
            Stage::Fuse => "fuse",
            Stage::Report => "report",
        };
        f.write_str(s)
    }
}

/// Event targets. Filter on these with `RUST_LOG`, e.g. `RUST_LOG=fusion.selected=info`.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const SPECTRA_LOADED: &str = "spectra.loaded";
    /// Emitted by the spectra dump loader.
    pub const SPECTRA_TRACE_SKIPPED: &str = sfl_spectra::provider::TRACE_SKIPPED_EVENT;

    pub const LOCALIZE_STARTED: &str = "localize.started";
    pub const LOCALIZE_FINISHED: &str = "localize.finished";

    pub const FUSION_SELECTED: &str = "fusion.selected";

    pub const REPORT_WRITTEN: &str = "report.written";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Identifiers stamped on every [`log_event!`](crate::log_event).
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    /// Short id of the configuration snapshot, once loaded.
    pub config_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            config_id: None,
        }
    }

    /// Record the configuration the rest of the run uses.
    pub fn attach_config(&mut self, config_id: impl Into<String>) {
        self.config_id = Some(config_id.into());
    }

    /// `config_id` as logged; `"none"` until a configuration is attached.
    pub fn config_label(&self) -> &str {
        self.config_id.as_deref().unwrap_or("none")
    }
}

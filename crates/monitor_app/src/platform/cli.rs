use std::path::PathBuf;

use clap::Parser;

use super::logging::LogDestination;

/// Follow a manuscript analysis job until it finishes.
#[derive(Debug, Clone, Parser)]
#[command(name = "job-monitor", version)]
pub struct Cli {
    /// Identifier of the analysis job (project) to monitor.
    pub job_id: String,

    /// Base URL of the job-status API, e.g. `https://host/api/`.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long)]
    pub token: Option<String>,

    /// RON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where log output goes. The terminal is used by the dashboard itself.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
}

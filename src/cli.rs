use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "klog")]
#[command(about = "Stream Kubernetes pod logs with severity coloring and keyword highlighting")]
pub struct Cli {
    /// Pod name pattern (regex); matched against pod names in the cluster
    pub pattern: String,

    /// Container name (if multi-container pod)
    #[arg(short = 'c', long)]
    pub container: Option<String>,

    /// Namespace (searches all namespaces when omitted)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Keyword pattern (regex) to highlight in log lines
    #[arg(short = 'k', long)]
    pub keyword: Option<String>,

    /// Only show lines containing the keyword
    #[arg(long, requires = "keyword")]
    pub keyword_only: bool,

    /// Disable timestamp extraction and display (on by default)
    #[arg(long)]
    pub no_timestamps: bool,

    /// Do not follow the log stream (follow is on by default)
    #[arg(long)]
    pub no_follow: bool,

    /// Show logs from the previous container instance
    #[arg(short = 'p', long)]
    pub previous: bool,

    /// Only show logs newer than this many hours
    #[arg(long)]
    pub since: Option<u32>,

    /// Number of trailing lines to show from each pod
    #[arg(long)]
    pub tail: Option<i64>,

    /// Stream every pod matching the pattern concurrently
    #[arg(short = 'A', long)]
    pub all_pods: bool,

    /// Maximum number of simultaneously open log streams
    #[arg(long, default_value_t = 10)]
    pub max_concurrent: usize,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

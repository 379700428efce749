/// One matched pod, as returned by resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRef {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<String>,
}

/// Options forwarded to the log stream provider when opening a pod stream.
#[derive(Debug, Clone, Default)]
pub struct TailOptions {
    pub follow: bool,
    pub previous: bool,
    pub timestamps: bool,
    pub since_hours: Option<u32>,
    pub tail_lines: Option<i64>,
}

mod classify;
mod cli;
mod kubernetes;
mod render;
mod stream;
mod types;
mod utils;

use clap::Parser;
use clap::error::ErrorKind;
use regex::Regex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use cli::Cli;
use kubernetes::KubeLogSource;
use render::RenderContext;
use stream::{fan_out, tail_pod};
use types::{PodRef, TailOptions};

/// Rendered lines buffered between the pod tasks and the printer task.
const SINK_BUFFER: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::MissingRequiredArgument => {
            let _ = err.print();
            std::process::exit(128);
        }
        Err(err) => err.exit(),
    };

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let keyword = match cli.keyword.as_deref() {
        Some(pattern) => match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                error!("invalid keyword pattern '{}': {}", pattern, err);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let client = match kubernetes::connect().await {
        Ok(client) => client,
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    };

    let pods = match kubernetes::resolve_pods(&client, &cli.pattern, cli.namespace.as_deref()).await
    {
        Ok(pods) => pods,
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    };

    let pods = if cli.all_pods {
        pods
    } else {
        match select_pod(pods, &cli.pattern) {
            Ok(pod) => vec![pod],
            Err(err) => {
                error!("{:#}", err);
                std::process::exit(1);
            }
        }
    };

    let ctx = Arc::new(RenderContext {
        show_timestamps: !cli.no_timestamps,
        show_pod_name: cli.all_pods,
        keyword,
        keyword_only: cli.keyword_only,
    });
    let opts = TailOptions {
        follow: !cli.no_follow,
        previous: cli.previous,
        timestamps: !cli.no_timestamps,
        since_hours: cli.since,
        tail_lines: cli.tail,
    };

    let (tx, mut rx) = mpsc::channel::<String>(SINK_BUFFER);
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            println!("{}", line);
        }
    });

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let source = Arc::new(KubeLogSource::new(client));
    if cli.all_pods {
        info!("streaming logs from {} matched pods", pods.len());
        fan_out(
            source,
            pods,
            cli.container.clone(),
            opts,
            ctx,
            cli.max_concurrent,
            tx,
            cancel,
        )
        .await;
    } else {
        // Single-pod mode runs on the calling task with no concurrency.
        let pod = &pods[0];
        let container = match cli.container.clone().or_else(|| pod.containers.first().cloned()) {
            Some(container) => container,
            None => {
                error!("pod {} has no containers", pod.name);
                std::process::exit(1);
            }
        };
        info!(
            "streaming logs from container '{}' of pod '{}'",
            container, pod.name
        );
        if let Err(err) = tail_pod(source.as_ref(), pod, &container, &opts, &ctx, &tx, &cancel).await
        {
            warn!("[{}] {:#}", pod.name, err);
        }
        drop(tx);
    }

    printer.await?;
    Ok(())
}

/// Pick one pod from the matches without an interactive menu: an exact name
/// match wins, then a sole match; anything else is ambiguous.
fn select_pod(mut pods: Vec<PodRef>, pattern: &str) -> anyhow::Result<PodRef> {
    if let Some(pos) = pods.iter().position(|p| p.name == pattern) {
        return Ok(pods.swap_remove(pos));
    }
    if pods.len() == 1 {
        return Ok(pods.remove(0));
    }
    let names = pods
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    anyhow::bail!(
        "pattern '{}' matches multiple pods ({}); pass --all-pods to stream them all",
        pattern,
        names
    )
}

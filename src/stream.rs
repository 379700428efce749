use anyhow::Context;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::render::{RenderContext, render};
use crate::types::{PodRef, TailOptions};
use crate::utils::color_for;

pub type LineStream = BoxStream<'static, std::io::Result<String>>;

/// Log stream provider: one line-producing stream per pod/container.
/// Implemented against the cluster in `kubernetes.rs` and by fakes in tests.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn open(
        &self,
        pod: &PodRef,
        container: &str,
        opts: &TailOptions,
    ) -> anyhow::Result<LineStream>;
}

/// Tail one pod's log stream to completion, rendering each line and sending
/// the result to the output channel. Returns when the stream ends, the
/// token is cancelled, or the sink is gone; stream errors propagate to the
/// caller with pod attribution.
pub async fn tail_pod(
    source: &dyn LogSource,
    pod: &PodRef,
    container: &str,
    opts: &TailOptions,
    ctx: &RenderContext,
    tx: &mpsc::Sender<String>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let mut lines = source
        .open(pod, container, opts)
        .await
        .with_context(|| format!("opening log stream for pod {}", pod.name))?;
    let color = color_for(&pod.name);
    let prefix = ctx.show_pod_name.then_some((pod.name.as_str(), color));

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            next = lines.next() => next,
        };
        match next {
            Some(Ok(line)) => {
                if let Some(rendered) = render(&line, ctx, prefix)
                    && tx.send(rendered).await.is_err()
                {
                    return Ok(());
                }
            }
            Some(Err(err)) => {
                return Err(err).with_context(|| format!("reading logs from pod {}", pod.name));
            }
            None => {
                debug!("log stream ended for pod {}", pod.name);
                return Ok(());
            }
        }
    }
}

/// Stream all matched pods concurrently, at most `max_concurrency` open
/// streams at a time, and wait for every stream to finish.
///
/// One pod's failure is reported and ends only that pod's task; the rest
/// keep streaming. Line order is preserved within a pod, unspecified
/// across pods.
pub async fn fan_out(
    source: Arc<dyn LogSource>,
    pods: Vec<PodRef>,
    container: Option<String>,
    opts: TailOptions,
    ctx: Arc<RenderContext>,
    max_concurrency: usize,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let mut tasks = JoinSet::new();

    for pod in pods {
        let Some(container) = container.clone().or_else(|| pod.containers.first().cloned()) else {
            warn!("pod {} has no containers, skipping", pod.name);
            continue;
        };
        let source = source.clone();
        let opts = opts.clone();
        let ctx = ctx.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();
        let semaphore = semaphore.clone();

        tasks.spawn(async move {
            let permit = tokio::select! {
                _ = cancel.cancelled() => return,
                permit = semaphore.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };
            if let Err(err) =
                tail_pod(source.as_ref(), &pod, &container, &opts, &ctx, &tx, &cancel).await
            {
                warn!("[{}] {:#}", pod.name, err);
            }
            drop(permit);
        });
    }

    while tasks.join_next().await.is_some() {}
}

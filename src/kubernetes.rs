use anyhow::Context;
use async_trait::async_trait;
use futures::io::AsyncBufReadExt;
use futures::stream::StreamExt;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{ListParams, LogParams};
use kube::{Api, Client, ResourceExt, config};
use regex::Regex;

use crate::stream::{LineStream, LogSource};
use crate::types::{PodRef, TailOptions};

/// Build a client from the ambient kubeconfig / in-cluster environment.
pub async fn connect() -> anyhow::Result<Client> {
    let config = config::Config::infer()
        .await
        .context("loading Kubernetes configuration")?;
    Client::try_from(config).context("constructing Kubernetes client")
}

pub async fn namespace_exists(client: &Client, namespace: &str) -> bool {
    Api::<Namespace>::all(client.clone())
        .get(namespace)
        .await
        .is_ok()
}

/// List pods and keep those whose name matches the pattern. Searches the
/// given namespace, or the whole cluster when none is given.
pub async fn resolve_pods(
    client: &Client,
    pattern: &str,
    namespace: Option<&str>,
) -> anyhow::Result<Vec<PodRef>> {
    let re =
        Regex::new(pattern).with_context(|| format!("invalid pod name pattern '{}'", pattern))?;

    let api: Api<Pod> = match namespace {
        Some(ns) => {
            if !namespace_exists(client, ns).await {
                anyhow::bail!("namespace '{}' not found", ns);
            }
            Api::namespaced(client.clone(), ns)
        }
        None => Api::all(client.clone()),
    };

    let pods = api
        .list(&ListParams::default())
        .await
        .context("listing pods")?;

    let mut matched = Vec::new();
    for pod in pods.items {
        let name = pod.name_any();
        if !re.is_match(&name) {
            continue;
        }
        let containers = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        matched.push(PodRef {
            name,
            namespace: pod.namespace().unwrap_or_else(|| "default".to_string()),
            containers,
        });
    }

    if matched.is_empty() {
        anyhow::bail!("no pod matches pattern '{}'", pattern);
    }
    Ok(matched)
}

/// Log stream provider backed by the Kubernetes API.
pub struct KubeLogSource {
    client: Client,
}

impl KubeLogSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogSource for KubeLogSource {
    async fn open(
        &self,
        pod: &PodRef,
        container: &str,
        opts: &TailOptions,
    ) -> anyhow::Result<LineStream> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &pod.namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            follow: opts.follow,
            previous: opts.previous,
            timestamps: opts.timestamps,
            since_seconds: opts.since_hours.map(|h| i64::from(h) * 3600),
            tail_lines: opts.tail_lines,
            ..Default::default()
        };
        let stream = api.log_stream(&pod.name, &params).await?;
        Ok(stream.lines().boxed())
    }
}

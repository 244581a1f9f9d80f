use std::collections::{HashMap, HashSet};
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{MetricsProvider, ProviderError};
use crate::config::KubeSettings;
use crate::model::{MetricRecord, Quantity, ResourceList, identity_key};

const METRICS_API: &str = "/apis/metrics.k8s.io/v1beta1";
const REQUEST_TIMEOUT: &str = "--request-timeout=10s";

#[derive(Deserialize)]
struct List<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ObjectMeta {
    name: String,
    #[serde(default)]
    namespace: String,
}

/// `PodMetrics` from the metrics API.
#[derive(Deserialize)]
struct PodMetrics {
    metadata: ObjectMeta,
    #[serde(default)]
    containers: Vec<ContainerMetrics>,
}

#[derive(Deserialize)]
struct ContainerMetrics {
    name: String,
    #[serde(default)]
    usage: ResourceList,
}

#[derive(Deserialize)]
struct Pod {
    metadata: ObjectMeta,
    #[serde(default)]
    spec: PodSpec,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PodSpec {
    #[serde(default)]
    node_name: Option<String>,
    #[serde(default)]
    containers: Vec<ContainerDef>,
}

#[derive(Deserialize)]
struct ContainerDef {
    name: String,
    #[serde(default)]
    resources: Resources,
}

#[derive(Deserialize, Default)]
struct Resources {
    #[serde(default)]
    requests: ResourceList,
    #[serde(default)]
    limits: ResourceList,
}

/// Declared resources of one container, keyed by identity key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub node: Option<String>,
    pub requests: ResourceList,
    pub limits: ResourceList,
}

/// Decode a `PodMetricsList` into records without declared resources.
pub fn parse_pod_metrics(json: &str) -> Result<Vec<MetricRecord>, ProviderError> {
    let list: List<PodMetrics> = serde_json::from_str(json).map_err(|source| ProviderError::Decode {
        what: "pod metrics",
        source,
    })?;

    let mut records = Vec::new();
    for pod in list.items {
        for container in pod.containers {
            let cpu = container.usage.get("cpu").copied().unwrap_or(Quantity::ZERO);
            let mem = container.usage.get("memory").copied().unwrap_or(Quantity::ZERO);
            records.push(MetricRecord::new(
                pod.metadata.namespace.clone(),
                pod.metadata.name.clone(),
                container.name,
                cpu,
                mem,
            ));
        }
    }
    Ok(records)
}

/// Decode a `PodList` into per-container declared resources.
pub fn parse_pod_specs(json: &str) -> Result<HashMap<String, ContainerSpec>, ProviderError> {
    let list: List<Pod> = serde_json::from_str(json).map_err(|source| ProviderError::Decode {
        what: "pod list",
        source,
    })?;

    let mut specs = HashMap::new();
    for pod in list.items {
        for container in pod.spec.containers {
            let key = identity_key(&pod.metadata.namespace, &pod.metadata.name, &container.name);
            specs.insert(
                key,
                ContainerSpec {
                    node: pod.spec.node_name.clone(),
                    requests: container.resources.requests,
                    limits: container.resources.limits,
                },
            );
        }
    }
    Ok(specs)
}

fn attach_specs(records: Vec<MetricRecord>, specs: &HashMap<String, ContainerSpec>) -> Vec<MetricRecord> {
    records
        .into_iter()
        .map(|record| match specs.get(&record.identity_key()) {
            Some(spec) => {
                let record = record.with_resources(spec.requests.clone(), spec.limits.clone());
                match &spec.node {
                    Some(node) => record.with_node(node.clone()),
                    None => record,
                }
            }
            None => record,
        })
        .collect()
}

/// Cached pod specs, plus the metrics keys a refresh already failed to
/// match. Metrics for a deleted pod can outlive its spec; those keys must
/// not trigger a new `kubectl get pods` on every poll.
#[derive(Debug, Default)]
struct SpecCache {
    specs: HashMap<String, ContainerSpec>,
    unmatched: HashSet<String>,
}

impl SpecCache {
    fn needs_refresh(&self, records: &[MetricRecord]) -> bool {
        records.iter().any(|r| {
            let key = r.identity_key();
            !self.specs.contains_key(&key) && !self.unmatched.contains(&key)
        })
    }

    /// Remember which keys of this batch have no spec. Keys gone from the
    /// batch are forgotten.
    fn track_unmatched(&mut self, records: &[MetricRecord]) {
        self.unmatched = records
            .iter()
            .map(MetricRecord::identity_key)
            .filter(|key| !self.specs.contains_key(key))
            .collect();
    }
}

/// Fetches usage through the metrics API via `kubectl get --raw`, and
/// declared resources via `kubectl get pods`. Pod specs rarely change, so
/// they are cached and only re-read when an unknown container shows up.
pub struct KubectlProvider {
    settings: KubeSettings,
    cache: Mutex<SpecCache>,
}

impl KubectlProvider {
    pub fn new(settings: KubeSettings) -> Self {
        Self {
            settings,
            cache: Mutex::new(SpecCache::default()),
        }
    }

    fn metrics_path(&self) -> String {
        match &self.settings.namespace {
            Some(ns) => format!("{METRICS_API}/namespaces/{ns}/pods"),
            None => format!("{METRICS_API}/pods"),
        }
    }

    fn global_args(&self) -> Vec<String> {
        let mut args = vec![REQUEST_TIMEOUT.to_string()];
        if let Some(path) = &self.settings.kubeconfig {
            args.push("--kubeconfig".into());
            args.push(path.display().to_string());
        }
        if let Some(context) = &self.settings.context {
            args.push("--context".into());
            args.push(context.clone());
        }
        args
    }

    fn metrics_args(&self) -> Vec<String> {
        let mut args = self.global_args();
        args.extend(["get".into(), "--raw".into(), self.metrics_path()]);
        args
    }

    fn pods_args(&self) -> Vec<String> {
        let mut args = self.global_args();
        args.extend(["get", "pods", "-o", "json"].map(String::from));
        match &self.settings.namespace {
            Some(ns) => args.extend(["-n".into(), ns.clone()]),
            None => args.push("--all-namespaces".into()),
        }
        args
    }

    fn kubectl(&self, args: &[String]) -> Result<String, ProviderError> {
        let command = format!("{} {}", self.settings.kubectl, args.join(" "));
        debug!(%command, "running kubectl");

        let output = Command::new(&self.settings.kubectl)
            .args(args)
            .output()
            .map_err(|source| ProviderError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProviderError::Command {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn refresh_specs(&self, specs: &mut HashMap<String, ContainerSpec>) -> Result<(), ProviderError> {
        let json = self.kubectl(&self.pods_args())?;
        *specs = parse_pod_specs(&json)?;
        debug!(containers = specs.len(), "pod specs refreshed");
        Ok(())
    }
}

impl MetricsProvider for KubectlProvider {
    fn fetch_batch(&self) -> Result<Vec<MetricRecord>, ProviderError> {
        let json = self.kubectl(&self.metrics_args())?;
        let records = parse_pod_metrics(&json)?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.needs_refresh(&records) {
            match self.refresh_specs(&mut cache.specs) {
                Ok(()) => cache.track_unmatched(&records),
                Err(e) if cache.specs.is_empty() => return Err(e),
                Err(e) => warn!(error = %e, "keeping cached pod specs"),
            }
        } else {
            cache.track_unmatched(&records);
        }

        Ok(attach_specs(records, &cache.specs))
    }

    fn describe(&self) -> String {
        format!(
            "kubectl (context: {}, namespace: {})",
            self.settings.context.as_deref().unwrap_or("current"),
            self.settings.namespace.as_deref().unwrap_or("all")
        )
    }
}

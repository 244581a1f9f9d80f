use std::collections::BTreeMap;

use super::Quantity;

/// Declared resources for a container, keyed by resource name (`cpu`, `memory`, ...).
pub type ResourceList = BTreeMap<String, Quantity>;

/// One container's usage at the moment of a poll. Records are rebuilt from
/// scratch on every fetch; only `identity_key` links them across polls.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRecord {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub node: Option<String>,
    pub cpu_text: String,
    pub mem_text: String,
    pub cpu_usage: Quantity,
    pub mem_usage: Quantity,
    pub requests: ResourceList,
    pub limits: ResourceList,
}

impl MetricRecord {
    /// Build a record from raw usage, deriving the display text for both quantities.
    pub fn new(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        container: impl Into<String>,
        cpu_usage: Quantity,
        mem_usage: Quantity,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: pod.into(),
            container: container.into(),
            node: None,
            cpu_text: cpu_usage.cpu_text(),
            mem_text: mem_usage.mem_text(),
            cpu_usage,
            mem_usage,
            requests: ResourceList::new(),
            limits: ResourceList::new(),
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_resources(mut self, requests: ResourceList, limits: ResourceList) -> Self {
        self.requests = requests;
        self.limits = limits;
        self
    }

    /// Stable identity across polls. Kubernetes names never contain `/`,
    /// so the joined key cannot collide.
    pub fn identity_key(&self) -> String {
        identity_key(&self.namespace, &self.pod, &self.container)
    }

    /// Requests/limits summary shown on the info line.
    pub fn info_line(&self) -> String {
        format!(
            "requests: {} -- limits: {}",
            format_resources(&self.requests),
            format_resources(&self.limits)
        )
    }
}

pub fn identity_key(namespace: &str, pod: &str, container: &str) -> String {
    format!("{}/{}/{}", namespace, pod, container)
}

/// `cpu=<text> mem=<n>Mi`; a missing entry counts as zero.
pub fn format_resources(list: &ResourceList) -> String {
    let cpu = list.get("cpu").copied().unwrap_or(Quantity::ZERO);
    let mem = list.get("memory").copied().unwrap_or(Quantity::ZERO);
    format!("cpu={} mem={}Mi", cpu.cpu_text(), mem.mebibytes_ceil())
}

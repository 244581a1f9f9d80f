use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::Error;
use crate::layout::{ClampCaps, MIN_COLUMN_WIDTH};

/// Live CPU and memory usage of Kubernetes containers.
#[derive(Parser, Debug, Clone)]
#[command(name = "kubetop", version, about)]
pub struct Args {
    /// Path to the kubeconfig file (kubectl's own lookup applies when unset)
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,

    /// Only show pods in this namespace (default: all namespaces)
    #[arg(short, long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Seconds between metric refreshes
    #[arg(short, long, default_value_t = 5, value_name = "SECS")]
    pub interval: u64,

    /// kubectl binary to invoke
    #[arg(long, default_value = "kubectl", env = "KUBETOP_KUBECTL")]
    pub kubectl: String,

    /// Write diagnostics to this file
    #[arg(long, value_name = "PATH", env = "KUBETOP_LOG")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Width of the POD column when the table does not fit
    #[arg(long, default_value_t = 25)]
    pub pod_cap: usize,

    /// Width of the CONTAINER column when the table does not fit
    #[arg(long, default_value_t = 20)]
    pub container_cap: usize,

    /// Width of the CPU and MEM columns when the table does not fit
    #[arg(long, default_value_t = 5)]
    pub usage_cap: usize,

    /// Minimum width of every column
    #[arg(long, default_value_t = MIN_COLUMN_WIDTH)]
    pub min_width: usize,
}

/// How to reach the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeSettings {
    pub kubectl: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub namespace: Option<String>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub interval: Duration,
    pub caps: ClampCaps,
    pub kube: KubeSettings,
    pub log_file: Option<PathBuf>,
    pub verbose: u8,
}

impl Args {
    pub fn into_config(self) -> Result<Config, Error> {
        if self.interval == 0 {
            return Err(Error::Config("--interval must be at least 1 second".into()));
        }
        for (name, value) in [
            ("--pod-cap", self.pod_cap),
            ("--container-cap", self.container_cap),
            ("--usage-cap", self.usage_cap),
            ("--min-width", self.min_width),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be positive")));
            }
        }
        if self.kubectl.trim().is_empty() {
            return Err(Error::Config("--kubectl must name a binary".into()));
        }

        Ok(Config {
            interval: Duration::from_secs(self.interval),
            caps: ClampCaps {
                pod: self.pod_cap,
                container: self.container_cap,
                usage: self.usage_cap,
                min_width: self.min_width,
            },
            kube: KubeSettings {
                kubectl: self.kubectl,
                kubeconfig: self.kubeconfig,
                context: non_empty(self.context),
                namespace: non_empty(self.namespace),
            },
            log_file: self.log_file,
            verbose: self.verbose,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

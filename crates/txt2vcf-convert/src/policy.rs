//! Remote run policy.
//!
//! The policy document is a JSON object whose integer `run` field decides the
//! outcome: `1` proceeds, `2` proceeds and records a local approval so later
//! runs skip the fetch, anything else halts.

use crate::gate::RUN_MARKER_VALUE;
use crate::{ConvertError, Result};
use std::path::Path;

pub const POLICY_FIELD: &str = "run";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Halt,
    Proceed,
    ProceedAndRemember,
}

impl PolicyDecision {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => PolicyDecision::Proceed,
            Some(2) => PolicyDecision::ProceedAndRemember,
            _ => PolicyDecision::Halt,
        }
    }

    pub fn allows_run(self) -> bool {
        !matches!(self, PolicyDecision::Halt)
    }
}

fn is_approved(marker: &Path) -> bool {
    marker.is_file()
}

#[cfg_attr(not(feature = "remote-gate"), allow(dead_code))]
fn remember_approval(marker: &Path) -> Result<()> {
    if let Some(parent) = marker.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
        }
    }
    std::fs::write(marker, RUN_MARKER_VALUE).map_err(|err| ConvertError::io(marker, err))
}

#[cfg(feature = "remote-gate")]
mod imp {
    use super::{is_approved, remember_approval, PolicyDecision, POLICY_FIELD};
    use crate::gate::RunGate;
    use crate::{ConvertError, Result};
    use reqwest::blocking::Client;
    use std::path::PathBuf;
    use std::time::Duration;
    use tracing::{debug, info};
    use url::Url;

    #[derive(Debug, Clone)]
    pub struct RemotePolicyGate {
        url: String,
        approved_marker: PathBuf,
    }

    impl RemotePolicyGate {
        pub fn new(url: impl Into<String>, approved_marker: impl Into<PathBuf>) -> Self {
            Self {
                url: url.into(),
                approved_marker: approved_marker.into(),
            }
        }
    }

    impl RunGate for RemotePolicyGate {
        fn is_authorized(&self) -> Result<bool> {
            if is_approved(&self.approved_marker) {
                debug!(marker = %self.approved_marker.display(), "run previously approved");
                return Ok(true);
            }

            let body = fetch_policy(&self.url)?;
            let decision = parse_policy(&body)?;
            debug!(?decision, "run policy fetched");
            if decision == PolicyDecision::ProceedAndRemember {
                remember_approval(&self.approved_marker)?;
                info!(marker = %self.approved_marker.display(), "run approval recorded");
            }
            Ok(decision.allows_run())
        }
    }

    pub fn fetch_policy(policy_url: &str) -> Result<String> {
        let url = Url::parse(policy_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConvertError::NetworkUnavailable(format!(
                "unsupported policy url scheme: {}",
                url.scheme()
            )));
        }
        let client = Client::builder()
            .user_agent("txt2vcf")
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let response = client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    pub fn parse_policy(body: &str) -> Result<PolicyDecision> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|err| ConvertError::NetworkUnavailable(format!("invalid policy: {err}")))?;
        let code = value.get(POLICY_FIELD).and_then(serde_json::Value::as_i64);
        Ok(PolicyDecision::from_code(code))
    }

}

#[cfg(not(feature = "remote-gate"))]
mod imp {
    use super::is_approved;
    use crate::gate::RunGate;
    use crate::{ConvertError, Result};
    use std::path::PathBuf;

    #[derive(Debug, Clone)]
    pub struct RemotePolicyGate {
        url: String,
        approved_marker: PathBuf,
    }

    impl RemotePolicyGate {
        pub fn new(url: impl Into<String>, approved_marker: impl Into<PathBuf>) -> Self {
            Self {
                url: url.into(),
                approved_marker: approved_marker.into(),
            }
        }
    }

    impl RunGate for RemotePolicyGate {
        fn is_authorized(&self) -> Result<bool> {
            if is_approved(&self.approved_marker) {
                return Ok(true);
            }
            Err(ConvertError::NetworkUnavailable(format!(
                "fetching {} requires the remote-gate feature",
                self.url
            )))
        }
    }
}

pub use imp::RemotePolicyGate;

#[cfg(feature = "remote-gate")]
pub use imp::{fetch_policy, parse_policy};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn decision_codes_map_to_tri_state() {
        assert_eq!(PolicyDecision::from_code(None), PolicyDecision::Halt);
        assert_eq!(PolicyDecision::from_code(Some(0)), PolicyDecision::Halt);
        assert!(PolicyDecision::from_code(Some(1)).allows_run());
        assert!(PolicyDecision::from_code(Some(2)).allows_run());
        assert!(!PolicyDecision::from_code(Some(-1)).allows_run());
    }

    #[test]
    fn remember_approval_writes_marker() {
        let temp = TempDir::new().expect("tempdir");
        let marker = temp.path().join("state").join(".approved");
        assert!(!is_approved(&marker));
        remember_approval(&marker).expect("remember");
        assert!(is_approved(&marker));
        assert_eq!(std::fs::read_to_string(&marker).expect("read"), "True");
    }
}

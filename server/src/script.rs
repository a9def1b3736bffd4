//! iPXE script rendering.
//!
//! Rendering is pure: the same stage, outcome and request always give the
//! same bytes. Values the client knows better than we do (mac, uuid,
//! serial, ip) are written as iPXE settings so the client expands them when
//! it follows the chain; `boot_url` is written literally.
use std::fmt::Write;
use std::str::FromStr;

use proto::prelude::*;

use super::validate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Success,
    Retry,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub kind: ScriptKind,
    pub body: String,
}

/// What happens to a script authored by the boot service before it is
/// handed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptPolicy {
    #[default]
    Verbatim,
    /// Drop ASCII control characters other than tab, CR and LF.
    StripControl,
}

impl ScriptPolicy {
    pub fn apply(&self, script: &str) -> String {
        match self {
            ScriptPolicy::Verbatim => script.to_owned(),
            ScriptPolicy::StripControl => script
                .chars()
                .filter(|c| !c.is_ascii_control() || matches!(c, '\t' | '\r' | '\n'))
                .collect(),
        }
    }
}

impl FromStr for ScriptPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbatim" => Ok(ScriptPolicy::Verbatim),
            "strip-control" | "strip_control" => Ok(ScriptPolicy::StripControl),
            other => Err(format!("unknown script policy {:?}", other)),
        }
    }
}

struct ScriptBuilder {
    body: String,
}

impl ScriptBuilder {
    fn new() -> Self {
        let mut body = String::with_capacity(256);
        body.push_str(SHEBANG);
        body.push('\n');
        Self { body }
    }
    fn echo(mut self, message: &str) -> Self {
        let _ = writeln!(self.body, "echo {}", message);
        self
    }
    fn sleep(mut self, secs: u64) -> Self {
        let _ = writeln!(self.body, "sleep {}", secs);
        self
    }
    fn chain(mut self, url: &str) -> Self {
        let _ = writeln!(self.body, "chain {}", url);
        self
    }
    fn build(self, kind: ScriptKind) -> Script {
        Script {
            kind,
            body: self.body,
        }
    }
}

/// URL the client should fetch to (re)enter `stage`.
pub fn chain_url(boot_url: &str, stage: Stage) -> String {
    let mut query = vec![("mac", MAC_VAR)];
    if stage.requires_identity() {
        query.push(("uuid", UUID_VAR));
        query.push(("serial_id", SERIAL_VAR));
        query.push(("en_ip", IP_VAR));
    }
    query.push(("boot_url", boot_url));

    let query = query
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&&");
    format!("{}/{}?{}", boot_url, stage.endpoint(), query)
}

/// Terminal script: the parameters are unusable, so there is nothing to
/// chain back to.
pub fn error(err: &ValidationError) -> Script {
    ScriptBuilder::new()
        .echo(&format!("Error: {}", err))
        .sleep(ERROR_SLEEP_SECS)
        .build(ScriptKind::Error)
}

pub fn retry(request: &BootRequest) -> Script {
    let message = if request.stage == Stage::Chain {
        format!(
            "Unable to get ipxe script for {}. Retrying after {} seconds",
            request.mac, RETRY_SLEEP_SECS
        )
    } else {
        format!(
            "Unable to update inventory for {} . Retrying after {} seconds.",
            request.mac, RETRY_SLEEP_SECS
        )
    };
    ScriptBuilder::new()
        .echo(&message)
        .sleep(RETRY_SLEEP_SECS)
        .chain(&chain_url(&request.boot_url, request.stage))
        .build(ScriptKind::Retry)
}

pub fn render(request: &BootRequest, outcome: &BackendOutcome, policy: ScriptPolicy) -> Script {
    match (request.stage.next(), outcome) {
        (Some(next), outcome) if outcome.is_pass() => ScriptBuilder::new()
            .echo(&format!("Inventory is updated for {}", request.mac))
            .echo(&format!("Checking if workflow is available for {}", request.mac))
            .chain(&chain_url(&request.boot_url, next))
            .build(ScriptKind::Success),
        (None, BackendOutcome::Success(script)) if !script.is_empty() => Script {
            kind: ScriptKind::Success,
            body: policy.apply(script),
        },
        _ => retry(request),
    }
}

use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Discover,
    Write,
    Chain,
}

impl Stage {
    /// Path segment the stage is served under, relative to `boot_url`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Stage::Discover => "discover.php",
            Stage::Write => "write.php",
            Stage::Chain => "chain.php",
        }
    }
    /// Whether uuid, serial_id and en_ip are part of the stage's contract.
    pub fn requires_identity(&self) -> bool {
        !matches!(self, Stage::Chain)
    }
    /// Stage a successful client is chained to, if any. Write is a
    /// standalone confirmation and leads nowhere.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Discover => Some(Stage::Chain),
            Stage::Write | Stage::Chain => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discover => "discover",
            Stage::Write => "write",
            Stage::Chain => "chain",
        };
        f.write_str(name)
    }
}

/// Query parameters as the booting client sent them, nothing checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootParams {
    pub mac: Option<String>,
    pub uuid: Option<String>,
    pub serial_id: Option<String>,
    pub en_ip: Option<String>,
    pub boot_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uuid: String,
    pub serial_id: String,
    pub client_ip: IpAddr,
}

/// A request that passed validation for its stage.
///
/// `identity` is always present for stages where
/// [`Stage::requires_identity`] holds and always absent otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRequest {
    pub stage: Stage,
    pub mac: String,
    pub boot_url: String,
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOutcome {
    /// Script authored by the backend, returned to the client untouched.
    Success(String),
    Status(InventoryStatus),
    Unavailable,
}

impl BackendOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, BackendOutcome::Status(InventoryStatus::Pass))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSignal {
    Written,
    Failed,
}

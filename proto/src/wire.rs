/// bodies exchanged with the boot service
use crate::common::{BootRequest, InventoryStatus};
use monostate::MustBe;
use serde::{Deserialize, Serialize};

// update inventory
// POST /UpdateEN
// cts
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InventoryUpdate {
    pub mac: String,
    pub uuid: String,
    pub serial_id: String,
    pub ip: String,
}

impl InventoryUpdate {
    pub fn from_request(request: &BootRequest) -> Option<Self> {
        let identity = request.identity.as_ref()?;
        Some(Self {
            mac: request.mac.clone(),
            uuid: identity.uuid.clone(),
            serial_id: identity.serial_id.clone(),
            ip: identity.client_ip.to_string(),
        })
    }
}

// stc
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum StatusRes {
    Pass {
        #[allow(dead_code)]
        status: MustBe!("pass"),
    },
    Other {
        #[allow(dead_code)]
        status: serde_json::Value,
    },
}

impl From<StatusRes> for InventoryStatus {
    fn from(res: StatusRes) -> Self {
        match res {
            StatusRes::Pass { .. } => InventoryStatus::Pass,
            StatusRes::Other { .. } => InventoryStatus::Fail,
        }
    }
}

// fetch the auto-boot script
// POST /auto.ipxe
// cts
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AutoIpxeReq<'a> {
    pub mac: &'a str,
}
// stc: raw script, empty when no workflow exists yet

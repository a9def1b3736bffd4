/// First line of every script handed to a booting client.
pub const SHEBANG: &str = "#!ipxe";
pub const RETRY_SLEEP_SECS: u64 = 30;
pub const ERROR_SLEEP_SECS: u64 = 5;
pub const BACKEND_TIMEOUT_SECS: u64 = 1800;

pub const DEFAULT_INVENTORY_ENDPOINT: &str = "UpdateEN";
pub const AUTO_IPXE: &str = "auto.ipxe";
pub const WRITE_SUCCESS: &str = "Write successful";

// iPXE settings expanded by the client itself when it follows a chain.
pub const MAC_VAR: &str = "${mac}";
pub const UUID_VAR: &str = "${uuid}";
pub const SERIAL_VAR: &str = "${serial}";
pub const IP_VAR: &str = "${ip}";

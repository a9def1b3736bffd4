use std::net::IpAddr;

use proto::prelude::*;
use regex::Regex;
use url::{form_urlencoded, Url};

lazy_static! {
    static ref MAC_ADDRESS: Regex = Regex::new(
        r"^(?:[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5}|[0-9A-Fa-f]{2}(?:-[0-9A-Fa-f]{2}){5}|[0-9A-Fa-f]{4}(?:\.[0-9A-Fa-f]{4}){2})$"
    )
    .unwrap();
}

/// Every parameter that was missing or malformed, in query order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing or invalid input parameters for {}", .fields.join(", "))]
pub struct ValidationError {
    pub fields: Vec<&'static str>,
}

/// Collects the stage parameters out of a raw query string.
///
/// Chain URLs rendered for the client separate pairs with `&&`, so empty
/// pairs are skipped rather than rejected. Repeated keys keep the last value.
pub fn parse_query(query: &str) -> BootParams {
    let mut params = BootParams::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "mac" => &mut params.mac,
            "uuid" => &mut params.uuid,
            "serial_id" => &mut params.serial_id,
            "en_ip" => &mut params.en_ip,
            "boot_url" => &mut params.boot_url,
            _ => continue,
        };
        *slot = Some(value.into_owned());
    }
    params
}

pub fn validate(stage: Stage, params: &BootParams) -> Result<BootRequest, ValidationError> {
    let mut fields = Vec::new();

    let mac = check(&mut fields, "mac", &params.mac, mac_address);
    let identity = if stage.requires_identity() {
        let uuid = check(&mut fields, "uuid", &params.uuid, token);
        let serial_id = check(&mut fields, "serial_id", &params.serial_id, token);
        let client_ip = check(&mut fields, "en_ip", &params.en_ip, ip_address);
        Some((uuid, serial_id, client_ip))
    } else {
        None
    };
    let boot_url = check(&mut fields, "boot_url", &params.boot_url, boot_url);

    match (mac, boot_url, identity) {
        (Some(mac), Some(boot_url), None) if fields.is_empty() => Ok(BootRequest {
            stage,
            mac,
            boot_url,
            identity: None,
        }),
        (Some(mac), Some(boot_url), Some((Some(uuid), Some(serial_id), Some(client_ip))))
            if fields.is_empty() =>
        {
            Ok(BootRequest {
                stage,
                mac,
                boot_url,
                identity: Some(Identity {
                    uuid,
                    serial_id,
                    client_ip,
                }),
            })
        }
        _ => Err(ValidationError { fields }),
    }
}

fn check<T>(
    fields: &mut Vec<&'static str>,
    name: &'static str,
    value: &Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let parsed = value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(parse);
    if parsed.is_none() {
        fields.push(name);
    }
    parsed
}

fn mac_address(value: &str) -> Option<String> {
    MAC_ADDRESS.is_match(value).then(|| value.to_owned())
}

fn ip_address(value: &str) -> Option<IpAddr> {
    value.parse().ok()
}

// uuid and serial_id are opaque to us; they only have to be printable.
fn token(value: &str) -> Option<String> {
    printable(value).then(|| value.to_owned())
}

fn boot_url(value: &str) -> Option<String> {
    // The url parser silently drops tabs and newlines, the script would not.
    if !printable(value) {
        return None;
    }
    let url = Url::parse(value).ok()?;
    let web = matches!(url.scheme(), "http" | "https");
    // stage paths get appended to it, so it has to end in its path
    let base = url.query().is_none() && url.fragment().is_none();
    (web && base && url.host().is_some()).then(|| value.to_owned())
}

fn printable(value: &str) -> bool {
    value.chars().all(|c| !c.is_control() && !c.is_whitespace())
}

#[cfg(test)]
mod test {
    use super::*;

    fn full() -> BootParams {
        BootParams {
            mac: Some("52:54:00:12:34:56".to_owned()),
            uuid: Some("8c4a1c22-0f5e-4c32-9f43-5a3d1c0b9e11".to_owned()),
            serial_id: Some("SN-0042".to_owned()),
            en_ip: Some("10.20.0.15".to_owned()),
            boot_url: Some("http://10.20.0.1:8080/boot".to_owned()),
        }
    }

    #[test]
    fn discover_accepts_full_set() {
        let request = validate(Stage::Discover, &full()).unwrap();
        assert_eq!(request.mac, "52:54:00:12:34:56");
        assert_eq!(request.boot_url, "http://10.20.0.1:8080/boot");
        let identity = request.identity.unwrap();
        assert_eq!(identity.serial_id, "SN-0042");
        assert_eq!(identity.client_ip, "10.20.0.15".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn reports_every_bad_field() {
        let params = BootParams {
            mac: Some("52:54:00:12:34".to_owned()),
            uuid: None,
            en_ip: Some("10.20.0.300".to_owned()),
            ..full()
        };
        let err = validate(Stage::Discover, &params).unwrap_err();
        assert_eq!(err.fields, vec!["mac", "uuid", "en_ip"]);
        assert_eq!(
            err.to_string(),
            "Missing or invalid input parameters for mac, uuid, en_ip"
        );

        let err = validate(Stage::Write, &BootParams::default()).unwrap_err();
        assert_eq!(err.fields, vec!["mac", "uuid", "serial_id", "en_ip", "boot_url"]);
    }

    #[test]
    fn chain_needs_mac_and_boot_url_only() {
        let params = BootParams {
            mac: Some("52-54-00-12-34-56".to_owned()),
            boot_url: Some("https://pxe.example.com".to_owned()),
            ..Default::default()
        };
        let request = validate(Stage::Chain, &params).unwrap();
        assert!(request.identity.is_none());

        let err = validate(Stage::Chain, &BootParams::default()).unwrap_err();
        assert_eq!(err.fields, vec!["mac", "boot_url"]);
    }

    #[test]
    fn mac_grammar() {
        for good in ["aa:BB:cc:dd:ee:ff", "aa-bb-cc-dd-ee-ff", "aabb.ccdd.eeff"] {
            assert!(mac_address(good).is_some(), "{}", good);
        }
        for bad in ["aa:bb-cc:dd:ee:ff", "aabbccddeeff", "gg:bb:cc:dd:ee:ff", "${mac}"] {
            assert!(mac_address(bad).is_none(), "{}", bad);
        }
    }

    #[test]
    fn boot_url_grammar() {
        assert!(boot_url("http://[fd00::1]:8080").is_some());
        assert!(boot_url("10.0.0.1").is_none());
        assert!(boot_url("ftp://10.0.0.1").is_none());
        assert!(boot_url("http://10.0.0.1/a\nchain http://evil").is_none());
    }

    #[test]
    fn boot_url_must_be_a_bare_base() {
        assert!(boot_url("http://10.0.0.1/boot").is_some());
        assert!(boot_url("http://10.0.0.1/x?a=1").is_none());
        assert!(boot_url("http://10.0.0.1/?").is_none());
        assert!(boot_url("http://10.0.0.1/#f").is_none());

        let params = BootParams {
            boot_url: Some("http://10.20.0.1:8080/?next=1".to_owned()),
            ..full()
        };
        let err = validate(Stage::Discover, &params).unwrap_err();
        assert_eq!(err.fields, vec!["boot_url"]);
    }

    #[test]
    fn blank_counts_as_missing() {
        let params = BootParams {
            serial_id: Some("   ".to_owned()),
            ..full()
        };
        let err = validate(Stage::Write, &params).unwrap_err();
        assert_eq!(err.fields, vec!["serial_id"]);
    }

    #[test]
    fn values_are_trimmed() {
        let params = BootParams {
            mac: Some(" 52:54:00:12:34:56 ".to_owned()),
            ..full()
        };
        assert_eq!(validate(Stage::Discover, &params).unwrap().mac, "52:54:00:12:34:56");
    }

    #[test]
    fn query_with_double_ampersands() {
        let params = parse_query(
            "mac=52:54:00:12:34:56&&uuid=abc&&serial_id=SN1&&en_ip=10.0.0.2&&boot_url=http://10.0.0.1&&extra=1",
        );
        assert_eq!(params.mac.as_deref(), Some("52:54:00:12:34:56"));
        assert_eq!(params.uuid.as_deref(), Some("abc"));
        assert_eq!(params.serial_id.as_deref(), Some("SN1"));
        assert_eq!(params.en_ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(params.boot_url.as_deref(), Some("http://10.0.0.1"));
    }

    #[test]
    fn query_decodes_and_keeps_last() {
        let params = parse_query("mac=a&mac=52%3A54%3A00%3A12%3A34%3A56");
        assert_eq!(params.mac.as_deref(), Some("52:54:00:12:34:56"));
        assert_eq!(parse_query(""), BootParams::default());
    }
}

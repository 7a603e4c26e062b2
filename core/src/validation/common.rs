//! Syntactic checks shared by row validators

use once_cell::sync::Lazy;
use regex::Regex;

pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;

static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

// 6 octets for ethernet, 20 for infiniband
static MAC_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-fA-F]{2}[:-]){5}[0-9a-fA-F]{2}$|^([0-9a-fA-F]{2}[:-]){19}[0-9a-fA-F]{2}$")
        .expect("valid regex")
});

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/:?#]+(:[0-9]+)?([/?#]\S*)?$").expect("valid regex"));

/// Validate a Kubernetes DNS-1123 label, returning a user-facing message
pub fn validate_dns1123_label(value: &str) -> Result<(), String> {
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        return Err(format!(
            "Name cannot be longer than {} characters",
            DNS1123_LABEL_MAX_LENGTH
        ));
    }
    if !DNS1123_LABEL.is_match(value) {
        return Err(
            "Name must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_mac_address(value: &str) -> Result<(), String> {
    if MAC_ADDRESS.is_match(value) {
        Ok(())
    } else {
        Err("Invalid MAC address format".to_string())
    }
}

/// Multus network names may be namespaced as `namespace/name`
pub fn validate_multus_network_name(value: &str) -> Result<(), String> {
    let mut parts = value.split('/');
    let (namespace, name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) => (None, name),
        (Some(namespace), Some(name), None) => (Some(namespace), name),
        _ => return Err("Network name can contain at most one '/'".to_string()),
    };
    if let Some(namespace) = namespace {
        validate_dns1123_label(namespace).map_err(|e| format!("Invalid namespace: {}", e))?;
    }
    validate_dns1123_label(name)
}

pub fn validate_url(value: &str) -> Result<(), String> {
    if URL.is_match(value.trim()) {
        Ok(())
    } else {
        Err("URL must start with http:// or https:// and name a host".to_string())
    }
}

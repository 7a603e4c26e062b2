//! Cloud-init user data in the shape the wizard form can edit
//!
//! The form only knows a handful of top-level keys. User data that uses
//! anything else has to stay YAML-only.

use crate::error::Result;
use crate::resources::CloudInitNoCloudSource;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

pub const CLOUD_CONFIG_HEADER: &str = "#cloud-config";

const SSH_AUTHORIZED_KEYS: &str = "ssh_authorized_keys";

/// Keys the form edits, in the order it writes them back
pub const FORM_KEYS: [&str; 4] = ["hostname", "user", "password", SSH_AUTHORIZED_KEYS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudInitValue {
    Scalar(String),
    List(Vec<String>),
}

/// Top-level cloud-config document whose values are scalars or lists of scalars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudInitData {
    pub values: BTreeMap<String, CloudInitValue>,
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl CloudInitData {
    /// Parse user data. Returns `None` for invalid YAML, a non-mapping
    /// document, or anything deeper than scalars and lists of scalars.
    pub fn parse(user_data: &str) -> Option<Self> {
        let document: Value = match serde_yaml::from_str(user_data) {
            Ok(document) => document,
            Err(e) => {
                log::debug!("Cloud-init user data is not valid YAML: {}", e);
                return None;
            }
        };

        let mapping = match document {
            Value::Null => return Some(CloudInitData::default()),
            Value::Mapping(mapping) => mapping,
            _ => return None,
        };

        let mut data = CloudInitData::default();
        for (key, value) in mapping {
            let Value::String(key) = key else {
                return None;
            };
            let value = match value {
                Value::Null if key == SSH_AUTHORIZED_KEYS => CloudInitValue::List(Vec::new()),
                Value::Null => CloudInitValue::Scalar(String::new()),
                Value::Sequence(items) => CloudInitValue::List(
                    items.iter().map(scalar).collect::<Option<Vec<_>>>()?,
                ),
                other => CloudInitValue::Scalar(scalar(&other)?),
            };
            data.values.insert(key, value);
        }

        Some(data)
    }

    fn is_form_shaped(&self) -> bool {
        self.values.iter().all(|(key, value)| match value {
            CloudInitValue::List(_) => key == SSH_AUTHORIZED_KEYS,
            CloudInitValue::Scalar(_) => {
                key != SSH_AUTHORIZED_KEYS && FORM_KEYS.contains(&key.as_str())
            }
        })
    }

    /// Whether a no-cloud source holds nothing the form cannot represent
    pub fn includes_only_form_values(source: &CloudInitNoCloudSource) -> bool {
        let has_network_data = source
            .network_data
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if source.user_data_base64.is_some() || source.secret_ref.is_some() || has_network_data {
            return false;
        }
        source
            .user_data
            .as_deref()
            .map_or(Some(CloudInitData::default()), CloudInitData::parse)
            .is_some_and(|data| data.is_form_shaped())
    }

    /// Render back as a cloud-config document with the form's key order
    pub fn to_user_data(&self) -> Result<String> {
        let mut mapping = Mapping::new();
        for key in FORM_KEYS {
            let value = match self.values.get(key) {
                Some(CloudInitValue::Scalar(value)) => Value::String(value.clone()),
                Some(CloudInitValue::List(items)) => {
                    Value::Sequence(items.iter().cloned().map(Value::String).collect())
                }
                None => continue,
            };
            mapping.insert(Value::String(key.to_string()), value);
        }

        if mapping.is_empty() {
            return Ok(format!("{}\n", CLOUD_CONFIG_HEADER));
        }
        let body = serde_yaml::to_string(&mapping)?;
        Ok(format!("{}\n{}", CLOUD_CONFIG_HEADER, body))
    }

    /// Normalize a form-shaped source; other sources are returned unchanged
    pub fn make_form_compliant(source: &CloudInitNoCloudSource) -> CloudInitNoCloudSource {
        let parsed = source
            .user_data
            .as_deref()
            .map_or(Some(CloudInitData::default()), CloudInitData::parse);
        let Some(data) = parsed.filter(CloudInitData::is_form_shaped) else {
            return source.clone();
        };
        match data.to_user_data() {
            Ok(user_data) => CloudInitNoCloudSource {
                user_data: Some(user_data),
                ..source.clone()
            },
            Err(e) => {
                log::warn!("Keeping cloud-init user data as written: {}", e);
                source.clone()
            }
        }
    }
}

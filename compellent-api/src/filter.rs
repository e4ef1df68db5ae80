//! Filters for `GetList` queries.

use serde::Serialize;

use crate::error::{ApiError, Result};

/// Attribute names used by list lookups
pub mod attr {
    pub const NAME: &str = "Name";
    pub const INSTANCE_NAME: &str = "instanceName";
    pub const CLUSTER_ID: &str = "clusterId";
    pub const NAS_VOLUME_FOLDER_ID: &str = "nasVolumeFolderId";
    pub const VOLUME_NAME: &str = "VolumeName";
}

/// One `attribute == value` condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterItem {
    pub attribute_name: String,
    pub attribute_value: String,
    pub filter_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub filter_type: String,
    pub filters: Vec<FilterItem>,
}

/// Request body of a `GetList` call: `{"filter": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRequest {
    pub filter: Filter,
}

impl Filter {
    /// AND together one `Equals` condition per pair, in the given order.
    pub fn equals_all(conditions: &[(&str, &str)]) -> Result<FilterRequest> {
        if conditions.is_empty() {
            return Err(ApiError::EmptyFilter);
        }

        let filters = conditions
            .iter()
            .map(|(name, value)| FilterItem {
                attribute_name: (*name).to_string(),
                attribute_value: (*value).to_string(),
                filter_type: "Equals".to_string(),
            })
            .collect();

        Ok(FilterRequest {
            filter: Filter {
                filter_type: "AND".to_string(),
                filters,
            },
        })
    }
}

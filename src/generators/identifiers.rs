//! UUID generator

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ToolkitError};

pub const MAX_UUID_COUNT: usize = 10;

/// Input for `generate-uuid`
#[derive(Debug, Clone, Deserialize)]
pub struct UuidParams {
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for UuidParams {
    fn default() -> Self {
        Self {
            count: default_count(),
        }
    }
}

fn default_count() -> usize {
    1
}

/// Output of `generate-uuid`
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedUuids {
    pub uuids: Vec<String>,
    pub count: usize,
}

/// Generate `count` random (version 4) UUIDs
pub fn generate_uuids(params: &UuidParams) -> Result<GeneratedUuids> {
    if !(1..=MAX_UUID_COUNT).contains(&params.count) {
        return Err(ToolkitError::Generation(format!(
            "count must be between 1 and {}",
            MAX_UUID_COUNT
        )));
    }

    let uuids: Vec<String> = (0..params.count)
        .map(|_| Uuid::new_v4().hyphenated().to_string())
        .collect();

    Ok(GeneratedUuids {
        count: uuids.len(),
        uuids,
    })
}

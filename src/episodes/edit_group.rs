use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const GROUP_ID_LEN: usize = 10;

/// Correlates every edit made by one invocation, across seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditGroup(String);

impl EditGroup {
    pub fn mint() -> Self {
        let digest = Sha256::digest(Uuid::now_v7().as_bytes());
        let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        Self(hex[..GROUP_ID_LEN].to_string())
    }

    /// Reuses the group from an earlier season in the same run, or mints the
    /// first one.
    pub fn continue_from(previous: Option<EditGroup>) -> Self {
        previous.unwrap_or_else(Self::mint)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiCallStatus {
    Success,
    Error,
}

impl Display for AiCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            AiCallStatus::Success => "success",
            AiCallStatus::Error => "error",
        };
        write!(f, "{}", status)
    }
}

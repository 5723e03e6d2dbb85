use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DevLogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Display for DevLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            DevLogLevel::Debug => "debug",
            DevLogLevel::Info => "info",
            DevLogLevel::Warn => "warn",
            DevLogLevel::Error => "error",
        };
        write!(f, "{}", level)
    }
}

impl DevLogLevel {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "debug" => Some(DevLogLevel::Debug),
            "info" => Some(DevLogLevel::Info),
            "warn" => Some(DevLogLevel::Warn),
            "error" => Some(DevLogLevel::Error),
            _ => None,
        }
    }
}

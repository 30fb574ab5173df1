// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three basic permission levels which can be assigned to a subject on a dashboard or
/// folder. Greater levels are assumed to also contain all lower ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum PermissionLevel {
    /// Permission to view a dashboard or the dashboards inside a folder.
    View,

    /// Permission to edit and save changes.
    Edit,

    /// Permission to manage permissions of the resource.
    Admin,
}

impl PermissionLevel {
    /// Numeric code of this level as used by the dashboard API.
    pub fn code(&self) -> u8 {
        match self {
            PermissionLevel::View => 1,
            PermissionLevel::Edit => 2,
            PermissionLevel::Admin => 4,
        }
    }
}

impl Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PermissionLevel::View => "View",
            PermissionLevel::Edit => "Edit",
            PermissionLevel::Admin => "Admin",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "View" => Ok(PermissionLevel::View),
            "Edit" => Ok(PermissionLevel::Edit),
            "Admin" => Ok(PermissionLevel::Admin),
            _ => Err(PermissionLevelError::UnknownName(value.to_string())),
        }
    }
}

impl TryFrom<u8> for PermissionLevel {
    type Error = PermissionLevelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PermissionLevel::View),
            2 => Ok(PermissionLevel::Edit),
            4 => Ok(PermissionLevel::Admin),
            _ => Err(PermissionLevelError::UnknownCode(code)),
        }
    }
}

impl From<PermissionLevel> for u8 {
    fn from(level: PermissionLevel) -> Self {
        level.code()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionLevelError {
    #[error("unknown permission level name \"{0}\"")]
    UnknownName(String),

    #[error("unknown permission level code {0}")]
    UnknownCode(u8),
}

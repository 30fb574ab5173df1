// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entry::SignedInUser;

/// Where permission updates are persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AccessControlMode {
    /// Reconcile against the resource permission services.
    #[default]
    Resource,

    /// Hand the whole list to the list-based ACL store.
    Legacy,
}

/// Configuration for reading and updating resource permissions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub access_control: AccessControlMode,

    /// Logins of users which are hidden from permission listings.
    pub hidden_users: HashSet<String>,
}

impl Config {
    pub fn new(access_control: AccessControlMode) -> Self {
        Self {
            access_control,
            ..Default::default()
        }
    }

    pub fn with_hidden_users<I, S>(mut self, logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_users = logins.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if entries of this login should be hidden from the given viewer.
    ///
    /// Hidden users always see their own entries.
    pub fn is_hidden_user(&self, login: &str, viewer: &SignedInUser) -> bool {
        if login.is_empty() || viewer.login == login {
            return false;
        }

        self.hidden_users.contains(login)
    }

    pub fn is_legacy(&self) -> bool {
        self.access_control == AccessControlMode::Legacy
    }
}

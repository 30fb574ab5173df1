// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces to the services surrounding permission updates.
mod guardian;
mod store;

pub use guardian::{Guardian, GuardianError};
pub use store::{LegacyAclError, LegacyAclStore, ResourcePermissions};

/// Generates avatar URLs for permission listings.
pub trait AvatarUrls {
    fn gravatar_url(&self, email: &str) -> String;

    /// Avatar URL for an email, falling back to an image generated from `text` when no avatar is
    /// known.
    fn gravatar_url_with_default(&self, email: &str, text: &str) -> String;
}

//! Project domain model.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, VpError};

/// A website project that owns generated virtual persons.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Storage identifier of the project
    pub id: String,
    /// Public website URL (e.g. `https://acme.example.com/`)
    pub website: String,
    /// Identifier of the user owning the project
    pub owner_id: String,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        website: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            website: website.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Returns the project name used in prompts: the hostname of the website.
    ///
    /// A website without a scheme (`acme.example.com`) is read as `https://`.
    pub fn project_name(&self) -> Result<String> {
        let raw = self.website.trim();
        let parsed = Url::parse(raw).or_else(|_| Url::parse(&format!("https://{raw}")));

        let url = parsed.map_err(|e| {
            VpError::config(format!("Invalid project website '{}': {}", self.website, e))
        })?;

        url.host_str()
            .filter(|host| !host.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                VpError::config(format!("Project website '{}' has no host", self.website))
            })
    }
}

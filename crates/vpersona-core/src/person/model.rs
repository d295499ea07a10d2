//! Virtual person domain model.
//!
//! A virtual person is a fabricated profile attached to a project. Records move
//! through the generation pipeline as values: each stage produces a new record
//! through one of the `with_*` methods instead of mutating a shared one.

use serde::{Deserialize, Serialize};

use crate::naming::{create_file_name, encode_name};
use crate::project::Project;

/// A generated profile (name, biography, status, optional headshot).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualPerson {
    /// Storage identifier, assigned by the persistence adapter on create
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "_id")]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Deduplication key, always `encode_name(name)`
    pub name_encoded: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    /// Short status line (e.g. "Head of Partnerships")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Durable URL of the generated headshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headshot: Option<String>,
    /// Filename slug derived from the name
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub owner_id: String,
}

impl VirtualPerson {
    /// Creates an unresolved candidate for `project` with derived key and link.
    pub fn candidate(name: impl Into<String>, project: &Project) -> Self {
        let name = name.into();
        Self {
            id: None,
            name_encoded: encode_name(&name),
            link: create_file_name(&name),
            name,
            biography: None,
            status: None,
            headshot: None,
            project_id: project.id.clone(),
            owner_id: project.owner_id.clone(),
        }
    }

    /// Returns a copy with biography and status attached.
    pub fn with_profile(self, biography: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            biography: Some(biography.into()),
            status: Some(status.into()),
            ..self
        }
    }

    /// Returns a copy carrying the storage identifier.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self
        }
    }

    /// Returns a copy with the headshot URL attached.
    pub fn with_headshot(self, url: impl Into<String>) -> Self {
        Self {
            headshot: Some(url.into()),
            ..self
        }
    }

    /// Both biography and status are resolved.
    pub fn has_profile(&self) -> bool {
        self.biography.is_some() && self.status.is_some()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn has_headshot(&self) -> bool {
        self.headshot.is_some()
    }
}

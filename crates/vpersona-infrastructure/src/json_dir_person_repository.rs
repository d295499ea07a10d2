//! File-backed `VirtualPersonRepository`.
//!
//! Directory structure:
//! ```text
//! base_dir/
//! └── persons/
//!     └── <encoded project id>/
//!         ├── <uuid-1>.json
//!         └── <uuid-2>.json
//! ```
//!
//! The project directory name is the encoded project id so arbitrary ids stay
//! inside `persons/`.

use std::path::{Path, PathBuf};

use tokio::fs;
use vpersona_core::error::{Result, VpError};
use vpersona_core::naming::encode_name;
use vpersona_core::person::{VirtualPerson, VirtualPersonRepository};

use crate::paths::VpersonaPaths;

const PERSONS_DIR: &str = "persons";

/// One JSON file per person.
pub struct JsonDirPersonRepository {
    root: PathBuf,
}

impl JsonDirPersonRepository {
    /// Uses the platform data directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(VpersonaPaths::data_dir()?))
    }

    /// Creates a repository rooted at `base_dir` (for testing or custom data dirs).
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            root: base_dir.as_ref().join(PERSONS_DIR),
        }
    }

    fn project_dir(&self, project_id: &str) -> PathBuf {
        self.root.join(encode_name(project_id))
    }

    fn record_path(&self, project_id: &str, id: &str) -> PathBuf {
        self.project_dir(project_id).join(format!("{id}.json"))
    }

    async fn write_record(&self, person: &VirtualPerson, id: &str) -> Result<()> {
        let dir = self.project_dir(&person.project_id);
        fs::create_dir_all(&dir).await?;

        let path = self.record_path(&person.project_id, id);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(person)?;

        // tmp file + rename keeps readers from seeing half-written records
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn load_project(&self, project_id: &str) -> Result<Vec<VirtualPerson>> {
        let dir = self.project_dir(project_id);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut persons = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<VirtualPerson>(&content) {
                Ok(person) => persons.push(person),
                Err(e) => {
                    tracing::warn!("Skipping unreadable person record {}: {}", path.display(), e);
                }
            }
        }
        Ok(persons)
    }
}

#[async_trait::async_trait]
impl VirtualPersonRepository for JsonDirPersonRepository {
    async fn find_by_encoded_names(
        &self,
        project_id: &str,
        encoded_names: &[String],
    ) -> Result<Vec<VirtualPerson>> {
        if encoded_names.is_empty() {
            return Ok(Vec::new());
        }

        let persons = self.load_project(project_id).await?;
        Ok(persons
            .into_iter()
            .filter(|person| encoded_names.contains(&person.name_encoded))
            .collect())
    }

    async fn create(&self, person: &VirtualPerson) -> Result<VirtualPerson> {
        let id = uuid::Uuid::new_v4().to_string();
        let stored = person.clone().with_id(id.clone());
        self.write_record(&stored, &id).await?;
        tracing::debug!("Created person '{}' ({})", stored.name, id);
        Ok(stored)
    }

    async fn patch(&self, id: &str, person: &VirtualPerson) -> Result<VirtualPerson> {
        let path = self.record_path(&person.project_id, id);
        if !fs::try_exists(&path).await? {
            return Err(VpError::not_found("virtual_person", id));
        }

        let stored = person.clone().with_id(id);
        self.write_record(&stored, id).await?;
        Ok(stored)
    }
}

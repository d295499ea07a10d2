//! Virtual Person Generator
//!
//! Generates fictitious persons for a project in one sequential pass:
//!
//! 1. request `count` candidate names (`count` drawn from `[min, max)`)
//! 2. drop candidates already stored for the project
//! 3. stop if nothing is left
//! 4. request a biography and status per candidate
//! 5. create the records
//! 6. request a headshot per record, pausing between image requests
//!
//! Repository and schema errors propagate from every stage. Image generation
//! and upload failures are isolated per person: the record is stored without a
//! headshot and the batch moves on.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use vpersona_core::error::{Result, VpError};
use vpersona_core::generation::{
    GenerationRequest, ImageGenerator, ImageStorage, PictureRequest, TextGenerator, TextRequest,
};
use vpersona_core::naming::encode_name;
use vpersona_core::person::{VirtualPerson, VirtualPersonRepository};
use vpersona_core::project::Project;
use vpersona_core::prompt::{build_biography_prompt, build_headshot_prompt, build_names_prompt};
use vpersona_core::schema::{BiographyResponse, NamesResponse, ResponseSchema};
use vpersona_core::settings::PromptSource;

/// Tunables read once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Token cap forwarded to the text backend
    pub max_tokens: Option<u32>,
    /// Pause after each headshot attempt, in milliseconds
    pub headshot_delay_ms: RangeInclusive<u64>,
    pub aspect_ratio: String,
    /// Headshot prompt; `Custom` text may contain a `{name}` placeholder
    pub prompt_source: PromptSource,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            headshot_delay_ms: 1500..=2500,
            aspect_ratio: "1:1".to_string(),
            prompt_source: PromptSource::Generated,
        }
    }
}

/// Outcome of one `init` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Number of names requested from the text backend
    pub requested: usize,
    /// Candidates dropped because they already exist (or repeat)
    pub skipped_existing: usize,
    /// Final records, in candidate order
    pub created: Vec<VirtualPerson>,
    pub headshots_attached: usize,
    pub headshots_missing: usize,
}

/// Orchestrates virtual person generation for one project.
pub struct VirtualPersonGenerator {
    text_generator: Arc<dyn TextGenerator>,
    image_generator: Arc<dyn ImageGenerator>,
    image_storage: Arc<dyn ImageStorage>,
    person_repository: Arc<dyn VirtualPersonRepository>,
    project: Project,
    options: GeneratorOptions,
    rng: Mutex<StdRng>,
}

impl VirtualPersonGenerator {
    pub fn new(
        text_generator: Arc<dyn TextGenerator>,
        image_generator: Arc<dyn ImageGenerator>,
        image_storage: Arc<dyn ImageStorage>,
        person_repository: Arc<dyn VirtualPersonRepository>,
        project: Project,
        options: GeneratorOptions,
    ) -> Self {
        Self {
            text_generator,
            image_generator,
            image_storage,
            person_repository,
            project,
            options,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Makes the candidate count and the delays reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| VpError::internal(format!("rng lock poisoned: {e}")))?;
        Ok(f(&mut *rng))
    }

    /// Runs the whole pipeline for between `min` (inclusive) and `max`
    /// (exclusive) new persons.
    pub async fn init(&self, min: usize, max: usize) -> Result<GenerationReport> {
        let request = GenerationRequest::new(min, max)?;
        let project_name = self.project.project_name()?;
        let count = self.with_rng(|rng| request.draw_count(rng))?;

        tracing::info!(
            "[Generator] Requesting {} names for project '{}'",
            count,
            project_name
        );
        let names = self.request_names(&project_name, count).await?;
        let received = names.len();

        let candidates = self.filter_existing(names).await?;
        let mut report = GenerationReport {
            requested: count,
            skipped_existing: received - candidates.len(),
            ..Default::default()
        };

        if candidates.len() < request.min {
            tracing::warn!(
                "[Generator] Only {} new persons left after deduplication (minimum {})",
                candidates.len(),
                request.min
            );
        }

        if candidates.is_empty() {
            tracing::info!("[Generator] No new persons to create");
            return Ok(report);
        }

        let resolved = self.resolve_profiles(&project_name, candidates).await?;
        let persisted = self.persist(resolved).await?;
        let finished = self.resolve_headshots(persisted).await?;

        report.headshots_attached = finished.iter().filter(|p| p.has_headshot()).count();
        report.headshots_missing = finished.len() - report.headshots_attached;
        report.created = finished;

        tracing::info!(
            "[Generator] Created {} persons ({} with headshot)",
            report.created.len(),
            report.headshots_attached
        );
        Ok(report)
    }

    /// Stage 1: asks the text backend for `count` names.
    pub async fn request_names(&self, project_name: &str, count: usize) -> Result<Vec<String>> {
        let schema = ResponseSchema::names();
        let request = TextRequest::new(build_names_prompt(project_name, count), schema.clone())
            .with_max_tokens(self.options.max_tokens);

        let value = self.text_generator.request(&request).await?;
        let response: NamesResponse = schema.parse(value)?;

        Ok(response
            .persons
            .into_iter()
            .map(|entry| entry.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Stage 2: turns names into candidates, dropping names already stored
    /// for the project and repeats within `names`. Order is preserved.
    pub async fn filter_existing(&self, names: Vec<String>) -> Result<Vec<VirtualPerson>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let encoded: Vec<String> = names.iter().map(|name| encode_name(name)).collect();
        let existing = self
            .person_repository
            .find_by_encoded_names(&self.project.id, &encoded)
            .await?;

        let mut seen: HashSet<String> = existing.into_iter().map(|person| person.name).collect();

        let candidates: Vec<VirtualPerson> = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .map(|name| VirtualPerson::candidate(name, &self.project))
            .collect();

        tracing::debug!("[Generator] {} candidates after deduplication", candidates.len());
        Ok(candidates)
    }

    /// Stage 4: attaches biography and status to candidates lacking them.
    pub async fn resolve_profiles(
        &self,
        project_name: &str,
        candidates: Vec<VirtualPerson>,
    ) -> Result<Vec<VirtualPerson>> {
        let schema = ResponseSchema::biography();
        let mut resolved = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            if candidate.has_profile() {
                resolved.push(candidate);
                continue;
            }

            let request = TextRequest::new(
                build_biography_prompt(project_name, &candidate.name),
                schema.clone(),
            )
            .with_max_tokens(self.options.max_tokens);

            tracing::debug!("[Generator] Requesting biography for '{}'", candidate.name);
            let value = self.text_generator.request(&request).await?;
            let profile: BiographyResponse = schema.parse(value)?;

            resolved.push(candidate.with_profile(profile.biography, profile.status));
        }

        Ok(resolved)
    }

    /// Stage 5: creates records for candidates without a storage id.
    pub async fn persist(&self, candidates: Vec<VirtualPerson>) -> Result<Vec<VirtualPerson>> {
        let mut persisted = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            if candidate.is_persisted() {
                persisted.push(candidate);
                continue;
            }

            let stored = self.person_repository.create(&candidate).await?;
            tracing::info!(
                "[Generator] Created '{}' ({})",
                stored.name,
                stored.id.as_deref().unwrap_or("-")
            );
            persisted.push(stored);
        }

        Ok(persisted)
    }

    /// Stage 6: requests, stores and attaches a headshot for every stored
    /// person without one. Image and upload failures are logged per person;
    /// a failed patch aborts the stage.
    pub async fn resolve_headshots(&self, persons: Vec<VirtualPerson>) -> Result<Vec<VirtualPerson>> {
        let mut finished = Vec::with_capacity(persons.len());

        for person in persons {
            let Some(id) = person.id.clone() else {
                tracing::warn!("[Generator] '{}' has no storage id, skipping headshot", person.name);
                finished.push(person);
                continue;
            };

            if person.has_headshot() {
                finished.push(person);
                continue;
            }

            let updated = match self.fetch_headshot(&person).await {
                Ok(Some(url)) => person.with_headshot(url),
                Ok(None) => {
                    tracing::warn!("[Generator] No headshot generated for '{}'", person.name);
                    person
                }
                Err(e) => {
                    tracing::warn!("[Generator] Headshot failed for '{}': {}", person.name, e);
                    person
                }
            };

            let stored = self.person_repository.patch(&id, &updated).await?;
            finished.push(stored);

            self.pause_between_images().await;
        }

        Ok(finished)
    }

    fn headshot_prompt(&self, name: &str) -> String {
        match &self.options.prompt_source {
            PromptSource::Generated => build_headshot_prompt(name),
            PromptSource::Custom(text) => text.replace("{name}", name),
        }
    }

    async fn fetch_headshot(&self, person: &VirtualPerson) -> Result<Option<String>> {
        let request = PictureRequest {
            query: self.headshot_prompt(&person.name),
            aspect_ratio: self.options.aspect_ratio.clone(),
        };

        let Some(remote_url) = self.image_generator.get_picture(&request).await? else {
            return Ok(None);
        };

        let stored_url = self.image_storage.upload_from_url(&remote_url).await?;
        Ok(Some(stored_url))
    }

    async fn pause_between_images(&self) {
        let range = self.options.headshot_delay_ms.clone();
        let millis = if range.is_empty() {
            *range.start()
        } else {
            self.with_rng(|rng| rng.gen_range(range.clone()))
                .unwrap_or(*range.end())
        };
        tracing::debug!("[Generator] Waiting {} ms before next image request", millis);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

#[cfg(test)]
#[path = "virtual_person_generator_test.rs"]
mod tests;

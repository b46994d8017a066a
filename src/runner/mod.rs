//! Run loop
//!
//! Processes entities strictly in ascending index order starting from the
//! resume point. Each entity's row is durably appended before the next
//! entity begins, so a crash or Ctrl-C loses at most the entity in flight,
//! and that entity is processed again on the next run.

use crate::crawler::CrawlController;
use crate::input::Entity;
use crate::registry::RegistryLookup;
use crate::state::RunStats;
use crate::storage::{EntityResult, FoundStatus, ResultStore};
use crate::Result;
use std::future::Future;
use std::time::Instant;
use url::Url;

/// What one invocation of [`Runner::run`] did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Index the run started from
    pub resumed_from: usize,
    /// Rows persisted during this run
    pub processed: usize,
    pub websites_found: usize,
    pub emails_found: usize,
    /// Rolling average seconds per entity over the process lifetime
    pub average_seconds: f64,
    /// Shutdown was requested before every entity was processed
    pub interrupted: bool,
}

/// Owns the run-scoped collaborators and drives entities through them
pub struct Runner<S: ResultStore> {
    lookup: Box<dyn RegistryLookup>,
    controller: CrawlController,
    store: S,
    stats: RunStats,
}

impl<S: ResultStore> Runner<S> {
    pub fn new(lookup: Box<dyn RegistryLookup>, controller: CrawlController, store: S) -> Self {
        Self {
            lookup,
            controller,
            store,
            stats: RunStats::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Processes every entity at or past the resume point
    ///
    /// `shutdown` is raced against each entity. When it completes, the
    /// entity in flight is dropped without a row and the run returns with
    /// `interrupted` set.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - All remaining entities processed, or shutdown requested
    /// * `Err(ScoutError)` - Result store unwritable or connectivity lost for good
    pub async fn run<F>(&mut self, entities: &[Entity], shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let resume_point = self.store.resume_point()?;
        tracing::info!(
            "Resuming from index {} ({} entities in input)",
            resume_point,
            entities.len()
        );

        let mut summary = RunSummary {
            resumed_from: resume_point,
            ..Default::default()
        };

        tokio::pin!(shutdown);

        for entity in entities.iter().filter(|e| e.index >= resume_point) {
            tracing::info!("Processing [{}] {}", entity.index, entity.name);
            let started = Instant::now();

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!(
                        "Shutdown requested; [{}] {} will be processed on the next run",
                        entity.index,
                        entity.name
                    );
                    summary.interrupted = true;
                    break;
                }
                result = self.process(entity) => result?,
            };

            let elapsed = started.elapsed();
            let average = self.stats.record(elapsed);
            let result = EntityResult {
                elapsed_seconds: elapsed.as_secs_f64(),
                ..result
            };

            if self.store.append(&result)? {
                summary.processed += 1;
                if result.website_status.is_found() {
                    summary.websites_found += 1;
                }
                if result.email_status.is_found() {
                    summary.emails_found += 1;
                }
            }

            tracing::info!(
                "Saved [{}]: website {}, email {} ({:.2}s, average {:.2}s)",
                result.index,
                result.website_status,
                result.email_status,
                result.elapsed_seconds,
                average
            );
        }

        summary.average_seconds = self.stats.average();
        Ok(summary)
    }

    /// Resolves and crawls one entity
    async fn process(&mut self, entity: &Entity) -> Result<EntityResult> {
        if entity.name.is_empty() {
            tracing::debug!("Entity {} has a blank name; nothing to look up", entity.index);
            return Ok(EntityResult::not_found(entity.index, ""));
        }

        let Some(website) = self.lookup.lookup(&entity.name).await? else {
            return Ok(EntityResult::not_found(entity.index, entity.name.clone()));
        };

        let report = self.controller.crawl(&website).await?;
        let email = report.email.map(|candidate| candidate.address);

        Ok(EntityResult {
            index: entity.index,
            name: entity.name.clone(),
            website_status: FoundStatus::from_bool(report.website_reachable),
            website_url: Some(website_label(&website)),
            email_status: FoundStatus::from_bool(email.is_some()),
            email,
            elapsed_seconds: 0.0,
        })
    }
}

/// Formats a website for the result row; a bare root loses its trailing slash
fn website_label(url: &Url) -> String {
    let text = url.as_str();
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        text.trim_end_matches('/').to_string()
    } else {
        text.to_string()
    }
}

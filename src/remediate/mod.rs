//! Remediation of failing items: automatic replacement or interactive
//! release selection.

mod console;

pub use console::ConsolePrompt;

use crate::arr::{CatalogClient, CatalogError, MediaItem, ReleaseCandidate};
use crate::cache::{CacheSet, PassedRecord, SkipRecord};
use crate::classify::Verdict;
use crate::report::Outcome;
use crate::select;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the operator decided at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// Download the release at this index of the presented (filtered) list.
    Download(usize),
    /// Restrict the list to titles containing this term and re-present.
    Filter(String),
    /// Drop the active filter and re-present.
    ClearFilter,
    /// Leave the item alone and remember that across runs.
    Skip,
    /// Forget a previously recorded skip decision and re-present.
    ClearSkip,
    /// Keep the current file: record a pass despite the verdict.
    Keep,
    /// No decision; prompt again next run.
    Cancel,
}

/// Everything a prompt needs to present one failing item.
pub struct PromptContext<'a> {
    pub item: &'a MediaItem,
    pub verdict: Verdict,
    /// The filtered, ordered view currently presented.
    pub releases: &'a [ReleaseCandidate],
    pub filter: Option<&'a str>,
    /// Total candidates before filtering.
    pub total: usize,
    pub skip_recorded: bool,
    pub dry_run: bool,
}

/// Capability handed to the remediation engine for interactive runs; the
/// audit loop itself never touches a terminal.
#[async_trait::async_trait]
pub trait ReleasePrompt: Send + Sync {
    async fn choose(&self, ctx: &PromptContext<'_>) -> anyhow::Result<PromptAction>;
}

/// Applies one of the two remediation policies to a single failing item.
/// Strictly sequential per item: delete always settles before the follow-up
/// search or download is attempted.
pub struct Remediator {
    caches: Arc<CacheSet>,
    dry_run: bool,
    /// Set as soon as the catalog rejects the API key; the audit loop stops
    /// remediating the remaining items of that catalog.
    auth_failed: Arc<AtomicBool>,
}

impl Remediator {
    pub fn new(caches: Arc<CacheSet>, dry_run: bool, auth_failed: Arc<AtomicBool>) -> Self {
        Self {
            caches,
            dry_run,
            auth_failed,
        }
    }

    fn note_error(&self, error: &CatalogError) {
        if error.is_auth() {
            self.auth_failed.store(true, Ordering::Relaxed);
        }
    }

    /// Automatic policy: delete the failing file, then trigger the catalog's
    /// own search. Neither call is retried within the run.
    pub async fn automatic(&self, catalog: &dyn CatalogClient, item: &MediaItem) -> Outcome {
        if self.dry_run {
            tracing::info!(
                title = %item.title,
                path = %item.path.display(),
                "DRY RUN: would delete file and trigger search"
            );
            return Outcome::Remediated { dry_run: true };
        }

        if let Err(e) = catalog.delete_file(item).await {
            self.note_error(&e);
            return Outcome::RemediationError {
                error: e.to_string(),
                inconsistent: false,
            };
        }

        if let Err(e) = catalog.trigger_search(item).await {
            self.note_error(&e);
            // The file is gone but nothing is queued to replace it.
            return Outcome::RemediationError {
                error: e.to_string(),
                inconsistent: true,
            };
        }

        Outcome::Remediated { dry_run: false }
    }

    /// Interactive policy: present ranked candidates and apply the operator's
    /// decision. A chosen release replaces the file but never writes a
    /// PassedRecord - the replacement is re-probed next run.
    pub async fn interactive(
        &self,
        catalog: &dyn CatalogClient,
        item: &MediaItem,
        verdict: Verdict,
        prompt: &dyn ReleasePrompt,
    ) -> Outcome {
        let releases = match catalog.list_releases(item).await {
            Ok(releases) => releases,
            Err(e) => {
                self.note_error(&e);
                return Outcome::RemediationError {
                    error: e.to_string(),
                    inconsistent: false,
                };
            }
        };

        let mut filter: Option<String> = None;

        loop {
            let view = select::select(&releases, filter.as_deref());

            let ctx = PromptContext {
                item,
                verdict,
                releases: &view,
                filter: filter.as_deref(),
                total: releases.len(),
                skip_recorded: self.caches.skip.contains(&item.skip_key()),
                dry_run: self.dry_run,
            };

            let action = match prompt.choose(&ctx).await {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!(title = %item.title, "prompt failed: {}, deferring", e);
                    return Outcome::Deferred;
                }
            };

            match action {
                PromptAction::Filter(term) => filter = Some(term),
                PromptAction::ClearFilter => filter = None,
                PromptAction::Cancel => return Outcome::Deferred,
                PromptAction::Skip => {
                    let record = SkipRecord {
                        title: item.title.clone(),
                        path: item.path.clone(),
                        decided_at: Utc::now(),
                    };
                    if let Err(e) = self.caches.skip.put(&item.skip_key(), record) {
                        tracing::warn!("Could not persist skip decision: {}", e);
                    }
                    return Outcome::Skipped;
                }
                PromptAction::ClearSkip => {
                    match self.caches.skip.clear_entry(&item.skip_key()) {
                        Ok(true) => tracing::info!(title = %item.title, "cleared skip decision"),
                        Ok(false) => tracing::info!(title = %item.title, "no skip decision to clear"),
                        Err(e) => tracing::warn!("Could not clear skip decision: {}", e),
                    }
                }
                PromptAction::Keep => {
                    let record = PassedRecord {
                        path: item.path.clone(),
                        checked_at: Utc::now(),
                    };
                    if let Err(e) = self.caches.passed.put(&item.fingerprint(), record) {
                        tracing::warn!("Could not persist keep decision: {}", e);
                    }
                    return Outcome::Kept;
                }
                PromptAction::Download(index) => {
                    let Some(release) = view.get(index) else {
                        tracing::warn!("Release choice {} out of range, re-prompting", index + 1);
                        continue;
                    };

                    if self.dry_run {
                        tracing::info!(
                            title = %item.title,
                            release = %release.title,
                            "DRY RUN: would delete file and download release"
                        );
                        return Outcome::DownloadQueued {
                            release_title: release.title.clone(),
                            dry_run: true,
                        };
                    }

                    if let Err(e) = catalog.delete_file(item).await {
                        self.note_error(&e);
                        return Outcome::RemediationError {
                            error: e.to_string(),
                            inconsistent: false,
                        };
                    }

                    if let Err(e) = catalog.download_release(item, release).await {
                        self.note_error(&e);
                        return Outcome::RemediationError {
                            error: e.to_string(),
                            inconsistent: true,
                        };
                    }

                    return Outcome::DownloadQueued {
                        release_title: release.title.clone(),
                        dry_run: false,
                    };
                }
            }
        }
    }
}

//! The audit loop: caches -> prober -> classifier -> remediation routing.
//!
//! Items are evaluated with bounded concurrency but handled in the catalog's
//! listing order, so interactive runs are reproducible and resumable.
//! Remediation is strictly sequential per item; across items it runs
//! bounded-concurrently in automatic mode and sequentially in interactive
//! mode (a prompt is a human-in-the-loop checkpoint).

use crate::arr::{CatalogClient, MediaItem};
use crate::cache::{CacheSet, PassedRecord};
use crate::classify::{self, LanguageSet, Verdict};
use crate::config::Settings;
use crate::probe::Inspector;
use crate::remediate::{ReleasePrompt, Remediator};
use crate::report::{ItemReport, Outcome, RunReport};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Audit policy, resolved from configuration (and CLI overrides) once per run.
#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub dry_run: bool,
    pub interactive: bool,
    pub require_audio: bool,
    pub require_subs: bool,
    pub languages: LanguageSet,
    /// Presentation-only highlight set; None when not configured.
    pub highlight: Option<LanguageSet>,
    pub probe_concurrency: usize,
    pub remediation_concurrency: usize,
}

impl From<&Settings> for AuditSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            dry_run: settings.dry_run,
            interactive: settings.interactive,
            require_audio: settings.require_audio,
            require_subs: settings.require_subs,
            languages: LanguageSet::new(&settings.language_codes),
            // The highlight label resolves to the configured codes; it only
            // ever drives log output.
            highlight: settings
                .highlight_missing_subs
                .as_ref()
                .map(|_| LanguageSet::new(&settings.language_codes)),
            probe_concurrency: settings.probe_concurrency.max(1),
            remediation_concurrency: settings.remediation_concurrency.max(1),
        }
    }
}

enum EvalState {
    /// PassedRecord hit: neither probed nor remediated.
    CachedOk,
    /// Freshly classified as passing; PassedRecord written.
    Passed(Verdict),
    Failing(Verdict),
    Uninspectable(String),
}

struct Evaluation {
    item: MediaItem,
    state: EvalState,
}

pub struct Auditor {
    inspector: Arc<dyn Inspector>,
    caches: Arc<CacheSet>,
    prompt: Arc<dyn ReleasePrompt>,
    settings: AuditSettings,
}

impl Auditor {
    pub fn new(
        inspector: Arc<dyn Inspector>,
        caches: Arc<CacheSet>,
        prompt: Arc<dyn ReleasePrompt>,
        settings: AuditSettings,
    ) -> Self {
        Self {
            inspector,
            caches,
            prompt,
            settings,
        }
    }

    /// Audit every catalog in turn. Item failures never abort the run; a
    /// catalog-level failure aborts that catalog's items only.
    pub async fn run(&self, catalogs: &[Box<dyn CatalogClient>]) -> RunReport {
        let mut report = RunReport::default();
        for catalog in catalogs {
            self.run_catalog(catalog.as_ref(), &mut report).await;
        }
        report
    }

    async fn run_catalog(&self, catalog: &dyn CatalogClient, report: &mut RunReport) {
        let items = match catalog.list_items().await {
            Ok(items) => items,
            Err(e) => {
                report.record_catalog_failure(catalog.name(), e.to_string());
                return;
            }
        };

        tracing::info!(catalog = catalog.name(), items = items.len(), "auditing catalog");

        let evaluations: Vec<Evaluation> =
            stream::iter(items.into_iter().map(|item| self.evaluate(item)))
                .buffered(self.settings.probe_concurrency)
                .collect()
                .await;

        let auth_failed = Arc::new(AtomicBool::new(false));
        let remediator = Remediator::new(
            self.caches.clone(),
            self.settings.dry_run,
            auth_failed.clone(),
        );

        if self.settings.interactive {
            for evaluation in evaluations {
                let item_report = self
                    .finalize(catalog, evaluation, &remediator, &auth_failed)
                    .await;
                report.push(item_report);
            }
        } else {
            let item_reports: Vec<ItemReport> = stream::iter(
                evaluations
                    .into_iter()
                    .map(|evaluation| self.finalize(catalog, evaluation, &remediator, &auth_failed)),
            )
            .buffered(self.settings.remediation_concurrency)
            .collect()
            .await;

            for item_report in item_reports {
                report.push(item_report);
            }
        }

        if auth_failed.load(Ordering::Relaxed) {
            report.record_catalog_failure(
                catalog.name(),
                "API key rejected during remediation, remaining calls aborted".to_string(),
            );
        }
    }

    /// Steps 1-3 of the per-item state machine: passed-record check, probe
    /// (cache or Prober), classify. Never touches the catalog.
    async fn evaluate(&self, item: MediaItem) -> Evaluation {
        let fingerprint = item.fingerprint();

        if self.caches.passed.contains(&fingerprint) {
            return Evaluation {
                item,
                state: EvalState::CachedOk,
            };
        }

        let inventory = match self.caches.probe.get(&fingerprint) {
            Some(inventory) => inventory,
            None => match self.inspector.inspect(&item.path).await {
                Ok(inventory) => {
                    // Only successful probes are cached; failures retry next run.
                    if let Err(e) = self.caches.probe.put(&fingerprint, inventory.clone()) {
                        tracing::warn!("Could not cache probe result: {}", e);
                    }
                    inventory
                }
                Err(e) => {
                    return Evaluation {
                        item,
                        state: EvalState::Uninspectable(e.to_string()),
                    };
                }
            },
        };

        let verdict = classify::classify(
            &inventory,
            self.settings.require_audio,
            self.settings.require_subs,
            &self.settings.languages,
        );

        if let Some(highlight) = &self.settings.highlight {
            if classify::subs_highlight(&inventory, highlight) {
                tracing::info!(
                    title = %item.title,
                    path = %item.path.display(),
                    "missing highlighted subtitles"
                );
            }
        }

        if verdict.overall_ok() {
            let record = PassedRecord {
                path: item.path.clone(),
                checked_at: Utc::now(),
            };
            if let Err(e) = self.caches.passed.put(&fingerprint, record) {
                tracing::warn!("Could not persist passed record: {}", e);
            }
            Evaluation {
                item,
                state: EvalState::Passed(verdict),
            }
        } else {
            Evaluation {
                item,
                state: EvalState::Failing(verdict),
            }
        }
    }

    /// Steps 4-5: route a failing item to the configured remediation policy,
    /// honoring skip records and the catalog's auth latch.
    async fn finalize(
        &self,
        catalog: &dyn CatalogClient,
        evaluation: Evaluation,
        remediator: &Remediator,
        auth_failed: &AtomicBool,
    ) -> ItemReport {
        let Evaluation { item, state } = evaluation;

        let (verdict, outcome) = match state {
            EvalState::CachedOk => (None, Outcome::Ok { cached: true }),
            EvalState::Passed(verdict) => (Some(verdict), Outcome::Ok { cached: false }),
            EvalState::Uninspectable(error) => (None, Outcome::Uninspectable { error }),
            EvalState::Failing(verdict) => {
                let outcome = if self.caches.skip.contains(&item.skip_key()) {
                    Outcome::Skipped
                } else if auth_failed.load(Ordering::Relaxed) {
                    Outcome::RemediationError {
                        error: format!(
                            "not attempted: {} rejected the API key earlier in this run",
                            catalog.name()
                        ),
                        inconsistent: false,
                    }
                } else if self.settings.interactive {
                    remediator
                        .interactive(catalog, &item, verdict, self.prompt.as_ref())
                        .await
                } else {
                    remediator.automatic(catalog, &item).await
                };
                (Some(verdict), outcome)
            }
        };

        ItemReport {
            catalog: catalog.name().to_string(),
            title: item.title,
            path: item.path,
            verdict,
            outcome,
        }
    }
}

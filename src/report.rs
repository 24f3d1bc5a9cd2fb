//! Per-item outcomes and the end-of-run report.

use crate::classify::Verdict;
use std::path::PathBuf;

/// Terminal state of one item for this run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// File satisfies the language requirement.
    Ok { cached: bool },
    /// File deleted and an automatic search triggered (or would be, on dry run).
    Remediated { dry_run: bool },
    /// A specific release was queued for download (or would be, on dry run).
    DownloadQueued { release_title: String, dry_run: bool },
    /// Operator chose to keep the file despite the failing verdict.
    Kept,
    /// Left alone per a recorded skip decision.
    Skipped,
    /// Interactive session ended without a decision; will prompt again next run.
    Deferred,
    /// The file could not be inspected; retried next run.
    Uninspectable { error: String },
    /// Remediation was attempted and failed. `inconsistent` means the file is
    /// gone but no replacement was queued - operator attention needed.
    RemediationError { error: String, inconsistent: bool },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Ok { .. } => "ok",
            Outcome::Remediated { dry_run: false } => "failing-remediated",
            Outcome::Remediated { dry_run: true } => "failing-remediated (dry run)",
            Outcome::DownloadQueued { dry_run: false, .. } => "failing-download-queued",
            Outcome::DownloadQueued { dry_run: true, .. } => "failing-download-queued (dry run)",
            Outcome::Kept => "kept-by-operator",
            Outcome::Skipped => "failing-skipped",
            Outcome::Deferred => "failing-deferred-interactive",
            Outcome::Uninspectable { .. } => "uninspectable-error",
            Outcome::RemediationError { .. } => "remediation-error",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }
}

/// Everything an operator needs to diagnose one item without re-running.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub catalog: String,
    pub title: String,
    pub path: PathBuf,
    pub verdict: Option<Verdict>,
    pub outcome: Outcome,
}

impl ItemReport {
    fn log(&self) {
        let verdict = self
            .verdict
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match &self.outcome {
            Outcome::Ok { cached: true } => {
                tracing::debug!(catalog = %self.catalog, title = %self.title, "already verified as OK")
            }
            Outcome::Ok { cached: false } => {
                tracing::info!(catalog = %self.catalog, title = %self.title, "OK")
            }
            Outcome::Skipped => {
                tracing::info!(catalog = %self.catalog, title = %self.title, %verdict, "skipped per prior decision")
            }
            Outcome::Kept => {
                tracing::info!(catalog = %self.catalog, title = %self.title, %verdict, "kept by operator decision")
            }
            Outcome::Deferred => {
                tracing::info!(catalog = %self.catalog, title = %self.title, %verdict, "deferred, will prompt again next run")
            }
            Outcome::Remediated { .. } | Outcome::DownloadQueued { .. } => {
                tracing::warn!(
                    catalog = %self.catalog,
                    title = %self.title,
                    path = %self.path.display(),
                    %verdict,
                    outcome = self.outcome.label(),
                    "failing item remediated"
                )
            }
            Outcome::Uninspectable { error } => {
                tracing::warn!(
                    catalog = %self.catalog,
                    title = %self.title,
                    path = %self.path.display(),
                    %error,
                    "could not inspect file, will retry next run"
                )
            }
            Outcome::RemediationError { error, inconsistent } => {
                if *inconsistent {
                    tracing::error!(
                        catalog = %self.catalog,
                        title = %self.title,
                        path = %self.path.display(),
                        %verdict,
                        %error,
                        "file deleted but no replacement queued - needs operator attention"
                    )
                } else {
                    tracing::error!(
                        catalog = %self.catalog,
                        title = %self.title,
                        path = %self.path.display(),
                        %verdict,
                        %error,
                        "remediation failed, item left for next run"
                    )
                }
            }
        }
    }
}

/// Aggregate of one audit pass across all catalogs.
#[derive(Debug, Default)]
pub struct RunReport {
    pub items: Vec<ItemReport>,
    /// Catalogs that could not be audited at all (e.g. auth failure).
    pub failed_catalogs: Vec<(String, String)>,
}

impl RunReport {
    pub fn push(&mut self, item: ItemReport) {
        item.log();
        self.items.push(item);
    }

    pub fn record_catalog_failure(&mut self, catalog: &str, error: String) {
        tracing::error!(catalog, %error, "catalog unreachable, its items were not audited");
        self.failed_catalogs.push((catalog.to_string(), error));
    }

    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|i| predicate(&i.outcome)).count()
    }

    /// True unless every audited catalog failed outright.
    pub fn any_catalog_succeeded(&self, total_catalogs: usize) -> bool {
        self.failed_catalogs.len() < total_catalogs
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Audited {} items", self.items.len())?;
        writeln!(
            f,
            "  ok: {} ({} from cache)",
            self.count(Outcome::is_ok),
            self.count(|o| matches!(o, Outcome::Ok { cached: true }))
        )?;
        writeln!(
            f,
            "  remediated: {}",
            self.count(|o| matches!(
                o,
                Outcome::Remediated { .. } | Outcome::DownloadQueued { .. }
            ))
        )?;
        writeln!(
            f,
            "  skipped: {}, kept: {}, deferred: {}",
            self.count(|o| matches!(o, Outcome::Skipped)),
            self.count(|o| matches!(o, Outcome::Kept)),
            self.count(|o| matches!(o, Outcome::Deferred))
        )?;
        writeln!(
            f,
            "  uninspectable: {}, remediation errors: {}",
            self.count(|o| matches!(o, Outcome::Uninspectable { .. })),
            self.count(|o| matches!(o, Outcome::RemediationError { .. }))
        )?;

        for item in &self.items {
            if let Outcome::RemediationError {
                inconsistent: true, ..
            } = item.outcome
            {
                writeln!(
                    f,
                    "  ATTENTION: {} ({}) deleted without replacement queued",
                    item.title,
                    item.path.display()
                )?;
            }
        }

        for (catalog, error) in &self.failed_catalogs {
            writeln!(f, "  catalog '{}' unreachable: {}", catalog, error)?;
        }

        Ok(())
    }
}

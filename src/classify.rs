//! Pass/fail classification of a file's stream inventory.
//!
//! Pure functions over an already-probed [`StreamInventory`]; a missing
//! required language is a normal verdict, never an error.

use linguarr_probe::StreamInventory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A set of language tags, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct LanguageSet(HashSet<String>);

impl LanguageSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            codes
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Whether a stream's language tag satisfies this set. Untagged streams
    /// never match.
    pub fn matches(&self, language: Option<&str>) -> bool {
        match language {
            Some(lang) => self.0.contains(&lang.to_lowercase()),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compliance result for one file at one point in time. Derived, never
/// persisted; only the fact that a file passed is durable (as a PassedRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub audio_ok: bool,
    pub subs_ok: bool,
}

impl Verdict {
    pub fn overall_ok(&self) -> bool {
        self.audio_ok && self.subs_ok
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "audio: {}, subs: {}",
            if self.audio_ok { "ok" } else { "missing" },
            if self.subs_ok { "ok" } else { "missing" }
        )
    }
}

/// Decide whether the inventory satisfies the language requirement.
///
/// A disabled requirement always passes; an enabled requirement needs at
/// least one stream of that kind tagged with a configured language. An
/// inventory with zero streams of a required kind fails that axis.
pub fn classify(
    inventory: &StreamInventory,
    require_audio: bool,
    require_subs: bool,
    languages: &LanguageSet,
) -> Verdict {
    let audio_ok = !require_audio
        || inventory
            .audio_streams
            .iter()
            .any(|s| languages.matches(s.language.as_deref()));

    let subs_ok = !require_subs
        || inventory
            .subtitle_streams
            .iter()
            .any(|s| languages.matches(s.language.as_deref()));

    Verdict { audio_ok, subs_ok }
}

/// Presentation-only check: true when none of the highlight label's codes
/// appear among the subtitle streams. Never feeds into the verdict.
pub fn subs_highlight(inventory: &StreamInventory, highlight: &LanguageSet) -> bool {
    !inventory
        .subtitle_streams
        .iter()
        .any(|s| highlight.matches(s.language.as_deref()))
}

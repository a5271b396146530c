//! Garden memory data model.
//!
//! One [`GardenMemory`] per garden: a fixed anchor block describing the
//! garden's identity, a chronological journal, and periodic review records.
//! `log` and `review` are append-only under engine operations — entries are
//! never reordered, edited, or evicted here.

pub mod store;

use serde::{Deserialize, Serialize};

/// Facts that define a garden's identity and frame every advice request.
/// Set at creation; not touched by engine operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Guiding principles, in the order the gardener wrote them.
    pub principles: Vec<String>,
    pub location: String,
    /// Hardiness zone label (e.g. `"8b"`).
    pub zone: String,
    /// Cultivation style (e.g. `"no-dig permaculture"`).
    pub style: String,
}

/// One timestamped journal record with model-derived tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub entry: String,
    pub tags: Vec<String>,
}

/// A periodic summary of the accumulated journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Free-text period label (e.g. `"Spring 2026"`).
    pub period: String,
    pub summary: String,
    pub lessons_learned: Vec<String>,
}

/// Full memory record for one garden, keyed by `name` in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenMemory {
    pub name: String,
    pub anchor: Anchor,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    #[serde(default)]
    pub review: Vec<ReviewRecord>,
}

impl GardenMemory {
    /// A fresh record with an empty journal and no reviews.
    pub fn new(name: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            name: name.into(),
            anchor,
            log: Vec::new(),
            review: Vec::new(),
        }
    }
}

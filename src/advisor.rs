//! Garden advisory engine — context assembly, journaling, periodic review.
//!
//! A [`GardenAdvisor`] borrows one [`GardenMemory`] and one [`LlmClient`]
//! for the duration of a single request. It holds no other state and never
//! persists anything — loading and saving the record is the caller's job.
//!
//! Mutation discipline: `log` and `review` only ever grow, and an operation
//! that fails mid-flight appends nothing (tags are obtained before the log
//! entry is constructed).

use chrono::Utc;
use tracing::debug;

use crate::llm::{LlmClient, ProviderError};
use crate::memory::{GardenMemory, LogEntry, ReviewRecord};

/// How many of the newest log entries go into an advice context.
const RECENT_LOG_WINDOW: usize = 5;
/// How many of the newest reviews go into an advice context.
const RECENT_REVIEW_WINDOW: usize = 2;

/// Marker prefix for journal entries produced from image analysis.
const IMAGE_MARKER: &str = "[IMAGE ANALYSIS]";
/// Fixed tag set for image-analysis entries — never model-derived.
const IMAGE_TAGS: [&str; 2] = ["image-analysis", "visual-inspection"];

pub struct GardenAdvisor<'a> {
    memory: &'a mut GardenMemory,
    llm: &'a LlmClient,
}

impl<'a> GardenAdvisor<'a> {
    pub fn new(memory: &'a mut GardenMemory, llm: &'a LlmClient) -> Self {
        Self { memory, llm }
    }

    /// Today's calendar day, ISO `YYYY-MM-DD`.
    fn today() -> String {
        Utc::now().date_naive().to_string()
    }

    /// Stamp the date, derive tags from the model, append one journal entry.
    ///
    /// Tags come first: if tag generation fails, the error propagates and
    /// the log is left exactly as it was — no half-formed entry.
    pub async fn append_log_entry(&mut self, text: &str) -> Result<(), ProviderError> {
        let tags = self.llm.generate_tags(text).await?;
        debug!(garden = %self.memory.name, tag_count = tags.len(), "appending log entry");
        self.memory.log.push(LogEntry {
            date: Self::today(),
            entry: text.to_string(),
            tags,
        });
        Ok(())
    }

    /// Append a journal entry wrapping an already-performed image analysis.
    ///
    /// No model call happens here — the caller ran the analysis separately.
    /// Tags are always exactly `["image-analysis", "visual-inspection"]`.
    pub fn append_image_analysis(&mut self, analysis: &str, description: Option<&str>) {
        let entry = match description {
            Some(desc) => format!("{IMAGE_MARKER} {desc}: {analysis}"),
            None => format!("{IMAGE_MARKER} {analysis}"),
        };
        debug!(garden = %self.memory.name, "appending image analysis entry");
        self.memory.log.push(LogEntry {
            date: Self::today(),
            entry,
            tags: IMAGE_TAGS.iter().map(ToString::to_string).collect(),
        });
    }

    /// Ask the model a question against a bounded context window:
    /// the full anchor block, the last five journal entries (oldest of the
    /// window first), and the last two reviews (most-recent-last).
    ///
    /// Returns the raw completion. Mutates nothing.
    pub async fn ask_advice(&self, question: &str) -> Result<String, ProviderError> {
        let prompt = self.advice_prompt(question);
        debug!(garden = %self.memory.name, prompt_len = prompt.len(), "requesting advice");
        self.llm.complete(&prompt).await
    }

    fn advice_prompt(&self, question: &str) -> String {
        let anchor = &self.memory.anchor;

        let recent_logs = tail(&self.memory.log, RECENT_LOG_WINDOW)
            .iter()
            .map(|l| format!("- [{}] {}", l.date, l.entry))
            .collect::<Vec<_>>()
            .join("\n");

        let recent_reviews = tail(&self.memory.review, RECENT_REVIEW_WINDOW)
            .iter()
            .map(|r| format!("[{}]: {}", r.period, r.summary))
            .collect::<Vec<_>>()
            .join("\n");

        let context = format!(
            "You are Indigo, a gardening assistant for the garden \"{name}\".\n\
             \n\
             CORE PRINCIPLES:\n{principles}\n\
             \n\
             LOCATION/ZONE:\n{location} (Zone {zone})\n\
             Style: {style}\n\
             \n\
             RECENT ACTIVITY:\n{recent_logs}\n\
             \n\
             SEASONAL REVIEWS:\n{recent_reviews}\n",
            name = self.memory.name,
            principles = anchor.principles.join("\n"),
            location = anchor.location,
            zone = anchor.zone,
            style = anchor.style,
        );

        format!("{context}\nUser Question: {question}\n\nIndigo's Advice:")
    }

    /// Summarize the journal into one new [`ReviewRecord`].
    ///
    /// Covers the *entire* log every time — there is no "since last review"
    /// cursor, so repeated reviews reprocess the same accumulating journal,
    /// and the log is never pruned afterwards. An empty log is a no-op:
    /// nothing is appended and no model call is made.
    ///
    /// Reply handling is best-effort text parsing: the first line becomes
    /// the summary, and the whole raw reply is stored as the single element
    /// of `lessons_learned`. Downstream consumers see one block, not three
    /// discrete lessons — a carried-over quirk, kept for compatibility.
    pub async fn seasonal_review(&mut self, period: &str) -> Result<(), ProviderError> {
        if self.memory.log.is_empty() {
            debug!(garden = %self.memory.name, "seasonal review skipped: empty log");
            return Ok(());
        }

        let logs = self
            .memory
            .log
            .iter()
            .map(|l| format!("- {}", l.entry))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Summarize these gardening logs for the period \"{period}\" into a concise \
             summary and list 3 key lessons learned.\n\nLogs:\n{logs}"
        );

        let response = self.llm.complete(&prompt).await?;

        let summary = response.lines().next().unwrap_or_default().to_string();
        debug!(garden = %self.memory.name, %period, "appending review record");
        self.memory.review.push(ReviewRecord {
            period: period.to_string(),
            summary,
            lessons_learned: vec![response],
        });
        Ok(())
    }
}

/// The last `n` elements of a slice, in original order.
fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

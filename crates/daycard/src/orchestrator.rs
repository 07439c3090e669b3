//! The bounded retry loop that turns model output into a persisted day.
//!
//! A run moves `Idle → Attempting → {Success, Exhausted}`:
//!
//! - The banned set and the prompt are computed once, before the first
//!   attempt.
//! - Each attempt calls the generator under a timeout, parses the text as
//!   JSON, and validates it. Any failure is logged, recorded as an
//!   [`AttemptFailure`], and spends one attempt from the budget.
//! - The first accepted set ends the loop. [`Orchestrator::run`] then appends
//!   the day to the history, trims it to the window, and commits both
//!   documents.
//! - If the budget runs out, nothing is written and the outcome is
//!   [`RunOutcome::Exhausted`].
//!
//! Only storage write failures escape as errors; everything that can go wrong
//! inside an attempt is folded into the tagged outcome.

use std::time::Duration;

use chrono::NaiveDate;
use daycard_llm::{GenerationError, TextGenerator};
use tracing::{debug, info, warn};

use crate::cards::TodaySet;
use crate::config::CardConfig;
use crate::history::{BannedWords, HistoryEntry};
use crate::prompt::{SYSTEM_INSTRUCTION, build_prompt};
use crate::store::{StateStore, StorageError};
use crate::validate::{ValidationError, accept};

/// Why a single attempt was discarded.
#[derive(Debug, thiserror::Error)]
pub enum AttemptFailure {
    #[error("generation failed: {0}")]
    Transport(#[from] GenerationError),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("response rejected: {0}")]
    Invalid(#[from] ValidationError),
}

/// Result of the attempt loop, before anything is persisted.
#[derive(Debug)]
pub enum Generation {
    Accepted {
        today: TodaySet,
        /// 1-indexed attempt that produced `today`.
        attempts: u32,
        /// Failures of the attempts before it.
        failures: Vec<AttemptFailure>,
    },
    Exhausted {
        attempts: u32,
        failures: Vec<AttemptFailure>,
    },
}

/// Summary of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub date: NaiveDate,
    pub today: TodaySet,
    pub attempts: u32,
    pub failures: Vec<AttemptFailure>,
    /// History length after the new day was appended and trimmed.
    pub history_len: usize,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum RunOutcome {
    Success(RunReport),
    Exhausted {
        attempts: u32,
        failures: Vec<AttemptFailure>,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    /// Convert exhaustion into [`RunError::RetriesExhausted`].
    pub fn into_result(self) -> Result<RunReport, RunError> {
        match self {
            RunOutcome::Success(report) => Ok(report),
            RunOutcome::Exhausted {
                attempts,
                mut failures,
            } => Err(RunError::RetriesExhausted {
                attempts,
                last: failures.pop(),
            }),
        }
    }
}

/// Fatal run errors.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to generate valid cards after {attempts} attempts{}", last_suffix(.last))]
    RetriesExhausted {
        attempts: u32,
        last: Option<AttemptFailure>,
    },
}

fn last_suffix(last: &Option<AttemptFailure>) -> String {
    last.as_ref()
        .map(|f| format!(" (last: {f})"))
        .unwrap_or_default()
}

/// Drives one run against a generator and a store.
pub struct Orchestrator<'a> {
    generator: &'a dyn TextGenerator,
    store: &'a StateStore,
    config: &'a CardConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        store: &'a StateStore,
        config: &'a CardConfig,
    ) -> Self {
        Self {
            generator,
            store,
            config,
        }
    }

    /// Banned words for the next run, from the stored history.
    pub fn banned_words(&self) -> BannedWords {
        self.store
            .load_history()
            .banned_words(self.config.history_window)
    }

    /// Generate, validate, and persist the set for `date`.
    pub async fn run(&self, date: NaiveDate) -> Result<RunOutcome, StorageError> {
        let mut history = self.store.load_history();
        let banned = history.banned_words(self.config.history_window);
        debug!(
            "history has {} entries, {} banned words",
            history.len(),
            banned.len()
        );

        match self.generate(&banned).await {
            Generation::Accepted {
                today,
                attempts,
                failures,
            } => {
                history.push_capped(
                    HistoryEntry::from_today(date, &today),
                    self.config.history_window,
                );
                self.store.commit(&history, &today)?;
                info!(
                    "saved {} for {date}: {}",
                    self.store.today_path().display(),
                    today.words().join(", ")
                );
                Ok(RunOutcome::Success(RunReport {
                    date,
                    today,
                    attempts,
                    failures,
                    history_len: history.len(),
                }))
            }
            Generation::Exhausted { attempts, failures } => {
                warn!("no valid set after {attempts} attempts; nothing persisted");
                Ok(RunOutcome::Exhausted { attempts, failures })
            }
        }
    }

    /// Run the attempt loop against `banned` without touching storage.
    pub async fn generate(&self, banned: &BannedWords) -> Generation {
        let retry = &self.config.retry;
        let prompt = build_prompt(&banned.sorted(), self.config.history_window);
        let mut failures = Vec::new();
        let mut attempt = 1;

        while retry.allows(attempt) {
            let delay = retry.delay_before_attempt(attempt);
            if !delay.is_zero() {
                debug!("waiting {delay:?} before attempt {attempt}");
                tokio::time::sleep(delay).await;
            }

            info!("attempt {attempt}/{}", retry.max_attempts);
            match self.attempt(&prompt, banned).await {
                Ok(today) => {
                    return Generation::Accepted {
                        today,
                        attempts: attempt,
                        failures,
                    };
                }
                Err(failure) => {
                    warn!("attempt {attempt} failed: {failure}");
                    failures.push(failure);
                }
            }
            attempt += 1;
        }

        Generation::Exhausted {
            attempts: attempt - 1,
            failures,
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        banned: &BannedWords,
    ) -> Result<TodaySet, AttemptFailure> {
        let timeout = self.config.attempt_timeout;
        let request = self.generator.generate(SYSTEM_INSTRUCTION, prompt);
        let text = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| AttemptFailure::Timeout(timeout))??;

        let candidate: serde_json::Value = serde_json::from_str(text.trim())
            .map_err(|e| AttemptFailure::Malformed(e.to_string()))?;
        Ok(accept(&candidate, banned)?)
    }
}

//! Daily English/Japanese vocabulary cards generated by an LLM.
//!
//! Each run asks a model for three cards (English short, English long,
//! Japanese N3+), validates the JSON it returns, and keeps a rolling history
//! so no word repeats within the history window.
//!
//! # Library usage
//!
//! ```ignore
//! use daycard::{CardConfig, Orchestrator};
//! use daycard_llm::ChatGenerator;
//!
//! let config = CardConfig::default();
//! let generator = ChatGenerator::new(config.generation_config(api_key))?;
//! let store = config.store();
//!
//! let outcome = Orchestrator::new(&generator, &store, &config)
//!     .run(chrono::Local::now().date_naive())
//!     .await?;
//! let report = outcome.into_result()?;
//! println!("{:?}", report.today.words());
//! ```
//!
//! # Binary
//!
//! ```sh
//! # Generate and persist today's cards
//! OPENROUTER_KEY=... daycard
//!
//! # Preview without writing anything
//! daycard --dry-run
//!
//! # Show the words currently banned
//! daycard --show-banned
//! ```

pub mod cards;
pub mod config;
pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod store;
pub mod validate;

pub use cards::{Card, CardLength, Lang, TodaySet};
pub use config::CardConfig;
pub use history::{BannedWords, History, HistoryEntry, HistoryItem};
pub use orchestrator::{AttemptFailure, Generation, Orchestrator, RunError, RunOutcome, RunReport};
pub use store::{StateStore, StorageError};
pub use validate::{ValidationError, accept, validate};

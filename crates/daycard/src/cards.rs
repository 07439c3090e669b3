//! Card data model.
//!
//! A day's output is a [`TodaySet`]: exactly three [`Card`]s in a fixed order
//! (English short, English long, Japanese N3+). The fixed-size array makes the
//! "exactly three" rule part of the type.

use serde::{Deserialize, Serialize};

/// Language of a card.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Jp,
}

impl Lang {
    pub fn as_str(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Jp => "jp",
        }
    }
}

/// Sentence length class of an English card.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardLength {
    Short,
    Long,
}

impl CardLength {
    pub fn as_str(self) -> &'static str {
        match self {
            CardLength::Short => "short",
            CardLength::Long => "long",
        }
    }
}

/// One vocabulary card.
///
/// `length` is present only on English cards and `level` only on the
/// Japanese card.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub lang: Lang,
    pub word: String,
    pub situation: String,
    pub example: String,
    pub sentence: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<CardLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// The three cards produced by one successful run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct TodaySet([Card; 3]);

impl TodaySet {
    pub fn new(cards: [Card; 3]) -> Self {
        Self(cards)
    }

    pub fn cards(&self) -> &[Card; 3] {
        &self.0
    }

    /// The three words in card order.
    pub fn words(&self) -> [&str; 3] {
        [
            self.0[0].word.as_str(),
            self.0[1].word.as_str(),
            self.0[2].word.as_str(),
        ]
    }
}

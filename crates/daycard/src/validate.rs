//! Validation of model output.
//!
//! [`validate`] checks a parsed JSON candidate against the card schema and
//! the banned-word set, stopping at the first violation:
//!
//! 1. The candidate is an array of exactly 3 elements.
//! 2. For each item in order: it is an object, every required field is a
//!    non-empty string after trimming, and its trimmed `word` is not banned.
//! 3. Item 0 is `lang=en, length=short`.
//! 4. Item 1 is `lang=en, length=long`.
//! 5. Item 2 is `lang=jp` with a `level` starting with `N3`.
//!
//! [`accept`] runs the same checks and then builds the typed [`TodaySet`].

use serde_json::{Map, Value};

use crate::cards::{Card, CardLength, Lang, TodaySet};
use crate::history::BannedWords;

/// Fields every card must carry as non-empty strings.
pub const REQUIRED_FIELDS: [&str; 6] =
    ["lang", "word", "situation", "example", "sentence", "meaning"];

/// Number of cards in a day's set.
pub const CARDS_PER_DAY: usize = 3;

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("output must be an array of 3 objects")]
    NotAnArray,

    #[error("output must contain exactly 3 items, got {0}")]
    WrongCount(usize),

    #[error("item {index} is not an object")]
    NotAnObject { index: usize },

    #[error("item {index} missing/empty field: {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("item {index} field {field} must be a string")]
    NotAString { index: usize, field: &'static str },

    #[error("banned word reused in item {index}: {word}")]
    BannedWord { index: usize, word: String },

    #[error("item {index} must be {expected}")]
    WrongSlot { index: usize, expected: &'static str },
}

/// Check `candidate` against the schema and the banned-word set.
pub fn validate(candidate: &Value, banned: &BannedWords) -> Result<(), ValidationError> {
    let items = slots(candidate)?;

    for (index, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or(ValidationError::NotAnObject { index })?;
        for field in REQUIRED_FIELDS {
            required_str(obj, index, field)?;
        }
        let word = required_str(obj, index, "word")?;
        if banned.contains(word) {
            return Err(ValidationError::BannedWord {
                index,
                word: word.to_string(),
            });
        }
    }

    check_english(&items[0], 0, CardLength::Short)?;
    check_english(&items[1], 1, CardLength::Long)?;
    check_japanese(&items[2], 2)?;
    Ok(())
}

/// Validate `candidate` and convert it into a [`TodaySet`].
///
/// Text fields are stored trimmed. English cards keep their `length`, the
/// Japanese card keeps its `level`; any other keys are dropped.
pub fn accept(candidate: &Value, banned: &BannedWords) -> Result<TodaySet, ValidationError> {
    validate(candidate, banned)?;
    let items = slots(candidate)?;

    let en_short = Card {
        length: Some(CardLength::Short),
        ..base_card(&items[0], 0, Lang::En)?
    };
    let en_long = Card {
        length: Some(CardLength::Long),
        ..base_card(&items[1], 1, Lang::En)?
    };
    let jp = Card {
        level: Some(level_of(&items[2]).unwrap_or_default().trim().to_string()),
        ..base_card(&items[2], 2, Lang::Jp)?
    };
    Ok(TodaySet::new([en_short, en_long, jp]))
}

fn slots(candidate: &Value) -> Result<&[Value], ValidationError> {
    let items = candidate.as_array().ok_or(ValidationError::NotAnArray)?;
    if items.len() != CARDS_PER_DAY {
        return Err(ValidationError::WrongCount(items.len()));
    }
    Ok(items.as_slice())
}

/// Trimmed value of a required string field.
fn required_str<'a>(
    obj: &'a Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { index, field }),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ValidationError::MissingField { index, field })
        }
        Some(Value::String(s)) => Ok(s.trim()),
        Some(_) => Err(ValidationError::NotAString { index, field }),
    }
}

fn check_english(item: &Value, index: usize, length: CardLength) -> Result<(), ValidationError> {
    let ok = item.get("lang").and_then(Value::as_str) == Some(Lang::En.as_str())
        && item.get("length").and_then(Value::as_str) == Some(length.as_str());
    if ok {
        Ok(())
    } else {
        Err(ValidationError::WrongSlot {
            index,
            expected: match length {
                CardLength::Short => "English short with length=short",
                CardLength::Long => "English long with length=long",
            },
        })
    }
}

fn check_japanese(item: &Value, index: usize) -> Result<(), ValidationError> {
    let lang_ok = item.get("lang").and_then(Value::as_str) == Some(Lang::Jp.as_str());
    let level_ok = level_of(item).is_some_and(|level| level.starts_with("N3"));
    if lang_ok && level_ok {
        Ok(())
    } else {
        Err(ValidationError::WrongSlot {
            index,
            expected: "Japanese with level starting N3",
        })
    }
}

fn level_of(item: &Value) -> Option<&str> {
    item.get("level").and_then(Value::as_str)
}

fn base_card(item: &Value, index: usize, lang: Lang) -> Result<Card, ValidationError> {
    let obj = item
        .as_object()
        .ok_or(ValidationError::NotAnObject { index })?;
    let text = |field| required_str(obj, index, field).map(str::to_string);
    Ok(Card {
        lang,
        word: text("word")?,
        situation: text("situation")?,
        example: text("example")?,
        sentence: text("sentence")?,
        meaning: text("meaning")?,
        length: None,
        level: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(lang: &str, word: &str) -> Value {
        json!({
            "lang": lang,
            "word": word,
            "situation": "someone is running late",
            "example": "a colleague texts before the 10am meeting",
            "sentence": "No worries, take your time.",
            "meaning": "괜찮아요, 천천히 오세요.",
        })
    }

    fn candidate(words: [&str; 3]) -> Value {
        let mut short = item("en", words[0]);
        short["length"] = json!("short");
        let mut long = item("en", words[1]);
        long["length"] = json!("long");
        let mut jp = item("jp", words[2]);
        jp["level"] = json!("N3+");
        json!([short, long, jp])
    }

    fn none() -> BannedWords {
        BannedWords::default()
    }

    #[test]
    fn accepts_well_formed_candidate() {
        let value = candidate(["postpone", "follow up on", "見送る"]);
        assert_eq!(validate(&value, &none()), Ok(()));
    }

    #[test]
    fn rejects_non_array() {
        assert_eq!(
            validate(&json!({"cards": []}), &none()),
            Err(ValidationError::NotAnArray)
        );
    }

    #[test]
    fn rejects_wrong_count() {
        let mut value = candidate(["a", "b", "c"]);
        value.as_array_mut().unwrap().pop();
        assert_eq!(validate(&value, &none()), Err(ValidationError::WrongCount(2)));

        let mut value = candidate(["a", "b", "c"]);
        value.as_array_mut().unwrap().push(item("en", "d"));
        assert_eq!(validate(&value, &none()), Err(ValidationError::WrongCount(4)));
    }

    #[test]
    fn rejects_non_object_item() {
        let mut value = candidate(["a", "b", "c"]);
        value[1] = json!("card");
        assert_eq!(
            validate(&value, &none()),
            Err(ValidationError::NotAnObject { index: 1 })
        );
    }

    #[test]
    fn rejects_missing_and_blank_fields() {
        for field in REQUIRED_FIELDS {
            let mut value = candidate(["a", "b", "c"]);
            value[2].as_object_mut().unwrap().remove(field);
            assert_eq!(
                validate(&value, &none()),
                Err(ValidationError::MissingField { index: 2, field })
            );

            let mut value = candidate(["a", "b", "c"]);
            value[0][field] = json!("   ");
            assert_eq!(
                validate(&value, &none()),
                Err(ValidationError::MissingField { index: 0, field })
            );
        }
    }

    #[test]
    fn rejects_non_string_field() {
        let mut value = candidate(["a", "b", "c"]);
        value[0]["example"] = json!(42);
        assert_eq!(
            validate(&value, &none()),
            Err(ValidationError::NotAString {
                index: 0,
                field: "example"
            })
        );
    }

    #[test]
    fn rejects_banned_word_in_any_position_after_trimming() {
        let banned: BannedWords = ["deadline"].into_iter().collect();
        for index in 0..3 {
            let mut words = ["postpone", "follow up on", "見送る"];
            words[index] = " deadline ";
            let err = validate(&candidate(words), &banned).unwrap_err();
            assert_eq!(
                err,
                ValidationError::BannedWord {
                    index,
                    word: "deadline".to_string()
                }
            );
        }
    }

    #[test]
    fn banned_check_is_exact_match_only() {
        let banned: BannedWords = ["deadline"].into_iter().collect();
        let value = candidate(["Deadline", "deadlines", "見送る"]);
        assert_eq!(validate(&value, &banned), Ok(()));
    }

    #[test]
    fn field_check_runs_before_banned_check_of_later_items() {
        let banned: BannedWords = ["c"].into_iter().collect();
        let mut value = candidate(["a", "b", "c"]);
        value[1].as_object_mut().unwrap().remove("meaning");
        assert_eq!(
            validate(&value, &banned),
            Err(ValidationError::MissingField {
                index: 1,
                field: "meaning"
            })
        );
    }

    #[test]
    fn rejects_slot_violations() {
        let mut value = candidate(["a", "b", "c"]);
        value[0]["length"] = json!("long");
        assert!(matches!(
            validate(&value, &none()),
            Err(ValidationError::WrongSlot { index: 0, .. })
        ));

        let mut value = candidate(["a", "b", "c"]);
        value[1]["lang"] = json!("jp");
        assert!(matches!(
            validate(&value, &none()),
            Err(ValidationError::WrongSlot { index: 1, .. })
        ));

        let mut value = candidate(["a", "b", "c"]);
        value[1].as_object_mut().unwrap().remove("length");
        assert!(matches!(
            validate(&value, &none()),
            Err(ValidationError::WrongSlot { index: 1, .. })
        ));

        let mut value = candidate(["a", "b", "c"]);
        value[2]["level"] = json!("N4");
        assert!(matches!(
            validate(&value, &none()),
            Err(ValidationError::WrongSlot { index: 2, .. })
        ));

        let mut value = candidate(["a", "b", "c"]);
        value[2].as_object_mut().unwrap().remove("level");
        assert!(matches!(
            validate(&value, &none()),
            Err(ValidationError::WrongSlot { index: 2, .. })
        ));
    }

    #[test]
    fn level_only_needs_the_n3_prefix() {
        for level in ["N3", "N3+", "N3-N2"] {
            let mut value = candidate(["a", "b", "c"]);
            value[2]["level"] = json!(level);
            assert_eq!(validate(&value, &none()), Ok(()), "level {level}");
        }
    }

    #[test]
    fn error_messages_name_the_rule() {
        assert_eq!(
            ValidationError::MissingField {
                index: 1,
                field: "word"
            }
            .to_string(),
            "item 1 missing/empty field: word"
        );
        assert_eq!(
            ValidationError::BannedWord {
                index: 0,
                word: "deadline".into()
            }
            .to_string(),
            "banned word reused in item 0: deadline"
        );
    }

    #[test]
    fn accept_builds_trimmed_typed_set() {
        let mut value = candidate(["  postpone ", "follow up on", "見送る"]);
        value[2]["length"] = json!("short");
        value[0]["extra"] = json!("ignored");

        let set = accept(&value, &none()).unwrap();
        assert_eq!(set.words(), ["postpone", "follow up on", "見送る"]);

        let cards = set.cards();
        assert_eq!(cards[0].length, Some(CardLength::Short));
        assert_eq!(cards[1].length, Some(CardLength::Long));
        assert_eq!(cards[2].lang, Lang::Jp);
        assert_eq!(cards[2].level.as_deref(), Some("N3+"));
        assert_eq!(cards[2].length, None);
    }

    #[test]
    fn accept_propagates_validation_error() {
        let banned: BannedWords = ["postpone"].into_iter().collect();
        let value = candidate(["postpone", "b", "c"]);
        assert!(matches!(
            accept(&value, &banned),
            Err(ValidationError::BannedWord { .. })
        ));
    }
}

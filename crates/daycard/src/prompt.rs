//! Prompts for card generation.

/// Fixed system instruction describing the output schema and tone.
pub const SYSTEM_INSTRUCTION: &str = "\
You generate daily language cards for a Korean learner.
Return ONLY valid JSON: no markdown fences, no commentary.
Return an array of exactly 3 objects, in this order:
1) English short (lang=en, length=short)
2) English long  (lang=en, length=long)
3) Japanese N3+  (lang=jp, level=N3+)

Every object must include:
lang, word, situation, example, sentence, meaning
Additionally:
- English cards must include length: short or long
- The Japanese card must include level: N3+

Rules:
- Common, natural, polite or neutral wording. Nothing rude, no profanity.
- Domain: everyday and business conversation.
- meaning: one line of Korean that stays close to the sentence.
- situation: the general state where the word fits, described neutrally.
- example: exactly one concrete real-life scene.
- sentence: one natural line using the word.
- Japanese must be JLPT N3+ vocabulary or phrasing, realistic spoken Japanese rather than textbook style.";

/// Render the user prompt for one run.
///
/// `banned` should already be sorted so that the prompt is stable for a
/// given history.
pub fn build_prompt(banned: &[&str], window_days: usize) -> String {
    let banned_text = if banned.is_empty() {
        "(none)".to_string()
    } else {
        banned
            .iter()
            .map(|w| format!("- {w}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Create today's set.

Constraints:
- English short sentence: 3–6 words.
- English long sentence: 10–18 words.
- Japanese: N3+ level.
- Do NOT reuse any of these words (exact match) from the last {window_days} days:
{banned_text}

Keep examples vivid but realistic (elevator, meeting, email, schedule, awkward silence, etc.).
"
    )
}

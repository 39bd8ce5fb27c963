//! Narrator role: turns a planned `CommentIntent` into a bounded natural
//! language comment, sanitizing LLM output and falling back to a
//! deterministic template when the LLM circuit breaker is open.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::intent::{CommentIntent, IntentType};

const MAX_COMMENT_CHARS: usize = 280;

static EVAL_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[+\-]?\d+(\.\d+)?\s*(cp|centipawns?|pawns?\s+(up|down)|#\d+|mate\s+in\s+\d+)").unwrap()
});
static PREAMBLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(sure[,!]?|certainly[,!]?|here'?s? (an?|the) (comment|analysis|annotation)[:,]?|as an ai[^.]*\.)\s*").unwrap()
});

pub struct NarratorInput<'a> {
    pub intent: &'a CommentIntent,
    pub played_san: &'a str,
    pub legal_moves_san: &'a [String],
    pub llm_text: Option<String>,
}

/// Produces a bounded, sanitized comment for `intent`. If `llm_text` is
/// `None` (circuit open / skip-llm), falls back to the deterministic
/// per-intent-type template.
pub fn narrate(input: &NarratorInput) -> String {
    let raw = match &input.llm_text {
        Some(text) => text.clone(),
        None => template_fallback(input.intent),
    };
    sanitize(&raw, input.played_san, input.legal_moves_san)
}

fn template_fallback(intent: &CommentIntent) -> String {
    match intent.intent_type {
        IntentType::MoveQuality => format!("This move changes the evaluation meaningfully: {}", intent.summary),
        IntentType::TacticalTheme => format!("A tactical motif is present: {}", intent.summary),
        IntentType::PositionalTheme => format!("Positionally notable: {}", intent.summary),
        IntentType::Weakness => format!("A structural weakness appears: {}", intent.summary),
        IntentType::PlanShift => format!("The natural plan shifts here: {}", intent.summary),
        IntentType::CriticalMoment => format!("This is a critical moment: {}", intent.summary),
        IntentType::AlternativeLine => format!("An alternative worth considering: {}", intent.summary),
        IntentType::OpeningTheory => format!("Known opening theory: {}", intent.summary),
        IntentType::EndgameTechnique => format!("An endgame technique applies: {}", intent.summary),
        IntentType::GeneralObservation => intent.summary.clone(),
    }
}

/// Strips numeric eval tokens, meta-preambles, bounds length, and rewrites
/// any mentioned move that is not actually legal in this position to the
/// generic phrase "the suggested move" (hallucination guard).
fn sanitize(text: &str, played_san: &str, legal_moves_san: &[String]) -> String {
    let mut s = text.trim().to_string();
    s = PREAMBLE_RE.replace(&s, "").to_string();
    s = EVAL_TOKEN_RE.replace_all(&s, "").to_string();
    s = rewrite_illegal_move_mentions(&s, legal_moves_san);

    // Never let the comment open by echoing the move just played.
    let trimmed_start = s.trim_start();
    if trimmed_start.starts_with(played_san) {
        s = trimmed_start[played_san.len()..].trim_start().to_string();
    }

    s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() > MAX_COMMENT_CHARS {
        s = s.chars().take(MAX_COMMENT_CHARS - 1).collect::<String>() + "\u{2026}";
    }
    s
}

fn rewrite_illegal_move_mentions(text: &str, legal_moves_san: &[String]) -> String {
    let move_like = Regex::new(r"\b([KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](=[QRBN])?[+#]?|O-O-O|O-O)\b").unwrap();
    move_like
        .replace_all(text, |caps: &regex::Captures| {
            let candidate = &caps[0];
            if legal_moves_san.iter().any(|m| m == candidate) {
                candidate.to_string()
            } else {
                "the suggested move".to_string()
            }
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{CommentIntent, IntentType};

    fn intent() -> CommentIntent {
        CommentIntent {
            ply: 1,
            intent_type: IntentType::TacticalTheme,
            score: 1.0,
            mandatory: true,
            idea_id: None,
            summary: "the bishop pins the knight".to_string(),
        }
    }

    #[test]
    fn strips_eval_tokens() {
        let out = sanitize("This is +2.3 pawns up for white.", "e4", &[]);
        assert!(!out.contains("2.3"));
    }

    #[test]
    fn strips_preamble() {
        let out = sanitize("Sure! Here's the analysis: the pin is decisive.", "e4", &[]);
        assert!(out.starts_with("the pin"));
    }

    #[test]
    fn bounds_comment_length() {
        let long = "x".repeat(1000);
        let out = sanitize(&long, "e4", &[]);
        assert!(out.chars().count() <= MAX_COMMENT_CHARS);
    }

    #[test]
    fn falls_back_to_template_when_circuit_open() {
        let input = NarratorInput {
            intent: &intent(),
            played_san: "Bxf7+",
            legal_moves_san: &[],
            llm_text: None,
        };
        let out = narrate(&input);
        assert!(out.contains("tactical motif"));
    }

    #[test]
    fn rewrites_illegal_move_mentions() {
        let out = sanitize("Consider Qxh7#.", "e4", &["Nf3".to_string()]);
        assert!(out.contains("the suggested move"));
    }
}

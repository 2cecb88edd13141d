//! Generative-model fallback.
//!
//! Composes the system prompt in a fixed order: base rules with the
//! current date/time, persona fragments, an optional exact-format
//! directive (only for explicit count or steps requests, never inferred
//! loosely), and an optional topic anchor derived by stripping format
//! directives from the query. Backend failure degrades to empty text.

use std::sync::LazyLock;

use regex::Regex;

use crate::persona::{self, PersonaState};
use crate::shape::mode::{BULLET_N_RE, SENT_N_RE, STEPS_N_RE};
use crate::traits::Generator;
use kestrel_client::ChatMessage;

static COUNT_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:in|with)\s+\d+\s+(?:bullets?|sentences?)\b").unwrap());
static FORMAT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:code only|tl;?dr|summary|steps?)\b").unwrap());

/// Build the system-role messages for one model call.
pub fn compose_messages(query: &str, persona_state: &PersonaState, now: &str) -> Vec<ChatMessage> {
    let base = format!("{}\n\n(Current date/time: {})", persona::compose_system_rules(persona_state), now);
    let mut messages = vec![ChatMessage::system(base)];

    let mut hints: Vec<String> = Vec::new();
    let ql = query.to_lowercase();

    if let Some(caps) = BULLET_N_RE.captures(&ql)
        && let Ok(n) = caps[1].parse::<usize>()
    {
        hints.push(format!(
            "Return exactly {} bullet points. One short clause per bullet. \
             No preamble or conclusion. Output only the bullet points. \
             Do not repeat these instructions.",
            n
        ));
    }
    if let Some(caps) = SENT_N_RE.captures(&ql)
        && let Ok(n) = caps[1].parse::<usize>()
    {
        hints.push(format!(
            "Write exactly {} sentences. No lead-in or wrap-up. \
             Output only the sentences. Do not repeat these instructions.",
            n
        ));
    }
    if STEPS_N_RE.is_match(&ql) || ql.contains(" in steps") || ql.starts_with("steps:") {
        hints.push(
            "Return numbered steps. One action per step. No preamble or \
             wrap-up. Output only the steps. Do not repeat these instructions."
                .to_string(),
        );
    }

    // Topic anchor: the query with its format directives removed.
    let topic = COUNT_DIRECTIVE_RE.replace_all(query, "");
    let topic = FORMAT_WORD_RE.replace_all(&topic, "");
    let topic = topic.split_whitespace().collect::<Vec<_>>().join(" ");
    if !topic.is_empty() {
        hints.push(format!("Stay strictly on topic: {}. Do not include unrelated content.", topic));
    }

    if !hints.is_empty() {
        messages.push(ChatMessage::system(hints.join(" ")));
    }

    messages.push(ChatMessage::user(query));
    messages
}

/// Run the model fallback. Never fails; a backend fault is empty text.
pub async fn answer_via_model(
    generator: &dyn Generator,
    query: &str,
    model: &str,
    persona_state: &PersonaState,
) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let messages = compose_messages(query, persona_state, &now);
    generator.generate(&messages, model).await.unwrap_or_default().trim().to_string()
}

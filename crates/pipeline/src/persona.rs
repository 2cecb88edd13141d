//! Persona traits and system-rule composition.
//!
//! A persona is a stack of named trait fragments plus two extras: a
//! professional-mode override that is always appended last so it wins over
//! anything stacked before it, and an optional greeting line returned
//! verbatim by the orchestrator's greeting intercept.

use serde::{Deserialize, Serialize};

/// Base behavioral rules present in every system prompt.
pub const BASE_RULES: &str = "Answer only the current user message. Be concise and on-topic. \
Decline unsafe requests politely.";

/// Trait library: (name, system fragment). Kept light-touch so a trait
/// never harms clarity.
pub const TRAITS: &[(&str, &str)] = &[
    (
        "cowboy",
        "Adopt a friendly, plainspoken Western drawl; concise and helpful, avoid caricature. \
         Use occasional colloquialisms like 'partner' or 'reckon' sparingly.",
    ),
    (
        "upbeat",
        "Warm, upbeat, supportive tone; keep it wholesome and respectful.",
    ),
    (
        "shy",
        "Softer tone; concise sentences; avoid over-apologizing; stay clear and helpful.",
    ),
    (
        "trainer",
        "Act like a supportive personal trainer: specific, encouraging, short action steps; \
         no medical advice; suggest checking with a professional when appropriate.",
    ),
    (
        "professional",
        "Professional assistant mode: neutral, concise, and courteous; no slang; \
         prioritize clarity and facts; avoid intimate or suggestive tones. \
         If any prior stylistic layer conflicts with this, prefer professional behavior.",
    ),
];

/// Look up a trait fragment by name.
pub fn trait_fragment(name: &str) -> Option<&'static str> {
    TRAITS.iter().find(|(n, _)| *n == name).map(|(_, frag)| *frag)
}

/// Names a user may stack (professional is a mode, not a layer).
pub fn available_traits() -> Vec<&'static str> {
    TRAITS.iter().map(|(n, _)| *n).filter(|n| *n != "professional").collect()
}

/// Persisted persona state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaState {
    /// Stacked trait names, in activation order.
    #[serde(default)]
    pub layers: Vec<String>,

    /// Professional-mode override.
    #[serde(default)]
    pub professional: bool,

    /// Verbatim greeting returned for a bare "hi"/"hello".
    #[serde(default)]
    pub greeting: Option<String>,
}

impl PersonaState {
    /// Drop unknown layers and blank greetings. Called after every load so
    /// a hand-edited file cannot poison the prompt.
    pub fn sanitize(&mut self) {
        self.layers.retain(|name| trait_fragment(name).is_some() && name != "professional");
        if let Some(g) = &self.greeting
            && g.trim().is_empty()
        {
            self.greeting = None;
        }
    }

    pub fn add_layer(&mut self, name: &str) {
        if trait_fragment(name).is_some() && name != "professional" && !self.layers.iter().any(|l| l == name) {
            self.layers.push(name.to_string());
        }
    }

    pub fn remove_layer(&mut self, name: &str) {
        self.layers.retain(|l| l != name);
    }

    pub fn set_greeting(&mut self, line: Option<&str>) {
        self.greeting = line.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    }
}

/// Compose the system rules: base rules, stacked trait fragments in
/// activation order, the professional override last, then the greeting
/// directive.
pub fn compose_system_rules(state: &PersonaState) -> String {
    let mut parts = vec![BASE_RULES.to_string()];

    for name in &state.layers {
        if let Some(frag) = trait_fragment(name) {
            parts.push(frag.to_string());
        }
    }

    if state.professional
        && let Some(frag) = trait_fragment("professional")
    {
        parts.push(frag.to_string());
    }

    if let Some(g) = &state.greeting {
        parts.push(format!("When the user greets, respond with exactly: {}", g));
    }

    parts.join("\n")
}

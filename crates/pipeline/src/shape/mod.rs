//! Deterministic response shaping.
//!
//! One pass over the query's surface cues picks a `ResponseMode`
//! (`mode`), and a stateless transform rewrites the answer text to match
//! (`render`). Explicit user-requested counts always win; stored style
//! defaults only fill fields the user left unset and never introduce a
//! count the user did not ask for.

use serde::{Deserialize, Serialize};

use crate::prefs::StyleDefaults;

pub(crate) mod mode;
mod render;

pub use mode::decide_mode;
pub use render::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Brief,
    Normal,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutFormat {
    Plain,
    Bullets,
    Steps,
    Code,
    Mixed,
}

impl OutFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Bullets => "bullets",
            Self::Steps => "steps",
            Self::Code => "code",
            Self::Mixed => "mixed",
        }
    }
}

/// The chosen shaping parameters for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMode {
    pub verbosity: Verbosity,
    pub format: OutFormat,
    /// Soft word cap; `None` means no forced cap.
    pub max_words: Option<usize>,
    /// Honored only when explicitly requested.
    pub bullet_count: Option<usize>,
    /// Honored only when explicitly requested.
    pub sentence_cap: Option<usize>,
}

impl Default for ResponseMode {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            format: OutFormat::Plain,
            max_words: None,
            bullet_count: None,
            sentence_cap: None,
        }
    }
}

impl ResponseMode {
    /// Fill unset fields from stored defaults. Counts are never taken
    /// from defaults.
    pub fn merge_defaults(mut self, defaults: &StyleDefaults) -> Self {
        if self.max_words.is_none() {
            self.max_words = defaults.max_words;
        }
        self
    }
}

/// Decide the mode for `query`, shape `text` accordingly, and apply the
/// optional lead-in preference.
pub fn apply(text: &str, query: &str, defaults: &StyleDefaults) -> String {
    let mode = decide_mode(query).merge_defaults(defaults);
    let shaped = render(text, &mode);

    if defaults.leadins && mode.format != OutFormat::Code && !shaped.is_empty() {
        let head = match mode.format {
            OutFormat::Steps => "Sure, here are the steps:",
            OutFormat::Bullets => "Sure, here are some quick bullets:",
            _ => "Sure, here's a quick answer:",
        };
        if !shaped.trim_start().to_lowercase().starts_with("sure") {
            return format!("{}\n{}", head, shaped);
        }
    }

    shaped
}

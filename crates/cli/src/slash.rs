//! REPL slash commands.
//!
//! Commands mutate preference state, the curated store, the memory file,
//! or the per-query flags; none of them run the resolution pipeline. Every
//! command returns its reply as text so the REPL loop stays a plain
//! print-and-continue loop.

use kestrel_pipeline::orchestrator::QueryFlags;
use kestrel_pipeline::memory::MemoryStore;
use kestrel_pipeline::persona;
use kestrel_pipeline::Orchestrator;

const HELP: &str = "\
commands:
  /style set max_words <n> | /style set leadins on|off | /style clear
  /persona add <trait> | remove <trait> | clear | list
  /professional on|off
  /greeting set <text> | /greeting clear
  /remember [#tag] <text>
  /recall [#tag] [<n>] [<needle>]
  /forget <id>|all
  /answers pin <q> => <a> | pin! <q> => <a> | unpin <q>
  /forceweb on|off
  /noemoji on|off
  /help";

/// Handle a slash command. `None` means the line is a regular query.
pub async fn handle(line: &str, orch: &Orchestrator, memory: &MemoryStore, flags: &mut QueryFlags) -> Option<String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return None;
    }

    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    let reply = match cmd {
        "/help" => HELP.to_string(),
        "/style" => style(orch, rest),
        "/persona" => persona_cmd(orch, rest),
        "/professional" => match on_off(rest) {
            Some(on) => {
                orch.prefs().update(|p| p.persona.professional = on);
                format!("professional mode {}", if on { "on" } else { "off" })
            }
            None => "usage: /professional on|off".to_string(),
        },
        "/greeting" => greeting(orch, rest),
        "/remember" => remember(memory, rest),
        "/recall" => recall(memory, rest),
        "/forget" => forget(memory, rest),
        "/answers" => answers(orch, rest).await,
        "/forceweb" => match on_off(rest) {
            Some(on) => {
                flags.force_web = on;
                format!("force-web {}", if on { "on" } else { "off" })
            }
            None => "usage: /forceweb on|off".to_string(),
        },
        "/noemoji" => match on_off(rest) {
            Some(on) => {
                flags.no_emoji = on;
                format!("no-emoji {}", if on { "on" } else { "off" })
            }
            None => "usage: /noemoji on|off".to_string(),
        },
        _ => format!("unknown command {cmd}; try /help"),
    };

    Some(reply)
}

fn on_off(arg: &str) -> Option<bool> {
    match arg.trim().to_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Some(true),
        "off" | "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn style(orch: &Orchestrator, rest: &str) -> String {
    let mut parts = rest.split_whitespace();
    match parts.next() {
        Some("clear") => {
            orch.prefs().update(|p| p.style = Default::default());
            "style defaults cleared".to_string()
        }
        Some("set") => match (parts.next(), parts.next()) {
            (Some("max_words"), Some(n)) => match n.parse::<usize>() {
                Ok(n) => {
                    orch.prefs().update(|p| p.style.max_words = Some(n));
                    format!("style: max_words={n}")
                }
                Err(_) => "usage: /style set max_words <n>".to_string(),
            },
            (Some("leadins"), Some(v)) => match on_off(v) {
                Some(on) => {
                    orch.prefs().update(|p| p.style.leadins = on);
                    format!("style: leadins={}", if on { "on" } else { "off" })
                }
                None => "usage: /style set leadins on|off".to_string(),
            },
            _ => "usage: /style set max_words <n> | leadins on|off".to_string(),
        },
        _ => "usage: /style set ... | /style clear".to_string(),
    }
}

fn persona_cmd(orch: &Orchestrator, rest: &str) -> String {
    let (sub, arg) = match rest.split_once(char::is_whitespace) {
        Some((sub, arg)) => (sub, arg.trim()),
        None => (rest, ""),
    };

    match sub {
        "add" => {
            if persona::trait_fragment(arg).is_none() || arg == "professional" {
                return format!("unknown trait {arg:?}; available: {}", persona::available_traits().join(", "));
            }
            let prefs = orch.prefs().update(|p| p.persona.add_layer(arg));
            format!("persona layers: [{}]", prefs.persona.layers.join(", "))
        }
        "remove" => {
            let prefs = orch.prefs().update(|p| p.persona.remove_layer(arg));
            format!("persona layers: [{}]", prefs.persona.layers.join(", "))
        }
        "clear" => {
            orch.prefs().update(|p| p.persona.layers.clear());
            "persona layers cleared".to_string()
        }
        "list" => {
            let prefs = orch.prefs().load();
            format!(
                "active: [{}]; available: {}",
                prefs.persona.layers.join(", "),
                persona::available_traits().join(", ")
            )
        }
        _ => "usage: /persona add|remove|clear|list".to_string(),
    }
}

fn greeting(orch: &Orchestrator, rest: &str) -> String {
    match rest.split_once(char::is_whitespace) {
        Some(("set", text)) if !text.trim().is_empty() => {
            orch.prefs().update(|p| p.persona.set_greeting(Some(text.trim())));
            format!("greeting set: {}", text.trim())
        }
        _ if rest == "clear" => {
            orch.prefs().update(|p| p.persona.set_greeting(None));
            "greeting cleared".to_string()
        }
        _ => "usage: /greeting set <text> | /greeting clear".to_string(),
    }
}

fn remember(memory: &MemoryStore, rest: &str) -> String {
    let (tag, text) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) if first.starts_with('#') && first.len() > 1 => {
            (Some(first.trim_start_matches('#')), tail.trim())
        }
        _ => (None, rest),
    };

    if text.is_empty() {
        return "usage: /remember [#tag] <text>".to_string();
    }
    match memory.remember(text, tag) {
        Ok(record) => format!("remembered [{}]", record.id),
        Err(e) => format!("could not remember: {e}"),
    }
}

fn recall(memory: &MemoryStore, rest: &str) -> String {
    let mut tag: Option<String> = None;
    let mut last: Option<usize> = None;
    let mut needle_words: Vec<&str> = Vec::new();

    for token in rest.split_whitespace() {
        if let Some(t) = token.strip_prefix('#') {
            tag = Some(t.to_string());
        } else if let Ok(n) = token.parse::<usize>() {
            last = Some(n);
        } else {
            needle_words.push(token);
        }
    }
    let needle = (!needle_words.is_empty()).then(|| needle_words.join(" "));

    let records = memory.recall(needle.as_deref(), tag.as_deref(), last);
    if records.is_empty() {
        return "nothing remembered matches".to_string();
    }
    records
        .iter()
        .map(|r| match &r.tag {
            Some(tag) => format!("[{}] #{} {}", r.id, tag, r.text),
            None => format!("[{}] {}", r.id, r.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn forget(memory: &MemoryStore, rest: &str) -> String {
    if rest.is_empty() {
        return "usage: /forget <id>|all".to_string();
    }
    match memory.forget(rest) {
        Ok(n) => format!("forgot {n} record(s)"),
        Err(e) => format!("could not forget: {e}"),
    }
}

async fn answers(orch: &Orchestrator, rest: &str) -> String {
    let (sub, arg) = match rest.split_once(char::is_whitespace) {
        Some((sub, arg)) => (sub, arg.trim()),
        None => (rest, ""),
    };

    match sub {
        "pin" | "pin!" => {
            let Some((q, a)) = arg.split_once("=>").map(|(q, a)| (q.trim(), a.trim())) else {
                return "usage: /answers pin <query> => <answer>".to_string();
            };
            if q.is_empty() || a.is_empty() {
                return "usage: /answers pin <query> => <answer>".to_string();
            }
            if sub == "pin!" {
                match orch.curated().add_persistent(q, a).await {
                    Ok(()) => format!("pinned persistently: {q}"),
                    Err(e) => format!("could not pin: {e}"),
                }
            } else {
                orch.curated().add_ephemeral(q, a);
                format!("pinned for this session: {q}")
            }
        }
        "unpin" => {
            if arg.is_empty() {
                return "usage: /answers unpin <query>".to_string();
            }
            match orch.curated().remove(arg).await {
                Ok(()) => format!("unpinned: {arg}"),
                Err(e) => format!("could not unpin: {e}"),
            }
        }
        _ => "usage: /answers pin|pin!|unpin".to_string(),
    }
}

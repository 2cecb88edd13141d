//! Staged query resolution.
//!
//! `resolve` is the sole entry point any front end sees. Stages run in a
//! fixed order and short-circuit on the first usable answer: literal
//! code-only intercept, persona greeting intercept, skills, guarded web
//! synthesis, curated overrides, the persistent answer cache, the session
//! cache, and last the generative model with an honesty override when the
//! web stage was expected but came back empty. Each stage absorbs its own
//! faults; resolution never aborts on one stage's failure.
//!
//! All toggles arrive through `AppConfig` and per-query `QueryFlags`;
//! nothing here reads process-wide state.

use std::sync::Arc;

use serde::Serialize;

use crate::heuristics::{is_greeting, wants_web};
use crate::model;
use crate::prefs::PrefsStore;
use crate::scrub::final_scrub;
use crate::shape::{self, OutFormat, ResponseMode, decide_mode};
use crate::skills::SkillSet;
use crate::traits::Generator;
use crate::web::{WebMeta, WebResolver};
use kestrel_core::cache::key::{semantic_key, session_key};
use kestrel_core::{AnswerStore, AppConfig, CacheDb, CuratedStore, SessionCache};

/// The fixed message returned when fresh online data was expected but the
/// web stage produced nothing usable.
pub const HONESTY_TEXT: &str = "(online info unavailable) — could not fetch reliable results right now. \
Try again with /forceweb, or be more specific.";

/// Which stage produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteTag {
    Skill,
    Web,
    Answers,
    Model,
    PersonaGreeting,
    CodeOnly,
}

impl RouteTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Web => "web",
            Self::Answers => "answers",
            Self::Model => "model",
            Self::PersonaGreeting => "persona-greeting",
            Self::CodeOnly => "code-only",
        }
    }
}

/// Metadata attached to every resolved answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerMeta {
    pub route: RouteTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<WebMeta>,
}

impl AnswerMeta {
    fn route(route: RouteTag) -> Self {
        Self { route, note: None, skill: None, web: None }
    }

    fn noted(route: RouteTag, note: &str) -> Self {
        Self { note: Some(note.to_string()), ..Self::route(route) }
    }
}

/// One resolved answer.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub meta: AnswerMeta,
}

/// Per-query toggles layered over `AppConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFlags {
    pub force_web: bool,
    pub no_emoji: bool,
    pub trace: bool,
}

/// The staged resolution pipeline.
pub struct Orchestrator {
    config: AppConfig,
    skills: SkillSet,
    web: WebResolver,
    generator: Arc<dyn Generator>,
    session: SessionCache,
    db: CacheDb,
    curated: CuratedStore,
    prefs: PrefsStore,
}

impl Orchestrator {
    pub fn new(
        config: AppConfig,
        skills: SkillSet,
        web: WebResolver,
        generator: Arc<dyn Generator>,
        db: CacheDb,
        prefs: PrefsStore,
    ) -> Self {
        let curated = CuratedStore::new(db.clone());
        Self { config, skills, web, generator, session: SessionCache::new(), db, curated, prefs }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn curated(&self) -> &CuratedStore {
        &self.curated
    }

    pub fn prefs(&self) -> &PrefsStore {
        &self.prefs
    }

    /// Resolve one query. `model_override` replaces the configured model id
    /// for this query only.
    pub async fn resolve(&self, query: &str, model_override: Option<&str>, flags: QueryFlags) -> Answer {
        let q = query.trim();
        let no_emoji = self.config.no_emoji || flags.no_emoji;
        if flags.trace {
            tracing::info!(query = q, "resolving");
        }

        if q.is_empty() {
            return Answer { text: String::new(), meta: AnswerMeta::noted(RouteTag::Model, "empty-query") };
        }

        // Literal intercept: verbatim fence, no model, no scrub.
        if let Some(payload) = code_only_payload(q) {
            let mode = ResponseMode { format: OutFormat::Code, ..ResponseMode::default() };
            return Answer { text: shape::render(&payload, &mode), meta: AnswerMeta::route(RouteTag::CodeOnly) };
        }

        let prefs = self.prefs.load();

        // Greeting intercept fires only when an override is configured.
        if is_greeting(q)
            && let Some(greeting) = prefs.persona.greeting.clone()
        {
            return Answer { text: greeting, meta: AnswerMeta::route(RouteTag::PersonaGreeting) };
        }

        if let Some((text, name)) = self.skills.dispatch(q).await {
            let mut meta = AnswerMeta::route(RouteTag::Skill);
            meta.skill = Some(name.to_string());
            return Answer { text: final_scrub(&text, no_emoji), meta };
        }

        let model_id = model_override.unwrap_or(&self.config.model).to_string();
        let force = flags.force_web || self.config.force_web;
        let enabled = self.config.web_enabled || force;
        let wanted = wants_web(q);

        let skey = session_key(q, decide_mode(q).format.as_str(), &model_id, wanted, force);
        let semkey = semantic_key(q, wanted.then_some("web"), &self.config.version_salt);

        let mut web_usable = false;
        if enabled && (wanted || force) {
            let result = self.web.resolve(q, self.config.token_budget).await;
            web_usable = result.usable();
            if web_usable {
                let shaped = shape::apply(&result.text, q, &prefs.style);
                let text = final_scrub(&shaped, no_emoji);
                let mut meta = AnswerMeta::route(RouteTag::Web);
                meta.web = Some(result.meta);
                self.remember_answer(&skey, &semkey, &text, &meta).await;
                return Answer { text, meta };
            }
            tracing::debug!(
                reason = result.meta.reason.as_deref().unwrap_or("no-docs"),
                "web stage produced nothing usable"
            );
        }

        // Curated overrides win over anything generated or cached.
        match self.curated.maybe(q).await {
            Ok(Some(text)) => return Answer { text, meta: AnswerMeta::route(RouteTag::Answers) },
            Ok(None) => {}
            Err(e) => tracing::debug!("curated lookup failed: {}", e),
        }

        // Persistent answer cache, freshness judged at read time.
        match self.db.get(&semkey, self.config.answer_ttl_secs).await {
            Ok(Some(record)) => {
                return Answer { text: record.text, meta: AnswerMeta::noted(RouteTag::Answers, "cache") };
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("answer record lookup failed: {}", e),
        }

        if let Some((text, _)) = self.session.get(&skey) {
            return Answer { text, meta: AnswerMeta::noted(RouteTag::Answers, "session") };
        }

        // Honesty override: fresh data was wanted, the web gave nothing,
        // so a model answer would only look authoritative. Say so instead.
        if enabled && wanted && !web_usable {
            return Answer { text: HONESTY_TEXT.to_string(), meta: AnswerMeta::noted(RouteTag::Model, "web-empty") };
        }

        let raw = model::answer_via_model(self.generator.as_ref(), q, &model_id, &prefs.persona).await;

        // Inline "code only" skips shaping but still gets the final scrub.
        if q.to_lowercase().contains("code only") {
            return Answer { text: final_scrub(&raw, no_emoji), meta: AnswerMeta::route(RouteTag::Model) };
        }

        let shaped = shape::apply(&raw, q, &prefs.style);
        let text = final_scrub(&shaped, no_emoji);
        let meta = AnswerMeta::route(RouteTag::Model);
        self.remember_answer(&skey, &semkey, &text, &meta).await;
        Answer { text, meta }
    }

    /// Record a usable answer in both caches. Write failures are logged,
    /// never surfaced.
    async fn remember_answer(&self, skey: &str, semkey: &str, text: &str, meta: &AnswerMeta) {
        let meta_json = serde_json::to_value(meta).unwrap_or_else(|_| serde_json::json!({}));
        self.session.put(skey, text, meta_json.clone());
        if let Err(e) = self.db.put(semkey, text, &meta_json.to_string()).await {
            tracing::debug!("answer record write failed: {}", e);
        }
    }
}

/// Payload of a "code only:" query, if it is one.
fn code_only_payload(q: &str) -> Option<String> {
    let low = q.to_lowercase();
    if low.starts_with("code only:") || low.starts_with("code-only:") || low.contains(" code only:") {
        let payload = match q.split_once(':') {
            Some((_, rest)) => rest.trim(),
            None => q,
        };
        return Some(payload.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::traits::{DocumentFetcher, SearchProvider};
    use kestrel_client::{ChatMessage, SearchHit};
    use kestrel_core::Error;

    struct CountingSearch {
        hits: Vec<SearchHit>,
        calls: AtomicUsize,
    }

    impl CountingSearch {
        fn empty() -> Self {
            Self { hits: Vec::new(), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    struct PageFetcher {
        url: String,
        body: String,
    }

    #[async_trait]
    impl DocumentFetcher for PageFetcher {
        async fn fetch_clean(&self, url: &str) -> Option<String> {
            (url == self.url).then(|| self.body.clone())
        }
    }

    struct NoFetcher;

    #[async_trait]
    impl DocumentFetcher for NoFetcher {
        async fn fetch_clean(&self, _url: &str) -> Option<String> {
            None
        }
    }

    struct CountingGen {
        reply: String,
        calls: AtomicUsize,
    }

    impl CountingGen {
        fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Generator for CountingGen {
        async fn generate(&self, _messages: &[ChatMessage], _model: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(self.reply.clone())
        }
    }

    fn prefs_store(name: &str) -> PrefsStore {
        let path = std::env::temp_dir().join(format!("kestrel-orch-test-{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        PrefsStore::new(path)
    }

    async fn harness(
        name: &str,
        config: AppConfig,
        search: Arc<CountingSearch>,
        fetcher: Arc<dyn DocumentFetcher>,
        generator: Arc<CountingGen>,
    ) -> Orchestrator {
        let db = CacheDb::open_in_memory().await.unwrap();
        let web = WebResolver::new(search, fetcher, generator.clone(), config.max_docs, config.model.clone());
        Orchestrator::new(config, SkillSet::standard(None, None), web, generator, db, prefs_store(name))
    }

    #[tokio::test]
    async fn test_skill_short_circuit() {
        let search = Arc::new(CountingSearch::empty());
        let generator = Arc::new(CountingGen::new("never used"));
        let config = AppConfig { web_enabled: true, ..AppConfig::default() };
        let orch = harness("skill", config, search.clone(), Arc::new(NoFetcher), generator.clone()).await;

        let out = orch.resolve("2+2", None, QueryFlags::default()).await;
        assert_eq!(out.meta.route, RouteTag::Skill);
        assert!(out.text.contains("= 4"));
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_honesty_fallback() {
        let search = Arc::new(CountingSearch::empty());
        let generator = Arc::new(CountingGen::new("a confident fabrication"));
        let config = AppConfig { web_enabled: true, ..AppConfig::default() };
        let orch = harness("honesty", config, search.clone(), Arc::new(NoFetcher), generator.clone()).await;

        let out = orch.resolve("quakelib release notes", None, QueryFlags::default()).await;
        assert_eq!(out.text, HONESTY_TEXT);
        assert_eq!(out.meta.route, RouteTag::Model);
        assert_eq!(out.meta.note.as_deref(), Some("web-empty"));
        // The model is never consulted when honesty applies, and the
        // resolver used both of its bounded attempts.
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_code_only_intercept() {
        let generator = Arc::new(CountingGen::new("never used"));
        let orch = harness(
            "codeonly",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;

        let out = orch.resolve("code only: print('hi')", None, QueryFlags::default()).await;
        assert_eq!(out.text, "```python\nprint('hi')\n```");
        assert_eq!(out.meta.route, RouteTag::CodeOnly);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_greeting_override() {
        let generator = Arc::new(CountingGen::new("model greeting"));
        let orch = harness(
            "greeting",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;
        orch.prefs().update(|p| p.persona.set_greeting(Some("Howdy, partner!")));

        let out = orch.resolve("hi", None, QueryFlags::default()).await;
        assert_eq!(out.text, "Howdy, partner!");
        assert_eq!(out.meta.route, RouteTag::PersonaGreeting);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_greeting_without_override_reaches_model() {
        let generator = Arc::new(CountingGen::new("Hello back."));
        let orch = harness(
            "nogreeting",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;

        let out = orch.resolve("hi", None, QueryFlags::default()).await;
        assert_eq!(out.meta.route, RouteTag::Model);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_curated_wins_over_model() {
        let generator = Arc::new(CountingGen::new("never used"));
        let orch = harness(
            "curated",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;
        orch.curated().add_ephemeral("office wifi password", "Ask at the front desk.");

        let out = orch.resolve("office wifi password", None, QueryFlags::default()).await;
        assert_eq!(out.text, "Ask at the front desk.");
        assert_eq!(out.meta.route, RouteTag::Answers);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_answer_then_cache_hit() {
        let generator = Arc::new(CountingGen::new("A calm reply about autumn."));
        let orch = harness(
            "modelcache",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;

        let first = orch.resolve("tell me something nice about autumn", None, QueryFlags::default()).await;
        assert_eq!(first.meta.route, RouteTag::Model);
        assert_eq!(first.text, "A calm reply about autumn.");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        // The second identical query is served from the answer cache.
        let second = orch.resolve("tell me something nice about autumn", None, QueryFlags::default()).await;
        assert_eq!(second.meta.route, RouteTag::Answers);
        assert_eq!(second.text, first.text);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_web_route_via_fastpath() {
        let generator = Arc::new(CountingGen::new("- CUDA 12.6 adds new features [1]"));
        let fetcher = Arc::new(PageFetcher {
            url: "https://docs.nvidia.com/cuda/cuda-toolkit-release-notes/index.html".to_string(),
            body: "CUDA Toolkit 12.6 release notes content".to_string(),
        });
        let search = Arc::new(CountingSearch::empty());
        let config = AppConfig { web_enabled: true, ..AppConfig::default() };
        let orch = harness("webroute", config, search.clone(), fetcher, generator.clone()).await;

        let out = orch.resolve("cuda 12.6 release notes", None, QueryFlags::default()).await;
        assert_eq!(out.meta.route, RouteTag::Web);
        let web = out.meta.web.unwrap();
        assert!(web.web_used);
        assert!(!web.links.is_empty());
        assert!(out.text.contains("[1]"));
    }

    #[tokio::test]
    async fn test_no_emoji_flag_scrubs_output() {
        let generator = Arc::new(CountingGen::new("Nice 😀 day"));
        let orch = harness(
            "noemoji",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;

        let flags = QueryFlags { no_emoji: true, ..QueryFlags::default() };
        let out = orch.resolve("describe a pleasant morning routine for me", None, flags).await;
        assert!(!out.text.contains('😀'));
        assert_eq!(out.text, "Nice day");
    }

    #[tokio::test]
    async fn test_inline_code_only_still_scrubbed() {
        let generator = Arc::new(CountingGen::new("print('hi')  # done 😀"));
        let orch = harness(
            "inlinecode",
            AppConfig::default(),
            Arc::new(CountingSearch::empty()),
            Arc::new(NoFetcher),
            generator.clone(),
        )
        .await;

        let flags = QueryFlags { no_emoji: true, ..QueryFlags::default() };
        let out = orch.resolve("write a greeting script, code only please", None, flags).await;
        assert_eq!(out.meta.route, RouteTag::Model);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        // Shaping is skipped for inline code asks, the emoji scrub is not.
        assert_eq!(out.text, "print('hi') # done");
    }

    #[test]
    fn test_code_only_payload() {
        assert_eq!(code_only_payload("code only: x = 1").as_deref(), Some("x = 1"));
        assert_eq!(code_only_payload("code-only: x = 1").as_deref(), Some("x = 1"));
        assert!(code_only_payload("explain code only when asked").is_none());
    }

    #[test]
    fn test_route_tags() {
        assert_eq!(RouteTag::PersonaGreeting.as_str(), "persona-greeting");
        assert_eq!(RouteTag::CodeOnly.as_str(), "code-only");
        assert_eq!(serde_json::json!(RouteTag::Web), serde_json::json!("web"));
    }
}

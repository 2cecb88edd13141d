//! kestrel entry point.
//!
//! One-shot mode answers a single query given as arguments; with no
//! arguments a REPL starts. Logging goes to stderr so answers stay clean
//! on stdout.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use kestrel_client::{
    FetchClient, FetchConfig, GenClient, GenConfig, RateClient, SearchClient, SearchConfig, WeatherClient,
};
use kestrel_core::{AppConfig, CacheDb};
use kestrel_pipeline::memory::MemoryStore;
use kestrel_pipeline::prefs::PrefsStore;
use kestrel_pipeline::skills::SkillSet;
use kestrel_pipeline::traits::Generator;
use kestrel_pipeline::{Answer, Orchestrator, QueryFlags, WebResolver};

mod slash;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(model = %config.model, web = config.web_enabled, "kestrel starting");

    let search = SearchClient::new(SearchConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.web_timeout(),
    })?;
    let fetch = FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.web_timeout(),
        ..FetchConfig::default()
    })?;
    let generate = GenClient::new(GenConfig {
        base_url: config.backend_url.clone(),
        timeout: config.backend_timeout(),
        user_agent: config.user_agent.clone(),
    })?;

    let rates = if config.live_skills { RateClient::new(&config.user_agent) } else { None };
    let weather = if config.live_skills { WeatherClient::new(&config.user_agent) } else { None };
    let skills = SkillSet::standard(rates, weather);

    let warm_client = generate.clone();
    let warm_model = config.model.clone();
    let generator: Arc<dyn Generator> = Arc::new(generate);
    let web = WebResolver::new(Arc::new(search), Arc::new(fetch), generator.clone(), config.max_docs, config.model.clone());

    let db = CacheDb::open(&config.db_path).await.context("opening cache database")?;
    let prefs = PrefsStore::new(&config.prefs_path);
    let memory = MemoryStore::new(&config.memory_path);

    let orch = Orchestrator::new(config, skills, web, generator, db, prefs);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let query = args.join(" ");
        let answer = orch.resolve(&query, None, QueryFlags::default()).await;
        print_answer(&answer);
        return Ok(());
    }

    // Load the model in the background so the first answer is not cold.
    tokio::spawn(async move {
        match warm_client.warm(&warm_model).await {
            Ok(ms) => tracing::debug!("backend warm in {} ms", ms),
            Err(e) => tracing::debug!("backend warm failed: {}", e),
        }
    });

    repl(&orch, &memory).await
}

async fn repl(orch: &Orchestrator, memory: &MemoryStore) -> Result<()> {
    let mut flags = QueryFlags::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("kestrel ready; /help for commands, ctrl-d to exit");
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(reply) = slash::handle(&line, orch, memory, &mut flags).await {
            println!("{reply}");
            continue;
        }

        // Interrupt aborts only the in-flight query, not the REPL.
        tokio::select! {
            answer = orch.resolve(&line, None, flags) => print_answer(&answer),
            _ = tokio::signal::ctrl_c() => println!("(interrupted)"),
        }
    }
    Ok(())
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    match &answer.meta.note {
        Some(note) => println!("[route={} note={}]", answer.meta.route.as_str(), note),
        None => println!("[route={}]", answer.meta.route.as_str()),
    }
}

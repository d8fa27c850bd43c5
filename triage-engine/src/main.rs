use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use triage_engine::cases;
use triage_engine::config::CliArgs;
use triage_engine::engine::ResolverEngine;
use triage_engine::inference::ollama::{OllamaConfig, OllamaEmbedder, OllamaGenerator};
use triage_engine::inference::{Embedder, Generator};
use triage_engine::prompt::{Locale, PromptTemplate};
use triage_engine::server::{ResolverServer, ServerConfig};
use triage_engine::transport::NdjsonTransport;
use triage_vector::index::CaseIndex;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logging to stderr — stdout carries the NDJSON protocol exclusively.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let locale = Locale::parse(&args.locale)
        .with_context(|| format!("unsupported locale '{}'; expected en or zh", args.locale))?;

    let ollama = OllamaConfig {
        base_url: args.ollama_url.clone(),
        embedding_model: args.embedding_model.clone(),
        generation_model: args.generation_model.clone(),
        embed_timeout_secs: args.embed_timeout_secs,
        generate_timeout_secs: args.generate_timeout_secs,
        temperature: args.temperature,
    };
    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(&ollama));
    let generator: Arc<dyn Generator> = Arc::new(OllamaGenerator::new(&ollama));

    // Open or build the index. A restored snapshot is reused as-is; the
    // case file is only read when starting from an empty directory.
    let mut index = CaseIndex::open(Path::new(&args.index_dir), embedder.model())
        .context("failed to open vector index")?;

    if index.was_restored() {
        tracing::info!(cases = index.len(), dir = %args.index_dir, "Reopened persisted index");
    } else if let Some(case_path) = &args.cases {
        let records = cases::read_case_file(Path::new(case_path))?;
        let count = cases::load_cases(&mut index, embedder.as_ref(), &records)?;
        tracing::info!(count, dir = %args.index_dir, "Built fresh index from case file");
    } else {
        tracing::warn!("No persisted index and no case file; starting with an empty index");
    }

    let engine = Arc::new(ResolverEngine::new(
        embedder,
        generator,
        Arc::new(index),
        PromptTemplate::for_locale(locale),
        args.top_k,
    ));

    let config = ServerConfig {
        server_name: "triage-engine".to_string(),
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        embedding_model: args.embedding_model,
        generation_model: args.generation_model,
        locale: args.locale,
    };

    let mut server = ResolverServer::new(config, engine, NdjsonTransport::new());
    tracing::info!("triage-engine ready");
    server.run()
}

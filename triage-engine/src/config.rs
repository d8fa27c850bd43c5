use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "triage-engine",
    about = "Case-grounded technical support resolver over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct CliArgs {
    /// Ollama server base URL (serves both embedding and generation)
    #[arg(long, default_value = "http://localhost:11434", env = "TRIAGE_OLLAMA_URL")]
    pub ollama_url: String,

    /// Embedding model name
    #[arg(long, default_value = "nomic-embed-text", env = "TRIAGE_EMBEDDING_MODEL")]
    pub embedding_model: String,

    /// Generation model name
    #[arg(long, default_value = "llama3.2:1b", env = "TRIAGE_GENERATION_MODEL")]
    pub generation_model: String,

    /// Directory holding the persisted vector index
    #[arg(long, default_value = "./triage-index", env = "TRIAGE_INDEX_DIR")]
    pub index_dir: String,

    /// JSON file of historical case records, loaded once when no
    /// persisted index exists
    #[arg(long, env = "TRIAGE_CASES")]
    pub cases: Option<String>,

    /// Default number of cases to retrieve per query
    #[arg(long, default_value = "3")]
    pub top_k: usize,

    /// Sampling temperature for answer generation
    #[arg(long, default_value = "0.2")]
    pub temperature: f64,

    /// Prompt template locale ("en" or "zh")
    #[arg(long, default_value = "en", env = "TRIAGE_LOCALE")]
    pub locale: String,

    /// Embedding request timeout in seconds
    #[arg(long, default_value = "30", env = "TRIAGE_EMBED_TIMEOUT")]
    pub embed_timeout_secs: u64,

    /// Generation request timeout in seconds
    #[arg(long, default_value = "120", env = "TRIAGE_GENERATE_TIMEOUT")]
    pub generate_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "TRIAGE_LOG_LEVEL")]
    pub log_level: String,
}

use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::Result;

use crate::engine::{QueryRequest, ResolverEngine};
use crate::error::EngineError;
use crate::protocol::*;
use crate::transport::NdjsonTransport;

// ── Server configuration ──────────────────────────────────────────────────

pub struct ServerConfig {
    pub server_name: String,
    pub server_version: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub locale: String,
}

// ── Resolver server ───────────────────────────────────────────────────────

pub struct ResolverServer {
    config: ServerConfig,
    engine: Arc<ResolverEngine>,
    transport: NdjsonTransport,
}

impl ResolverServer {
    pub fn new(
        config: ServerConfig,
        engine: Arc<ResolverEngine>,
        transport: NdjsonTransport,
    ) -> Self {
        Self {
            config,
            engine,
            transport,
        }
    }

    /// Main loop: read messages from stdin until EOF, dispatch to
    /// handlers.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        for line_result in stdin.lock().lines() {
            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let msg: JsonRpcIncoming = match serde_json::from_str(trimmed) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Parse error: {}", e);
                    self.transport
                        .write_error(0, PARSE_ERROR, "Parse error: invalid JSON", None);
                    continue;
                }
            };

            self.handle_message(msg);
        }

        Ok(())
    }

    fn handle_message(&mut self, msg: JsonRpcIncoming) {
        let id = msg.id.unwrap_or(0);
        let method = match msg.method {
            Some(m) => m,
            // A response to something we never sent — ignore.
            None => return,
        };

        match method.as_str() {
            "initialize" => self.handle_initialize(id),
            "resolver/status" => self.handle_status(id),
            "resolver/query" => self.handle_query(id, msg.params),
            _ => {
                self.transport.write_error(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", method),
                    None,
                );
            }
        }
    }

    fn handle_initialize(&self, id: u64) {
        let result = InitializeResult {
            protocol_version: 1,
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
            index: IndexInfo {
                cases: self.engine.case_count(),
                state: "ready".to_string(),
            },
        };
        self.write_result(id, &result);
    }

    fn handle_status(&self, id: u64) {
        let result = StatusResult {
            state: "ready".to_string(),
            cases: self.engine.case_count(),
            embedding_model: self.config.embedding_model.clone(),
            generation_model: self.config.generation_model.clone(),
            locale: self.config.locale.clone(),
        };
        self.write_result(id, &result);
    }

    fn handle_query(&self, id: u64, params: Option<serde_json::Value>) {
        let Some(params_value) = params else {
            self.transport
                .write_error(id, INVALID_PARAMS, "Missing params", None);
            return;
        };
        let params: QueryParams = match serde_json::from_value(params_value) {
            Ok(p) => p,
            Err(e) => {
                self.transport.write_error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid query params: {}", e),
                    None,
                );
                return;
            }
        };

        let request = QueryRequest {
            question: params.question,
            model_type: params.model_type,
            sw_version: params.sw_version,
            components: params.components.unwrap_or_default(),
            country: params.country,
            k: params.k,
        };

        match self.engine.query(&request) {
            Ok(answer) => self.write_result(id, &QueryResult { answer }),
            Err(e) => {
                tracing::warn!(code = e.code(), "Query failed: {}", e);
                self.transport.write_error(
                    id,
                    rpc_code(&e),
                    e.to_string(),
                    Some(serde_json::json!({ "engineCode": e.code() })),
                );
            }
        }
    }

    fn write_result(&self, id: u64, result: &impl serde::Serialize) {
        match serde_json::to_value(result) {
            Ok(value) => self.transport.write_response(id, value),
            Err(e) => {
                tracing::error!("Failed to encode result: {}", e);
                self.transport
                    .write_error(id, INTERNAL_ERROR, "Failed to encode result", None);
            }
        }
    }
}

/// Map engine errors onto JSON-RPC error codes: caller mistakes are
/// invalid-params, backend failures are internal.
fn rpc_code(err: &EngineError) -> i32 {
    match err {
        EngineError::Validation(_) => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    }
}

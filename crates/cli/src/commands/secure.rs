//! `agentweave secure`: the same query twice: LLM call, then cache hit.

use std::sync::Arc;

use agentweave_cache::ResponseCache;
use agentweave_core::Gateway;
use agentweave_patterns::SecureExecutor;
use agentweave_providers::OfflineGateway;
use agentweave_telemetry::{JsonlSink, Tracer};

use super::{Context, print_step};

const DEFAULT_QUERY: &str = "How do I reset my password?";
const CONTACT_SUFFIX: &str = ". Include a contact email in your response.";
const OFFLINE_REPLY: &str = "Sure, I can help. Contact support at admin@company.com for details.";

pub async fn run(
    ctx: &Context,
    query: Option<String>,
    repeat: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = query.unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let sink = Arc::new(JsonlSink::open(&ctx.config.telemetry.trace_file)?);
    let tracer = Arc::new(Tracer::with_timestamp_id(sink));
    let cache = Arc::new(ResponseCache::from_capacity(ctx.config.cache.capacity));

    // The offline reply carries an email so the output filter has work to do.
    let gateway: Arc<dyn Gateway> = if ctx.config.has_api_key() {
        ctx.gateway.clone()
    } else {
        Arc::new(OfflineGateway::new().with_reply(OFFLINE_REPLY))
    };
    let executor = SecureExecutor::new(gateway, cache.clone(), tracer.clone())
        .with_prompt_suffix(Some(CONTACT_SUFFIX.to_string()))
        .with_temperature(ctx.config.default_temperature);

    println!("--- Production Agent Demo (Trace ID: {}) ---", tracer.trace_id());
    for run in 1..=repeat.max(1) {
        let outcome = executor.execute(&query).await?;
        print_step(
            "Secure",
            &format!("Run {run} ({:?})", outcome.source),
            &outcome.response,
        );
    }

    let stats = cache.stats();
    println!();
    println!("  Cache: {} hit(s), {} miss(es)", stats.hits, stats.misses);
    println!(
        "  Spans written to {}",
        ctx.config.telemetry.trace_file.display()
    );
    Ok(())
}

//! Demo that researches one topic against the live web and prints the results.
//!
//! Usage: `cargo run --bin research_demo -- [topic] [depth]`

use std::sync::Arc;

use research_agent_api::fetch::HttpFetcher;
use research_agent_api::ResearchAgent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    research_agent_api::init_tracing();

    let mut args = std::env::args().skip(1);
    let topic = args
        .next()
        .unwrap_or_else(|| "artificial intelligence".to_string());
    let depth = match args.next() {
        Some(d) => d.parse::<i64>()?,
        None => 2,
    };

    let agent = ResearchAgent::new(Arc::new(HttpFetcher::new()?));
    let results = agent.research(&topic, depth).await;

    println!("\nResearch Results for '{topic}':");
    for (i, item) in results.iter().enumerate() {
        println!("\n--- Result {} ---", i + 1);
        println!("Source: {}", item.source);
        println!("Summary: {}", item.summary);
    }

    Ok(())
}

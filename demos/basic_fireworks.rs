//! Basic Fireworks example covering the main call patterns.
//!
//! This example shows how to:
//! - Create a client from `FIREWORKS_*` environment variables
//! - Complete one prompt with a stop list
//! - Batch several prompts and read token usage from `generate`
//! - Stream a completion token by token
//!
//! # Running
//!
//! ```bash
//! export FIREWORKS_API_KEY="fw-..."
//! cargo run --example basic_fireworks
//! ```

use fireworks_llm::{Fireworks, FireworksConfig, Llm, LlmResult};
use futures_util::StreamExt;
use std::io::Write;

#[tokio::main]
async fn main() -> LlmResult<()> {
    let llm = Fireworks::new(FireworksConfig::from_env())?;
    let stop = vec![",".to_string()];

    println!("Model: {}", llm.model());

    // Single prompt, cut at the first comma
    let answer = llm
        .invoke("How is the weather in New York today?", Some(&stop))
        .await?;
    println!("\nInvoke: {answer}");

    // Several prompts, sent concurrently in sub-batches
    let prompts = vec![
        "Name a city in France:".to_string(),
        "Name a city in Japan:".to_string(),
        "Name a city in Peru:".to_string(),
    ];
    for (prompt, answer) in prompts.iter().zip(llm.batch(&prompts, Some(&stop)).await?) {
        println!("\n{prompt} {answer}");
    }

    let output = llm.generate(&prompts, Some(&stop)).await?;
    if let Some(usage) = output.llm_output.and_then(|o| o.token_usage) {
        println!(
            "\nToken usage: {} input + {} output = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    // Streaming
    print!("\nStream: ");
    let mut tokens = llm.stream("I'm pickle rick", None).await?;
    while let Some(token) = tokens.next().await {
        print!("{}", token?);
        std::io::stdout().flush().ok();
    }
    println!();

    Ok(())
}

use anyhow::Result;
use std::sync::Arc;

use crate::cli::ui;
use crate::config::SacmConfig;
use crate::implementations::retrieval::{HttpIndexClient, RetrievalService};

/// One-shot semantic index query command
pub async fn execute(config: &SacmConfig, text: &str, k: Option<usize>) -> Result<()> {
    ui::print_header("Semantic Index Query");

    let mut index_config = config.index.clone();
    index_config.api_key = config.index_api_key();

    let client = match HttpIndexClient::new(&index_config) {
        Ok(client) => client,
        Err(e) => {
            ui::print_error(&format!("Cannot build index client: {}", e));
            ui::print_info("Set SACM_INDEX_ENDPOINT (and SACM_INDEX_API_KEY if required).");
            return Ok(());
        }
    };

    let service = RetrievalService::new(Arc::new(client), config.retry.clone(), config.index.top_k);
    let k = k.unwrap_or(service.default_k());

    let spinner = ui::create_spinner("Querying the semantic index...");
    let context = service.context_for(text, k).await;
    spinner.finish_and_clear();

    if context.is_empty() {
        ui::print_warning("No context retrieved (index unavailable or no matches).");
    } else {
        println!("{}", context);
    }

    Ok(())
}

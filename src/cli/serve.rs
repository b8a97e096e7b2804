use std::sync::Arc;

use anyhow::Result;

use crate::api;
use crate::core::AppConfig;
use crate::gemini::GeminiClient;

pub async fn run(host: String, port: String, config: AppConfig) -> Result<()> {
    let client = GeminiClient::new(&config)?;
    api::serve(host, port, config, Arc::new(client)).await
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncReadExt;

use crate::ai::chat::Reviewer;
use crate::core::AppConfig;
use crate::gemini::GeminiClient;

async fn read_code(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("Failed to read code from stdin")?;
            Ok(code)
        }
    }
}

pub async fn run(file: Option<PathBuf>, config: AppConfig) -> Result<()> {
    let code = read_code(file).await?;
    if code.trim().is_empty() {
        bail!("No code to review");
    }

    let client = GeminiClient::new(&config)?;
    let mut reviewer = Reviewer::new(Arc::new(client), &config.language);

    let review = reviewer.review(&code).await?;
    println!("# AI Response\n\n{}\n", review);

    let bug_report = reviewer.review_with_bug_report(&code).await?;
    println!("# Bug Report and Suggestions\n\n{}", bug_report);

    Ok(())
}

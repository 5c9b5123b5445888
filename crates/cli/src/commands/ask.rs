//! `rentier ask` — One-shot advisor question from the terminal.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use rentier_advisor::{AdvisorPipeline, KnowledgeBase};
use rentier_config::AppConfig;
use rentier_core::query::{AdvisorQuery, TransactionRecord};
use rentier_providers::OpenAiCompatProvider;

pub async fn run(
    question: String,
    transactions_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    RENTIER_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY  = 'sk-...'");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let transactions: Vec<TransactionRecord> = match transactions_file {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?
        }
        None => Vec::new(),
    };

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config));
    let index = rentier_store::build_from_config(&config)?;
    let knowledge = Arc::new(KnowledgeBase::load(&config)?);
    let pipeline = AdvisorPipeline::new(provider.clone(), provider, index, knowledge, &config);

    let query = AdvisorQuery {
        question,
        transactions,
    };

    let mut stream = pipeline.run(query).await?;

    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.recv().await {
        print!("{chunk}");
        stdout.flush()?;
    }
    println!();

    Ok(())
}

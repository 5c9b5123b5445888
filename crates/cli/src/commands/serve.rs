//! `rentier serve` — Start the HTTP gateway.

use rentier_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🏠 Rentier Gateway");
    println!(
        "   Listening: {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("   Store:     {}", config.retrieval.store);
    println!("   Model:     {}", config.chat_model);

    rentier_gateway::start(config).await?;

    Ok(())
}

//! `rentier config` — Configuration management commands.

use rentier_config::AppConfig;

pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🏠 Rentier — Configuration Setup");
    println!("================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run `rentier config init`.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("   2. Add your Supabase URL and key under [retrieval] (or set store = \"memory\")");
        println!("   3. Run: rentier ask \"利回りとは？\"");
        println!("   4. Run: rentier serve to expose the HTTP gateway\n");
    }

    Ok(())
}

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            // Additional validation checks
            let mut warnings = Vec::new();

            if !config.has_api_key() {
                warnings.push("No API key set (set RENTIER_API_KEY or OPENAI_API_KEY env var)");
            }

            if config.retrieval.store == "rpc"
                && (config.retrieval.supabase_url.is_none()
                    || config.retrieval.supabase_key.is_none())
            {
                warnings.push(
                    "store = \"rpc\" but retrieval.supabase_url / supabase_key are not set",
                );
            }

            if let Some(file) = &config.knowledge.file {
                if !std::path::Path::new(file).exists() {
                    warnings.push("knowledge.file points to a missing file");
                }
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Chat model:      {}", config.chat_model);
            println!("   Embedding model: {}", config.embedding_model);
            println!(
                "   Gateway:         {}:{}",
                config.gateway.host, config.gateway.port
            );
            println!("   Store:           {}", config.retrieval.store);
            println!(
                "   Retrieval:       threshold {} / limit {}",
                config.retrieval.threshold, config.retrieval.limit
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

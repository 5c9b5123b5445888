//! `rentier doctor` — Diagnose setup problems.
//!
//! Offline checks only: no network calls are made, so a clean bill of
//! health still requires valid credentials at request time.

use rentier_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Rentier Doctor — Setup Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    println!("  ✅ Rust binary running");

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");

                // Check API key
                if config.has_api_key() {
                    println!("  ✅ API key configured");
                } else {
                    println!("  ⚠️  No API key configured — add api_key to config.toml");
                    issues += 1;
                }

                // Check store credentials
                match config.retrieval.store.as_str() {
                    "rpc" => {
                        if config.retrieval.supabase_url.is_some()
                            && config.retrieval.supabase_key.is_some()
                        {
                            println!("  ✅ Vector store credentials configured (rpc)");
                        } else {
                            println!(
                                "  ❌ store = \"rpc\" but supabase_url / supabase_key missing"
                            );
                            issues += 1;
                        }
                    }
                    "memory" => {
                        println!("  ✅ In-memory vector store (no credentials needed)");
                    }
                    other => {
                        println!("  ❌ Unknown store backend: {other}");
                        issues += 1;
                    }
                }

                // Check optional knowledge file
                if let Some(file) = &config.knowledge.file {
                    if std::path::Path::new(file).exists() {
                        println!("  ✅ Knowledge file found: {file}");
                    } else {
                        println!("  ⚠️  Knowledge file missing: {file}");
                        issues += 1;
                    }
                }
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ❌ No config file — run `rentier config init`");
        issues += 1;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use ecart_server::{parse_list, ServerConfig};

use super::{load_report_config, open_db};

pub async fn cmd_serve(
    db_path: &Path,
    config_path: Option<&Path>,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Ecart API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    // Parse API keys and CORS origins from environment (comma-separated)
    let api_keys = parse_list(&std::env::var("ECART_API_KEYS").unwrap_or_default());
    let allowed_origins = parse_list(&std::env::var("ECART_ALLOWED_ORIGINS").unwrap_or_default());
    let admin_username = std::env::var("ECART_ADMIN_USERNAME")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let report = load_report_config(config_path)?;
    println!(
        "   Designated centres: {}",
        report.designated_centres.join(", ")
    );

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: {} header", ecart_server::USER_HEADER);
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (ECART_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if let Some(admin) = &admin_username {
        println!("   👤 Bootstrap admin: {} (ECART_ADMIN_USERNAME)", admin);
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");
    println!();

    let db = open_db(db_path, no_encrypt)?;

    let config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
        admin_username,
        report,
    };

    ecart_server::serve_with_config(Arc::new(db), host, port, config).await
}

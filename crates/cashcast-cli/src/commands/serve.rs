//! Server command implementation

use std::path::Path;

use anyhow::Result;
use cashcast_core::ForecastConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    allowed_origins: Vec<String>,
    forecast: ForecastConfig,
) -> Result<()> {
    println!("🚀 Starting Cashcast web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Reporting currency: {}", forecast.reporting_currency);

    // Comma-separated bearer keys for service clients
    let api_keys =
        cashcast_server::parse_api_keys(&std::env::var("CASHCAST_API_KEYS").unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
        println!(
            "      Requests without an owner header act as '{}'",
            cashcast_server::LOCAL_DEV_OWNER
        );
    } else {
        println!("   🔒 Authentication: Cloudflare Access (header)");
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (CASHCAST_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = cashcast_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
    };

    cashcast_server::serve_with_config(db, host, port, config, forecast).await?;

    Ok(())
}

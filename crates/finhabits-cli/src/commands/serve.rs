//! Server command implementation

use anyhow::Result;
use finhabits_core::ai::{AIBackend, AIClient};
use finhabits_core::config::AppConfig;
use finhabits_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(config: &AppConfig) -> Result<()> {
    let settings = &config.server;

    println!("🚀 Starting FinHabits web server...");
    println!("   Database: {}", config.database.path.display());
    println!("   Listening: http://{}:{}", settings.host, settings.port);
    if let Some(dir) = &settings.static_dir {
        println!("   Static files: {}", dir.display());
    }

    let server_config = ServerConfig::from(settings);
    println!(
        "   🍪 Sessions: {} hour(s){}",
        server_config.session_ttl.num_hours(),
        if server_config.secure_cookies {
            ", Secure cookies"
        } else {
            ""
        }
    );
    if !server_config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {}",
            server_config.allowed_origins.join(", ")
        );
    }

    let ai = AIClient::from_config(&config.ai);
    match &ai {
        Some(client) => println!("   🤖 AI backend: {} ({})", client.host(), client.model()),
        None => println!("   💡 Tip: Set GEMINI_API_KEY to enable AI insights and the advisor"),
    }
    println!();

    let db = open_db(&config.database.path)?;
    let static_dir = settings
        .static_dir
        .as_ref()
        .and_then(|dir| dir.to_str());

    finhabits_server::serve(
        db,
        &settings.host,
        settings.port,
        static_dir,
        server_config,
        ai,
    )
    .await
}

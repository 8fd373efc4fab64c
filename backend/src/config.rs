//! Environment-backed configuration, resolved once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Path to the UCI engine binary.
    pub engine_path: String,
    /// Fixed think budget handed to the engine per query.
    pub movetime: Duration,
    /// Commentary service endpoint; unset disables commentary and every
    /// analysis degrades to an empty string.
    pub commentary_url: Option<String>,
    pub cors_origins: Vec<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:8000")
            .parse()
            .context("invalid BIND_ADDR")?;
        let movetime_ms: u64 = env_or("ENGINE_MOVETIME_MS", "100")
            .parse()
            .context("invalid ENGINE_MOVETIME_MS")?;
        let cors_origins = env_or(
            "CORS_ORIGINS",
            "http://localhost:3000,http://localhost:5173",
        )
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

        Ok(Self {
            bind_addr,
            engine_path: env_or("ENGINE_PATH", "/usr/local/bin/stockfish"),
            movetime: Duration::from_millis(movetime_ms),
            commentary_url: std::env::var("COMMENTARY_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            cors_origins,
        })
    }
}

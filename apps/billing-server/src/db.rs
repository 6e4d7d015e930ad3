use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use runtime::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use url::Url;

pub const MEMORY_DSN: &str = "sqlite::memory:";

/// Detect DB backend from URL scheme (sqlite/postgres).
pub fn detect_from_dsn(dsn: &str) -> Result<&'static str> {
    let raw = dsn.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if raw.eq_ignore_ascii_case(MEMORY_DSN) {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// Keeps "sqlite::memory:" as-is and normalizes backslashes into forward slashes.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }
    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Open the configured database, or a private in-memory one when `mock` is set.
pub async fn connect(
    cfg: Option<&DatabaseConfig>,
    base_dir: &Path,
    mock: bool,
) -> Result<DatabaseConnection> {
    let (dsn, max_conns, timeout_ms) = match (mock, cfg) {
        (true, _) => (MEMORY_DSN.to_string(), Some(1), None),
        (false, Some(c)) => (c.url.trim().to_string(), c.max_conns, c.connect_timeout_ms),
        (false, None) => return Err(anyhow!("No database configuration found; use --mock")),
    };

    let backend = detect_from_dsn(&dsn)?;
    let dsn = if backend == "sqlite" {
        absolutize_sqlite_dsn(&dsn, base_dir, true)?
    } else {
        dsn
    };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.connect_timeout(Duration::from_millis(timeout_ms.unwrap_or(5000)))
        .sqlx_logging(false);
    if let Some(n) = max_conns {
        opts.max_connections(n);
    }

    tracing::info!(backend, "Connecting to database: {}", redact(&dsn));
    Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {backend} database"))
}

/// Hide the password part of a DSN for logs.
fn redact(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => dsn.to_string(),
    }
}

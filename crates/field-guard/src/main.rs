//! `field-guard`: service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured logging.
//! 3. Resolve the master secret and the guard configuration.
//! 4. Build the Axum router and start the server.

use anyhow::Result;
use tracing::{info, warn};

use field_guard::config::Config;
use field_guard::server::{router, state::AppState};
use field_guard::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        "field-guard starting"
    );

    // -----------------------------------------------------------------------
    // 3. Guard
    // -----------------------------------------------------------------------
    let core = cfg.crypto_core()?;
    let guard_cfg = cfg.guard_config();
    if guard_cfg.enabled {
        info!(
            fields = guard_cfg.fields.len(),
            kdf_iterations = core.iterations(),
            "response encryption enabled"
        );
    } else {
        warn!("ENABLE_ENCRYPTION is off; sensitive fields will be sent in plaintext");
    }

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(guard_cfg, core);
    let app = router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

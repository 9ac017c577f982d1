//! Mesa Server - guest ordering edge node for a single restaurant
//!
//! # Architecture
//!
//! - **sessions** (`sessions`): QR tokens and guest sessions bound to tables
//! - **orders** (`orders`): event-sourced tab lifecycle over embedded redb
//! - **services** (`services`): read-only catalog + spend-gated song requests
//! - **HTTP API** (`api`): RESTful routes plus an SSE change feed
//!
//! # Module structure
//!
//! ```text
//! mesa-server/src/
//! ├── core/          # Config, state, server runner
//! ├── sessions/      # QR / guest session issuer
//! ├── services/      # Catalog, songs
//! ├── api/           # HTTP routes and handlers
//! ├── utils/         # Errors, logging
//! └── orders/        # Tab event sourcing
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod services;
pub mod sessions;
pub mod utils;

// Re-export common types
pub use core::{Config, Server, ServerState};
pub use orders::{OrdersManager, TabStorage};
pub use sessions::SessionService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: dotenv, work directory, logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        logs_dir.to_str(),
    );

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   __  ___
  /  |/  /__  _________ _
 / /|_/ / _ \/ ___/ __ `/
/ /  / /  __(__  ) /_/ /
/_/  /_/\___/____/\__,_/
    "#
    );
}

//! Bookstore CLI - storefront and back office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and browse
//! bookstore auth login -e reader@example.com -p secret123
//! bookstore catalog list --category 3
//!
//! # Fill the cart and check out
//! bookstore cart add 42 --quantity 2
//! bookstore orders place --name "Nguyễn Văn A" --phone 0912345678 --address "Hà Nội"
//!
//! # Back office
//! bookstore admin login -e admin@example.com -p secret123
//! bookstore admin orders status 17 delivering
//!
//! # Offline helpers
//! bookstore util date '[2025, 5, 23]'
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_API_URL` - Backend base URL (required except for `util`)
//! - `BOOKSTORE_API_TIMEOUT_SECS` - Request timeout (default 30)
//! - `BOOKSTORE_STATE_FILE` - Client storage file (default `.bookstore-state.json`)
//! - `BOOKSTORE_LOG_FORMAT` - `json` for JSON logs
//! - `RUST_LOG` - Log filter (default `info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use bookstore_client::ViewScope;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod context;
mod error;
mod output;
mod store;

use commands::{
    account::AccountAction, admin::AdminAction, auth::AuthAction, cart::CartAction,
    catalog::CatalogAction, orders::OrdersAction, util::UtilAction,
};
use context::Context;
use error::CliError;

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(author, version, about = "Bookstore storefront and back-office client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, register, confirmation emails
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse products, categories and reviews
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out, order history, cancellation, vouchers
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Profile and password
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Back-office administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Offline helpers (no backend needed)
    Util {
        #[command(subcommand)]
        action: UtilAction,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let is_json = std::env::var("BOOKSTORE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let json_layer = is_json.then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!is_json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries command results.
    init_tracing();

    let cli = Cli::parse();

    // Ctrl-C tears the command down like closing a page.
    let scope = ViewScope::new();
    let handle = scope.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            scope.cancel();
        }
    });

    if let Err(e) = handle.run(run(cli)).await {
        tracing::error!(error = %e, "Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let command = match cli.command {
        Commands::Util { action } => return commands::util::run(action),
        command => command,
    };

    let ctx = Context::from_env()?;
    match command {
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Catalog { action } => commands::catalog::run(&ctx, action).await,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await,
        Commands::Orders { action } => commands::orders::run(&ctx, action).await,
        Commands::Account { action } => commands::account::run(&ctx, action).await,
        Commands::Admin { action } => commands::admin::run(&ctx, action).await,
        Commands::Util { action } => commands::util::run(action),
    }
}

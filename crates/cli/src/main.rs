//! Tote CLI - browse the catalog, manage the cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! tote products
//! tote product 4
//!
//! # Cart (server-authoritative; needs TOTE_API_TOKEN)
//! tote cart add 4
//! tote cart inc 4
//! tote cart set 4 3
//! tote cart show
//!
//! # Checkout
//! tote checkout --name "Asha Rao" --line1 "12 Park Street" --city Pune \
//!     --postal-code 411001 --country IN --yes
//!
//! # Account
//! tote login -e asha@example.com -p '...'
//! tote orders
//! ```
//!
//! # Environment Variables
//!
//! See [`tote_client::config`] for the API variables. `SENTRY_DSN` enables
//! error tracking; `RUST_LOG` overrides the default `tote=info` filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tote_core::{ProductId, ShippingAddress};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::CartAction;

#[derive(Parser)]
#[command(name = "tote")]
#[command(author, version, about = "Tote storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all products
    Products,
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Review the cart and place an order
    Checkout {
        #[command(flatten)]
        address: AddressArgs,

        /// Place the order (otherwise only the summary is shown)
        #[arg(short, long)]
        yes: bool,
    },
    /// List past orders
    Orders,
    /// Log in and print a bearer token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and print a bearer token
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum CartCommand {
    /// Show the cart with totals
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Set a line's quantity (0 removes it)
    Set { id: ProductId, quantity: i64 },
    /// Remove a line
    Remove { id: ProductId },
    /// Increase a line's quantity by one
    Inc { id: ProductId },
    /// Decrease a line's quantity by one (never below 1)
    Dec { id: ProductId },
}

impl From<CartCommand> for CartAction {
    fn from(command: CartCommand) -> Self {
        match command {
            CartCommand::Show => Self::Show,
            CartCommand::Add { id } => Self::Add(id),
            CartCommand::Set { id, quantity } => Self::Set(id, quantity),
            CartCommand::Remove { id } => Self::Remove(id),
            CartCommand::Inc { id } => Self::Increment(id),
            CartCommand::Dec { id } => Self::Decrement(id),
        }
    }
}

#[derive(clap::Args)]
struct AddressArgs {
    /// Recipient name
    #[arg(long)]
    name: String,
    /// Street address
    #[arg(long)]
    line1: String,
    /// Apartment, suite, etc.
    #[arg(long)]
    line2: Option<String>,
    #[arg(long)]
    city: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    country: String,
    /// Contact phone number
    #[arg(long)]
    phone: Option<String>,
}

impl From<AddressArgs> for ShippingAddress {
    fn from(args: AddressArgs) -> Self {
        Self {
            full_name: args.name,
            line1: args.line1,
            line2: args.line2,
            city: args.city,
            postal_code: args.postal_code,
            country: args.country,
            phone: args.phone,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load .env before reading SENTRY_DSN
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry();

    // Logs go to stderr; stdout is for command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tote=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if sentry_guard.is_some() {
        tracing::debug!("Sentry initialized");
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products => commands::catalog::list().await?,
        Commands::Product { id } => commands::catalog::show(id).await?,
        Commands::Cart { action } => commands::cart::run(action.into()).await?,
        Commands::Checkout { address, yes } => {
            commands::checkout::run(address.into(), yes).await?;
        }
        Commands::Orders => commands::orders::list().await?,
        Commands::Login { email, password } => {
            commands::auth::login(&email, SecretString::from(password)).await?;
        }
        Commands::Signup {
            name,
            email,
            password,
        } => {
            commands::auth::signup(&name, &email, SecretString::from(password)).await?;
        }
    }
    Ok(())
}

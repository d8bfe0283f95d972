//! Tradepost CLI - Database, account, cart and dispatch tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tp-cli migrate
//!
//! # Create an administrator
//! tp-cli account create -e admin@example.com -n "Admin Name" -p "long passphrase" -r admin
//!
//! # Approve a pending wholesaler
//! tp-cli wholesaler list --status pending
//! tp-cli wholesaler approve 42
//!
//! # Build a cart and send it
//! tp-cli cart add --id A --name Widget --price 10.00 --quantity 2
//! tp-cli checkout -n Tendai -p 0771234567 -m "Deliver Friday"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account` - Create, deactivate and reactivate accounts
//! - `wholesaler` - List and approve wholesalers
//! - `sessions purge` - Delete expired sessions
//! - `cart` - Inspect and edit the local cart
//! - `checkout` - Send the cart as an order confirmation
//! - `inquiry` - Send a contact message to the store

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tradepost_api::models::WholesalerFilter;
use tradepost_core::AccountRole;

mod commands;
mod error;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(author, version, about = "Tradepost CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage wholesalers
    Wholesaler {
        #[command(subcommand)]
        action: WholesalerAction,
    },
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Inspect and edit the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Send the cart as an order confirmation and clear it
    Checkout {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer phone number
        #[arg(short, long)]
        phone: String,

        /// Customer email
        #[arg(short, long)]
        email: Option<String>,

        /// Note included in the confirmation
        #[arg(short, long)]
        message: String,
    },
    /// Send a contact message to the store
    Inquiry {
        /// Sender name
        #[arg(short, long)]
        name: String,

        /// Sender phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Sender email
        #[arg(short, long)]
        email: Option<String>,

        /// Message text
        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Account role (`admin`, `wholesaler`)
        #[arg(short, long, default_value = "admin")]
        role: AccountRole,

        /// Approve a wholesaler immediately
        #[arg(long)]
        approved: bool,
    },
    /// Deactivate an account and revoke its sessions
    Deactivate {
        /// Login email address
        #[arg(short, long)]
        email: String,
    },
    /// Reactivate a deactivated account
    Activate {
        /// Login email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum WholesalerAction {
    /// Approve a wholesaler
    Approve {
        /// Account ID
        id: i32,

        /// Withdraw approval instead
        #[arg(long)]
        revoke: bool,
    },
    /// List wholesalers
    List {
        /// Filter (`pending`, `approved`, `all`)
        #[arg(short, long, default_value = "pending")]
        status: WholesalerFilter,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Delete expired sessions
    Purge,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product (merges with an existing line)
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product name
        #[arg(long)]
        name: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Image reference
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a product
    Remove {
        /// Product ID
        #[arg(long)]
        id: String,
    },
    /// Set a product's quantity (zero or less removes it)
    Set {
        /// Product ID
        #[arg(long)]
        id: String,

        /// New quantity
        #[arg(short, long, allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), error::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Account { action } => match action {
            AccountAction::Create {
                email,
                name,
                password,
                role,
                approved,
            } => {
                commands::account::create(&email, &name, &password, role, approved).await?;
            }
            AccountAction::Deactivate { email } => {
                commands::account::set_active(&email, false).await?;
            }
            AccountAction::Activate { email } => {
                commands::account::set_active(&email, true).await?;
            }
        },
        Commands::Wholesaler { action } => match action {
            WholesalerAction::Approve { id, revoke } => {
                commands::wholesaler::approve(id, !revoke).await?;
            }
            WholesalerAction::List { status } => commands::wholesaler::list(status).await?,
        },
        Commands::Sessions { action } => match action {
            SessionsAction::Purge => commands::sessions::purge().await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                name,
                price,
                quantity,
                image,
            } => commands::cart::add(id, name, price, quantity, image)?,
            CartAction::Remove { id } => commands::cart::remove(&id)?,
            CartAction::Set { id, quantity } => commands::cart::set(&id, quantity)?,
            CartAction::Show => commands::cart::show()?,
            CartAction::Clear => commands::cart::clear()?,
        },
        Commands::Checkout {
            name,
            phone,
            email,
            message,
        } => commands::dispatch::checkout(name, phone, email, message).await?,
        Commands::Inquiry {
            name,
            phone,
            email,
            message,
        } => commands::dispatch::inquiry(name, phone, email, message).await?,
    }
    Ok(())
}

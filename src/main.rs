#![allow(clippy::result_large_err)]

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use meal_buddy::{
    config,
    core::{
        AdminGuard, AnalyticsAggregator, CartItem, OrderBook, PaymentLedger, PreferenceStore,
        RecommendationEngine, SalesPeriod,
    },
    errors::Result,
    models::PreferenceUpdate,
    store::CollectionStore,
};
use serde::Serialize;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Meal recommendations and admin dashboard figures for the food-ordering store.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "MEAL_BUDDY_CONFIG", default_value = "config.toml")]
    config: PathBuf,
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct AdminArgs {
    /// Email of the admin requesting dashboard data
    #[arg(long, env = "MEAL_BUDDY_ADMIN")]
    admin: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dashboard KPIs
    Summary(AdminArgs),
    /// Revenue per day, week or month
    Trends {
        #[command(flatten)]
        admin: AdminArgs,
        /// daily, weekly or monthly
        #[arg(short, long, default_value = "daily")]
        period: String,
    },
    /// Items by units sold
    Popular(AdminArgs),
    /// Customers by total spent
    Customers(AdminArgs),
    /// Demand forecast from the last 30 days
    Forecast(AdminArgs),
    /// Recorded payments
    Payments(AdminArgs),
    /// Meals ordered by similar customers
    Recommend {
        /// User id (account email)
        #[arg(short, long)]
        user: String,
    },
    /// Meals that go with the given cart
    Cart {
        /// User id (account email)
        #[arg(short, long)]
        user: String,
        /// Meal id in the cart; repeat for several
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
    },
    /// Meals matching the user's diet, healthiest first
    Health {
        /// User id (account email)
        #[arg(short, long)]
        user: String,
    },
    /// Read or update dietary preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// Manage orders
    #[command(subcommand)]
    Orders(OrdersCommand),
    /// Write a sample order if there are none
    Seed,
}

#[derive(Subcommand, Debug)]
enum PrefsCommand {
    /// Show the stored preferences
    Get {
        #[arg(short, long)]
        user: String,
    },
    /// Replace the given preference lists, keeping the others
    Set {
        #[arg(short, long)]
        user: String,
        /// Dietary tag, e.g. vegan; repeat for several
        #[arg(long = "diet")]
        dietary_preferences: Option<Vec<String>>,
        /// Allergen to avoid; repeat for several
        #[arg(long = "allergy")]
        allergies: Option<Vec<String>>,
        /// Favorite cuisine; repeat for several
        #[arg(long = "cuisine")]
        favorite_cuisines: Option<Vec<String>>,
    },
}

#[derive(Subcommand, Debug)]
enum OrdersCommand {
    /// Print all orders
    List,
    /// Mark an order as completed
    Complete { id: String },
    /// Delete an order
    Delete { id: String },
}

/// Loads `env_file` (or `.env` from the working directory) before parsing `args`,
/// so `env = ...` arguments can be supplied from the file.
fn parse_cli<I, T>(env_file: Option<&Path>, args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    // Non-fatal since env vars can be set externally
    if let Some(path) = env_file {
        dotenvy::from_path(path).ok();
    } else {
        dotenv().ok();
    }
    Cli::try_parse_from(args)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command, store: Arc<dyn CollectionStore>, guard: &AdminGuard) -> Result<()> {
    let analytics = || AnalyticsAggregator::new(Arc::clone(&store));
    let recommendations = || RecommendationEngine::new(Arc::clone(&store));

    match command {
        Command::Summary(args) => {
            guard.authorize(&args.admin)?;
            print_json(&analytics().summary().await)
        }
        Command::Trends { admin, period } => {
            guard.authorize(&admin.admin)?;
            let period: SalesPeriod = period.parse()?;
            print_json(&analytics().sales_trends(period).await)
        }
        Command::Popular(args) => {
            guard.authorize(&args.admin)?;
            print_json(&analytics().popular_items().await)
        }
        Command::Customers(args) => {
            guard.authorize(&args.admin)?;
            print_json(&analytics().customer_insights().await)
        }
        Command::Forecast(args) => {
            guard.authorize(&args.admin)?;
            print_json(&analytics().inventory_forecast().await)
        }
        Command::Payments(args) => {
            guard.authorize(&args.admin)?;
            print_json(&PaymentLedger::new(Arc::clone(&store)).list().await?)
        }
        Command::Recommend { user } => {
            print_json(&recommendations().recommend_for_user(&user).await?)
        }
        Command::Cart { user, items } => {
            let cart: Vec<CartItem> = items.into_iter().map(CartItem::new).collect();
            print_json(&recommendations().recommend_for_cart(&user, &cart).await?)
        }
        Command::Health { user } => {
            print_json(&recommendations().recommend_for_health(&user).await?)
        }
        Command::Prefs(PrefsCommand::Get { user }) => {
            print_json(&PreferenceStore::new(Arc::clone(&store)).get(&user).await)
        }
        Command::Prefs(PrefsCommand::Set {
            user,
            dietary_preferences,
            allergies,
            favorite_cuisines,
        }) => {
            let update = PreferenceUpdate {
                dietary_preferences,
                allergies,
                favorite_cuisines,
            };
            let saved = PreferenceStore::new(Arc::clone(&store))
                .upsert(&user, update)
                .await?;
            print_json(&saved)
        }
        Command::Orders(OrdersCommand::List) => {
            print_json(&OrderBook::new(Arc::clone(&store)).list().await?)
        }
        Command::Orders(OrdersCommand::Complete { id }) => {
            print_json(&OrderBook::new(Arc::clone(&store)).complete(&id).await?)
        }
        Command::Orders(OrdersCommand::Delete { id }) => {
            OrderBook::new(Arc::clone(&store)).delete(&id).await?;
            info!("Deleted order {id}");
            Ok(())
        }
        Command::Seed => {
            let seeded = OrderBook::new(Arc::clone(&store))
                .seed_sample_if_empty()
                .await?;
            if !seeded {
                info!("Orders already present, nothing seeded");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, then parse arguments
    let cli = parse_cli(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

    // 2. Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // 3. Load the application configuration
    let app_config = config::load_or_default(&cli.config)
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;

    // 4. Open the collection store
    let store = app_config
        .open_store()
        .await
        .inspect(|_| info!("Collection store ready ({:?})", app_config.storage.backend))
        .inspect_err(|e| error!("Failed to open collection store: {e}"))?;

    let guard = AdminGuard::from(&app_config.admin);
    run(cli.command, store, &guard)
        .await
        .inspect_err(|e| error!("{e}"))
}

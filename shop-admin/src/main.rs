//! shop-admin - operator CLI for the shop back office
//!
//! Every command prints an `ApiResponse` JSON document on stdout; logs go to
//! stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value, json};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{CouponMap, Setting, SettingKey};
use shop_admin::catalog::{category_path, resolve_properties};
use shop_admin::settings::SettingsStore;
use shop_admin::stats::order_stats;
use shop_admin::{AppState, Config};

#[derive(Debug, Parser)]
#[command(name = "shop-admin", version, about = "Shop back-office operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Push the coupon specification to Stripe and save it
    SyncCoupons {
        /// JSON file replacing the saved specification
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Properties a product in the category must fill in
    Properties {
        #[arg(long)]
        category: String,
    },
    /// Paid-order counts and revenue
    Stats,
    /// Re-mirror a product and its price onto Stripe
    MirrorProduct {
        #[arg(long)]
        id: String,
    },
    /// Read or write shop settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Every setting with its current value
    Show,
    Get { name: String },
    /// VALUE is JSON; bare text is taken as a string
    Set { name: String, value: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = %e.code, "{}", e.message);
            print_json(&ApiResponse::<()>::error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), AppError> {
    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, "Starting shop-admin");

    let state = AppState::new(&config).await?;

    match command {
        Command::SyncCoupons { file } => {
            let desired = match file {
                Some(path) => read_coupon_file(&path).await?,
                None => state.settings().coupons().await?,
            };
            let report = state.sync_coupons(&desired).await?;
            if !report.is_clean() {
                tracing::warn!(failed = ?report.failed_codes(), "Some coupons did not sync");
            }
            print_json(&ApiResponse::success(report));
        }
        Command::Properties { category } => {
            let categories = state.list_categories().await?;
            let path = category_path(&category, &categories);
            if path.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::CategoryNotFound,
                    format!("Category {category} not found"),
                )
                .with_detail("category_id", category));
            }
            let properties = resolve_properties(&category, &categories);
            let path: Vec<&str> = path.iter().map(|c| c.name.as_str()).collect();
            print_json(&ApiResponse::success(json!({
                "category": category,
                "path": path,
                "properties": properties,
            })));
        }
        Command::Stats => {
            let orders = state.recent_orders().await?;
            print_json(&ApiResponse::success(order_stats(&orders, Utc::now())));
        }
        Command::MirrorProduct { id } => {
            let price_id = state.mirror_product(&id).await?;
            print_json(&ApiResponse::success(json!({
                "productId": id,
                "priceId": price_id,
            })));
        }
        Command::Settings(cmd) => run_settings(&state, cmd).await?,
    }
    Ok(())
}

async fn run_settings(state: &AppState, command: SettingsCommand) -> Result<(), AppError> {
    match command {
        SettingsCommand::Show => {
            let mut values = Map::new();
            for key in SettingKey::ALL {
                let value = match state.settings_store.get(key).await? {
                    Some(setting) => setting.to_value()?,
                    None => Value::Null,
                };
                values.insert(key.as_str().to_string(), value);
            }
            print_json(&ApiResponse::success(values));
        }
        SettingsCommand::Get { name } => {
            let key = SettingKey::from_name(&name).ok_or_else(|| unknown_setting(&name))?;
            let value = match key {
                // An unset coupon list reads as empty
                SettingKey::Coupons => serde_json::to_value(state.settings().coupon_list().await?)
                    .map_err(|e| AppError::internal(e.to_string()))?,
                _ => match state.settings_store.get(key).await? {
                    Some(setting) => setting.to_value()?,
                    None => Value::Null,
                },
            };
            print_json(&ApiResponse::success(json!({ "name": key.as_str(), "value": value })));
        }
        SettingsCommand::Set { name, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let settings = state.settings();
            match Setting::from_raw(&name, value)? {
                Setting::FeaturedProductId(id) => {
                    state.get_product(&id).await?;
                    settings.set_featured_product_id(id).await?;
                }
                Setting::ShippingFee(fee) => settings.set_shipping_fee(fee).await?,
                Setting::ShopName(shop_name) => settings.set_shop_name(shop_name).await?,
                // Saving coupons always goes through a platform sync
                Setting::Coupons(desired) => {
                    let report = state.sync_coupons(&desired).await?;
                    print_json(&ApiResponse::success(report));
                    return Ok(());
                }
            }
            print_json(&ApiResponse::success(json!({ "name": name })));
        }
    }
    Ok(())
}

async fn read_coupon_file(path: &Path) -> Result<CouponMap, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("{}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("{}: {e}", path.display()))
    })
}

fn unknown_setting(name: &str) -> AppError {
    AppError::with_message(ErrorCode::SettingNotFound, format!("Unknown setting: {name}"))
        .with_detail("name", name)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode output"),
    }
}

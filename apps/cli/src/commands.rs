//! Subcommand handlers.
//!
//! Each handler drives the session and prints either a plain table or,
//! with `--json`, a pretty-printed document on stdout.

use std::io::BufRead;
use std::path::PathBuf;

use serde::Serialize;
use shopfront_api::CatalogSource;
use shopfront_core::{CartLine, Money, Product, ProductQuery, DEFAULT_SIZE};
use shopfront_session::{Debouncer, SessionResult, SessionStore, ShopfrontConfig};
use tracing::{debug, warn};

use crate::cli::{CatalogArgs, Command, SearchArgs};

// =============================================================================
// Dispatch
// =============================================================================

pub async fn dispatch<S: CatalogSource>(
    session: &mut SessionStore<S>,
    config: &ShopfrontConfig,
    command: Command,
    json: bool,
) -> SessionResult<()> {
    match command {
        Command::Catalog(args) => {
            session.load_catalog().await?;
            let products = session.query(&product_query(&args));
            print_products(&products, json);
        }

        Command::Show { id } => {
            load_catalog_or_warn(session).await;
            let product = session.product(&id).await?;
            print_product(&product, json);
        }

        Command::Add { id, size } => {
            session.load_catalog().await?;
            let quantity = session.add_item(&id, size.as_deref()).await?;
            if json {
                print_json(&CartView::build(session));
            } else {
                println!(
                    "{} × {} ({}) in cart",
                    quantity,
                    id,
                    size.as_deref().unwrap_or(DEFAULT_SIZE)
                );
                print_summary(session);
            }
        }

        Command::Update { id, quantity, size } => {
            // Zero and negative quantities are decided without the catalog.
            if quantity > 0 {
                session.load_catalog().await?;
            }
            let size = size.as_deref().unwrap_or(DEFAULT_SIZE);
            session.update_quantity(&id, size, quantity).await?;
            print_cart_or_summary(session, json);
        }

        Command::Remove { id, size } => {
            session
                .remove_item(&id, size.as_deref().unwrap_or(DEFAULT_SIZE))
                .await?;
            print_cart_or_summary(session, json);
        }

        Command::Cart => {
            load_catalog_or_warn(session).await;
            print_cart(session, json);
        }

        Command::Clear => {
            session.clear_cart().await?;
            print_cart_or_summary(session, json);
        }

        Command::Checkout => {
            session.load_catalog().await?;
            let snapshot = session.proceed_to_checkout().await?;
            if json {
                print_json(&snapshot);
            } else {
                println!("Checkout {}", snapshot.id);
                for line in &snapshot.lines {
                    println!(
                        "  {:<24} {:<8} {:>3} × {:>10} = {:>10}",
                        line.name, line.size, line.quantity, line.unit_price, line.line_total
                    );
                }
                println!("  Subtotal  {:>10}", snapshot.subtotal);
                println!("  Shipping  {:>10}", snapshot.shipping);
                println!("  Tax       {:>10}", snapshot.tax);
                println!("  Total     {:>10}", snapshot.total);
            }
        }

        Command::Search(args) => {
            session.load_catalog().await?;
            search(session, config, args, json).await?;
        }

        // Handled before storage is opened.
        Command::Config { .. } => {}
    }

    Ok(())
}

/// Prints the effective configuration, optionally writing it out.
pub fn config(config: &ShopfrontConfig, save: bool, path: Option<PathBuf>) -> SessionResult<()> {
    if save {
        let written = config.save(path)?;
        println!("Saved {}", written.display());
    }

    let text = toml::to_string_pretty(config)?;
    print!("{}", text);
    Ok(())
}

/// Views that can still show the cart keep going on a failed catalog load.
async fn load_catalog_or_warn<S: CatalogSource>(session: &mut SessionStore<S>) {
    if let Err(err) = session.load_catalog().await {
        warn!(error = %err, "Continuing without a fresh catalog");
    }
}

fn product_query(args: &CatalogArgs) -> ProductQuery {
    ProductQuery {
        text: args.search.clone(),
        category: args.category.clone(),
        sub_category: args.sub_category.clone(),
        size: args.size.clone(),
        in_stock_only: args.in_stock,
        min_price: args.min_price.map(Money::from_cents),
        max_price: args.max_price.map(Money::from_cents),
        sort: args.sort,
    }
}

// =============================================================================
// Search
// =============================================================================

async fn search<S: CatalogSource>(
    session: &mut SessionStore<S>,
    config: &ShopfrontConfig,
    args: SearchArgs,
    json: bool,
) -> SessionResult<()> {
    if !args.interactive {
        let products = session.search(&args.query)?;
        print_products(&products, json);
        return Ok(());
    }

    session.set_search_visible(true);
    let (debouncer, mut settled) = Debouncer::spawn(config.search.debounce());

    // Every line read is one keystroke-equivalent; only settled text is searched.
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if !debouncer.input(line) {
                break;
            }
        }
    });

    while let Some(text) = settled.recv().await {
        debug!(query = %text, "Search settled");
        match session.search(&text) {
            Ok(products) => {
                if !json {
                    println!("search: {:?}", text.trim());
                }
                print_products(&products, json);
            }
            Err(err) => eprintln!("error [{}]: {}", err.code(), err),
        }
    }

    session.set_search_visible(false);
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

/// Cart as printed by `cart` and `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView {
    lines: Vec<CartLineView>,
    item_count: u64,
    total: Money,
    /// Lines whose product is missing from the catalog, priced at zero.
    stale: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartLineView {
    product_id: String,
    size: String,
    quantity: u32,
    name: Option<String>,
    unit_price: Option<Money>,
    line_total: Money,
}

impl CartView {
    fn build<S: CatalogSource>(session: &SessionStore<S>) -> Self {
        let catalog = session.catalog();
        let lines = session
            .cart()
            .lines()
            .map(|line| {
                let product = catalog.get(&line.product_id);
                let unit_price = product.map(|p| p.price);
                CartLineView {
                    name: product.map(|p| p.name.clone()),
                    line_total: unit_price
                        .map(|price| price.multiply_quantity(line.quantity))
                        .unwrap_or_default(),
                    unit_price,
                    product_id: line.product_id,
                    size: line.size,
                    quantity: line.quantity,
                }
            })
            .collect();

        CartView {
            lines,
            item_count: session.item_count(),
            total: session.total_amount(),
            stale: session.stale_lines(),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => warn!(error = %e, "Failed to encode output"),
    }
}

fn print_products(products: &[&Product], json: bool) {
    if json {
        print_json(products);
        return;
    }

    if products.is_empty() {
        println!("No products match.");
        return;
    }

    for product in products {
        let stock = if product.in_stock() {
            format!("{} left", product.stock)
        } else {
            "sold out".to_string()
        };
        println!(
            "{:<26} {:<28} {:>10}  {:<9} {}",
            product.id,
            product.name,
            product.price.to_string(),
            stock,
            product.sizes.join("/")
        );
    }
}

fn print_product(product: &Product, json: bool) {
    if json {
        print_json(product);
        return;
    }

    println!("{} ({})", product.name, product.id);
    println!("  Price:    {}", product.price);
    println!("  Stock:    {}", product.stock);
    if !product.category.is_empty() {
        println!("  Category: {} / {}", product.category, product.sub_category);
    }
    if product.has_variants() {
        println!("  Sizes:    {}", product.sizes.join(", "));
    }
    println!("  Image:    {}", product.image);
    if let Some(description) = &product.description {
        println!();
        println!("{}", description);
    }
}

fn print_cart<S: CatalogSource>(session: &SessionStore<S>, json: bool) {
    let view = CartView::build(session);
    if json {
        print_json(&view);
        return;
    }

    if view.lines.is_empty() {
        println!("Cart is empty.");
        return;
    }

    for line in &view.lines {
        let name = line.name.as_deref().unwrap_or("(no longer listed)");
        let unit = line
            .unit_price
            .map(|price| price.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<26} {:<24} {:<8} {:>3} × {:>10} = {:>10}",
            line.product_id, name, line.size, line.quantity, unit, line.line_total
        );
    }
    println!("Items: {}   Total: {}", view.item_count, view.total);
}

fn print_summary<S: CatalogSource>(session: &SessionStore<S>) {
    println!(
        "Cart: {} items, {}",
        session.item_count(),
        session.total_amount()
    );
}

fn print_cart_or_summary<S: CatalogSource>(session: &SessionStore<S>, json: bool) {
    if json {
        print_json(&CartView::build(session));
    } else {
        print_summary(session);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Storefront CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use storefront::{
    cart::{CartLine, LineId},
    catalog::CatalogError,
    checkout::{CheckoutDetails, CheckoutError},
    config::{self, StorefrontConfig},
    context::{AppContext, AppInitError},
    filters::SortOrder,
    mirror::MirrorError,
    observability::{self, ObservabilityError},
    pricing::{PricingError, to_money},
    products::{Product, ProductId},
    receipt::ReceiptError,
};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List catalog products
    Products(ProductsArgs),

    /// Show one product
    Product {
        /// Product id
        id: u32,
    },

    /// List categories
    Categories {
        /// Ask the remote catalog instead of the first page of products
        #[arg(long)]
        remote: bool,
    },

    /// Manage the cart
    Cart(CartCommand),

    /// Manage favorites
    Favorites(FavoritesCommand),

    /// Buy everything in the cart
    Checkout(CheckoutArgs),
}

#[derive(Debug, Args)]
struct ProductsArgs {
    /// Pages to load
    #[arg(long, default_value_t = 1_u32)]
    pages: u32,

    /// Remote full-text search instead of paging
    #[arg(long, conflicts_with = "remote_category")]
    search: Option<String>,

    /// Fetch one category remotely instead of paging
    #[arg(long)]
    remote_category: Option<String>,

    /// Local text filter over title, description and brand
    #[arg(short, long)]
    query: Option<String>,

    /// Local category filter
    #[arg(short, long)]
    category: Option<String>,

    /// Sort order
    #[arg(short, long, value_enum, default_value_t = SortOrder::NameAsc)]
    sort: SortOrder,
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,

    /// Add a product
    Add {
        /// Product id
        product: u32,

        /// Units to add
        #[arg(short, long, default_value_t = 1_u32)]
        quantity: u32,
    },

    /// Set a line's quantity; zero or less removes it
    Set {
        /// Line id
        line: u32,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line
    Remove {
        /// Line id
        line: u32,
    },

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Debug, Subcommand)]
enum FavoritesSubcommand {
    /// Show favorites
    Show,

    /// Favorite a product
    Add {
        /// Product id
        product: u32,
    },

    /// Unfavorite a product
    Remove {
        /// Product id
        product: u32,
    },

    /// Remove every favorite
    Clear,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Buyer name
    #[arg(long)]
    name: String,

    /// Buyer email
    #[arg(long)]
    email: String,

    /// Buyer phone number
    #[arg(long)]
    phone: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("changes may not have been saved: {0}")]
    Mirror(#[from] MirrorError),

    #[error("failed to write output")]
    Io(#[from] io::Error),
}

#[tokio::main]
pub async fn main() -> ExitCode {
    config::load_dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "errors are reported to the user on stderr"
            )]
            {
                eprintln!("error: {error}");
            }

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    observability::init(&cli.config.logging)?;

    let mut app = AppContext::from_config(&cli.config).await?;
    let mut out = io::stdout().lock();

    let result = dispatch(&mut app, cli.command, &mut out).await;

    // Persist whatever the command changed, even if it then failed.
    let flushed = app.shutdown().await;

    result?;
    flushed?;

    Ok(())
}

async fn dispatch(
    app: &mut AppContext,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Products(args) => list_products(app, args, out).await,
        Commands::Product { id } => {
            let product = app.catalog.fetch_product(ProductId::new(id)).await?;

            write_product(out, &product, app.currency())
        }
        Commands::Categories { remote } => list_categories(app, remote, out).await,
        Commands::Cart(CartCommand { command }) => cart(app, command, out).await,
        Commands::Favorites(FavoritesCommand { command }) => favorites(app, command, out).await,
        Commands::Checkout(args) => {
            let receipt = app.checkout(&CheckoutDetails {
                name: args.name,
                email: args.email,
                phone: args.phone,
            })?;

            receipt.write_to(out)?;

            Ok(())
        }
    }
}

async fn list_products(
    app: &mut AppContext,
    args: ProductsArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if let Some(query) = &args.search {
        app.catalog.search_remote(query).await?;
    } else if let Some(category) = &args.remote_category {
        app.catalog.load_category(category).await?;
    } else {
        app.catalog.load_first_page().await?;

        for _ in 1..args.pages {
            if app.catalog.load_more().await? == 0 {
                break;
            }
        }
    }

    app.catalog.set_query(args.query.unwrap_or_default());
    app.catalog.set_category(args.category);
    app.catalog.set_sort(args.sort);

    let visible = app.catalog.visible();

    write_product_table(out, &visible, app.currency())?;

    writeln!(
        out,
        "{} of {} loaded products shown, {} in catalog",
        visible.len(),
        app.catalog.products().len(),
        app.catalog.total()
    )?;

    Ok(())
}

async fn list_categories(
    app: &mut AppContext,
    remote: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if remote {
        for category in app.catalog.fetch_categories().await? {
            writeln!(out, "{:<24} {}", category.slug, category.name)?;
        }
    } else {
        app.catalog.load_first_page().await?;

        for category in app.catalog.categories() {
            writeln!(out, "{category}")?;
        }
    }

    Ok(())
}

async fn cart(
    app: &mut AppContext,
    command: CartSubcommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product, quantity } => {
            let product = app.catalog.fetch_product(ProductId::new(product)).await?;

            if let Some(line) = app.cart.add(&product, quantity) {
                writeln!(out, "Added {quantity} x {} (line {line})", product.title)?;
            }
        }
        CartSubcommand::Set { line, quantity } => {
            let line = LineId::new(line);

            if !app.cart.set_quantity(line, quantity) {
                writeln!(out, "No cart line {line}, nothing changed")?;
            }
        }
        CartSubcommand::Remove { line } => {
            let line = LineId::new(line);

            if !app.cart.remove(line) {
                writeln!(out, "No cart line {line}, nothing changed")?;
            }
        }
        CartSubcommand::Clear => app.cart.clear(),
    }

    write_cart(out, app.cart.lines(), app)
}

async fn favorites(
    app: &mut AppContext,
    command: FavoritesSubcommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        FavoritesSubcommand::Show => {}
        FavoritesSubcommand::Add { product } => {
            let product = app.catalog.fetch_product(ProductId::new(product)).await?;

            app.favorites.add(&product);
        }
        FavoritesSubcommand::Remove { product } => {
            app.favorites.remove(ProductId::new(product));
        }
        FavoritesSubcommand::Clear => app.favorites.clear(),
    }

    let products: Vec<Product> = app.favorites.products().cloned().collect();

    write_product_table(out, &products, app.currency())
}

fn write_product_table(
    out: &mut impl Write,
    products: &[Product],
    currency: &'static Currency,
) -> Result<(), CliError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Title", "Category", "Price", "Discount", "Rating", "Stock"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.title.clone(),
            product.category.clone(),
            to_money(product.discounted_price(), currency)?.to_string(),
            format!("{}%", product.discount_percentage.round_dp(2)),
            format!("{:.2}", product.rating),
            product.stock.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..7), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

fn write_product(
    out: &mut impl Write,
    product: &Product,
    currency: &'static Currency,
) -> Result<(), CliError> {
    writeln!(out, "{} (#{})", product.title, product.id)?;
    writeln!(out, "{}", product.description)?;
    writeln!(
        out,
        "Price: {} ({} before {}% off)",
        to_money(product.discounted_price(), currency)?,
        to_money(product.price, currency)?,
        product.discount_percentage.round_dp(2)
    )?;
    writeln!(out, "Rating: {:.2}  Stock: {}", product.rating, product.stock)?;
    writeln!(out, "Category: {}", product.category)?;

    if let Some(brand) = &product.brand {
        writeln!(out, "Brand: {brand}")?;
    }

    Ok(())
}

fn write_cart(out: &mut impl Write, lines: &[CartLine], app: &AppContext) -> Result<(), CliError> {
    if lines.is_empty() {
        writeln!(out, "Cart is empty")?;

        return Ok(());
    }

    let currency = app.currency();
    let mut builder = Builder::default();

    builder.push_record(["Line", "Item", "Qty", "Unit Price", "Total"]);

    for line in lines {
        builder.push_record([
            line.id.to_string(),
            line.product.title.clone(),
            line.quantity.to_string(),
            to_money(line.unit_price(), currency)?.to_string(),
            to_money(line.total_price(), currency)?.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());

    let summary = app.cart.summary();

    writeln!(out, "{table}")?;
    writeln!(out, "Items:    {}", app.cart.total_quantity())?;
    writeln!(out, "Subtotal: {}", to_money(summary.subtotal, currency)?)?;
    writeln!(out, "Discount: -{}", to_money(summary.discount, currency)?)?;
    writeln!(out, "Total:    {}", to_money(summary.total, currency)?)?;

    Ok(())
}

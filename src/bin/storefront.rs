//! Storefront command line: bulk import plus the local cart and favorites.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use olas_storefront::client::ClientState;
use olas_storefront::domain::{Product, ProductSnapshot};
use olas_storefront::import::{parse_file, ImportRequest};

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Import products and manage the local cart and favorites")]
struct Cli {
    /// Catalog service base URL
    #[arg(long, env = "STOREFRONT_API", default_value = "http://localhost:8083")]
    api: String,
    /// File holding the local cart and favorites
    #[arg(long, env = "STOREFRONT_STORAGE", default_value = ".storefront.json")]
    storage: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import products from a .csv or .json file
    Import { file: PathBuf },
    /// List active products
    Products {
        #[arg(long)]
        category: Option<String>,
    },
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Debug, Subcommand)]
enum CartAction {
    List,
    Add { id: String },
    Set { id: String, quantity: i64 },
    Remove { id: String },
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum FavoritesAction {
    List,
    Toggle { id: String },
    Remove { id: String },
    ToCart { id: String },
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

struct Catalog {
    client: reqwest::Client,
    base: String,
}

impl Catalog {
    fn new(base: &str) -> Self {
        Self { client: reqwest::Client::new(), base: base.trim_end_matches('/').to_string() }
    }

    async fn product(&self, id: &str) -> Result<Product> {
        let body: Envelope<Product> = self.client.get(format!("{}/products/{id}", self.base)).send().await?.json().await?;
        match body {
            Envelope { success: true, data: Some(product), .. } => Ok(product),
            Envelope { error, .. } => bail!(error.unwrap_or_else(|| format!("product {id} not available"))),
        }
    }

    async fn products(&self, category: Option<&str>) -> Result<Vec<Product>> {
        let mut request = self.client.get(format!("{}/products", self.base));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let body: Envelope<Vec<Product>> = request.send().await?.json().await?;
        match body {
            Envelope { success: true, data, .. } => Ok(data.unwrap_or_default()),
            Envelope { error, .. } => bail!(error.unwrap_or_else(|| "listing failed".into())),
        }
    }

    async fn import(&self, request: &ImportRequest) -> Result<u64> {
        let body: Value = self.client.post(format!("{}/products/import", self.base)).json(request).send().await?.json().await?;
        if body["success"].as_bool() == Some(true) {
            Ok(body["imported"].as_u64().unwrap_or_default())
        } else {
            bail!(body["error"].as_str().unwrap_or("import failed").to_string())
        }
    }
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_cart(state: &ClientState) -> Result<()> {
    let cart = state.cart()?;
    if cart.is_empty() {
        println!("cart is empty");
        return Ok(());
    }
    for item in cart.items() {
        println!("{:<38} {:<30} {:>3} x {:>9.2} = {:>9.2}", item.id, item.name, item.quantity, item.price, item.line_total());
    }
    println!("total: {:.2}", cart.total());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let catalog = Catalog::new(&cli.api);

    match cli.command {
        Commands::Import { file } => {
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
            let content = tokio::fs::read_to_string(&file).await.with_context(|| format!("reading {}", file.display()))?;
            let products = parse_file(&name, &content)?;
            let imported = catalog.import(&ImportRequest { products }).await?;
            println!("{imported} products imported successfully");
        }
        Commands::Products { category } => {
            for p in catalog.products(category.as_deref()).await? {
                println!("{:<38} {:<30} {:<10} {:>9.2} stock {}", p.id.to_string(), p.name, p.category.as_str(), p.price, p.stock);
            }
        }
        Commands::Cart { action } => {
            let mut state = ClientState::open(&cli.storage)?;
            match action {
                CartAction::List => {}
                CartAction::Add { id } => {
                    let product = catalog.product(&id).await?;
                    state.add_to_cart(&ProductSnapshot::from(&product))?;
                }
                CartAction::Set { id, quantity } => { state.update_quantity(&id, quantity)?; }
                CartAction::Remove { id } => {
                    if !state.remove_from_cart(&id)? { println!("{id} was not in the cart"); }
                }
                CartAction::Clear { yes } => {
                    if !state.clear_cart(|| yes || confirm("Empty the cart?"))? { println!("cart left unchanged"); }
                }
            }
            print_cart(&state)?;
        }
        Commands::Favorites { action } => {
            let mut state = ClientState::open(&cli.storage)?;
            match action {
                FavoritesAction::List => {}
                FavoritesAction::Toggle { id } => {
                    let product = catalog.product(&id).await?;
                    let added = state.toggle_favorite(&ProductSnapshot::from(&product))?;
                    println!("{} {} favorites", product.name, if added { "added to" } else { "removed from" });
                }
                FavoritesAction::Remove { id } => { state.remove_favorite(&id)?; }
                FavoritesAction::ToCart { id } => {
                    state.add_favorite_to_cart(&id)?;
                    print_cart(&state)?;
                }
                FavoritesAction::Clear { yes } => {
                    if !state.clear_favorites(|| yes || confirm("Clear all favorites?"))? { println!("favorites left unchanged"); }
                }
            }
            for f in state.favorites()?.items() {
                println!("{:<38} {:<30} {:>9.2}", f.id, f.name, f.price);
            }
        }
    }

    Ok(())
}

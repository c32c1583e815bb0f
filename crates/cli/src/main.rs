//! Catalog CLI for querying materials snapshots.
//!
//! Usage:
//!     catalog --file snapshot.json query --search "cable" --sort price-low
//!     catalog --file snapshot.json facets --search "mcb"
//!     catalog --url https://project.supabase.co health

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use elecmat_facets::{compute_facets, describe_filters, summarize_page, Facet};
use elecmat_features::parse_price;
use elecmat_model::{CatalogItem, FilterFacet, QuerySpec, SortKey};
use elecmat_query::{Engine, EngineConfig};
use elecmat_source::{CatalogSource, FileSource, HttpSource, HttpSourceConfig, SourceError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Query electrical-materials catalog snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot JSON file
    #[arg(long, global = true, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// REST base URL serving the materials cache
    #[arg(long, global = true)]
    url: Option<String>,

    /// API key for the REST source
    #[arg(long, global = true, env = "ELECMAT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Restrict the REST source to one category
    #[arg(long, global = true)]
    category: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, sort and page the catalog
    Query(QueryArgs),

    /// Show filter facet counts
    Facets {
        /// Search term the counts follow
        #[arg(short, long, default_value = "")]
        search: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check the item source
    Health,
}

#[derive(Args)]
struct QueryArgs {
    /// Free-text search over name, supplier, category and highlights
    #[arg(short, long, default_value = "")]
    search: String,

    /// Brand to include (repeatable)
    #[arg(long)]
    brand: Vec<String>,

    /// Price bucket, e.g. "Under £50" (repeatable)
    #[arg(long)]
    price: Vec<String>,

    /// Stock label or "on-sale" (repeatable)
    #[arg(long)]
    availability: Vec<String>,

    /// Supplier to include (repeatable)
    #[arg(long)]
    supplier: Vec<String>,

    /// Generic selection as facet=value, e.g. brands=Hager (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// relevance, price-low, price-high, name, supplier
    #[arg(long, default_value = "relevance")]
    sort: String,

    #[arg(short, long, default_value = "1")]
    page: usize,

    #[arg(long, default_value = "12")]
    page_size: usize,

    /// Cap on the page size honoured
    #[arg(long)]
    max_page_size: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

impl QueryArgs {
    fn to_spec(&self) -> Result<QuerySpec> {
        let sort: SortKey = self.sort.parse()?;
        let mut spec = QuerySpec::new()
            .with_search(self.search.clone())
            .with_sort(sort)
            .with_page(self.page)
            .with_page_size(self.page_size);

        let selections = [
            (FilterFacet::Brands, &self.brand),
            (FilterFacet::PriceRanges, &self.price),
            (FilterFacet::Availability, &self.availability),
            (FilterFacet::Suppliers, &self.supplier),
        ];
        for (facet, values) in selections {
            spec.filters.values_mut(facet).extend(values.iter().cloned());
        }

        for pair in &self.filters {
            let Some((name, value)) = pair.split_once('=') else {
                bail!("Filter must be facet=value, got '{}'", pair);
            };
            let facet: FilterFacet = name.trim().parse()?;
            spec.filters.values_mut(facet).insert(value.trim().to_string());
        }

        Ok(spec)
    }
}

/// Source chosen on the command line.
enum Source {
    File(FileSource),
    Http(HttpSource),
}

impl Source {
    fn from_cli(cli: &Cli) -> Result<Self> {
        match (&cli.file, &cli.url) {
            (Some(path), _) => Ok(Source::File(FileSource::new(path))),
            (None, Some(url)) => {
                let config = HttpSourceConfig {
                    base_url: url.clone(),
                    api_key: cli.api_key.clone(),
                    category: cli.category.clone(),
                    timeout_secs: cli.timeout,
                    ..Default::default()
                };
                Ok(Source::Http(HttpSource::new(config)?))
            }
            (None, None) => bail!("No item source: pass --file or --url"),
        }
    }
}

impl CatalogSource for Source {
    async fn fetch(&self) -> Result<Vec<CatalogItem>, SourceError> {
        match self {
            Source::File(s) => s.fetch().await,
            Source::Http(s) => s.fetch().await,
        }
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        match self {
            Source::File(s) => s.health_check().await,
            Source::Http(s) => s.health_check().await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Source::File(s) => s.name(),
            Source::Http(s) => s.name(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("elecmat=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let source = Source::from_cli(&cli)?;

    match &cli.command {
        Commands::Query(args) => {
            run_query(&source, args).await?;
        }
        Commands::Facets { search, format } => {
            run_facets(&source, search, format).await?;
        }
        Commands::Health => {
            run_health(&source).await?;
        }
    }

    Ok(())
}

async fn load(source: &Source) -> Result<Vec<CatalogItem>> {
    let items = source
        .fetch()
        .await
        .with_context(|| format!("Failed to load catalog from {} source", source.name()))?;
    tracing::info!(items = items.len(), source = source.name(), "Catalog loaded");
    Ok(items)
}

async fn run_query(source: &Source, args: &QueryArgs) -> Result<()> {
    let spec = args.to_spec()?;
    let items = load(source).await?;

    let engine = Engine::new(EngineConfig {
        max_page_size: args.max_page_size,
    });
    let page = engine.run(&items, &spec);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let chips = describe_filters(&spec);
    if !chips.is_empty() {
        println!("Filters: {}", chips.join(" | "));
    }
    println!("Sort: {}", spec.sort_key.display_name());
    println!("---");

    for (offset, item) in page.items.iter().enumerate() {
        println!("\n{}. {}", page.start_index + offset + 1, item.name);
        println!(
            "   Price: {} ({:.2}) | Supplier: {}",
            item.price,
            parse_price(&item.price),
            item.supplier.as_deref().unwrap_or("-")
        );
        if item.is_on_sale {
            println!("   On sale: {}", item.sale_price.as_deref().unwrap_or("yes"));
        }
        if let Some(status) = &item.stock_status {
            println!("   Stock: {}", status);
        }
        if !item.category.is_empty() {
            println!("   Category: {}", item.category);
        }
    }

    println!("\n---");
    println!("{}", summarize_page(&page));
    println!("Page {} of {}", page.current_page, page.total_pages);

    Ok(())
}

async fn run_facets(source: &Source, search: &str, format: &str) -> Result<()> {
    let items = load(source).await?;
    let engine = Engine::new(EngineConfig::default());
    let spec = QuerySpec::new().with_search(search);
    let facets = compute_facets(&items, &spec, engine.brand_extractor());

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&facets)?);
        return Ok(());
    }

    for facet in [
        &facets.brands,
        &facets.suppliers,
        &facets.categories,
        &facets.availability,
        &facets.price_ranges,
    ] {
        print_facet(facet);
    }

    Ok(())
}

fn print_facet(facet: &Facet) {
    println!("\n{}", facet.name);
    if facet.values.is_empty() {
        println!("   (none)");
    }
    for value in &facet.values {
        println!("   {} ({})", value.value, value.count);
    }
}

async fn run_health(source: &Source) -> Result<()> {
    print!("Checking {} source... ", source.name());

    match source.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}

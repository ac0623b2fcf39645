//! # Glass Calculator CLI
//!
//! Terminal front end for quoting glass structures.
//!
//! ```text
//! glass_cli                           # catalog from GLASS_CATALOG_URL (HTTP)
//! glass_cli --url https://shop/api    # explicit backend
//! glass_cli catalog.json              # offline catalog file
//! glass_cli --store shop.gqs          # where saved quotes go
//! ```
//!
//! Set `RUST_LOG=debug` to see every recalculation.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use glass_core::catalog::{CatalogService, HttpCatalog, StaticCatalog};
use glass_core::configuration::{ConfigurationController, CustomerInfo};
use glass_core::geometry::{project_faces, Layout, ViewRotation};
use glass_core::pricing::{CalculationResult, CostBucket};
use glass_core::saved::{load_store, save_store, SavedCalculations, StoreLock};
use glass_core::settings::CatalogSettings;
use glass_core::validation::ValidationIssue;

#[derive(Parser)]
#[command(name = "glass_cli")]
#[command(about = "Quote glass partitions and shower enclosures", long_about = None)]
struct Cli {
    /// Offline catalog file; without it the HTTP backend is used
    catalog: Option<PathBuf>,

    /// Catalog backend URL, overrides GLASS_CATALOG_URL
    #[arg(long)]
    url: Option<String>,

    /// Saved quotes store
    #[arg(long, default_value = "quotes.gqs")]
    store: PathBuf,
}

fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .context("failed to install log subscriber")?;
    Ok(())
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn prompt_f64(label: &str, default: f64) -> f64 {
    prompt(label)
        .and_then(|s| s.replace(',', ".").parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    println!("Glass Calculator - Partition and Shower Quotes");
    println!("==============================================");
    println!();

    match &cli.catalog {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using catalog file");
            let catalog = StaticCatalog::from_file(path)
                .with_context(|| format!("could not load catalog file {}", path.display()))?;
            run(ConfigurationController::new(catalog), &cli.store).await
        }
        None => {
            let mut settings = CatalogSettings::from_env();
            if let Some(url) = &cli.url {
                settings = settings.with_base_url(url.clone());
            }
            tracing::info!(url = %settings.base_url, timeout_secs = settings.timeout_secs, "Using catalog backend");
            let catalog = HttpCatalog::new(&settings)?;
            run(ConfigurationController::new(catalog), &cli.store).await
        }
    }
}

async fn run<S: CatalogService>(mut controller: ConfigurationController<S>, store_path: &Path) -> anyhow::Result<()> {
    let count = controller.load_catalog().await.context("could not load packages")?;
    if count == 0 {
        bail!("the catalog has no active packages");
    }
    if let Err(e) = controller.load_components().await {
        println!("Component catalog unavailable ({}); only package alternatives are offered.", e);
    }

    println!();
    println!("Packages:");
    for package in controller.packages() {
        let pricing = if package.has_components() { "components" } else { "flat" };
        println!("  [{}] {} ({} pricing)", package.package_id, package.package_name, pricing);
    }
    println!();

    let first_id = controller.packages()[0].package_id;
    let package_id = prompt(&format!("Package id [{}]: ", first_id))
        .and_then(|s| s.parse().ok())
        .unwrap_or(first_id);
    controller.select_package(package_id)?;

    configure_structure(&mut controller)?;
    configure_door(&mut controller)?;

    println!();
    print_issues(controller.issues());
    print_layout(controller.layout());

    let Some(result) = controller.result().cloned() else {
        println!("Dimensions are incomplete; nothing to price.");
        return Ok(());
    };
    print_result(&result);

    println!();
    println!("JSON Output:");
    println!("{}", serde_json::to_string_pretty(&result)?);

    offer_save(&controller, store_path)?;
    offer_order(&mut controller).await;
    Ok(())
}

fn configure_structure<S: CatalogService>(controller: &mut ConfigurationController<S>) -> anyhow::Result<()> {
    let structure = controller.configuration().structure.clone();

    let height = prompt_f64(&format!("Height (mm) [{:.0}]: ", structure.height_mm), structure.height_mm);
    controller.set_height(height)?;

    for (index, section) in structure.sections.iter().enumerate() {
        let width = prompt_f64(
            &format!("Section {} width (mm) [{:.0}]: ", index + 1, section.width_mm),
            section.width_mm,
        );
        controller.set_section_width(index, width)?;
    }
    Ok(())
}

fn configure_door<S: CatalogService>(controller: &mut ConfigurationController<S>) -> anyhow::Result<()> {
    let Some(door) = controller.configuration().door else {
        return Ok(());
    };
    let width = prompt_f64(&format!("Door width (mm) [{:.0}]: ", door.width_mm), door.width_mm);
    controller.set_door_width(width)?;
    let height = prompt_f64(&format!("Door height (mm) [{:.0}]: ", door.height_mm), door.height_mm);
    controller.set_door_height(height)?;
    Ok(())
}

fn print_issues(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("Warnings:");
    for issue in issues {
        println!("  {}: {}", issue.field, issue.message);
    }
    println!();
}

fn print_layout(layout: &Layout) {
    let Some(structure) = layout.as_structure() else {
        println!("Layout: (empty)");
        return;
    };
    let faces = project_faces(structure, &ViewRotation::default().projector());
    println!(
        "Layout: {} segments, {} door leaves, {} walls, plan {:.0} x {:.0}, {} faces",
        structure.segments.len(),
        structure.doors.len(),
        structure.walls.len(),
        structure.max_x,
        structure.room_depth,
        faces.len()
    );
    println!();
}

fn print_result(result: &CalculationResult) {
    println!("═══════════════════════════════════════");
    println!("  QUOTE");
    println!("═══════════════════════════════════════");
    println!("  Area:        {:.2} m²", result.square_meters);
    for line in &result.lines {
        let bucket = match line.bucket {
            CostBucket::Materials => "",
            CostBucket::Services => " (service)",
        };
        println!(
            "  {:<28} {:>7.2} {} x {:>9.2} = {:>10.2}{}",
            line.variant_name,
            line.quantity,
            line.unit.label(),
            line.unit_price,
            line.cost,
            bucket
        );
    }
    println!("  Materials:   {:.2}", result.components_total);
    println!("  Services:    {:.2}", result.services_total);
    println!("  Markup:      {:.2}", result.markup_amount);
    println!("═══════════════════════════════════════");
    println!("  TOTAL:       {:.2}", result.total_price);
    println!("═══════════════════════════════════════");
}

fn offer_save<S: CatalogService>(controller: &ConfigurationController<S>, path: &Path) -> anyhow::Result<()> {
    let Some(name) = prompt("Save this quote as (blank to skip): ").filter(|n| !n.is_empty()) else {
        return Ok(());
    };
    let user = std::env::var("USER").unwrap_or_else(|_| "glass_cli".to_string());

    let _lock = StoreLock::acquire(path, user)?;
    let mut store = if path.exists() {
        load_store(path)?
    } else {
        SavedCalculations::new()
    };
    let id = store.add(controller.save_calculation(name)?);
    save_store(&store, path)?;
    tracing::info!(%id, path = %path.display(), "Saved quote");
    println!("Saved to {} ({} quotes).", path.display(), store.len());
    Ok(())
}

async fn offer_order<S: CatalogService>(controller: &mut ConfigurationController<S>) {
    let Some(name) = prompt("Customer name to place an order (blank to skip): ").filter(|n| !n.is_empty()) else {
        return;
    };
    let phone = prompt("Customer phone: ").unwrap_or_default();
    let mut customer = CustomerInfo::new(name, phone);
    customer.email = prompt("Customer email (optional): ").unwrap_or_default();

    match controller.submit_order(&customer).await {
        Ok(order) => println!("Order sent: {:.2} total.", order.total_price),
        Err(e) => {
            eprintln!("Order not sent: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
        }
    }
}

//! # Seed Data Generator
//!
//! Populates a development database with a realistic sample dataset:
//! the shirt catalogue, two resellers, two consignments (one partially
//! paid), and two sales.
//!
//! Everything goes through the engine services, so stock math and the
//! activity log come out exactly as they would in production use.
//!
//! ## Usage
//! ```bash
//! cargo run -p kaos-engine --bin seed
//! cargo run -p kaos-engine --bin seed -- --db ./data/kaos.db
//! ```

use std::env;

use kaos_core::{ShirtSize, ShirtType};
use kaos_db::{Database, DbConfig};
use kaos_engine::{
    ConsignmentEngine, NewConsignment, NewConsignmentLine, NewConsignmentSale, NewDirectSale,
    NewProduct, NewReseller, ProductLedger, SaleLine, SalesRecorder,
};

/// The sample shirt catalogue.
const PRODUCTS: &[(&str, ShirtType, ShirtSize, i64, i64, &str)] = &[
    ("KD-001", ShirtType::Dewasa, ShirtSize::M, 85, 95_000, "Hitam polos"),
    ("KD-002", ShirtType::Dewasa, ShirtSize::L, 72, 95_000, "Hitam polos"),
    ("KD-003", ShirtType::Dewasa, ShirtSize::Xl, 124, 100_000, "Hitam polos"),
    ("KDP-001", ShirtType::DewasaPanjang, ShirtSize::L, 18, 115_000, "Hitam polos"),
    ("KDP-002", ShirtType::DewasaPanjang, ShirtSize::Xl, 32, 120_000, "Hitam polos"),
    ("KB-001", ShirtType::Bloombee, ShirtSize::Xl3, 8, 140_000, "Premium"),
    ("KA-001", ShirtType::Anak, ShirtSize::M, 75, 75_000, "Biru polos"),
    ("KAT-001", ShirtType::AnakTanggung, ShirtSize::L, 42, 85_000, "Merah polos"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./kaos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kaos Inventory Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kaos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kaos Inventory Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    let (total, applied) = kaos_db::migrations::migration_status(db.pool()).await?;
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let ledger = ProductLedger::new(db.clone());
    let engine = ConsignmentEngine::new(db.clone());
    let sales = SalesRecorder::new(db.clone());

    // Products
    println!();
    println!("Creating products...");
    let mut product_ids = Vec::new();
    for (code, shirt_type, size, stock, price, notes) in PRODUCTS {
        let product = ledger
            .create_product(NewProduct {
                product_code: (*code).to_string(),
                shirt_type: *shirt_type,
                size: *size,
                stock: *stock,
                price: *price,
                notes: Some((*notes).to_string()),
            })
            .await?;
        product_ids.push(product.id);
    }
    println!("  {} products created", product_ids.len());

    // Resellers
    println!("Creating resellers...");
    let budi = engine
        .register_reseller(NewReseller {
            name: "Budi Santoso".to_string(),
            phone: Some("0812-3456-7890".to_string()),
            address: Some("Jl. Merdeka No. 123, Jakarta".to_string()),
        })
        .await?;
    let dewi = engine
        .register_reseller(NewReseller {
            name: "Dewi Lestari".to_string(),
            phone: Some("0856-7890-1234".to_string()),
            address: Some("Jl. Pahlawan No. 45, Bandung".to_string()),
        })
        .await?;
    println!("  2 resellers created");

    // Consignments
    println!("Creating consignments...");
    let consignment_budi = engine
        .create_consignment(NewConsignment {
            consignment_code: "CN-1001".to_string(),
            reseller_id: budi.id.clone(),
            notes: Some("Konsinyasi pertama".to_string()),
            items: vec![
                NewConsignmentLine {
                    product_id: product_ids[2].clone(), // KD-003, XL
                    quantity: 15,
                    price_per_item: 110_000,
                },
                NewConsignmentLine {
                    product_id: product_ids[1].clone(), // KD-002, L
                    quantity: 10,
                    price_per_item: 105_000,
                },
            ],
        })
        .await?;

    let consignment_dewi = engine
        .create_consignment(NewConsignment {
            consignment_code: "CN-1002".to_string(),
            reseller_id: dewi.id.clone(),
            notes: Some("Konsinyasi anak".to_string()),
            items: vec![NewConsignmentLine {
                product_id: product_ids[6].clone(), // KA-001, M
                quantity: 15,
                price_per_item: 95_000,
            }],
        })
        .await?;

    // Dewi has paid part of her batch.
    engine.process_payment(&consignment_dewi.id, 800_000).await?;
    println!("  2 consignments created (1 partially paid)");

    // Sales
    println!("Creating sales...");
    sales
        .create_direct_sale(NewDirectSale {
            sale_code: "SL-1001".to_string(),
            items: vec![SaleLine {
                product_id: product_ids[0].clone(), // KD-001, M
                quantity: 10,
                price_per_item: 95_000,
            }],
            notes: Some("Penjualan langsung".to_string()),
        })
        .await?;
    sales
        .create_consignment_sale(NewConsignmentSale {
            sale_code: "SL-1002".to_string(),
            consignment_id: consignment_budi.id.clone(),
            amount: 550_000,
            notes: Some("Penjualan dari konsinyasi Budi".to_string()),
        })
        .await?;
    println!("  2 sales created");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

//! # Concurrent Update Example
//!
//! Several workers increment one stock counter through the optimistic
//! concurrency loop. Conflicting writes are retried from a fresh read, and a
//! worker whose update would push the stock below zero is rejected without
//! writing anything.
//!
//! Run with `RUST_LOG=debug` to see every attempt and retry.

use item_ops::{
    CancellationSignal, ConcurrentReplaceBuilder, ConcurrentReplaceResult, CreateBuilder,
    InMemoryStore, InMemoryStoreConfig, ItemOperations, ItemStore, ReplaceBuilder, ReplaceResult,
    RetryConfig,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Stock {
    id: String,
    warehouse: String,
    available: i64,
}

#[derive(Debug)]
enum StockError {
    Insufficient { available: i64, requested: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    println!("📦 Concurrent Stock Update");
    println!("==========================\n");

    let store = InMemoryStore::with_config(InMemoryStoreConfig {
        partition_key_path: Some("/warehouse".to_string()),
        ..InMemoryStoreConfig::default()
    });
    let cancel = CancellationSignal::none();

    let created = store
        .create(
            CreateBuilder::returning_content()
                .item(Stock {
                    id: "widget".to_string(),
                    warehouse: "north".to_string(),
                    available: 20,
                })
                .build(),
            &cancel,
        )
        .await?;
    println!(
        "✅ Created stock item (status {}, charge {})",
        created.status_code, created.request_charge
    );

    // Six workers each take five units; only four can succeed
    let retry = RetryConfig::new().with_max_retry_count(50);
    let mut workers = Vec::new();
    for worker in 0..6 {
        let store = store.clone();
        workers.push(tokio::spawn(async move {
            let op = ConcurrentReplaceBuilder::<Stock, StockError>::new()
                .id("widget")
                .partition_key("north")
                .update(|mut stock: Stock, _| async move {
                    let requested = 5;
                    if stock.available < requested {
                        return Err(StockError::Insufficient {
                            available: stock.available,
                            requested,
                        });
                    }
                    stock.available -= requested;
                    Ok(stock)
                })
                .build();

            let response = store
                .replace_concurrently_with(op, &retry, &CancellationSignal::none())
                .await;
            (worker, response)
        }));
    }

    for handle in workers {
        let (worker, response) = handle.await?;
        match response {
            Ok(response) => match response.result {
                ConcurrentReplaceResult::Success(stock) => println!(
                    "  worker {}: took 5, {} left ({} attempt(s), charge {})",
                    worker, stock.available, response.attempts, response.request_charge
                ),
                ConcurrentReplaceResult::CustomError(StockError::Insufficient {
                    available,
                    requested,
                }) => println!(
                    "  worker {}: rejected, wanted {} but only {} left",
                    worker, requested, available
                ),
                other => println!("  worker {}: {:?}", worker, other),
            },
            Err(e) => println!("  worker {}: failed: {}", worker, e),
        }
    }

    // A safe replace with a stale etag is refused
    let first_etag = created.etag.clone().ok_or("create returned no etag")?;
    let stale = ReplaceBuilder::new()
        .item(Stock {
            id: "widget".to_string(),
            warehouse: "north".to_string(),
            available: 1_000,
        })
        .id("widget")
        .partition_key("north")
        .if_match_etag(first_etag)
        .build();
    match store.replace(stale, &cancel).await?.result {
        ReplaceResult::ModifiedBefore(_) => println!("\n🔒 Stale replace refused as expected"),
        other => println!("\n⚠️  Unexpected replace outcome: {:?}", other),
    }

    let current = store
        .read_item::<Stock>("widget", Some(&"north".into()), &cancel)
        .await?;
    if let Some(stock) = current.resource {
        println!("📊 Final stock: {}", stock.available);
    }

    Ok(())
}

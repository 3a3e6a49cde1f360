//! Integration demo: create a sandbox transaction, then poll its status.
//!
//! Requires `DUITKU_MERCHANT_CODE` and `DUITKU_API_KEY` environment
//! variables (sandbox credentials).
//!
//! Run: `cargo run --example create_transaction --features cli`

use std::process::ExitCode;

use duitku_rs::checkout::CheckoutBlocking;
use duitku_rs::config::{DuitkuConfig, EnvProvider};
use duitku_rs::models::{MerchantOrderId, TransactionRequest};
use duitku_rs::store::FileStore;
use uuid::Uuid;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _dotenv = dotenvy::dotenv();

    let config = DuitkuConfig::from_provider(&EnvProvider::new())?;

    let store = FileStore::new(FileStore::default_dir()?)?;
    let checkout = CheckoutBlocking::builder()
        .config(config)
        .store(store)
        .build()?;

    // See which methods the sandbox offers for this amount.
    println!("Listing payment methods...");
    let methods = checkout.inner_client().payment_methods(15_000)?;
    for method in &methods.payment_fee {
        println!(
            "  {} — {} (fee Rp{})",
            method.payment_method, method.payment_name, method.total_fee
        );
    }

    let order_id = MerchantOrderId::from(format!("DEMO-{}", Uuid::new_v4()));
    println!("Creating transaction (order id: {order_id})...");

    let request = TransactionRequest::new(
        15_000,
        "SP".to_owned(),
        order_id.clone(),
        "Demo transaction — safe to let expire".to_owned(),
        "demo@example.com".to_owned(),
        "https://example.com/callback".to_owned(),
        "https://example.com/return".to_owned(),
    );
    let response = checkout.pay(request)?;

    println!("Created: reference {}", response.reference);
    if let Some(url) = response.payment_url.as_deref() {
        println!("Payment URL: {url}");
    }
    if let Some(qr_string) = response.qr_string.as_deref() {
        println!("QR string: {qr_string}");
    }

    // The customer has not paid, so this should report pending.
    println!("Polling status...");
    let status = checkout.refresh_status(&order_id)?;
    println!(
        "Status: {} ({})",
        status.status_code.label(),
        status.status_message
    );

    // The order is now in the local store.
    let recorded = checkout.orders()?;
    println!("{} order(s) recorded locally", recorded.len());

    Ok(())
}

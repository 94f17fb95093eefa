//! `tw-cli catalog` - fetch and print the store catalog.

#![allow(clippy::print_stdout)]

use tradewind_client::{Settings, StoreClient};

pub async fn run(locale: &str) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let client = StoreClient::new(settings);

    client.fetch_item_groups(locale).await?;
    client.fetch_virtual_items().await?;
    client.fetch_virtual_currencies().await?;
    client.fetch_virtual_currency_packages().await?;

    let data = client.items_data();
    println!(
        "{} items, {} groups ({} referenced by items)",
        data.items.len(),
        data.groups.len(),
        data.group_ids.len()
    );
    for item in &data.items {
        let price = item
            .price
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        println!("  {:<24} {:<32} {}", item.sku, item.name, price);
    }

    let currencies = client.virtual_currencies();
    println!("{} virtual currencies", currencies.len());
    for currency in &currencies {
        println!("  {:<24} {}", currency.sku, currency.name);
    }

    let packages = client.virtual_currency_packages();
    println!("{} currency packages", packages.len());
    for package in &packages {
        println!("  {:<24} {}", package.sku, package.name);
    }

    Ok(())
}

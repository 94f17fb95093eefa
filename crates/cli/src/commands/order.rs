//! `tw-cli order` - check an order's status.

#![allow(clippy::print_stdout)]

use tradewind_client::{Settings, StoreClient};

pub async fn run(token: &str, order_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let client = StoreClient::new(settings);

    let order = client.check_order(token, order_id).await?;
    println!("order {} is {}", order.order_id, order.status);

    Ok(())
}

//! `tw-cli token` - decode a session token's payload.

#![allow(clippy::print_stdout)]

use tradewind_client::token::decode_payload;

pub fn run(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let claims = decode_payload(token)?;

    println!("user id:  {}", claims.user_id());
    println!("provider: {}", claims.provider());
    println!("master:   {}", claims.is_master_account());

    Ok(())
}

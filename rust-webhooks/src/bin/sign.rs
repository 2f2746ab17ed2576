//! Logify Sign - compute a Shopify webhook signature.
//!
//! Reads a request body from stdin and prints the value Shopify would send in
//! `X-Shopify-Hmac-Sha256` for it, keyed by `SHOPIFY_SHARED_SECRET`:
//!
//! ```text
//! logify-sign < customer.json
//! ```

use std::io::Read;

use anyhow::{anyhow, Context, Result};

use logify::web::sign;
use logify::Config;

fn main() -> Result<()> {
    let config = Config::from_env();
    let secret = config
        .shared_secret
        .context("SHOPIFY_SHARED_SECRET must be set")?;

    let mut body = Vec::new();
    std::io::stdin()
        .read_to_end(&mut body)
        .context("Failed to read body from stdin")?;

    let signature = sign(secret.as_bytes(), &body)
        .map_err(|e| anyhow!("Failed to sign body: {e}"))?;
    println!("{signature}");

    Ok(())
}

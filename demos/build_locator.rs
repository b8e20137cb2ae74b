//! Build a compound key locator and encode it.
//!
//! Run with: cargo run --example build_locator

use keylocator::{from_str, to_string_with_options, CodecOptions, KeyLocator, Role};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // A data key locked under either the server role or a KMS key
    let locker = KeyLocator::list([
        KeyLocator::role("", Role::Server),
        KeyLocator::fqid("", "kms-primary", "wrapping-key-7"),
    ]);
    let locator = KeyLocator::pair(locker, "HMAC-SHA-256", b"wrapped data key".to_vec());

    let token = locator.to_token()?;
    println!("Token:\n{}\n", token);

    let decoded = from_str(&token)?;
    assert_eq!(decoded, locator);
    println!("✓ Round-trip successful");

    // A tighter nesting limit rejects the same tree
    let options = CodecOptions::new().with_max_depth(1);
    match to_string_with_options(&locator, &options) {
        Ok(_) => println!("unexpectedly encoded with max_depth = 1"),
        Err(err) => println!("max_depth = 1: {err}"),
    }

    Ok(())
}

use anyhow::{Result, bail};
use solana_sdk::hash::hash;

use crate::constants::ANCHOR_DISCRIMINATOR_LEN;

/// Anchor account discriminator: first 8 bytes of `sha256("account:<name>")`
pub fn account_discriminator(account_name: &str) -> [u8; 8] {
    let preimage = format!("account:{}", account_name);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

/// Helper function to split the discriminator off raw account data
pub(crate) fn strip_discriminator<'a>(data: &'a [u8], account_name: &str) -> Result<&'a [u8]> {
    if data.len() < ANCHOR_DISCRIMINATOR_LEN {
        bail!(
            "{} account data too short: {} bytes",
            account_name,
            data.len()
        );
    }

    let expected = account_discriminator(account_name);
    let (found, body) = data.split_at(ANCHOR_DISCRIMINATOR_LEN);
    if found != expected {
        bail!(
            "Invalid {} discriminator: expected {}, found {}",
            account_name,
            hex::encode(expected),
            hex::encode(found)
        );
    }

    Ok(body)
}

/// Lamports to SOL, for display only
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1e9
}

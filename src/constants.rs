use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const LAUNCH_PROGRAM_ID: Pubkey = pubkey!("DxchSpAi7A14f9o1LGPr18HikXEjMT6VXj1oy24VXAgN");

// SEEDS
pub const LAUNCH_SEED: &[u8] = b"launch";
pub const BUYER_SEED: &[u8] = b"buyer";

// DECIMALS
pub const SOL_DECIMALS: u32 = 9;
pub const TOKEN_DECIMALS: u32 = 6;

pub const MAX_BPS: u64 = 10_000; // 100% in basis points

// ACCOUNT SIZES (discriminator included)
pub const TOKEN_LAUNCH_V1_LEN: usize = 443; // with holders_thawed
pub const TOKEN_LAUNCH_V2_LEN: usize = 439;

pub const ANCHOR_DISCRIMINATOR_LEN: usize = 8;

use solana_sdk::pubkey::Pubkey;

use crate::constants::{BUYER_SEED, LAUNCH_PROGRAM_ID, LAUNCH_SEED};

/// Launch account for a token mint
pub fn launch_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LAUNCH_SEED, mint.as_ref()], &LAUNCH_PROGRAM_ID)
}

/// Per-buyer record of a launch
pub fn buyer_record_address(launch: &Pubkey, buyer: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[BUYER_SEED, launch.as_ref(), buyer.as_ref()],
        &LAUNCH_PROGRAM_ID,
    )
}

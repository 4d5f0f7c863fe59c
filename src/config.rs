use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_BPS, SOL_DECIMALS, TOKEN_DECIMALS};

/// Curve and trading parameters shared by the calculator and the launch model.
///
/// The defaults are the deployed launch program's constants. Amounts are in
/// base units (lamports for SOL); `curve_tokens` and `real_supply` are taken
/// verbatim from the program's supply constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub sol_decimals: u32,
    pub token_decimals: u32,
    pub platform_fee_bps: u64, // 10^4 = 100%
    pub min_sol_per_tx: u64,
    pub max_sol_per_tx: u64,
    pub curve_tokens: u64, // tokens sellable on the curve
    pub real_supply: u64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            sol_decimals: SOL_DECIMALS,
            token_decimals: TOKEN_DECIMALS,
            platform_fee_bps: 200,
            min_sol_per_tx: 10_000_000,
            max_sol_per_tx: 100_000_000_000,
            curve_tokens: 793_100_000_000_000_000,
            real_supply: 1_000_000_000_000_000_000,
        }
    }
}

impl CurveConfig {
    /// Parse a config from JSON. Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CurveConfig =
            serde_json::from_str(json).context("Failed to parse curve config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // 10^19 overflows u64 base units
        if self.sol_decimals > 18 || self.token_decimals > 18 {
            bail!(
                "Decimals out of range: sol {} token {}",
                self.sol_decimals,
                self.token_decimals
            );
        }
        if self.platform_fee_bps > MAX_BPS {
            bail!("Platform fee {} bps exceeds 100%", self.platform_fee_bps);
        }
        if self.min_sol_per_tx > self.max_sol_per_tx {
            bail!(
                "Min SOL per tx {} is above max {}",
                self.min_sol_per_tx,
                self.max_sol_per_tx
            );
        }
        if self.curve_tokens > self.real_supply {
            bail!("Curve tokens exceed the real supply");
        }
        Ok(())
    }
}

/// Per-tier curve presets of the launch program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierParams {
    pub tier: u8,
    pub virtual_sol_init: u64, // lamports
    pub constant_k: u128,
    pub target_sol: u64, // lamports
    pub duration_secs: i64,
}

impl TierParams {
    pub fn for_tier(tier: u8) -> Result<Self> {
        let (virtual_sol_init, constant_k, target_sol, duration_secs) = match tier {
            1 => (
                353_000_000,
                378_769_000_000_000_000_000_000,
                1_000_000_000,
                3 * 60,
            ),
            2 => (
                900_403_000_000,
                966_262_319_000_000_000_000_000,
                2_551_000_000_000,
                7 * 24 * 60 * 60,
            ),
            3 => (
                9_004_030_000_000,
                9_662_623_190_000_000_000_000_000,
                25_510_000_000_000,
                15 * 24 * 60 * 60,
            ),
            4 => (
                90_040_300_000_000,
                96_626_231_900_000_000_000_000_000,
                255_102_000_000_000,
                30 * 24 * 60 * 60,
            ),
            _ => bail!("Invalid tier {}, must be 1-4", tier),
        };

        Ok(Self {
            tier,
            virtual_sol_init,
            constant_k,
            target_sol,
            duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CurveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sol_decimals, 9);
        assert_eq!(config.token_decimals, 6);
    }

    #[test]
    fn test_default_supplies_match_program() {
        let config = CurveConfig::default();
        assert_eq!(config.curve_tokens, 793_100_000_000_000_000);
        assert_eq!(config.real_supply, 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CurveConfig::from_json_str(r#"{ "platform_fee_bps": 100 }"#).unwrap();
        assert_eq!(config.platform_fee_bps, 100);
        assert_eq!(config.min_sol_per_tx, CurveConfig::default().min_sol_per_tx);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(CurveConfig::from_json_str(r#"{ "platform_fee_bps": 10001 }"#).is_err());
        assert!(
            CurveConfig::from_json_str(r#"{ "min_sol_per_tx": 5, "max_sol_per_tx": 4 }"#).is_err()
        );
        assert!(CurveConfig::from_json_str(r#"{ "token_decimals": 19 }"#).is_err());
        assert!(CurveConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_tier_params() {
        let tier_1 = TierParams::for_tier(1).unwrap();
        assert_eq!(tier_1.target_sol, 1_000_000_000);
        // k / x gives the initial virtual token reserve
        assert_eq!(
            tier_1.constant_k / tier_1.virtual_sol_init as u128,
            1_073_000_000_000_000
        );

        for tier in 2..=4 {
            let params = TierParams::for_tier(tier).unwrap();
            assert!(params.target_sol > tier_1.target_sol);
        }

        assert!(TierParams::for_tier(0).is_err());
        assert!(TierParams::for_tier(5).is_err());
    }
}

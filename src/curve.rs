//! Constant-product (`x * y = k`) bonding-curve pricing.
//!
//! All invariant math runs on integer base units with arbitrary precision, so
//! `k` values far beyond `u64` (and `f64` mantissa) never lose precision.
//! Every division floors, which keeps client quotes at or below what the
//! on-chain program settles.

use num_bigint::BigUint;
use num_traits::{CheckedDiv, CheckedSub, FromPrimitive, ToPrimitive, Zero};
use thiserror::Error;

use crate::config::CurveConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("trade amount must be a positive finite number, got {0}")]
    InvalidAmount(f64),
    #[error("virtual SOL reserve must be a positive finite number, got {0}")]
    InvalidReserve(f64),
    #[error("malformed curve constant: {0:?}")]
    MalformedInvariant(String),
    #[error("reserve is empty in base units")]
    EmptyReserve,
    #[error("curve produced a negative output")]
    NegativeOutput,
    #[error("result is not representable as a finite number")]
    Unrepresentable,
}

/// One side of the curve before and after a trade, in base units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveStep {
    pub reserve_before: BigUint,
    pub reserve_after: BigUint,
    pub amount_out: BigUint,
}

/// Tokens received for `dx` lamports added to a curve holding `x` lamports.
///
/// `reserve_*` are token reserves (`y = k / x`, `new_y = k / (x + dx)`).
pub fn buy_base_units(x: &BigUint, dx: &BigUint, k: &BigUint) -> Result<CurveStep, CurveError> {
    let y = k.checked_div(x).ok_or(CurveError::EmptyReserve)?;
    let new_x = x + dx;
    let new_y = k.checked_div(&new_x).ok_or(CurveError::EmptyReserve)?;
    let dy = y.checked_sub(&new_y).ok_or(CurveError::NegativeOutput)?;

    Ok(CurveStep {
        reserve_before: y,
        reserve_after: new_y,
        amount_out: dy,
    })
}

/// Lamports returned for `dy` token base units sold into a curve holding `x` lamports.
///
/// `reserve_*` are SOL reserves (`x`, `new_x = k / (k / x + dy)`).
pub fn sell_base_units(x: &BigUint, dy: &BigUint, k: &BigUint) -> Result<CurveStep, CurveError> {
    if dy.is_zero() {
        return Ok(CurveStep {
            reserve_before: x.clone(),
            reserve_after: x.clone(),
            amount_out: BigUint::zero(),
        });
    }

    let y = k.checked_div(x).ok_or(CurveError::EmptyReserve)?;
    let new_y = y + dy;
    let new_x = k.checked_div(&new_y).ok_or(CurveError::EmptyReserve)?;
    let dx = x.checked_sub(&new_x).ok_or(CurveError::NegativeOutput)?;

    Ok(CurveStep {
        reserve_before: x.clone(),
        reserve_after: new_x,
        amount_out: dx,
    })
}

/// Parse a decimal curve constant. Zero is rejected.
pub fn parse_constant_k(constant_k: &str) -> Result<BigUint, CurveError> {
    let k: BigUint = constant_k
        .trim()
        .parse()
        .map_err(|_| CurveError::MalformedInvariant(constant_k.to_string()))?;
    if k.is_zero() {
        return Err(CurveError::MalformedInvariant(constant_k.to_string()));
    }
    Ok(k)
}

fn check_curve(virtual_sol: &BigUint, constant_k: &BigUint) -> Result<(), CurveError> {
    if constant_k.is_zero() {
        return Err(CurveError::MalformedInvariant(constant_k.to_string()));
    }
    if virtual_sol.is_zero() {
        return Err(CurveError::EmptyReserve);
    }
    Ok(())
}

/// `floor(amount * 10^decimals)`, `None` for negative or non-finite input
pub fn to_base_units(amount: f64, decimals: u32) -> Option<BigUint> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    BigUint::from_f64((amount * 10f64.powi(decimals as i32)).floor())
}

pub fn from_base_units(amount: &BigUint, decimals: u32) -> Result<f64, CurveError> {
    let value = amount.to_f64().ok_or(CurveError::Unrepresentable)? / 10f64.powi(decimals as i32);
    if !value.is_finite() {
        return Err(CurveError::Unrepresentable);
    }
    Ok(value)
}

/// Human-unit quotes over the constant-product curve.
///
/// The plain `quote_*` functions never fail: any error is logged and the
/// quote degrades to `0.0`, which callers treat as "no quote available".
/// The `try_quote_*` variants return the error instead.
#[derive(Debug, Clone, Default)]
pub struct CurveCalculator {
    config: CurveConfig,
}

impl CurveCalculator {
    pub fn new(config: CurveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Tokens received for spending `sol_amount` SOL
    pub fn quote_tokens_for_sol(
        &self,
        sol_amount: f64,
        current_virtual_sol: f64,
        constant_k: &str,
    ) -> f64 {
        self.try_quote_tokens_for_sol(sol_amount, current_virtual_sol, constant_k)
            .unwrap_or_else(|err| {
                log::warn!("Error calculating tokens: {}", err);
                0.0
            })
    }

    /// SOL received for selling `token_amount` tokens
    pub fn quote_sol_for_tokens(
        &self,
        token_amount: f64,
        current_virtual_sol: f64,
        constant_k: &str,
    ) -> f64 {
        self.try_quote_sol_for_tokens(token_amount, current_virtual_sol, constant_k)
            .unwrap_or_else(|err| {
                log::warn!("Error calculating SOL: {}", err);
                0.0
            })
    }

    pub fn try_quote_tokens_for_sol(
        &self,
        sol_amount: f64,
        current_virtual_sol: f64,
        constant_k: &str,
    ) -> Result<f64, CurveError> {
        let k = parse_constant_k(constant_k)?;
        let x = self.reserve_base_units(current_virtual_sol)?;

        self.try_quote_tokens_at_reserve(sol_amount, &x, &k)
    }

    pub fn try_quote_sol_for_tokens(
        &self,
        token_amount: f64,
        current_virtual_sol: f64,
        constant_k: &str,
    ) -> Result<f64, CurveError> {
        let k = parse_constant_k(constant_k)?;
        let x = self.reserve_base_units(current_virtual_sol)?;

        self.try_quote_sol_at_reserve(token_amount, &x, &k)
    }

    /// Like `try_quote_tokens_for_sol`, with the reserve already in lamports
    pub fn try_quote_tokens_at_reserve(
        &self,
        sol_amount: f64,
        virtual_sol: &BigUint,
        constant_k: &BigUint,
    ) -> Result<f64, CurveError> {
        check_curve(virtual_sol, constant_k)?;
        let dx = self.trade_base_units(sol_amount, self.config.sol_decimals)?;

        let step = buy_base_units(virtual_sol, &dx, constant_k)?;

        from_base_units(&step.amount_out, self.config.token_decimals)
    }

    /// Like `try_quote_sol_for_tokens`, with the reserve already in lamports
    pub fn try_quote_sol_at_reserve(
        &self,
        token_amount: f64,
        virtual_sol: &BigUint,
        constant_k: &BigUint,
    ) -> Result<f64, CurveError> {
        check_curve(virtual_sol, constant_k)?;
        let dy = self.trade_base_units(token_amount, self.config.token_decimals)?;

        let step = sell_base_units(virtual_sol, &dy, constant_k)?;

        from_base_units(&step.amount_out, self.config.sol_decimals)
    }

    fn reserve_base_units(&self, current_virtual_sol: f64) -> Result<BigUint, CurveError> {
        if current_virtual_sol <= 0.0 {
            return Err(CurveError::InvalidReserve(current_virtual_sol));
        }
        let x = to_base_units(current_virtual_sol, self.config.sol_decimals)
            .ok_or(CurveError::InvalidReserve(current_virtual_sol))?;
        if x.is_zero() {
            return Err(CurveError::EmptyReserve);
        }
        Ok(x)
    }

    fn trade_base_units(&self, amount: f64, decimals: u32) -> Result<BigUint, CurveError> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(CurveError::InvalidAmount(amount));
        }
        to_base_units(amount, decimals).ok_or(CurveError::InvalidAmount(amount))
    }
}

//! Property tests for the constant-product curve
//!
//! Increase cases: PROPTEST_CASES=1000 cargo test --test curve_properties

use battle_curve_sdk::{CurveCalculator, buy_base_units, sell_base_units};
use num_bigint::BigUint;
use proptest::prelude::*;

// Initial virtual token reserve of the tier presets, in base units
const VIRTUAL_TOKENS: u128 = 1_073_000_000_000_000;

fn reserve_lamports() -> impl Strategy<Value = u64> {
    1_000_000_000u64..500_000_000_000
}

fn trade_lamports() -> impl Strategy<Value = u64> {
    10_000_000u64..100_000_000_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn buy_preserves_invariant(
        x in reserve_lamports(),
        dx in trade_lamports(),
        remainder in 0u64..1_000_000_000,
    ) {
        let k = BigUint::from(x as u128 * VIRTUAL_TOKENS + (remainder % x) as u128);
        let x = BigUint::from(x);
        let dx = BigUint::from(dx);

        let step = buy_base_units(&x, &dx, &k).unwrap();
        let new_x = &x + &dx;
        let new_y = &step.reserve_before - &step.amount_out;

        prop_assert!(&new_x * &new_y <= k);
        prop_assert!(&new_x * (&new_y + 1u32) > k);
        prop_assert!(step.amount_out < step.reserve_before);
    }

    #[test]
    fn sell_never_returns_more_than_bought(
        x in reserve_lamports(),
        dx in trade_lamports(),
        remainder in 0u64..1_000_000_000,
    ) {
        let k = BigUint::from(x as u128 * VIRTUAL_TOKENS + (remainder % x) as u128);
        let x = BigUint::from(x);
        let dx = BigUint::from(dx);

        let bought = buy_base_units(&x, &dx, &k).unwrap();
        let sold = sell_base_units(&x, &bought.amount_out, &k).unwrap();

        prop_assert!(sold.amount_out <= dx);
    }

    #[test]
    fn human_round_trip_is_bounded(x in reserve_lamports(), sol in 0.01f64..100.0) {
        let calculator = CurveCalculator::default();
        let reserve = x as f64 / 1e9;
        let k = (x as u128 * VIRTUAL_TOKENS).to_string();

        let tokens = calculator.quote_tokens_for_sol(sol, reserve, &k);
        prop_assert!(tokens > 0.0);

        let back = calculator.quote_sol_for_tokens(tokens, reserve, &k);
        prop_assert!(back <= sol);
    }

    #[test]
    fn tokens_out_grow_with_sol_in(
        x in reserve_lamports(),
        sol in 0.01f64..100.0,
        extra in 0.0f64..100.0,
    ) {
        let calculator = CurveCalculator::default();
        let reserve = x as f64 / 1e9;
        let k = (x as u128 * VIRTUAL_TOKENS).to_string();

        let smaller = calculator.quote_tokens_for_sol(sol, reserve, &k);
        let larger = calculator.quote_tokens_for_sol(sol + extra, reserve, &k);

        prop_assert!(larger >= smaller);
    }

    #[test]
    fn invalid_amounts_quote_zero(amount in -1_000.0f64..=0.0, reserve in 0.001f64..1_000.0) {
        let calculator = CurveCalculator::default();
        let k = "32190005730000000000000000";

        prop_assert_eq!(calculator.quote_tokens_for_sol(amount, reserve, k), 0.0);
        prop_assert_eq!(calculator.quote_sol_for_tokens(amount, reserve, k), 0.0);
    }
}

//! crates/bempolo_core/src/pricing.rs
//!
//! Conversions between the display price (BEMP), the settlement amount (USDT)
//! and the token's minor units. Both derivations use the same multiplier and
//! round toward zero, so the displayed amount never exceeds what is charged.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

/// 1 BEMP = 0.001 USDT.
pub const SETTLEMENT_RATE: Decimal = dec!(0.001);
/// Decimal places shown for the settlement amount.
pub const SETTLEMENT_SCALE: u32 = 3;
/// USDT has 6 decimals.
pub const TOKEN_DECIMALS: u32 = 6;
/// Gas shown by the wallet simulator, in USD.
pub const SIMULATED_GAS_FEE: Decimal = dec!(0.04);

/// Settlement amount for a display price, truncated to 3 decimals.
pub fn settlement_amount(price: Decimal) -> Decimal {
    (price * SETTLEMENT_RATE).round_dp_with_strategy(SETTLEMENT_SCALE, RoundingStrategy::ToZero)
}

/// Settlement amount formatted for display, e.g. `"0.300"`.
pub fn format_settlement(price: Decimal) -> String {
    format!("{:.3}", settlement_amount(price))
}

/// Minor-unit amount for the on-chain transfer.
///
/// Derived from the display price directly rather than from the formatted
/// settlement string: `floor(price * 0.001 * 10^6)`. Returns `None` for
/// negative prices or amounts that do not fit in `u128`.
pub fn minor_units(price: Decimal) -> Option<u128> {
    let scale = Decimal::from(10u64.pow(TOKEN_DECIMALS));
    let amount = price.checked_mul(SETTLEMENT_RATE)?.checked_mul(scale)?.floor();
    if amount.is_sign_negative() {
        return None;
    }
    amount.to_u128()
}

/// Total shown on the simulated confirm screen, e.g. `"300.04"`.
pub fn simulated_total(price: Decimal) -> String {
    format!(
        "{:.2}",
        (price + SIMULATED_GAS_FEE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Everything a client needs to render the payment screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub display_price: Decimal,
    pub display_currency: &'static str,
    pub settlement_amount: String,
    pub settlement_currency: &'static str,
    pub minor_units: Option<u128>,
}

impl PriceQuote {
    pub fn for_price(price: Decimal) -> Self {
        Self {
            display_price: price,
            display_currency: "BEMP",
            settlement_amount: format_settlement(price),
            settlement_currency: "USDT",
            minor_units: minor_units(price),
        }
    }
}

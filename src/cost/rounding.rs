//! Fixed-point rounding used by cost math

/// Decimal places kept on a unit price
pub const UNIT_PRICE_DECIMALS: i32 = 4;

/// Decimal places kept on item costs and totals
pub const COST_DECIMALS: i32 = 2;

/// Round to `decimals` places, halves away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // normalize -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn round_unit_price(value: f64) -> f64 {
    round_to(value, UNIT_PRICE_DECIMALS)
}

pub fn round_cost(value: f64) -> f64 {
    round_to(value, COST_DECIMALS)
}

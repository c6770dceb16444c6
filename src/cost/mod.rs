//! Cost calculation module
//!
//! Builds the material lookup table and prices product recipes. Everything
//! here is pure and synchronous; callers load the records first.

pub mod calculator;
pub mod lookup;
pub mod rounding;

pub use calculator::{
    calculate_optional_product_cost, calculate_product_cost, calculate_unit_price,
    package_unit_price, CostDetail, CostError, CostInfo,
};
pub use lookup::LookupTable;
pub use rounding::{round_cost, round_to, round_unit_price, COST_DECIMALS, UNIT_PRICE_DECIMALS};

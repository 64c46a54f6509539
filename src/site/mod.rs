//! Public marketing-site helpers: calculators and the icon registry.

pub mod calculator;
pub mod icons;

pub use calculator::{affordability, mortgage_payment, CalcError};
pub use icons::IconId;

//! SeaORM entity definitions

pub mod prelude;
pub mod schools;

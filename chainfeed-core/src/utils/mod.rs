mod price;
pub use price::{calculate_price, scaling_factor, PriceError};

mod height;
pub use height::{parse_hex_height, HeightError};

/// Serde helpers for human readable durations
pub mod serde_duration;

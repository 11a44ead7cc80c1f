pub mod price;
pub mod projection;

pub use price::{PricePoint, PriceSeries, RecentChange};
pub use projection::{PatternMatch, PercentStep, ProjectionLine, ProjectionPoint};

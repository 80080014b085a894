mod aggregator;
mod window;

pub use aggregator::{PeriodAggregator, PeriodTotals};
pub use window::window_for;

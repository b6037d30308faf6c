pub mod types;
pub mod merge;

pub use types::{Analysis, DailyRecord, RollingRecord, SignalRecord, SignalSeries, StatSummary};
pub use merge::{merge_by_date, PriceRow, MarketCapRow, TradingValueRow};

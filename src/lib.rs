pub mod data;
pub mod error;
pub mod signals;
pub mod source;
pub mod lookup;
pub mod app;
pub mod cache;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use data::{
    Analysis, DailyRecord, RollingRecord, SignalRecord, SignalSeries, StatSummary,
    merge_by_date, PriceRow, MarketCapRow, TradingValueRow,
};
pub use error::{SignalError, SourceError};
pub use signals::{
    analyze, derive_signal, derive_signal_with, summarize,
    compute_rolling_sums, compute_exponential_average, SignalParams,
};
pub use source::{RecordSource, FileSource, lookback_range};
pub use lookup::{Listing, LookupOutcome, search, load_listings};
pub use app::{AppState, Action, Notice, Transition};
pub use cache::{SignalCache, CacheKey};
pub use report::{Report, ReportConfig};
pub use utils::Config;

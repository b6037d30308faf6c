pub mod file;

pub use file::FileSource;

use crate::data::DailyRecord;
use crate::error::SourceError;
use chrono::{Months, NaiveDate};

/// Supplies ordered daily records for a listing code
pub trait RecordSource: Send + Sync {
    /// Load records dated within `[from, to]`, ascending by date
    fn load(&self, code: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyRecord>, SourceError>;
}

/// Date range covering `months` back from `as_of`, inclusive
///
/// Six months of trading days leaves enough history for the 77-record window
/// after every warm-up period.
pub fn lookback_range(as_of: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let from = as_of
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    (from, as_of)
}

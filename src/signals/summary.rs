use crate::data::{Analysis, DailyRecord, SignalRecord, StatSummary};
use crate::error::{Result, SignalError};
use crate::signals::oscillator::{derive_signal_with, SignalParams};
use statrs::statistics::Statistics;

/// Derive the series and summarize it in one step
pub fn analyze(records: &[DailyRecord], params: &SignalParams) -> Result<Analysis> {
    let series = derive_signal_with(records, params)?;
    let summary = summarize(&series.records)?;
    Ok(Analysis { series, summary })
}

/// Summarize the oscillator over a populated window
pub fn summarize(records: &[SignalRecord]) -> Result<StatSummary> {
    let values: Vec<f64> = records.iter().map(|r| r.oscillator).collect();
    summarize_values(&values)
}

/// Quantile bands and mean over raw oscillator values
pub fn summarize_values(values: &[f64]) -> Result<StatSummary> {
    if values.is_empty() {
        return Err(SignalError::EmptyResult("nothing to summarize".to_string()));
    }

    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(SignalError::InvalidInput(format!("non-finite oscillator value {}", bad)));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let band = |q: f64| {
        quantile(&sorted, q)
            .ok_or_else(|| SignalError::EmptyResult("nothing to summarize".to_string()))
    };

    Ok(StatSummary {
        upper_10: band(0.90)?,
        upper_25: band(0.75)?,
        mean: values.iter().mean(),
        lower_25: band(0.25)?,
        lower_10: band(0.10)?,
    })
}

/// Linear interpolation between order statistics at rank q * (n - 1)
///
/// `sorted` must be ascending. Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return sorted.get(lower).copied();
    }

    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

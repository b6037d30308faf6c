use crate::data::{DailyRecord, RollingRecord};
use crate::error::{Result, SignalError};
use rust_decimal::Decimal;

/// Default trailing window for net buy sums (trading days)
pub const DEFAULT_ROLLING_WINDOW: usize = 5;

/// Trailing-inclusive window sums
///
/// Position `i` holds the sum of `values[i + 1 - window..=i]`. Positions with
/// fewer than `window` values behind them are `None`, never a partial sum.
/// A zero window has no defined sums. Fails with the offending position
/// when a sum leaves the `Decimal` range.
pub fn trailing_sums(values: &[Decimal], window: usize) -> std::result::Result<Vec<Option<Decimal>>, usize> {
    if window == 0 {
        return Ok(vec![None; values.len()]);
    }

    let mut sums = Vec::with_capacity(values.len());
    let mut running = Decimal::ZERO;

    for (i, value) in values.iter().enumerate() {
        // Drop the oldest value first so the running sum never spans window + 1 values
        if i >= window {
            running = running.checked_sub(values[i - window]).ok_or(i)?;
        }
        running = running.checked_add(*value).ok_or(i)?;

        if i + 1 >= window {
            sums.push(Some(running));
        } else {
            sums.push(None);
        }
    }

    Ok(sums)
}

/// Annotate records with trailing institutional and foreign net buy sums
///
/// Records must already be in ascending date order. The only failure is a
/// window sum outside the `Decimal` range, reported as `InvalidInput`.
pub fn compute_rolling_sums(records: &[DailyRecord], window: usize) -> Result<Vec<RollingRecord>> {
    let inst: Vec<Decimal> = records.iter().map(|r| r.inst_net_buy).collect();
    let foreign: Vec<Decimal> = records.iter().map(|r| r.foreign_net_buy).collect();

    let overflow = |kind: &str, i: usize| {
        SignalError::InvalidInput(format!(
            "{} net buy sum overflows on {}",
            kind, records[i].date
        ))
    };

    let inst_sums = trailing_sums(&inst, window).map_err(|i| overflow("institutional", i))?;
    let foreign_sums = trailing_sums(&foreign, window).map_err(|i| overflow("foreign", i))?;

    Ok(records.iter()
        .zip(inst_sums)
        .zip(foreign_sums)
        .map(|((record, inst_5d), foreign_5d)| RollingRecord {
            record: record.clone(),
            inst_net_buy_5d: inst_5d,
            foreign_net_buy_5d: foreign_5d,
        })
        .collect())
}

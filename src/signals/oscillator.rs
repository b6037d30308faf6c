use crate::data::{DailyRecord, RollingRecord, SignalRecord, SignalSeries};
use crate::error::{Result, SignalError};
use crate::signals::ema::compute_exponential_average;
use crate::signals::rolling::{compute_rolling_sums, DEFAULT_ROLLING_WINDOW};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of most recent records the pipeline exposes
pub const DEFAULT_WINDOW: usize = 77;

/// Raw records needed to clear every warm-up period with default parameters
pub const MIN_RAW_RECORDS: usize = 38;

/// Parameters for the net buy oscillator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    /// Trailing window for net buy sums
    pub rolling_window: usize,
    /// Fast EMA span over the ratio
    pub fast_span: usize,
    /// Slow EMA span over the ratio
    pub slow_span: usize,
    /// EMA span of the MACD signal line
    pub signal_span: usize,
    /// Most recent records kept
    pub window: usize,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            fast_span: 12,
            slow_span: 26,
            signal_span: 9,
            window: DEFAULT_WINDOW,
        }
    }
}

impl SignalParams {
    /// Minimum raw input length: rolling warm-up, slow EMA, then signal EMA
    pub fn min_raw_records(&self) -> usize {
        self.rolling_window.saturating_sub(1)
            + self.slow_span.saturating_sub(1)
            + self.signal_span.saturating_sub(1)
            + 1
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("rolling_window", self.rolling_window),
            ("fast_span", self.fast_span),
            ("slow_span", self.slow_span),
            ("signal_span", self.signal_span),
            ("window", self.window),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(SignalError::InvalidInput(format!("{} must be positive", name)));
            }
        }

        if self.fast_span >= self.slow_span {
            return Err(SignalError::InvalidInput(format!(
                "fast_span ({}) must be shorter than slow_span ({})",
                self.fast_span, self.slow_span
            )));
        }

        Ok(())
    }
}

/// Record that cleared the rolling warm-up and has a defined ratio
#[derive(Debug, Clone)]
struct RatioPoint {
    record: DailyRecord,
    market_cap: Decimal,
    inst_net_buy_5d: Decimal,
    foreign_net_buy_5d: Decimal,
    signal_ratio: f64,
}

/// Derive the oscillator series with default parameters
pub fn derive_signal(records: &[DailyRecord]) -> Result<SignalSeries> {
    derive_signal_with(records, &SignalParams::default())
}

/// Derive the oscillator series
///
/// Pipeline:
/// 1. Trailing net buy sums over `rolling_window` days
/// 2. Drop records without sums or market cap; non-positive cap is an error
/// 3. Ratio = (inst 5d + foreign 5d) / market cap * 100
/// 4. Narrow to the most recent `window` ratios
/// 5. Fast/slow EMA, MACD, signal EMA, oscillator
/// 6. Drop anything the EMAs left undefined
///
/// Smoothing runs over the narrowed window, so re-deriving from the output
/// reproduces the same oscillator values.
pub fn derive_signal_with(records: &[DailyRecord], params: &SignalParams) -> Result<SignalSeries> {
    params.validate()?;

    if records.is_empty() {
        return Err(SignalError::EmptyResult("no daily records supplied".to_string()));
    }

    let required = params.min_raw_records();
    if records.len() < required {
        return Err(SignalError::InsufficientData {
            required,
            actual: records.len(),
        });
    }

    ensure_ascending(records)?;

    let rolled = compute_rolling_sums(records, params.rolling_window)?;
    let points = retain_populated(&rolled)?;

    debug!(
        raw = records.len(),
        populated = points.len(),
        "Rolling sums computed"
    );

    let start = points.len().saturating_sub(params.window);
    smooth(&points[start..], params)
}

impl SignalSeries {
    /// Re-run ratio and smoothing stages over already populated records
    pub fn rederive(&self, params: &SignalParams) -> Result<SignalSeries> {
        params.validate()?;

        let points = self.records.iter()
            .map(|r| {
                let record = DailyRecord::new(
                    r.date,
                    r.close_price,
                    Some(r.market_cap),
                    r.inst_net_buy,
                    r.foreign_net_buy,
                );
                to_ratio_point(record, r.market_cap, r.inst_net_buy_5d, r.foreign_net_buy_5d)
            })
            .collect::<Result<Vec<_>>>()?;

        let start = points.len().saturating_sub(params.window);
        smooth(&points[start..], params)
    }
}

/// Dates must be strictly ascending (no duplicates)
fn ensure_ascending(records: &[DailyRecord]) -> Result<()> {
    for pair in records.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(SignalError::InvalidInput(format!(
                "dates must be strictly ascending: {} follows {}",
                pair[1].date, pair[0].date
            )));
        }
    }
    Ok(())
}

fn retain_populated(rolled: &[RollingRecord]) -> Result<Vec<RatioPoint>> {
    let mut points = Vec::with_capacity(rolled.len());
    let mut missing_cap = 0usize;

    for r in rolled {
        let (Some(inst_5d), Some(foreign_5d)) = (r.inst_net_buy_5d, r.foreign_net_buy_5d) else {
            continue;
        };

        let Some(market_cap) = r.record.market_cap else {
            missing_cap += 1;
            continue;
        };

        points.push(to_ratio_point(r.record.clone(), market_cap, inst_5d, foreign_5d)?);
    }

    if missing_cap > 0 {
        warn!("Dropped {} records without market cap", missing_cap);
    }

    Ok(points)
}

fn to_ratio_point(
    record: DailyRecord,
    market_cap: Decimal,
    inst_net_buy_5d: Decimal,
    foreign_net_buy_5d: Decimal,
) -> Result<RatioPoint> {
    let signal_ratio = compute_ratio(inst_net_buy_5d, foreign_net_buy_5d, market_cap)
        .map_err(|e| match e {
            SignalError::InvalidInput(reason) => {
                SignalError::InvalidInput(format!("{} on {}", reason, record.date))
            }
            other => other,
        })?;

    Ok(RatioPoint {
        record,
        market_cap,
        inst_net_buy_5d,
        foreign_net_buy_5d,
        signal_ratio,
    })
}

/// (inst 5d + foreign 5d) / market cap * 100
pub fn compute_ratio(
    inst_net_buy_5d: Decimal,
    foreign_net_buy_5d: Decimal,
    market_cap: Decimal,
) -> Result<f64> {
    if market_cap <= Decimal::ZERO {
        return Err(SignalError::InvalidInput(format!("non-positive market cap {}", market_cap)));
    }

    let ratio = inst_net_buy_5d
        .checked_add(foreign_net_buy_5d)
        .and_then(|net| net.checked_div(market_cap))
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| SignalError::InvalidInput("ratio overflow".to_string()))?;

    ratio.to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SignalError::InvalidInput(format!("ratio {} not representable", ratio)))
}

fn smooth(points: &[RatioPoint], params: &SignalParams) -> Result<SignalSeries> {
    let ratios: Vec<Option<f64>> = points.iter().map(|p| Some(p.signal_ratio)).collect();

    let fast = compute_exponential_average(&ratios, params.fast_span);
    let slow = compute_exponential_average(&ratios, params.slow_span);

    let macd: Vec<Option<f64>> = fast.iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal = compute_exponential_average(&macd, params.signal_span);

    let records: Vec<SignalRecord> = points.iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let ema_fast = fast[i]?;
            let ema_slow = slow[i]?;
            let macd = macd[i]?;
            let macd_signal = signal[i]?;

            Some(SignalRecord {
                date: p.record.date,
                close_price: p.record.close_price,
                market_cap: p.market_cap,
                inst_net_buy: p.record.inst_net_buy,
                foreign_net_buy: p.record.foreign_net_buy,
                inst_net_buy_5d: p.inst_net_buy_5d,
                foreign_net_buy_5d: p.foreign_net_buy_5d,
                signal_ratio: p.signal_ratio,
                ema_fast,
                ema_slow,
                macd,
                macd_signal,
                oscillator: macd - macd_signal,
            })
        })
        .collect();

    if records.len() < points.len() {
        debug!("Dropped {} records during EMA warm-up", points.len() - records.len());
    }

    if records.is_empty() {
        return Err(SignalError::EmptyResult(
            "no records survived warm-up".to_string(),
        ));
    }

    let series = SignalSeries {
        records,
        nominal_window: params.window,
    };

    if series.is_short() {
        warn!(
            "Only {} records available, nominal window is {}",
            series.len(),
            series.nominal_window
        );
    }

    Ok(series)
}

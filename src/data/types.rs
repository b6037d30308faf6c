use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trading day as supplied by a record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,

    /// Closing price, kept for display only
    pub close_price: Decimal,

    /// None when the market cap table had no row for this date
    #[serde(default)]
    pub market_cap: Option<Decimal>,

    /// Institutional net buy amount (signed)
    pub inst_net_buy: Decimal,

    /// Foreign net buy amount (signed)
    pub foreign_net_buy: Decimal,
}

impl DailyRecord {
    pub fn new(
        date: NaiveDate,
        close_price: Decimal,
        market_cap: Option<Decimal>,
        inst_net_buy: Decimal,
        foreign_net_buy: Decimal,
    ) -> Self {
        Self {
            date,
            close_price,
            market_cap,
            inst_net_buy,
            foreign_net_buy,
        }
    }
}

/// Daily record annotated with trailing net buy sums
#[derive(Debug, Clone, PartialEq)]
pub struct RollingRecord {
    pub record: DailyRecord,

    /// None until the window has a full history behind it
    pub inst_net_buy_5d: Option<Decimal>,
    pub foreign_net_buy_5d: Option<Decimal>,
}

/// Fully populated output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub close_price: Decimal,
    pub market_cap: Decimal,
    pub inst_net_buy: Decimal,
    pub foreign_net_buy: Decimal,
    pub inst_net_buy_5d: Decimal,
    pub foreign_net_buy_5d: Decimal,

    /// (inst 5d + foreign 5d) / market cap * 100
    pub signal_ratio: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub oscillator: f64,
}

/// Ordered output of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub records: Vec<SignalRecord>,

    /// Number of records the pipeline aims to expose
    pub nominal_window: usize,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when fewer records than the nominal window survived warm-up
    pub fn is_short(&self) -> bool {
        self.records.len() < self.nominal_window
    }

    pub fn oscillators(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.oscillator).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Records newest first, limited to `count`
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &SignalRecord> {
        self.records.iter().rev().take(count)
    }
}

/// Distribution of the oscillator over one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    /// 0.90 quantile
    pub upper_10: f64,
    /// 0.75 quantile
    pub upper_25: f64,
    pub mean: f64,
    /// 0.25 quantile
    pub lower_25: f64,
    /// 0.10 quantile
    pub lower_10: f64,
}

impl StatSummary {
    /// Labelled values, highest band first
    pub fn bands(&self) -> [(&'static str, f64); 5] {
        [
            ("upper 10%", self.upper_10),
            ("upper 25%", self.upper_25),
            ("mean", self.mean),
            ("lower 25%", self.lower_25),
            ("lower 10%", self.lower_10),
        ]
    }
}

/// Derived series with its summary, as handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub series: SignalSeries,
    pub summary: StatSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(day: u32, oscillator: f64) -> SignalRecord {
        SignalRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            close_price: dec!(70000),
            market_cap: dec!(1000000),
            inst_net_buy: dec!(10),
            foreign_net_buy: dec!(-5),
            inst_net_buy_5d: dec!(50),
            foreign_net_buy_5d: dec!(-25),
            signal_ratio: 0.0025,
            ema_fast: 0.0,
            ema_slow: 0.0,
            macd: 0.0,
            macd_signal: 0.0,
            oscillator,
        }
    }

    #[test]
    fn test_short_flag() {
        let series = SignalSeries {
            records: vec![record(1, 0.1), record(2, 0.2)],
            nominal_window: 77,
        };
        assert!(series.is_short());
        assert_eq!(series.len(), 2);
        assert_eq!(series.oscillators(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let series = SignalSeries {
            records: vec![record(1, 0.1), record(2, 0.2), record(3, 0.3)],
            nominal_window: 3,
        };
        assert!(!series.is_short());

        let dates: Vec<u32> = series.recent(2).map(|r| r.date.format("%d").to_string().parse().unwrap()).collect();
        assert_eq!(dates, vec![3, 2]);
    }

    #[test]
    fn test_daily_record_missing_cap_deserializes() {
        let json = r#"{
            "date": "2024-03-04",
            "close_price": "71200",
            "inst_net_buy": "-1500000000",
            "foreign_net_buy": "2300000000"
        }"#;

        let record: DailyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.market_cap, None);
        assert_eq!(record.inst_net_buy, dec!(-1500000000));
    }
}

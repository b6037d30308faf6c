use crate::data::Analysis;
use crate::lookup::Listing;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation settings, fixed when the report is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows in the recent-records table
    pub recent_rows: usize,
    /// Decimal places for ratio and oscillator values
    pub decimals: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            recent_rows: 10,
            decimals: 4,
        }
    }
}

/// Plain-text report: summary bands plus the most recent records, newest first
pub struct Report {
    config: ReportConfig,
}

impl Report {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, listing: &Listing, analysis: &Analysis) -> String {
        ReportView {
            config: &self.config,
            listing,
            analysis,
        }
        .to_string()
    }
}

/// One listing's analysis laid out with a report's settings
struct ReportView<'a> {
    config: &'a ReportConfig,
    listing: &'a Listing,
    analysis: &'a Analysis,
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listing = self.listing;
        let analysis = self.analysis;
        let series = &analysis.series;
        let dp = self.config.decimals;

        writeln!(out, "╔════════════════════════════════════════════════╗")?;
        writeln!(out, "║  NET BUY OSCILLATOR                            ║")?;
        writeln!(out, "╠════════════════════════════════════════════════╣")?;
        writeln!(out, "║ Listing: {:<38}║", listing.to_string())?;
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => {
                writeln!(out, "║ Period: {:<39}║", format!("{} to {}", first, last))?;
            }
            _ => writeln!(out, "║ Period: {:<39}║", "-")?,
        }
        writeln!(out, "║ Records: {:<38}║", format!("{} / {}", series.len(), series.nominal_window))?;
        writeln!(out, "╠════════════════════════════════════════════════╣")?;
        for (label, value) in analysis.summary.bands() {
            writeln!(out, "║ {:<12}{:>34} ║", label, format!("{:.*}", dp, value))?;
        }
        writeln!(out, "╚════════════════════════════════════════════════╝")?;

        if series.is_short() {
            writeln!(
                out,
                "Note: only {} records available (nominal window {})",
                series.len(),
                series.nominal_window
            )?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "{:<12} {:>12} {:>20} {:>18} {:>18} {:>10} {:>10}",
            "date", "close", "market cap", "inst 5d", "foreign 5d", "ratio", "osc"
        )?;

        for r in series.recent(self.config.recent_rows) {
            writeln!(
                out,
                "{:<12} {:>12} {:>20} {:>18} {:>18} {:>10.*} {:>10.*}",
                r.date.to_string(),
                r.close_price.to_string(),
                r.market_cap.to_string(),
                r.inst_net_buy_5d.to_string(),
                r.foreign_net_buy_5d.to_string(),
                dp,
                r.signal_ratio,
                dp,
                r.oscillator,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SignalRecord, SignalSeries, StatSummary};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn analysis(count: u32) -> Analysis {
        let records = (1..=count)
            .map(|d| SignalRecord {
                date: NaiveDate::from_ymd_opt(2024, 4, d).unwrap(),
                close_price: dec!(70000),
                market_cap: dec!(400000000000000),
                inst_net_buy: dec!(1000000),
                foreign_net_buy: dec!(-2000000),
                inst_net_buy_5d: dec!(5000000),
                foreign_net_buy_5d: dec!(-10000000),
                signal_ratio: -0.00125,
                ema_fast: 0.0,
                ema_slow: 0.0,
                macd: 0.0,
                macd_signal: 0.0,
                oscillator: d as f64 / 1000.0,
            })
            .collect();

        Analysis {
            series: SignalSeries { records, nominal_window: 77 },
            summary: StatSummary {
                upper_10: 0.0111,
                upper_25: 0.0077,
                mean: 0.0055,
                lower_25: 0.0033,
                lower_10: 0.0011,
            },
        }
    }

    #[test]
    fn test_render_newest_first_and_limited() {
        let report = Report::new(ReportConfig { recent_rows: 3, decimals: 4 });
        let text = report.render(&Listing::new("005930", "삼성전자"), &analysis(12));

        assert!(text.contains("삼성전자 (005930)"));
        assert!(text.contains("2024-04-01 to 2024-04-12"));
        assert!(text.contains("0.0111"));

        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("2024-04-")).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("2024-04-12"));
        assert!(rows[2].starts_with("2024-04-10"));
    }

    #[test]
    fn test_short_window_notice() {
        let report = Report::new(ReportConfig::default());
        let text = report.render(&Listing::new("005930", "삼성전자"), &analysis(5));

        assert!(text.contains("only 5 records available"));
    }
}

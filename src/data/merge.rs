use crate::data::DailyRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Row from the daily price table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Row from the market capitalization table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCapRow {
    pub date: NaiveDate,
    pub market_cap: Decimal,
}

/// Row from the trading value by investor table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingValueRow {
    pub date: NaiveDate,
    pub institution_total: Decimal,
    pub foreign_total: Decimal,
}

/// Join the three upstream tables into daily records keyed by date
///
/// The price table drives the join. Dates without a trading value row are
/// excluded; dates without a market cap row are kept with `market_cap: None`
/// so the pipeline can drop them itself. Output is ascending by date, one
/// record per date (later duplicate rows win).
pub fn merge_by_date(
    prices: &[PriceRow],
    caps: &[MarketCapRow],
    flows: &[TradingValueRow],
) -> Vec<DailyRecord> {
    let caps: BTreeMap<NaiveDate, Decimal> = caps.iter()
        .map(|row| (row.date, row.market_cap))
        .collect();

    let flows: BTreeMap<NaiveDate, (Decimal, Decimal)> = flows.iter()
        .map(|row| (row.date, (row.institution_total, row.foreign_total)))
        .collect();

    let mut merged: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
    let mut skipped = 0usize;

    for price in prices {
        let Some(&(inst, foreign)) = flows.get(&price.date) else {
            skipped += 1;
            continue;
        };

        merged.insert(
            price.date,
            DailyRecord::new(price.date, price.close, caps.get(&price.date).copied(), inst, foreign),
        );
    }

    if skipped > 0 {
        debug!("Excluded {} price rows without trading value data", skipped);
    }

    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_inner_join_on_trading_value() {
        let prices = vec![
            PriceRow { date: day(3), close: dec!(100) },
            PriceRow { date: day(2), close: dec!(99) },
            PriceRow { date: day(7), close: dec!(101) },
        ];
        let caps = vec![
            MarketCapRow { date: day(2), market_cap: dec!(5000) },
            MarketCapRow { date: day(3), market_cap: dec!(5100) },
            MarketCapRow { date: day(7), market_cap: dec!(5200) },
        ];
        let flows = vec![
            TradingValueRow { date: day(2), institution_total: dec!(10), foreign_total: dec!(-3) },
            TradingValueRow { date: day(3), institution_total: dec!(-4), foreign_total: dec!(8) },
        ];

        let merged = merge_by_date(&prices, &caps, &flows);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, day(2));
        assert_eq!(merged[1].date, day(3));
        assert_eq!(merged[1].inst_net_buy, dec!(-4));
        assert_eq!(merged[1].foreign_net_buy, dec!(8));
        assert_eq!(merged[1].market_cap, Some(dec!(5100)));
    }

    #[test]
    fn test_missing_cap_kept_as_none() {
        let prices = vec![PriceRow { date: day(2), close: dec!(99) }];
        let flows = vec![
            TradingValueRow { date: day(2), institution_total: dec!(1), foreign_total: dec!(1) },
        ];

        let merged = merge_by_date(&prices, &[], &flows);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].market_cap, None);
    }
}

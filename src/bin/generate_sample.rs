use netbuy_oscillator::{
    merge_by_date, FileSource, Listing, MarketCapRow, PriceRow, TradingValueRow,
};
use chrono::{Datelike, Local, NaiveDate, Weekday};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;

/// Write a synthetic record set for trying the analyzer offline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for `<code>.json` files and listings.json
    #[arg(long, default_value = "data")]
    out: PathBuf,

    /// Last date of the generated history (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Trading days per listing
    #[arg(long, default_value = "130")]
    days: usize,

    /// RNG seed for reproducible output
    #[arg(long, default_value = "7")]
    seed: u64,
}

/// Sample listings with starting price and share count
const SAMPLES: &[(&str, &str, i64, i64)] = &[
    ("005930", "삼성전자", 71_000, 5_969_782_550),
    ("005935", "삼성전자우", 58_000, 822_886_700),
    ("000660", "SK하이닉스", 180_000, 728_002_365),
    ("028260", "삼성물산", 140_000, 169_976_544),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    let args = Args::parse();
    let end = args.end.unwrap_or_else(|| Local::now().date_naive());
    let dates = trading_days(end, args.days);
    let mut rng = StdRng::seed_from_u64(args.seed);

    let source = FileSource::new(&args.out);
    let mut listings = Vec::new();

    for (code, name, start_price, shares) in SAMPLES {
        let (prices, caps, flows) = generate_tables(&mut rng, &dates, *start_price, *shares);
        let records = merge_by_date(&prices, &caps, &flows);

        source.store(code, &records)?;
        listings.push(Listing::new(*code, *name));
    }

    let listings_path = args.out.join("listings.json");
    std::fs::write(&listings_path, serde_json::to_string_pretty(&listings)?)?;
    info!("Wrote {} listings to {}", listings.len(), listings_path.display());

    Ok(())
}

/// Weekdays ending at `end`, ascending
fn trading_days(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = end;

    while days.len() < count {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        match current.pred_opt() {
            Some(prev) => current = prev,
            None => break,
        }
    }

    days.reverse();
    days
}

/// Random-walk price with investor flows proportional to market cap.
/// About 2% of days lack a market cap row and 1% lack trading values,
/// like gaps in the upstream tables.
fn generate_tables(
    rng: &mut StdRng,
    dates: &[NaiveDate],
    start_price: i64,
    shares: i64,
) -> (Vec<PriceRow>, Vec<MarketCapRow>, Vec<TradingValueRow>) {
    let mut prices = Vec::with_capacity(dates.len());
    let mut caps = Vec::with_capacity(dates.len());
    let mut flows = Vec::with_capacity(dates.len());

    let mut price = start_price as f64;
    let mut inst_bias = 0.0f64;

    for &date in dates {
        price = (price * (1.0 + rng.gen_range(-0.025..0.025))).max(100.0);
        let close = price.round() as i64;
        let market_cap = close * shares;

        prices.push(PriceRow { date, close: Decimal::from(close) });

        if !rng.gen_bool(0.02) {
            caps.push(MarketCapRow { date, market_cap: Decimal::from(market_cap) });
        }

        // Slowly drifting institutional appetite, noisier foreign flow
        inst_bias = (inst_bias + rng.gen_range(-0.0002..0.0002)).clamp(-0.001, 0.001);
        let inst = market_cap as f64 * (inst_bias + rng.gen_range(-0.0005..0.0005));
        let foreign = market_cap as f64 * rng.gen_range(-0.0008..0.0008);

        if !rng.gen_bool(0.01) {
            flows.push(TradingValueRow {
                date,
                institution_total: Decimal::from(inst.round() as i64),
                foreign_total: Decimal::from(foreign.round() as i64),
            });
        }
    }

    (prices, caps, flows)
}

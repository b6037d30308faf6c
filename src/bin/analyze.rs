use netbuy_oscillator::{
    analyze, lookback_range, load_listings, search, utils, Action, AppState, CacheKey,
    Config, FileSource, Listing, RecordSource, Report, SignalCache, SourceError,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Derive the net buy oscillator for one or more listings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stock names to resolve (exact name or part of one)
    names: Vec<String>,

    /// Analyze listing codes directly, skipping name lookup
    #[arg(long)]
    code: Vec<String>,

    /// Code to pick when a name matches several listings
    #[arg(long)]
    pick: Option<String>,

    /// Analysis date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Configuration file (defaults to $CONFIG_FILE or config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write results as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    utils::init_from_config(&config.logging)?;

    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let listings = if args.names.is_empty() {
        Vec::new()
    } else {
        load_listings(&config.general.listings_file)?
    };

    let mut targets: Vec<Listing> = Vec::new();

    for code in &args.code {
        let name = listings.iter()
            .find(|l| &l.code == code)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| code.clone());
        targets.push(Listing::new(code.clone(), name));
    }

    for name in &args.names {
        if let Some(listing) = resolve(&listings, name, args.pick.as_deref()) {
            targets.push(listing);
        }
    }

    if targets.is_empty() {
        warn!("Nothing to analyze");
        return Ok(());
    }

    let source = FileSource::new(&config.general.data_dir);
    let cache = SignalCache::new(config.cache.ttl());
    let report = Report::new(config.report.clone());
    let (from, to) = lookback_range(as_of, config.general.lookback_months);

    let mut results = Vec::new();

    for listing in &targets {
        let key = CacheKey::new(listing.code.clone(), as_of);
        let analysis = cache.get_or_try_insert_with(key, || -> anyhow::Result<_> {
            let records = source.load(&listing.code, from, to)?;
            info!("Loaded {} daily records for {}", records.len(), listing);
            Ok(analyze(&records, &config.signal)?)
        });

        match analysis {
            Ok(analysis) => {
                println!("{}", report.render(listing, &analysis));
                results.push(serde_json::json!({
                    "code": listing.code,
                    "name": listing.name,
                    "as_of": as_of,
                    "analysis": &*analysis,
                }));
            }
            Err(e) => match e.downcast_ref::<SourceError>() {
                Some(SourceError::NotListed(code)) => {
                    error!("{}: no stored data for {} (not listed or not collected yet)", listing, code);
                }
                Some(SourceError::Corrupt { reason, .. }) => {
                    error!("{}: stored data is unreadable: {}", listing, reason);
                }
                _ => error!("{}: analysis failed: {}", listing, e),
            },
        }
    }

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(path, json)?;
        info!("Results saved to: {}", path.display());
    }

    Ok(())
}

/// Run a name through the lookup state machine
fn resolve(listings: &[Listing], name: &str, pick: Option<&str>) -> Option<Listing> {
    let mut transition = AppState::Idle.apply(Action::Search(search(listings, name)));

    let ambiguous = matches!(transition.state, AppState::AmbiguousChoice(_));
    if let (true, Some(code)) = (ambiguous, pick) {
        transition = transition.state.apply(Action::Select(code.to_string()));
    }

    if let Some(notice) = &transition.notice {
        warn!("{}: {}", name, notice);
    }

    if let AppState::AmbiguousChoice(candidates) = &transition.state {
        println!("Similar listings for '{}':", name);
        for candidate in candidates {
            println!("  {}", candidate);
        }
        println!("Re-run with --pick <code> to choose one.");
    }

    transition.state.selected().cloned()
}

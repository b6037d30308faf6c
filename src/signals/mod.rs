pub mod rolling;
pub mod ema;
pub mod oscillator;
pub mod summary;

pub use rolling::{compute_rolling_sums, trailing_sums, DEFAULT_ROLLING_WINDOW};
pub use ema::{compute_exponential_average, smoothing_factor};
pub use oscillator::{
    derive_signal, derive_signal_with, compute_ratio,
    SignalParams, DEFAULT_WINDOW, MIN_RAW_RECORDS,
};
pub use summary::{analyze, summarize, summarize_values, quantile};

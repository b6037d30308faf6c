/// Exponential moving average over a series with gaps
///
/// Recursive, unadjusted form:
///   alpha  = 2 / (span + 1)
///   ema_t  = alpha * v_t + (1 - alpha) * ema_{t-1}
///
/// The first defined value seeds the average, so everything before it stays
/// undefined. `None` and non-finite inputs count as undefined. After the seed,
/// an undefined input yields `None` at that position and the average carries
/// over unchanged to the next defined value.
pub fn compute_exponential_average(series: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; series.len()];
    }

    let alpha = smoothing_factor(span);
    let mut state: Option<f64> = None;

    series.iter()
        .map(|value| {
            let value = (*value).filter(|v| v.is_finite())?;
            let next = match state {
                None => value,
                Some(prev) => alpha * value + (1.0 - alpha) * prev,
            };
            state = Some(next);
            Some(next)
        })
        .collect()
}

/// Smoothing factor for a span
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a defined value");
        assert!((actual - expected).abs() < 1e-10, "got {actual}, expected {expected}");
    }

    #[test]
    fn test_seed_at_first_defined_value() {
        let input = vec![None, Some(f64::NAN), Some(5.0), Some(10.0), Some(15.0)];
        let ema = compute_exponential_average(&input, 2);

        assert_eq!(ema.len(), 5);
        assert!(ema[0].is_none());
        assert!(ema[1].is_none());
        assert_close(ema[2], 5.0);
        // alpha = 2/3
        assert_close(ema[3], 2.0 / 3.0 * 10.0 + 1.0 / 3.0 * 5.0);
        assert_close(ema[4], 2.0 / 3.0 * 15.0 + 1.0 / 3.0 * (25.0 / 3.0));
    }

    #[test]
    fn test_constant_series_stays_constant() {
        let input = vec![Some(3.5); 40];
        let ema = compute_exponential_average(&input, 26);

        for value in ema {
            assert_close(value, 3.5);
        }
    }

    #[test]
    fn test_gap_after_seed_carries_state() {
        let input = vec![Some(4.0), None, Some(10.0)];
        let ema = compute_exponential_average(&input, 3);

        assert_close(ema[0], 4.0);
        assert!(ema[1].is_none());
        // alpha = 0.5, gap skipped
        assert_close(ema[2], 7.0);
    }

    #[test]
    fn test_all_undefined() {
        let ema = compute_exponential_average(&[None, None], 12);
        assert_eq!(ema, vec![None, None]);
    }

    #[test]
    fn test_zero_span() {
        let ema = compute_exponential_average(&[Some(1.0)], 0);
        assert_eq!(ema, vec![None]);
    }

    #[test]
    fn test_smoothing_factor() {
        assert!((smoothing_factor(12) - 2.0 / 13.0).abs() < 1e-15);
        assert!((smoothing_factor(1) - 1.0).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn prop_deterministic_and_prefix_preserved(
            prefix in 0usize..10,
            values in prop::collection::vec(-1.0e6f64..1.0e6, 0..60),
            span in 1usize..40,
        ) {
            let mut input: Vec<Option<f64>> = vec![None; prefix];
            input.extend(values.iter().copied().map(Some));

            let first = compute_exponential_average(&input, span);
            let second = compute_exponential_average(&input, span);

            prop_assert_eq!(first.len(), input.len());
            prop_assert!(first[..prefix].iter().all(|v| v.is_none()));
            prop_assert!(first[prefix..].iter().all(|v| v.is_some()));

            let bits = |s: &[Option<f64>]| s.iter().map(|v| v.map(f64::to_bits)).collect::<Vec<_>>();
            prop_assert_eq!(bits(&first), bits(&second));
        }
    }
}

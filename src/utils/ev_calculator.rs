/// Convert decimal odds to the probability the price encodes.
/// Zero, negative or missing odds carry no signal and give `None`.
pub fn implied_probability(odds: Option<f64>) -> Option<f64> {
    match odds {
        Some(odds) if odds > 0.0 && odds.is_finite() => Some(1.0 / odds),
        _ => None,
    }
}

/// Calculate the relative edge of a model probability over the market price.
///
/// EV = (model_prob - implied_prob) / implied_prob, which for decimal odds is
/// the same as `model_prob * odds - 1`: the expected profit per unit staked.
/// Returns 0 when either input is missing or zero.
pub fn expected_value(model_prob: Option<f64>, market_odds: Option<f64>) -> f64 {
    let (Some(model_prob), Some(market_odds)) = (model_prob, market_odds) else {
        return 0.0;
    };
    if model_prob == 0.0 || market_odds == 0.0 {
        return 0.0;
    }

    match implied_probability(Some(market_odds)) {
        Some(implied_prob) => (model_prob - implied_prob) / implied_prob,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_probability() {
        assert_eq!(implied_probability(Some(2.0)), Some(0.5));
        assert_eq!(implied_probability(Some(4.0)), Some(0.25));
        assert_eq!(implied_probability(None), None);
        assert_eq!(implied_probability(Some(0.0)), None);
        assert_eq!(implied_probability(Some(-1.5)), None);
        assert_eq!(implied_probability(Some(f64::NAN)), None);
    }

    #[test]
    fn test_expected_value() {
        // Positive EV: 60% on even money
        let ev = expected_value(Some(0.6), Some(2.0));
        assert!((ev - 0.2).abs() < 1e-9);

        // Fair price
        let ev = expected_value(Some(0.5), Some(2.0));
        assert!(ev.abs() < 1e-9);

        // Negative EV: 40% at 2.0
        let ev = expected_value(Some(0.4), Some(2.0));
        assert!(ev < 0.0);
    }

    #[test]
    fn test_expected_value_degenerate_inputs() {
        assert_eq!(expected_value(Some(0.7), None), 0.0);
        assert_eq!(expected_value(None, Some(2.0)), 0.0);
        assert_eq!(expected_value(Some(0.0), Some(2.0)), 0.0);
        assert_eq!(expected_value(Some(0.7), Some(0.0)), 0.0);
        assert_eq!(expected_value(Some(0.7), Some(-2.0)), 0.0);
    }

    #[test]
    fn test_expected_value_scales_with_odds() {
        // Same 5 point edge is worth more on a long shot than near even money
        let long_shot = expected_value(Some(0.25), Some(5.0));
        let even = expected_value(Some(0.55), Some(2.0));
        assert!(long_shot > even);
    }
}

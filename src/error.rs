/// Errors that stop processing of a whole odds or model document
#[derive(Debug, thiserror::Error)]
pub enum OddsError {
    #[error("Invalid odds format: {0}")]
    Format(String),

    #[error("Provider {provider} has no {target} normalizer")]
    UnsupportedProvider {
        provider: crate::normalizers::Provider,
        target: &'static str,
    },
}

impl OddsError {
    pub fn format(message: impl Into<String>) -> Self {
        OddsError::Format(message.into())
    }
}

/// Why a single prediction record was rejected. Reported back to the caller
/// alongside the batch, never raised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("prediction is not a JSON object")]
    NotAnObject,

    #[error("malformed prediction: {0}")]
    Malformed(String),

    #[error("{field} {value} is outside [0, 1]")]
    OutOfRange { field: &'static str, value: f64 },
}

/// A prediction that had nothing to match in the consolidated odds
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupMiss {
    /// Team predictions other than `is_win` have no moneyline counterpart
    #[error("prediction type {0} not supported")]
    NotApplicable(String),

    #[error("no moneyline quoted for {team}")]
    MoneylineUnavailable { team: String },

    #[error("player {0} has no props")]
    Player(String),

    #[error("player {player_id} has no {market} market")]
    Market { player_id: String, market: String },

    #[error("no book offers {outcome_type} {line} for {player_id} ({market})")]
    Line {
        player_id: String,
        market: String,
        outcome_type: String,
        line: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss_messages() {
        assert_eq!(
            LookupMiss::NotApplicable("total_over".to_string()).to_string(),
            "prediction type total_over not supported"
        );
        assert_eq!(
            LookupMiss::Line {
                player_id: "sr:player:1".to_string(),
                market: "total points".to_string(),
                outcome_type: "over".to_string(),
                line: 24.5,
            }
            .to_string(),
            "no book offers over 24.5 for sr:player:1 (total points)"
        );
        assert_eq!(
            SkipReason::OutOfRange {
                field: "probability",
                value: 1.4,
            }
            .to_string(),
            "probability 1.4 is outside [0, 1]"
        );
    }
}

//! Server configuration, resolved once at startup

use tracing::warn;

/// Seed ids used for inference prompts when none are configured
const DEFAULT_SEED_IDS: std::ops::RangeInclusive<i64> = 1..=10;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address for the HTTP listener
    pub bind_addr: String,
    /// Record ids used as prompt seeds, in prompt order
    pub seed_ids: Vec<i64>,
}

impl ApiConfig {
    /// Read configuration from `API_SERVER_ADDR` and `SEED_IDS`.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("API_SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let seed_ids = match std::env::var("SEED_IDS") {
            Ok(raw) => match parse_seed_ids(&raw) {
                Some(ids) => ids,
                None => {
                    warn!(%raw, "SEED_IDS is malformed, using the default seed set");
                    DEFAULT_SEED_IDS.collect()
                }
            },
            Err(_) => DEFAULT_SEED_IDS.collect(),
        };

        Self {
            bind_addr,
            seed_ids,
        }
    }
}

fn parse_seed_ids(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_id_lists_parse_in_order() {
        assert_eq!(parse_seed_ids("4, 2,9"), Some(vec![4, 2, 9]));
        assert_eq!(parse_seed_ids("4,two"), None);
    }
}

//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Per-IP limits with tower_governor. The Generic Cell Rate Algorithm needs
//! no background task to replenish quota.

use crate::ApiError;
use app_config::RateLimitConfig;
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config keyed on peer IP, reporting quota in response headers
pub type ClaimGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Build the governor config for `GovernorLayer`.
///
/// Peer IPs come from `ConnectInfo`, so the service must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`. Responses carry
/// X-RateLimit-* headers.
pub fn create_governor_config(config: &RateLimitConfig) -> Result<Arc<ClaimGovernorConfig>, ApiError> {
    GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .map(Arc::new)
        .ok_or_else(|| {
            ApiError::Startup(format!(
                "invalid rate limit: per_second={} burst_size={}",
                config.per_second, config.burst_size
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_governor_config() {
        let governor = create_governor_config(&RateLimitConfig::default()).unwrap();
        assert_eq!(Arc::strong_count(&governor), 1);
    }

    #[test]
    fn test_zero_quota_rejected() {
        let config = RateLimitConfig {
            per_second: 0,
            burst_size: 0,
        };
        assert!(matches!(create_governor_config(&config), Err(ApiError::Startup(_))));
    }
}

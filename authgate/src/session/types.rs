use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session tokens issued after a successful authentication.
///
/// Created by the exchange service and consumed right away by the cookie writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl ExchangeResult {
    /// Seconds until the access token expires, never negative.
    pub(crate) fn access_max_age(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    pub(crate) fn refresh_max_age(&self, now: DateTime<Utc>) -> Option<i64> {
        self.refresh_expires_at
            .map(|expires_at| (expires_at - now).num_seconds().max(0))
    }
}

//! Adapter settings read from the environment

use std::sync::LazyLock;

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Largest request body buffered for a gateway route.
/// Default: 1 MiB
pub static AUTHGATE_MAX_BODY_BYTES: LazyLock<usize> = LazyLock::new(|| {
    max_body_bytes(std::env::var("AUTHGATE_MAX_BODY_BYTES").ok().as_deref())
});

fn max_body_bytes(env_value: Option<&str>) -> usize {
    match env_value.map(str::parse::<usize>) {
        Some(Ok(limit)) if limit > 0 => limit,
        Some(_) => {
            tracing::warn!(
                "Ignoring invalid AUTHGATE_MAX_BODY_BYTES, using {}",
                DEFAULT_MAX_BODY_BYTES
            );
            DEFAULT_MAX_BODY_BYTES
        }
        None => DEFAULT_MAX_BODY_BYTES,
    }
}

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub trait TimeLimited {
    fn set_validity(&mut self, until: SystemTime);
    fn check_validity(&self) -> bool;
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Claim carried by API bearer token, `sub` is the numeric user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiClaim {
    pub sub: String,
    pub exp: u64,
}

impl ApiClaim {
    /// Validity is set when token is issued
    pub fn new_expired(user_id: i64) -> Self {
        ApiClaim {
            sub: user_id.to_string(),
            exp: 0,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

impl TimeLimited for ApiClaim {
    fn set_validity(&mut self, until: SystemTime) {
        self.exp = unix_secs(until);
    }

    fn check_validity(&self) -> bool {
        self.exp > unix_secs(SystemTime::now())
    }
}

use std::sync::Arc;
use std::time::Instant;

use crate::relay::Relay;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
            started_at: Instant::now(),
        }
    }
}

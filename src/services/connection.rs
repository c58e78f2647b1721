use crate::models::drive_types::ConnectionStatus;
use crate::services::api::ProcessingApi;
use std::sync::{Arc, RwLock};

/// Holds the last known drive connection flags. Only `check_status` writes
/// them; everything else reads.
#[derive(Clone)]
pub struct ConnectionMonitor {
    api: Arc<dyn ProcessingApi>,
    status: Arc<RwLock<ConnectionStatus>>,
}

impl ConnectionMonitor {
    pub fn new(api: Arc<dyn ProcessingApi>) -> Self {
        Self {
            api,
            status: Arc::new(RwLock::new(ConnectionStatus::disconnected())),
        }
    }

    pub fn current(&self) -> ConnectionStatus {
        self.status
            .read()
            .map(|s| *s)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    /// Any failure reads as "both disconnected"; it is never an error.
    pub async fn check_status(&self) -> ConnectionStatus {
        let status = match self.api.connection_status().await {
            Ok(status) => status,
            Err(e) => {
                log::warn!("Connection status check failed: {}", e);
                ConnectionStatus::disconnected()
            }
        };

        match self.status.write() {
            Ok(mut slot) => *slot = status,
            Err(poisoned) => *poisoned.into_inner() = status,
        }
        log::info!(
            "Connection status: source={}, destination={}",
            status.source_connected,
            status.destination_connected
        );
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::api::fake::FakeApi;

    #[tokio::test]
    async fn starts_disconnected() {
        let monitor = ConnectionMonitor::new(Arc::new(FakeApi::new()));
        assert_eq!(monitor.current(), ConnectionStatus::disconnected());
    }

    #[tokio::test]
    async fn stores_reported_status() {
        let api = Arc::new(FakeApi::new());
        api.push_status(Ok(ConnectionStatus {
            source_connected: true,
            destination_connected: false,
        }));
        let monitor = ConnectionMonitor::new(api.clone());
        let status = monitor.check_status().await;
        assert!(status.source_connected);
        assert_eq!(monitor.current(), status);
    }

    #[tokio::test]
    async fn failure_resets_both_flags() {
        let api = Arc::new(FakeApi::new());
        api.push_status(Ok(ConnectionStatus {
            source_connected: true,
            destination_connected: true,
        }));
        api.push_status(Err(AppError::http(500, None)));
        let monitor = ConnectionMonitor::new(api.clone());
        monitor.check_status().await;
        let status = monitor.check_status().await;
        assert_eq!(status, ConnectionStatus::disconnected());
        assert_eq!(monitor.current(), ConnectionStatus::disconnected());
    }
}

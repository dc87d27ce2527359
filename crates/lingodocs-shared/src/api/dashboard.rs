use serde::{Deserialize, Serialize};

/// Static headline numbers for the dashboard. The backend currently serves
/// fixed values; the shape is shared so the client can render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub users: u64,
    pub current_users: u64,
    pub active_users: u64,
}

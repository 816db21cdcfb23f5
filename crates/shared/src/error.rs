use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ClusterId;

/// Body the backend returns for any failed request, usually with a 4xx/5xx
/// status: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("rating {value} is outside 1..=10")]
    RatingOutOfRange { value: u8 },
    #[error("cluster {cluster_id} is not loaded")]
    UnknownCluster { cluster_id: ClusterId },
    #[error("cluster count {value} is outside 2..=50")]
    ClusterCountOutOfRange { value: u32 },
}

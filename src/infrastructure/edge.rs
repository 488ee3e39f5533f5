use crate::config::ServiceConfig;
use crate::services::edge::{EdgeOperation, create_edge_operation};
use std::sync::Arc;
use tracing::info;

pub async fn setup_edge_operation(config: &ServiceConfig) -> Arc<dyn EdgeOperation> {
    let operation = create_edge_operation(config);

    // Warm up the backend so a broken install shows up at boot
    if operation.health_check().await {
        info!("🔍 Edge operation '{}' ready", operation.name());
    } else {
        tracing::warn!(
            "⚠️  Edge operation '{}' unavailable! Filter requests will fail until it is fixed.",
            operation.name()
        );
    }

    operation
}

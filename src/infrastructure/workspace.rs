use crate::config::ServiceConfig;
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

/// Creates the directory that holds downloads and edge maps.
pub async fn prepare_temp_dir(config: &ServiceConfig) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(&config.temp_dir)
        .await
        .with_context(|| format!("failed to create temp dir {}", config.temp_dir.display()))?;

    info!("📂 Temp dir: {}", config.temp_dir.display());
    Ok(config.temp_dir.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_nested_dir() {
        let root = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            temp_dir: root.path().join("a").join("b"),
            ..ServiceConfig::default()
        };

        let dir = prepare_temp_dir(&config).await.unwrap();
        assert!(dir.is_dir());

        // Idempotent
        prepare_temp_dir(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_fails_when_path_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let config = ServiceConfig {
            temp_dir: blocker.join("tmp"),
            ..ServiceConfig::default()
        };

        assert!(prepare_temp_dir(&config).await.is_err());
    }
}

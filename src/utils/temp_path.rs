use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Builds a request-scoped path inside `dir`.
///
/// The millisecond timestamp keeps listings readable; the v4 UUID makes
/// collisions between concurrent requests impossible in practice.
pub fn unique_temp_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
    let token = Uuid::new_v4().simple();
    let extension = extension.trim_start_matches('.');

    let name = if extension.is_empty() {
        format!("{}-{}-{}", prefix, stamp, token)
    } else {
        format!("{}-{}-{}.{}", prefix, stamp, token, extension)
    };

    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique() {
        let dir = Path::new("/tmp/filters");
        let paths: HashSet<PathBuf> = (0..1000)
            .map(|_| unique_temp_path(dir, "download", "png"))
            .collect();
        assert_eq!(paths.len(), 1000);
    }

    #[test]
    fn test_path_shape() {
        let path = unique_temp_path(Path::new("/tmp/filters"), "edges", ".png");
        assert_eq!(path.parent(), Some(Path::new("/tmp/filters")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("edges-"));

        let bare = unique_temp_path(Path::new("/tmp"), "download", "");
        assert!(bare.extension().is_none());
    }
}

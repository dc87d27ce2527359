use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::body::Bytes;
use uuid::Uuid;

/// Local-filesystem file store for uploaded documents. Files are written
/// under the configured directory with a generated name; the returned key
/// (`uploads/<name>`) is what gets persisted on the record and resolved by
/// the `/uploads` static route.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn store(&self, original_name: &str, bytes: Bytes) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating upload directory {}", self.root.display()))?;

        let file_name = generated_name(original_name);
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("writing upload {}", path.display()))?;

        Ok(format!("uploads/{}", file_name))
    }
}

/// Store-generated name: a fresh uuid plus the original extension, if that
/// extension is plain ascii. Never trusts the client-supplied base name.
fn generated_name(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_keeps_clean_extension() {
        let name = generated_name("Quarterly Report.PDF");
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains("Quarterly"));
    }

    #[test]
    fn generated_name_drops_suspicious_extension() {
        assert!(!generated_name("evil.p/../df").contains('/'));
        assert!(!generated_name("noext").contains('.'));
        let long = generated_name("file.aaaaaaaaaaaaaaaa");
        assert!(!long.contains('.'));
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_key() {
        let dir = std::env::temp_dir().join(format!("lingodocs-test-{}", Uuid::new_v4()));
        let storage = Storage::new(&dir);

        let key = storage
            .store("report.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();

        assert!(key.starts_with("uploads/"));
        let file_name = key.trim_start_matches("uploads/");
        let written = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(written, b"%PDF-1.4");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}

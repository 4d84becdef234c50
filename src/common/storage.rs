// src/common/storage.rs

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

/// Arquivo recebido no multipart, ainda não validado.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Regras de validade do upload. Falhar aqui é um conflito (409), não validação.
    pub fn check(&self, field: &'static str, max_bytes: usize) -> Result<(), AppError> {
        let has_name = self.file_name.as_deref().is_some_and(|n| !n.trim().is_empty());
        let is_image = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));

        if !has_name || !is_image || self.bytes.is_empty() || self.bytes.len() > max_bytes {
            return Err(AppError::UploadFailed(field));
        }
        Ok(())
    }

    /// Extensão derivada do nome original (ex: "png"), em minúsculas.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }
}

#[async_trait]
pub trait LogoStorage: Send + Sync {
    /// Grava o arquivo em `dir` e devolve o caminho relativo armazenado.
    async fn put(&self, dir: &str, upload: &Upload) -> Result<String, AppError>;

    async fn delete(&self, path: &str) -> Result<(), AppError>;

    /// URL pública de um caminho armazenado.
    fn url(&self, path: &str) -> String;
}

/// Armazenamento em disco local, servido sob `public_url`.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
    public_url: String,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl LogoStorage for DiskStorage {
    async fn put(&self, dir: &str, upload: &Upload) -> Result<String, AppError> {
        let file_name = match upload.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let relative = format!("{}/{}", dir.trim_matches('/'), file_name);

        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::warn!("Falha ao criar diretório {:?}: {}", parent, e);
                AppError::UploadFailed("logo")
            })?;
        }

        tokio::fs::write(&target, &upload.bytes).await.map_err(|e| {
            tracing::warn!("Falha ao gravar {:?}: {}", target, e);
            AppError::UploadFailed("logo")
        })?;

        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::from(e).into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(bytes: usize) -> Upload {
        Upload {
            file_name: Some("Logo.PNG".into()),
            content_type: Some("image/png".into()),
            bytes: vec![7; bytes],
        }
    }

    #[test]
    fn accepts_a_small_image() {
        assert!(png(16).check("logo", 1024).is_ok());
        assert_eq!(png(1).extension().as_deref(), Some("png"));
    }

    #[test]
    fn rejects_empty_oversized_or_non_image_uploads() {
        assert!(matches!(png(0).check("logo", 1024), Err(AppError::UploadFailed("logo"))));
        assert!(png(2048).check("logo", 1024).is_err());

        let mut text = png(4);
        text.content_type = Some("text/plain".into());
        assert!(text.check("logo", 1024).is_err());

        let mut nameless = png(4);
        nameless.file_name = None;
        assert!(nameless.check("logo", 1024).is_err());
    }

    #[tokio::test]
    async fn disk_storage_writes_and_deletes() {
        let root = std::env::temp_dir().join(format!("backoffice-storage-{}", Uuid::new_v4()));
        let storage = DiskStorage::new(&root, "/storage/");

        let path = storage.put("company", &png(8)).await.unwrap();
        assert!(path.starts_with("company/") && path.ends_with(".png"));
        assert_eq!(tokio::fs::read(root.join(&path)).await.unwrap().len(), 8);
        assert_eq!(storage.url(&path), format!("/storage/{path}"));

        storage.delete(&path).await.unwrap();
        assert!(!root.join(&path).exists());
        // Apagar de novo não é erro
        storage.delete(&path).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}

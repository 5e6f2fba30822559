//! Model provisioning: fetch artifacts into the models directory, load them
//! once, and hand out the shared bundle.

use crate::config::{ArtifactSource, ModelsConfig};
use crate::error::LoadError;
use crate::models::bundle::ModelBundle;
use crate::models::loader::{ArtifactPaths, ModelLoader};
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Retrieves a remote artifact into a local file
pub trait ArtifactFetcher: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<u64, LoadError>> + Send;
}

/// Plain HTTP(S) download. No timeout and no retry.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, LoadError> {
        let download_error = |e: reqwest::Error| LoadError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(download_error)?
            .error_for_status()
            .map_err(download_error)?;

        // Storage providers answer large-file requests with a confirmation page
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(LoadError::UnexpectedHtml {
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(download_error)?;
        write_atomically(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}

/// Write through a `.part` sibling so an interrupted download never
/// looks like a present artifact.
pub async fn write_atomically(dest: &Path, contents: &[u8]) -> Result<(), LoadError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| LoadError::Io { path, source }
    };

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }
    let partial = partial_path(dest);
    tokio::fs::write(&partial, contents)
        .await
        .map_err(io_error(&partial))?;
    tokio::fs::rename(&partial, dest)
        .await
        .map_err(io_error(dest))
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Produces the model bundle at most once and shares it afterwards.
///
/// Concurrent callers arriving before the first load completes wait for it
/// and receive the same bundle. A failed load leaves the cache empty.
pub struct ModelProvisioner<F = HttpFetcher> {
    models: ModelsConfig,
    fetcher: F,
    loader: ModelLoader,
    bundle: OnceCell<Arc<ModelBundle>>,
}

impl<F: ArtifactFetcher> ModelProvisioner<F> {
    pub fn new(models: ModelsConfig, fetcher: F) -> Self {
        let loader = ModelLoader::with_threads(models.onnx_threads);
        Self {
            models,
            fetcher,
            loader,
            bundle: OnceCell::new(),
        }
    }

    /// Return the bundle, downloading and loading it on first use.
    pub async fn acquire(&self) -> Result<Arc<ModelBundle>, LoadError> {
        self.bundle
            .get_or_try_init(|| self.provision())
            .await
            .map(Arc::clone)
    }

    /// Whether a bundle has been loaded
    pub fn is_loaded(&self) -> bool {
        self.bundle.initialized()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn provision(&self) -> Result<Arc<ModelBundle>, LoadError> {
        let dir = Path::new(&self.models.models_dir);
        info!(models_dir = %dir.display(), "Provisioning models");

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| LoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let sources = [
            ("random forest", &self.models.ensemble),
            ("onnx neural model", &self.models.neural),
            ("dense neural model", &self.models.neural_fallback),
            ("scaler", &self.models.scaler),
        ];
        for (artifact, source) in sources {
            self.ensure_present(artifact, source, dir).await?;
        }

        let bundle = self
            .loader
            .load_bundle(&ArtifactPaths::from_config(&self.models))?;
        Ok(Arc::new(bundle))
    }

    async fn ensure_present(
        &self,
        artifact: &'static str,
        source: &ArtifactSource,
        dir: &Path,
    ) -> Result<(), LoadError> {
        let path = source.path_in(dir);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(artifact, path = %path.display(), "Artifact already present");
            return Ok(());
        }

        let Some(url) = source.url.as_deref() else {
            debug!(artifact, path = %path.display(), "No remote location, skipping download");
            return Ok(());
        };

        info!(artifact, url = %url, path = %path.display(), "Downloading artifact");
        let bytes = self.fetcher.fetch(url, &path).await?;
        info!(artifact, bytes, "Artifact downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("models/rf_model.json")),
            PathBuf::from("models/rf_model.json.part")
        );
    }

    #[tokio::test]
    async fn test_write_atomically_creates_parent() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested").join("scaler.json");

        write_atomically(&dest, b"{}").await.unwrap();

        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"{}");
        assert!(!partial_path(&dest).exists());
    }
}

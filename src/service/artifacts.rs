// src/service/artifacts.rs
// Artifact store - generated subtitle and video files served by name

use super::ServiceError;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const DOWNLOAD_PREFIX: &str = "/download/";

#[derive(Clone)]
pub struct ArtifactStore {
    base_url: Url,
    client: reqwest::Client,
}

impl ArtifactStore {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { base_url, client })
    }

    /// Link target for an artifact, as bound to a download affordance
    pub fn link(name: &str) -> String {
        format!("{}{}", DOWNLOAD_PREFIX, name)
    }

    /// Absolute URL for an artifact
    pub fn resolve(&self, name: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(&Self::link(name))
            .map_err(|_| ServiceError::InvalidArtifactName(name.to_string()))
    }

    /// Download an artifact into `dir`, returning the written path.
    /// The target only appears once the whole body has been written.
    pub async fn fetch(&self, name: &str, dir: &Path) -> Result<PathBuf, ServiceError> {
        validate_name(name)?;
        let url = self.resolve(name)?;

        tracing::info!("Downloading artifact {} from {}", name, url);

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::HttpStatus(status.as_u16()));
        }

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        let partial = dir.join(format!(".{}.{}.part", name, Uuid::new_v4()));

        let written = match write_body(&mut response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::warn!("Could not remove {}: {}", partial.display(), cleanup);
                }
                tracing::error!("Download of {} failed: {}", name, e);
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, &path).await?;

        tracing::info!("Saved {} ({} bytes)", path.display(), written);
        Ok(path)
    }
}

async fn write_body(response: &mut reqwest::Response, path: &Path) -> Result<usize, ServiceError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0usize;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;
    Ok(written)
}

/// Artifact names are flat file names; anything that could escape the target directory is refused
fn validate_name(name: &str) -> Result<(), ServiceError> {
    let bad = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(ServiceError::InvalidArtifactName(name.to_string()));
    }
    Ok(())
}

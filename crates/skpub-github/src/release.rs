//! Release publishing: draft, upload, publish.
//!
//! The three calls are independent. Each returns what the next one needs
//! (the release id) and nothing is rolled back on failure: a draft whose
//! upload failed stays on GitHub for manual recovery.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::client::Method;
use crate::{GithubClient, GithubError, GithubResult, RepositoryRef, Transport};

/// Label attached to uploaded plugin archives.
pub const ASSET_LABEL: &str =
    "To install: download this file, unzip and double click on the .sketchplugin";

/// Media type of uploaded plugin archives.
pub const ASSET_CONTENT_TYPE: &str = "application/zip";

/// A GitHub release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release id.
    pub id: u64,
    /// Tag the release points at.
    pub tag_name: String,
    /// Whether the release is still a draft.
    #[serde(default)]
    pub draft: bool,
    /// Web page of the release.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// An uploaded release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset id.
    pub id: u64,
    /// File name shown on the release page.
    pub name: String,
    /// Download URL.
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Creates, fills and publishes releases.
pub struct ReleasePublisher<'a, T> {
    client: &'a GithubClient<T>,
}

impl<'a, T: Transport> ReleasePublisher<'a, T> {
    /// Creates a publisher using `client`.
    #[must_use]
    pub fn new(client: &'a GithubClient<T>) -> Self {
        Self { client }
    }

    /// Creates a draft release named and tagged `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the release.
    pub async fn create_draft_release(
        &self,
        repo: &RepositoryRef,
        tag: &str,
    ) -> GithubResult<Release> {
        let request = self
            .client
            .request(
                Method::Post,
                self.client.api_url(&format!("/repos/{repo}/releases")),
            )
            .with_json(json!({
                "tag_name": tag,
                "name": tag,
                "draft": true,
            }));

        let release: Release = self.client.send_json(request, "release").await?;
        info!(%repo, tag, id = release.id, "created draft release");
        Ok(release)
    }

    /// Streams the zip archive at `path` as the release asset `asset_name`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Asset`] if the file cannot be read (no request
    /// is sent in that case), or the upload error.
    pub async fn upload_asset(
        &self,
        repo: &RepositoryRef,
        release_id: u64,
        asset_name: &str,
        path: impl AsRef<Path>,
    ) -> GithubResult<ReleaseAsset> {
        let path = path.as_ref();
        let asset_error = |source| GithubError::Asset {
            path: path.to_path_buf(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(asset_error)?;
        if !metadata.is_file() {
            return Err(asset_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let len = metadata.len();

        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", asset_name)
            .append_pair("label", ASSET_LABEL)
            .finish();
        let url = self.client.uploads_url(&format!(
            "/repos/{repo}/releases/{release_id}/assets?{query}"
        ));

        let request = self
            .client
            .request(Method::Post, url)
            .with_header("Content-Type", ASSET_CONTENT_TYPE)
            .with_header("Content-Length", len.to_string())
            .with_file(path, len);

        let asset: ReleaseAsset = self.client.send_json(request, "release asset").await?;
        info!(%repo, release_id, asset = %asset.name, bytes = len, "uploaded release asset");
        Ok(asset)
    }

    /// Marks the release as public.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    pub async fn publish_release(
        &self,
        repo: &RepositoryRef,
        release_id: u64,
    ) -> GithubResult<Release> {
        let request = self
            .client
            .request(
                Method::Patch,
                self.client
                    .api_url(&format!("/repos/{repo}/releases/{release_id}")),
            )
            .with_json(json!({ "draft": false }));

        let release: Release = self.client.send_json(request, "release").await?;
        info!(%repo, release_id, "published release");
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::{ClientSettings, MockTransport, RequestBody, Token};

    const RELEASES: &str = "https://api.github.com/repos/jane/my-plugin/releases";

    fn client() -> GithubClient<MockTransport> {
        GithubClient::with_transport(
            MockTransport::new(),
            Token::new("t0ken").unwrap(),
            ClientSettings::default(),
        )
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::new("jane", "my-plugin")
    }

    #[tokio::test]
    async fn test_create_draft_release() {
        let client = client();
        client.transport().respond(
            Method::Post,
            RELEASES,
            201,
            json!({ "id": 42, "tag_name": "v1.0.0", "draft": true }).to_string(),
        );

        let release = ReleasePublisher::new(&client)
            .create_draft_release(&repo(), "v1.0.0")
            .await
            .unwrap();
        assert_eq!(release.id, 42);
        assert!(release.draft);

        let requests = client.transport().requests_to(Method::Post, RELEASES);
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].json(),
            Some(&json!({ "tag_name": "v1.0.0", "name": "v1.0.0", "draft": true }))
        );
    }

    #[tokio::test]
    async fn test_upload_asset_missing_file() {
        let client = client();
        let temp = TempDir::new().unwrap();

        let err = ReleasePublisher::new(&client)
            .upload_asset(&repo(), 42, "plugin.zip", temp.path().join("missing.zip"))
            .await
            .unwrap_err();

        assert!(matches!(err, GithubError::Asset { .. }));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_asset_directory_is_rejected() {
        let client = client();
        let temp = TempDir::new().unwrap();

        let err = ReleasePublisher::new(&client)
            .upload_asset(&repo(), 42, "plugin.zip", temp.path())
            .await
            .unwrap_err();

        assert!(matches!(err, GithubError::Asset { .. }));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_asset_streams_file() {
        let client = client();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("my-plugin.sketchplugin.zip");
        fs::write(&path, b"PK\x03\x04zipbytes").unwrap();

        let url = "https://uploads.github.com/repos/jane/my-plugin/releases/42/assets?\
                   name=my-plugin.sketchplugin.zip&label=To+install%3A+download+this+file%2C+unzip+and+double+click+on+the+.sketchplugin";
        client.transport().respond(
            Method::Post,
            url,
            201,
            json!({ "id": 7, "name": "my-plugin.sketchplugin.zip" }).to_string(),
        );

        let asset = ReleasePublisher::new(&client)
            .upload_asset(&repo(), 42, "my-plugin.sketchplugin.zip", &path)
            .await
            .unwrap();
        assert_eq!(asset.id, 7);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, url);
        assert_eq!(request.header("Content-Type"), Some("application/zip"));
        assert_eq!(request.header("Content-Length"), Some("12"));
        assert_eq!(
            request.body,
            RequestBody::File {
                path: path.clone(),
                len: 12
            }
        );
    }

    #[tokio::test]
    async fn test_publish_release_only_flips_draft() {
        let client = client();
        let url = format!("{RELEASES}/42");
        client.transport().respond_json(
            Method::Patch,
            url.as_str(),
            &json!({ "id": 42, "tag_name": "v1.0.0", "draft": false }),
        );

        let release = ReleasePublisher::new(&client)
            .publish_release(&repo(), 42)
            .await
            .unwrap();
        assert!(!release.draft);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Patch);
        assert_eq!(requests[0].json(), Some(&json!({ "draft": false })));
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_redacted_error() {
        let client = client();
        client.transport().respond(
            Method::Patch,
            format!("{RELEASES}/42"),
            500,
            r#"{"message":"Server Error"}"#,
        );

        let err = ReleasePublisher::new(&client)
            .publish_release(&repo(), 42)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!err.to_string().contains("t0ken"));
    }
}

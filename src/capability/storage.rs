//! Object storage capability: fetch stored bytes.

use async_trait::async_trait;

use crate::config::StorageConfig;

use super::error::{client_with_timeout, endpoint, ensure_success, CapabilityError};

/// Async interface to object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object at `key`.  `bucket: None` reads from the store's
    /// default bucket.
    async fn get_object(&self, bucket: Option<&str>, key: &str) -> Result<Vec<u8>, CapabilityError>;
}

/// Reads objects through a JSON/HTTP gateway:
/// `GET {base_url}/objects/{bucket}/{key}`, or `GET {base_url}/objects/{key}`
/// for the default bucket.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            client: client_with_timeout(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Key separators stay path separators; everything else in the bucket
    /// and key is escaped.
    fn object_url(
        &self,
        bucket: Option<&str>,
        key: &str,
    ) -> Result<reqwest::Url, CapabilityError> {
        let segments: Vec<&str> = std::iter::once("objects")
            .chain(bucket)
            .chain(key.trim_start_matches('/').split('/'))
            .collect();
        endpoint(&self.base_url, &segments)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get_object(&self, bucket: Option<&str>, key: &str) -> Result<Vec<u8>, CapabilityError> {
        let url = self.object_url(bucket, key)?;
        let response = ensure_success(self.client.get(url).send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn store() -> HttpObjectStore {
        let mut config = StorageConfig::default();
        config.base_url = "http://storage:9000/".into();
        HttpObjectStore::from_config(&config)
    }

    fn gateway(server: &MockServer) -> HttpObjectStore {
        HttpObjectStore::from_config(&StorageConfig {
            base_url: server.base_url(),
            ..StorageConfig::default()
        })
    }

    #[test]
    fn object_url_with_bucket() {
        assert_eq!(
            store()
                .object_url(Some("wav-bucket"), "call-1/call-1.json")
                .unwrap()
                .as_str(),
            "http://storage:9000/objects/wav-bucket/call-1/call-1.json"
        );
    }

    #[test]
    fn object_url_without_bucket_uses_default() {
        assert_eq!(
            store()
                .object_url(None, "/call-1/call-1.json")
                .unwrap()
                .as_str(),
            "http://storage:9000/objects/call-1/call-1.json"
        );
    }

    #[test]
    fn object_url_escapes_key_segments() {
        assert_eq!(
            store()
                .object_url(Some("wav bucket"), "call 1/take#2?.wav")
                .unwrap()
                .as_str(),
            "http://storage:9000/objects/wav%20bucket/call%201/take%232%3F.wav"
        );
    }

    #[tokio::test]
    async fn http_get_object_returns_the_body() {
        let server = MockServer::start();
        let object = server.mock(|when, then| {
            when.method(GET).path("/objects/wav-bucket/call-1/call-1.json");
            then.status(200).body(r#"{"results":{"transcripts":[]}}"#);
        });

        let bytes = gateway(&server)
            .get_object(Some("wav-bucket"), "call-1/call-1.json")
            .await
            .expect("object");
        assert_eq!(bytes, br#"{"results":{"transcripts":[]}}"#.to_vec());
        assert_eq!(object.calls(), 1);
    }

    #[tokio::test]
    async fn http_missing_object_is_a_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/objects/call-1/call-1.json");
            then.status(404).body("NoSuchKey");
        });

        let err = gateway(&server)
            .get_object(None, "call-1/call-1.json")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::Status {
                status: 404,
                body: "NoSuchKey".into()
            }
        );
    }

    #[test]
    fn store_is_object_safe() {
        let _: Box<dyn ObjectStore> = Box::new(store());
    }
}

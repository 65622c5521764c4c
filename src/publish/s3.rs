use super::Store;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};
use tracing::debug;

/// Stores tables as objects in an S3 bucket, optionally gzip-encoded.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: Option<String>,
    gzip: bool,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: None,
            gzip: false,
        }
    }

    /// Builds a store from the ambient AWS configuration (env vars, profile,
    /// instance role).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket)
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    fn object_key(&self, key: &str) -> String {
        object_key(self.prefix.as_deref(), key)
    }
}

fn object_key(prefix: Option<&str>, key: &str) -> String {
    match prefix.map(|p| p.trim_matches('/')) {
        Some(p) if !p.is_empty() => format!("{p}/{key}"),
        _ => key.to_string(),
    }
}

fn gzip(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}

fn gunzip(body: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(body).read_to_end(&mut decoded)?;
    Ok(decoded)
}

#[async_trait]
impl Store for S3Store {
    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix.as_deref().unwrap_or(""))
    }

    async fn load(&self, key: &str) -> Result<Option<Bytes>> {
        let object_key = self.object_key(key);
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(err)
                    .with_context(|| format!("S3 GetObject failed for '{object_key}'"));
            }
        };

        let gzipped = resp.content_encoding() == Some("gzip");
        let body = resp
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read S3 object '{object_key}'"))?
            .into_bytes();

        debug!(key = %object_key, bytes = body.len(), gzipped, "Previous object loaded");
        if gzipped {
            Ok(Some(Bytes::from(gunzip(&body)?)))
        } else {
            Ok(Some(body))
        }
    }

    async fn save(&self, key: &str, body: Bytes) -> Result<()> {
        let object_key = self.object_key(key);

        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type("text/csv; charset=utf-8");

        let payload = if self.gzip {
            req = req.content_encoding("gzip");
            Bytes::from(gzip(&body)?)
        } else {
            body
        };

        req.body(ByteStream::from(payload))
            .send()
            .await
            .with_context(|| format!("S3 PutObject failed for '{object_key}'"))?;

        debug!(key = %object_key, gzip = self.gzip, "Object uploaded");
        Ok(())
    }
}

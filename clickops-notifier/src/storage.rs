use std::future::Future;
use std::io::Read;

use aws_sdk_s3 as s3;
use flate2::read::GzDecoder;

use clickops_filter::LogBatch;

use crate::error::FetchError;


/// Read access to the bucket CloudTrail writes into.
pub trait ObjectStore: Send + Sync {
    fn get_object(&self, bucket: &str, key: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

pub struct S3ObjectStore {
    client: s3::Client,
}

impl S3ObjectStore {
    pub fn new(config: &aws_config::SdkConfig, use_path_style_buckets: bool) -> Self {
        let client = s3::Client::new(config);

        let client = if use_path_style_buckets {
            tracing::info!("Using path-style buckets");
            let config_builder = client.config().clone().to_builder();
            s3::Client::from_conf(config_builder.force_path_style(true).build())
        } else {
            client
        };

        S3ObjectStore { client }
    }
}

impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| FetchError::Storage(Box::new(err)))?;

        let body = response.body
            .collect()
            .await
            .map_err(|err| FetchError::Storage(Box::new(err)))?;

        Ok(body.into_bytes().to_vec())
    }
}

/// Gunzips a CloudTrail log object and parses its `Records`.
pub fn decode_log_batch(content: &[u8]) -> Result<LogBatch, FetchError> {
    let mut decompressed = Vec::new();
    GzDecoder::new(content)
        .read_to_end(&mut decompressed)
        .map_err(FetchError::Decompress)?;

    LogBatch::from_slice(&decompressed).map_err(FetchError::Decode)
}

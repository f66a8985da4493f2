use aws_lambda_events::event::sqs::SqsMessage;
use serde::Deserialize;


/// S3 event notification as delivered in the body of an SQS message.
#[derive(Debug, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3Record>,
}

#[derive(Debug, Deserialize)]
pub struct S3Record {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// A log object written by CloudTrail, with its key already url-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Unwraps the S3 records carried by one SQS message.
///
/// Messages without a body or with a body that is not an S3 notification are
/// logged and yield nothing. Such a message is still acknowledged with the
/// rest of the batch, so SQS does not redeliver it.
pub fn object_refs(message: &SqsMessage) -> Vec<ObjectRef> {
    let body = match message.body {
        Some(ref body) => body,
        None => {
            tracing::warn!("Received message with no body, skipping.");
            return Vec::new();
        }
    };

    let notification: S3Notification = match serde_json::from_str(body) {
        Ok(notification) => notification,
        Err(err) => {
            tracing::error!("Failed to parse message body as S3 notification: {}", err);
            return Vec::new();
        }
    };

    notification.records
        .into_iter()
        .map(|record| ObjectRef {
            bucket: record.s3.bucket.name,
            key: decode_key(&record.s3.object.key),
        })
        .collect()
}

/// S3 notifications form-encode keys, so `+` stands for a space.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned(),
    }
}

/// Only keys with a literal `CloudTrail` path segment hold CloudTrail logs.
pub fn is_cloudtrail_key(key: &str) -> bool {
    key.split('/').any(|segment| segment == "CloudTrail")
}

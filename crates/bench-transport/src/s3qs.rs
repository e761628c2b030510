//! S3 + SQS transport.
//!
//! Buffers travel through object storage: the sender writes each buffer as
//! an object under an S3 prefix and enqueues the object URI on SQS. The
//! receiver long-polls the queue, downloads the announced object and
//! deletes both the message and the object.

use crate::channel::{Receiver, Sender};
use crate::error::TransportError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

/// SQS long-poll wait per receive call, in seconds (SQS maximum).
const RECEIVE_WAIT_SECONDS: i32 = 20;

/// Split `s3://bucket/key` into bucket and key.
pub fn parse_s3_uri(uri: &str) -> Result<(String, String), TransportError> {
    let rest = uri
        .strip_prefix("s3://")
        .ok_or_else(|| TransportError::InvalidAddress(format!("Not an S3 URI: {uri}")))?;

    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(TransportError::InvalidAddress(format!(
            "Missing bucket in S3 URI: {uri}"
        )));
    }
    Ok((bucket.to_string(), key.to_string()))
}

/// Key prefix objects are written under: empty, or ending with `/`.
fn object_key_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Sender that stages buffers in S3 and announces them on SQS.
pub struct S3qsSender {
    s3: aws_sdk_s3::Client,
    sqs: aws_sdk_sqs::Client,
    bucket: String,
    prefix: String,
    queue_url: String,
    sent: u64,
}

impl S3qsSender {
    /// Create a sender writing under `s3_prefix` (`s3://bucket/path/`) and
    /// announcing on `queue_url`.
    pub async fn new(s3_prefix: &str, queue_url: &str) -> Result<Self, TransportError> {
        let (bucket, prefix) = parse_s3_uri(s3_prefix)?;
        let prefix = object_key_prefix(&prefix);
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        Ok(Self {
            s3: aws_sdk_s3::Client::new(&sdk_config),
            sqs: aws_sdk_sqs::Client::new(&sdk_config),
            bucket,
            prefix,
            queue_url: queue_url.to_string(),
            sent: 0,
        })
    }
}

#[async_trait]
impl Sender for S3qsSender {
    async fn send(&mut self, buffer: Bytes) -> Result<(), TransportError> {
        let key = format!("{}{}", self.prefix, Uuid::new_v4());

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(buffer))
            .send()
            .await
            .map_err(|e| {
                TransportError::S3(format!(
                    "Failed to put s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        self.sqs
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(format!("s3://{}/{key}", self.bucket))
            .send()
            .await
            .map_err(|e| {
                TransportError::Sqs(format!(
                    "Failed to announce s3://{}/{key} on {}: {}",
                    self.bucket,
                    self.queue_url,
                    DisplayErrorContext(&e)
                ))
            })?;

        self.sent += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        debug!(
            "S3+SQS sender closed after {} buffers to {}",
            self.sent, self.queue_url
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqs"
    }
}

/// Receiver that polls SQS for announced S3 objects.
pub struct S3qsReceiver {
    s3: aws_sdk_s3::Client,
    sqs: aws_sdk_sqs::Client,
    queue_url: String,
    received: u64,
}

impl S3qsReceiver {
    /// Create a receiver polling `queue_url`.
    pub async fn new(queue_url: &str) -> Result<Self, TransportError> {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        Ok(Self {
            s3: aws_sdk_s3::Client::new(&sdk_config),
            sqs: aws_sdk_sqs::Client::new(&sdk_config),
            queue_url: queue_url.to_string(),
            received: 0,
        })
    }

    /// Long-poll until one message arrives; returns its body and receipt handle.
    async fn next_announcement(&self) -> Result<(String, String), TransportError> {
        loop {
            let output = self
                .sqs
                .receive_message()
                .queue_url(&self.queue_url)
                .max_number_of_messages(1)
                .wait_time_seconds(RECEIVE_WAIT_SECONDS)
                .send()
                .await
                .map_err(|e| {
                    TransportError::Sqs(format!(
                        "Failed to receive from {}: {}",
                        self.queue_url,
                        DisplayErrorContext(&e)
                    ))
                })?;

            let Some(message) = output.messages.unwrap_or_default().into_iter().next() else {
                continue;
            };

            match (message.body, message.receipt_handle) {
                (Some(body), Some(receipt_handle)) => return Ok((body, receipt_handle)),
                _ => {
                    return Err(TransportError::Sqs(format!(
                        "Message from {} without body or receipt handle",
                        self.queue_url
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl Receiver for S3qsReceiver {
    async fn receive(&mut self, max_size: usize) -> Result<Bytes, TransportError> {
        let (uri, receipt_handle) = self.next_announcement().await?;
        let (bucket, key) = parse_s3_uri(&uri)?;

        let object = self
            .s3
            .get_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                TransportError::S3(format!("Failed to get {uri}: {}", DisplayErrorContext(&e)))
            })?;
        let buffer = object
            .body
            .collect()
            .await
            .map_err(|e| TransportError::S3(format!("Failed to read {uri}: {e}")))?
            .into_bytes();

        self.sqs
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                TransportError::Sqs(format!(
                    "Failed to delete message for {uri}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        if let Err(e) = self.s3.delete_object().bucket(&bucket).key(&key).send().await {
            warn!("Failed to delete {}: {}", uri, DisplayErrorContext(&e));
        }

        if buffer.len() > max_size {
            return Err(TransportError::Oversized {
                size: buffer.len(),
                max_size,
            });
        }
        self.received += 1;
        Ok(buffer)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        debug!(
            "S3+SQS receiver closed after {} buffers from {}",
            self.received, self.queue_url
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_uri_with_prefix() {
        let (bucket, prefix) = parse_s3_uri("s3://bench-bucket/ccb/run-1/").unwrap();
        assert_eq!(bucket, "bench-bucket");
        assert_eq!(prefix, "ccb/run-1/");
    }

    #[test]
    fn test_parse_s3_object_uri() {
        let (bucket, key) = parse_s3_uri("s3://bench-bucket/ccb/0b6f").unwrap();
        assert_eq!(bucket, "bench-bucket");
        assert_eq!(key, "ccb/0b6f");
    }

    #[test]
    fn test_object_key_prefix() {
        assert_eq!(object_key_prefix("ccb"), "ccb/");
        assert_eq!(object_key_prefix("ccb/"), "ccb/");
        assert_eq!(object_key_prefix(""), "");
    }

    #[test]
    fn test_parse_s3_uri_bucket_only() {
        let (bucket, prefix) = parse_s3_uri("s3://bench-bucket").unwrap();
        assert_eq!(bucket, "bench-bucket");
        assert_eq!(prefix, "");
    }

    #[test]
    fn test_parse_s3_uri_invalid() {
        assert!(matches!(
            parse_s3_uri("https://bench-bucket/ccb"),
            Err(TransportError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_s3_uri("s3:///ccb"),
            Err(TransportError::InvalidAddress(_))
        ));
    }

    // Round trips through S3 and SQS need AWS credentials and live
    // resources; the probe protocol itself is covered in probe.rs.
}

use aws_lambda_events::event::sqs::SqsEvent;

use clickops_filter::{extract_principal, AccountKeyFilter, EventClassifier, LogBatch};

use crate::error::HandlerError;
use crate::message::{is_cloudtrail_key, object_refs, ObjectRef};
use crate::notify::{Alert, SlackPayload, WebhookNotifier};
use crate::storage::{decode_log_batch, ObjectStore};
use crate::webhook::{SecretSource, WebhookResolver};

pub const COMPLETED: &str = "Completed";


/// Everything one invocation needs, built once per process.
pub struct Handler<S, O> {
    pub webhook: WebhookResolver<S>,
    pub store: O,
    pub notifier: WebhookNotifier,
    pub accounts: AccountKeyFilter,
    pub classifier: EventClassifier,
}

impl<S: SecretSource, O: ObjectStore> Handler<S, O> {
    /// Walks every S3 record of every SQS message and alerts on console changes.
    ///
    /// A log object that cannot be fetched or decoded aborts the invocation so the
    /// queue redelivers the batch. Failed webhook deliveries are only logged.
    pub async fn handle(&self, event: SqsEvent) -> Result<&'static str, HandlerError> {
        let webhook_url = self.webhook.resolve().await?;

        for message in &event.records {
            for object in object_refs(message) {
                if !is_cloudtrail_key(&object.key) {
                    continue;
                }

                if !self.accounts.is_allowed(&object.key) {
                    continue;
                }

                let batch = self.fetch(&object).await.map_err(|err| {
                    tracing::error!("{}", err);
                    err
                })?;

                self.notify_batch(webhook_url, &object, &batch).await;
            }
        }

        Ok(COMPLETED)
    }

    async fn fetch(&self, object: &ObjectRef) -> Result<LogBatch, HandlerError> {
        let retrieval = |source| HandlerError::Retrieval {
            bucket: object.bucket.clone(),
            key: object.key.clone(),
            source,
        };

        let content = self.store.get_object(&object.bucket, &object.key).await.map_err(retrieval)?;
        decode_log_batch(&content).map_err(retrieval)
    }

    async fn notify_batch(&self, webhook_url: &str, object: &ObjectRef, batch: &LogBatch) {
        let kept = batch.records.iter().filter(|record| self.classifier.should_notify(record));

        for record in kept {
            let alert = Alert {
                record,
                principal: extract_principal(&record.event.user_identity.principal_id),
                bucket: &object.bucket,
                key: &object.key,
            };

            match self.notifier.send(webhook_url, &SlackPayload::from_alert(&alert)).await {
                Ok(()) => tracing::info!("Alert sent for {} by {}", alert.iam_action(), alert.principal),
                Err(err) => tracing::error!(event = %record.raw, "Slack message not sent: {}", err),
            }
        }
    }
}

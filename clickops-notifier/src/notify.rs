use serde::Serialize;

use clickops_filter::LogRecord;

use crate::error::DeliveryError;


/// Everything that ends up in one Slack alert.
#[derive(Debug, Clone, Copy)]
pub struct Alert<'a> {
    pub record: &'a LogRecord,
    pub principal: &'a str,
    pub bucket: &'a str,
    pub key: &'a str,
}

impl Alert<'_> {
    /// `iam.amazonaws.com` + `CreateUser` becomes `iam:CreateUser`.
    pub fn iam_action(&self) -> String {
        let event = &self.record.event;
        let service = event.event_source.split('.').next().unwrap_or_default();
        format!("{}:{}", service, event.event_name)
    }
}

#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
    },
    Divider,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

fn mrkdwn(text: String) -> Text {
    Text::Mrkdwn { text }
}

fn field(title: &str, value: &str) -> Text {
    mrkdwn(format!("*{}*\n{}", title, value))
}

impl SlackPayload {
    pub fn from_alert(alert: &Alert<'_>) -> Self {
        let event = &alert.record.event;
        let dump = serde_json::to_string_pretty(&alert.record.raw).unwrap_or_default();

        let blocks = vec![
            Block::Header {
                text: Text::PlainText { text: ":bell: ClickOps Alert :bell:".to_string(), emoji: true },
            },
            Block::Section {
                text: Some(mrkdwn("Someone is practicing ClickOps in your AWS Account!".to_string())),
                fields: vec![],
            },
            Block::Section {
                text: None,
                fields: vec![
                    field("Account Id", &event.recipient_account_id),
                    field("Region", &event.aws_region),
                ],
            },
            Block::Section {
                text: None,
                fields: vec![
                    field("IAM Action", &alert.iam_action()),
                    field("Principle", alert.principal),
                ],
            },
            Block::Section {
                text: None,
                fields: vec![
                    field("Cloudtrail Bucket", alert.bucket),
                    field("Key", alert.key),
                ],
            },
            Block::Divider,
            Block::Section {
                text: Some(mrkdwn(format!("*Event*\n```{}```", dump))),
                fields: vec![],
            },
        ];

        SlackPayload { blocks }
    }
}

/// Posts alerts to a Slack incoming webhook.
#[derive(Debug, Clone, Default)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        WebhookNotifier { client }
    }

    /// Only a plain `200 OK` counts as delivered.
    pub async fn send(&self, webhook_url: &str, payload: &SlackPayload) -> Result<(), DeliveryError> {
        let response = self.client
            .post(webhook_url)
            .json(payload)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(DeliveryError::Status(response.status()));
        }

        Ok(())
    }
}

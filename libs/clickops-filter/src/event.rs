use serde::{Deserialize, Deserializer};
use serde_json::Value;


/// Typed view of a single CloudTrail record. Only the attributes the
/// classifier and the alert need are pulled out, the full record stays
/// available through [`LogRecord::raw`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    #[serde(default)]
    pub event_source: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub user_identity: UserIdentity,
    // CloudTrail emits both `true` and `"true"` here depending on the service.
    #[serde(default, deserialize_with = "deserialize_read_only")]
    pub read_only: Option<bool>,
    #[serde(default)]
    pub recipient_account_id: String,
    #[serde(default)]
    pub aws_region: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default)]
    pub principal_id: String,
    pub invoked_by: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReadOnlyFlag {
    Bool(bool),
    Text(String),
    #[allow(dead_code)]
    Other(Value),
}

fn deserialize_read_only<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<ReadOnlyFlag>::deserialize(deserializer)?;
    Ok(flag.map(|flag| match flag {
        ReadOnlyFlag::Bool(value) => value,
        ReadOnlyFlag::Text(text) => text == "true",
        ReadOnlyFlag::Other(_) => false,
    }))
}

/// A record exactly as it appeared in the log file, together with its typed view.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub event: LogEvent,
    pub raw: Value,
}

impl LogRecord {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let event = LogEvent::deserialize(&raw)?;
        Ok(LogRecord { event, raw })
    }
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    #[serde(rename = "Records", default)]
    records: Vec<Value>,
}

/// All records of one decompressed CloudTrail object, in file order.
#[derive(Debug, Clone, Default)]
pub struct LogBatch {
    pub records: Vec<LogRecord>,
}

impl LogBatch {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawBatch = serde_json::from_slice(bytes)?;
        let records = raw.records
            .into_iter()
            .map(LogRecord::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LogBatch { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Pulls the human readable part out of a principal id.
///
/// Role sessions look like `AROAEXAMPLE:alice@example.com`, in which case the
/// part after the first colon is returned. Anything without a colon is
/// returned unchanged.
pub fn extract_principal(principal_id: &str) -> &str {
    let mut segments = principal_id.split(':');
    match (segments.next(), segments.next()) {
        (Some(_), Some(second)) => second,
        _ => principal_id,
    }
}

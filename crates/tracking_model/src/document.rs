use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::StateParseError;

/// SMS batch document states, declared in the expected change sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum SmsDocumentState {
    Init,
    Sent,
    Done,
}

impl SmsDocumentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsDocumentState::Init => "INIT",
            SmsDocumentState::Sent => "SENT",
            SmsDocumentState::Done => "DONE",
        }
    }
}

impl fmt::Display for SmsDocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmsDocumentState {
    type Err = StateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "INIT" => Ok(SmsDocumentState::Init),
            "SENT" => Ok(SmsDocumentState::Sent),
            "DONE" => Ok(SmsDocumentState::Done),
            other => Err(StateParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for SmsDocumentState {
    type Error = StateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One message-tracking entry within a batch.
///
/// `data` is opaque message metadata, stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SmsDocumentItem {
    #[serde(rename = "uniqueId")]
    #[validate(length(min = 1, max = 10))]
    pub unique_id: String,
    #[serde(rename = "SMScount")]
    #[validate(range(min = 1))]
    pub sms_count: i64,
    pub data: Value,
}

/// The document set of one transfer batch.
///
/// A batch is capped at 5000 documents; that is the original service limit
/// and it also keeps the bulk upsert under SQLite's bind-variable ceiling.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SmsDocumentPayload {
    #[serde(rename = "UBID")]
    pub ubid: Uuid,
    #[validate(length(min = 1, max = 5000), nested)]
    pub documents: Vec<SmsDocumentItem>,
}

/// Human-readable statistics answer for document queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: String,
}

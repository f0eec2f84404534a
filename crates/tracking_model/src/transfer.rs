use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::StateParseError;

/// SMS batch transfer states, declared in the expected change sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum SmsTransferState {
    Init,
    Sent,
    Done,
}

impl SmsTransferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsTransferState::Init => "INIT",
            SmsTransferState::Sent => "SENT",
            SmsTransferState::Done => "DONE",
        }
    }
}

impl fmt::Display for SmsTransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmsTransferState {
    type Err = StateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "INIT" => Ok(SmsTransferState::Init),
            "SENT" => Ok(SmsTransferState::Sent),
            "DONE" => Ok(SmsTransferState::Done),
            other => Err(StateParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for SmsTransferState {
    type Error = StateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An SMS batch transfer submission.
///
/// Field names on the wire match the tracking schema: `UBID` is the batch
/// key, `SMScount` the number of 160-character block splits and `documents`
/// the number of messages in the batch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SmsTransferPayload {
    #[serde(rename = "UBID")]
    pub ubid: Uuid,
    #[serde(rename = "fileName")]
    #[validate(length(min = 1, max = 55))]
    pub file_name: String,
    #[serde(rename = "origName")]
    #[validate(length(min = 1, max = 50))]
    pub orig_name: String,
    #[serde(rename = "SMScount")]
    #[validate(range(min = 1))]
    pub sms_count: i64,
    #[validate(range(min = 1))]
    pub documents: i64,
}

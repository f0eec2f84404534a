pub mod document;
pub mod transfer;

pub use document::{QueryResponse, SmsDocumentItem, SmsDocumentPayload, SmsDocumentState};
pub use transfer::{SmsTransferPayload, SmsTransferState};

use thiserror::Error;

/// A state column or path parameter held a value outside INIT/SENT/DONE.
#[derive(Debug, Error)]
#[error("unknown tracking state: {0}")]
pub struct StateParseError(pub String);

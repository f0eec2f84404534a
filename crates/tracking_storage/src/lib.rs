mod document;
mod error;
mod store;
mod transfer;
mod unit_of_work;

pub use document::DocumentRepository;
pub use error::StoreError;
pub use store::{StorageConfig, TrackingStore};
pub use transfer::{SmsTransferRow, TransferRepository};
pub use unit_of_work::{transact, Repository, UnitOfWork};

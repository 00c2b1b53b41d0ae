//! Investor onboarding domain
//!
//! An investor moves through Application -> Documentation (KYC) -> Review ->
//! Agreement -> Ready. Each step writes into one of three per-investor stores;
//! the progress engine derives the tracker state from them on demand.
//!
//! ```text
//! KYC upload / submit ──┐
//!                       ├──> stores ──> ProgressEngine ──> ProgressHub ──> subscribers
//! Agreement submit ─────┘
//! ```

pub mod agreement;
pub mod documents;
pub mod hub;
pub mod progress;
pub mod store;
pub mod view;

pub use agreement::{AgreementRecord, AgreementSubmission, BankDetails};
pub use documents::{DocumentSlot, DocumentStatus, DocumentStatusMap, REQUIRED_DOCUMENTS};
pub use hub::ProgressHub;
pub use progress::{compute, Milestone, MilestoneId, ProgressEngine, ProgressInputs, ProgressSnapshot};
pub use store::{
    normalize_email, AgreementRecordStore, DocumentStatusStore, MemoryStore, SubmissionFlagStore,
};
pub use view::{BadgeState, MilestoneBadge, ProgressView};

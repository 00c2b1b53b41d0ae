//! Onboarding progress engine
//!
//! Derives milestone states, a weighted completion percentage and guidance
//! text from the three per-user stores. The derivation is a pure function of
//! [`ProgressInputs`]; [`ProgressEngine`] only adds the store reads.
//!
//! Weights: application 20, documentation 40 (partial credit per uploaded
//! slot until the batch is submitted), agreement 40 (all or nothing).

use super::documents::REQUIRED_DOCUMENTS;
use super::store::{AgreementRecordStore, DocumentStatusStore, SubmissionFlagStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

const APPLICATION_WEIGHT: u32 = 20;
const DOCUMENTATION_WEIGHT: u32 = 40;
const AGREEMENT_WEIGHT: u32 = 40;

/// The five fixed onboarding stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneId {
    Application,
    Documentation,
    Review,
    Agreement,
    Ready,
}

impl MilestoneId {
    pub const ALL: [MilestoneId; 5] = [
        MilestoneId::Application,
        MilestoneId::Documentation,
        MilestoneId::Review,
        MilestoneId::Agreement,
        MilestoneId::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneId::Application => "application",
            MilestoneId::Documentation => "documentation",
            MilestoneId::Review => "review",
            MilestoneId::Agreement => "agreement",
            MilestoneId::Ready => "ready",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MilestoneId::Application => "Application",
            MilestoneId::Documentation => "Documentation",
            MilestoneId::Review => "Review",
            MilestoneId::Agreement => "Agreement",
            MilestoneId::Ready => "Ready",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MilestoneId::Application => "📝",
            MilestoneId::Documentation => "📁",
            MilestoneId::Review => "🔍",
            MilestoneId::Agreement => "📜",
            MilestoneId::Ready => "✅",
        }
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one onboarding stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: MilestoneId,
    pub label: String,
    pub icon: String,
    pub done: bool,
    pub in_progress: bool,
}

impl Milestone {
    fn new(id: MilestoneId, done: bool, in_progress: bool) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            icon: id.icon().to_string(),
            done,
            in_progress,
        }
    }
}

/// Derived view of an investor's onboarding. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// 0..=100
    pub percent: u8,
    pub milestones: Vec<Milestone>,
    pub current_step: String,
    pub next_action: String,
}

impl ProgressSnapshot {
    pub fn milestone(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100
    }
}

/// The three facts the derivation depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressInputs {
    /// Slots in the uploaded state (0..=4)
    pub docs_done: usize,
    pub docs_submitted: bool,
    pub agreement_complete: bool,
}

/// Derive a snapshot from raw inputs
pub fn compute(inputs: ProgressInputs) -> ProgressSnapshot {
    let ProgressInputs {
        docs_done,
        docs_submitted,
        agreement_complete,
    } = inputs;
    let docs_done = docs_done.min(REQUIRED_DOCUMENTS);

    let milestones = vec![
        Milestone::new(MilestoneId::Application, true, false),
        Milestone::new(
            MilestoneId::Documentation,
            docs_submitted,
            !docs_submitted && docs_done > 0,
        ),
        Milestone::new(
            MilestoneId::Review,
            docs_submitted,
            docs_submitted && !agreement_complete,
        ),
        // Shares its in-progress condition with review: once documents are in,
        // both stages show as active until the agreement lands.
        Milestone::new(
            MilestoneId::Agreement,
            agreement_complete,
            docs_submitted && !agreement_complete,
        ),
        Milestone::new(MilestoneId::Ready, agreement_complete, false),
    ];

    let (current_step, next_action) = guidance(docs_done, docs_submitted, agreement_complete);

    ProgressSnapshot {
        percent: percent(docs_done, docs_submitted, agreement_complete),
        milestones,
        current_step,
        next_action,
    }
}

fn percent(docs_done: usize, docs_submitted: bool, agreement_complete: bool) -> u8 {
    let mut percent = APPLICATION_WEIGHT;

    percent += if docs_submitted {
        DOCUMENTATION_WEIGHT
    } else {
        let share = docs_done as f64 / REQUIRED_DOCUMENTS as f64;
        (share * DOCUMENTATION_WEIGHT as f64).round() as u32
    };

    if agreement_complete {
        percent += AGREEMENT_WEIGHT;
    }

    percent.min(100) as u8
}

fn guidance(docs_done: usize, docs_submitted: bool, agreement_complete: bool) -> (String, String) {
    if docs_submitted && !agreement_complete {
        (
            "Sign agreement".to_string(),
            "Complete investor agreement & bank details".to_string(),
        )
    } else if agreement_complete {
        (
            "All complete".to_string(),
            "Explore opportunities".to_string(),
        )
    } else if docs_done > 0 {
        (
            format!("{}/{} documents uploaded", docs_done, REQUIRED_DOCUMENTS),
            format!("Upload {} more", REQUIRED_DOCUMENTS - docs_done),
        )
    } else {
        (
            "Complete documentation".to_string(),
            format!("Upload {} required documents", REQUIRED_DOCUMENTS),
        )
    }
}

/// Reads the stores for one investor and derives their progress
#[derive(Clone)]
pub struct ProgressEngine {
    documents: Arc<dyn DocumentStatusStore>,
    submissions: Arc<dyn SubmissionFlagStore>,
    agreements: Arc<dyn AgreementRecordStore>,
}

impl ProgressEngine {
    pub fn new(
        documents: Arc<dyn DocumentStatusStore>,
        submissions: Arc<dyn SubmissionFlagStore>,
        agreements: Arc<dyn AgreementRecordStore>,
    ) -> Self {
        Self {
            documents,
            submissions,
            agreements,
        }
    }

    /// Engine over a single backend implementing all three stores
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DocumentStatusStore + SubmissionFlagStore + AgreementRecordStore + 'static,
    {
        Self {
            documents: store.clone(),
            submissions: store.clone(),
            agreements: store,
        }
    }

    /// Gather inputs. Read failures count as "nothing done yet".
    pub fn inputs(&self, email: &str) -> ProgressInputs {
        let docs_done = match self.documents.document_status(email) {
            Ok(status) => status.uploaded_count(),
            Err(e) => {
                warn!("Failed to read document status for {}: {}", email, e);
                0
            }
        };

        let docs_submitted = self.submissions.documents_submitted(email).unwrap_or_else(|e| {
            warn!("Failed to read submission flag for {}: {}", email, e);
            false
        });

        let agreement_complete = match self.agreements.agreement(email) {
            Ok(record) => record.is_some(),
            Err(e) => {
                warn!("Failed to read agreement for {}: {}", email, e);
                false
            }
        };

        ProgressInputs {
            docs_done,
            docs_submitted,
            agreement_complete,
        }
    }

    pub fn compute_progress(&self, email: &str) -> ProgressSnapshot {
        compute(self.inputs(email))
    }
}

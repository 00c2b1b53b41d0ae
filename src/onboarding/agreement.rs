//! Investor agreement records

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bank account the investor will fund from and receive distributions to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_holder: String,
    pub bank_name: String,
    pub iban: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift: Option<String>,
}

/// Persisted proof that the investor accepted terms, supplied bank details
/// and picked a property shortlist. Presence alone means "agreement complete".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRecord {
    pub agreed: bool,
    pub bank_details: BankDetails,
    pub shortlist: BTreeSet<String>,
    pub submitted_at: String,
}

/// Raw agreement form as submitted by the investor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSubmission {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub agreed: bool,
    #[serde(default, alias = "bank")]
    pub bank_details: BankDetails,
    #[serde(default)]
    pub shortlist: Vec<String>,
}

impl AgreementSubmission {
    /// Validate the form and normalize it into a storable record
    pub fn into_record(self, submitted_at: String) -> Result<AgreementRecord> {
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("Email is required.".to_string()));
        }
        if !self.agreed {
            return Err(AppError::Validation(
                "You must accept the investor agreement.".to_string(),
            ));
        }

        let bank = self.bank_details;
        let account_holder = bank.account_holder.trim().to_string();
        let bank_name = bank.bank_name.trim().to_string();
        let iban = strip_whitespace(&bank.iban);
        if account_holder.is_empty() || bank_name.is_empty() || iban.is_empty() {
            return Err(AppError::Validation("Bank details are required.".to_string()));
        }
        let swift = bank
            .swift
            .as_deref()
            .map(strip_whitespace)
            .filter(|s| !s.is_empty());

        let shortlist: BTreeSet<String> = self
            .shortlist
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if shortlist.is_empty() {
            return Err(AppError::Validation(
                "Select at least one property of interest.".to_string(),
            ));
        }

        Ok(AgreementRecord {
            agreed: true,
            bank_details: BankDetails {
                account_holder,
                bank_name,
                iban,
                swift,
            },
            shortlist,
            submitted_at,
        })
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

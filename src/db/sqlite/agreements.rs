//! Investor agreement storage

use crate::error::Result;
use crate::onboarding::{AgreementRecord, BankDetails};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// Get the agreement for a member, if one was submitted
pub fn get_agreement(conn: &Connection, email: &str) -> Result<Option<AgreementRecord>> {
    let result = conn.query_row(
        "SELECT agreed, account_holder, bank_name, iban, swift, shortlist, submitted_at
         FROM agreements WHERE email = ?1",
        params![email],
        |row| {
            Ok((
                row.get::<_, i32>(0)? == 1,
                BankDetails {
                    account_holder: row.get(1)?,
                    bank_name: row.get(2)?,
                    iban: row.get(3)?,
                    swift: row.get(4)?,
                },
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        },
    );

    match result {
        Ok((agreed, bank_details, shortlist, submitted_at)) => {
            let shortlist: BTreeSet<String> = serde_json::from_str(&shortlist)?;
            Ok(Some(AgreementRecord {
                agreed,
                bank_details,
                shortlist,
                submitted_at,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert or replace the agreement for a member
pub fn save_agreement(conn: &Connection, email: &str, record: &AgreementRecord) -> Result<()> {
    let shortlist = serde_json::to_string(&record.shortlist)?;
    let bank = &record.bank_details;

    conn.execute(
        r#"
        INSERT INTO agreements (email, agreed, account_holder, bank_name, iban, swift, shortlist, submitted_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(email) DO UPDATE SET
            agreed = excluded.agreed,
            account_holder = excluded.account_holder,
            bank_name = excluded.bank_name,
            iban = excluded.iban,
            swift = excluded.swift,
            shortlist = excluded.shortlist,
            submitted_at = excluded.submitted_at
        "#,
        params![
            email,
            record.agreed as i32,
            bank.account_holder,
            bank.bank_name,
            bank.iban,
            bank.swift,
            shortlist,
            record.submitted_at
        ],
    )?;

    tracing::info!("Saved investor agreement for {}", email);
    Ok(())
}

//! KYC document status and batch submission flag

use crate::error::Result;
use crate::onboarding::{DocumentSlot, DocumentStatus, DocumentStatusMap};
use rusqlite::{params, Connection};

/// Load slot statuses for a member. Rows with unknown slots or statuses are skipped.
pub fn get_document_status(conn: &Connection, email: &str) -> Result<DocumentStatusMap> {
    let mut stmt = conn.prepare("SELECT slot, status FROM document_status WHERE email = ?1")?;

    let rows: Vec<(String, String)> = stmt
        .query_map(params![email], |row| Ok((row.get(0)?, row.get(1)?)))?
        .filter_map(|r| match r {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!("Skipping unreadable document row for {}: {}", email, e);
                None
            }
        })
        .collect();

    let map = rows
        .into_iter()
        .filter_map(|(slot, status)| match (slot.parse::<DocumentSlot>(), status.parse::<DocumentStatus>()) {
            (Ok(slot), Ok(status)) => Some((slot, status)),
            _ => {
                tracing::warn!("Skipping document row {}={} for {}", slot, status, email);
                None
            }
        })
        .collect();

    Ok(map)
}

/// Upsert the status of one slot
pub fn set_document_status(
    conn: &Connection,
    email: &str,
    slot: DocumentSlot,
    status: DocumentStatus,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO document_status (email, slot, status) VALUES (?1, ?2, ?3)
        ON CONFLICT(email, slot) DO UPDATE SET status = excluded.status, updated_at = datetime('now')
        "#,
        params![email, slot.as_str(), status.as_str()],
    )?;
    Ok(())
}

/// Whether the document batch was submitted
pub fn is_submitted(conn: &Connection, email: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM document_submissions WHERE email = ?1)",
        params![email],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Record the submission. Keeps the original timestamp on repeat calls.
pub fn mark_submitted(conn: &Connection, email: &str) -> Result<()> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO document_submissions (email) VALUES (?1)",
        params![email],
    )?;
    if rows > 0 {
        tracing::info!("Documents submitted for {}", email);
    }
    Ok(())
}

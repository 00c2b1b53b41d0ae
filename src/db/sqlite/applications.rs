//! Investment application records
//!
//! List-valued preferences are stored as JSON text columns.

use crate::db::sqlite::models::{Application, NewApplication};
use crate::error::Result;
use rusqlite::{params, Connection, Row};

const SELECT_COLUMNS: &str = "id, application_id, member_email, full_name, path, properties, cities,
    budget_range, share_range, investment_goals, timeline, property_types, risk_tolerance,
    budget_min, budget_max, status, kyc_status, documents_status, created_at";

/// Insert a new application in the pending state
pub fn create_application(conn: &Connection, application: &NewApplication) -> Result<Application> {
    conn.execute(
        r#"
        INSERT INTO applications (
            application_id, member_email, full_name, path, properties, cities, budget_range,
            share_range, investment_goals, timeline, property_types, risk_tolerance,
            budget_min, budget_max
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            application.application_id,
            application.member_email,
            application.full_name,
            application.path,
            serde_json::to_string(&application.properties)?,
            serde_json::to_string(&application.cities)?,
            application.budget_range,
            application.share_range,
            serde_json::to_string(&application.investment_goals)?,
            application.timeline,
            serde_json::to_string(&application.property_types)?,
            application.risk_tolerance,
            application.budget_min,
            application.budget_max,
        ],
    )?;

    tracing::info!(
        "Created application {} for {}",
        application.application_id,
        application.member_email
    );

    let id = conn.last_insert_rowid();
    let sql = format!("SELECT {} FROM applications WHERE id = ?1", SELECT_COLUMNS);
    let row = conn.query_row(&sql, params![id], read_row)?;
    row.into_application()
}

/// Most recent application for a member
pub fn get_application_by_email(conn: &Connection, email: &str) -> Result<Option<Application>> {
    let sql = format!(
        "SELECT {} FROM applications WHERE member_email = ?1 ORDER BY id DESC LIMIT 1",
        SELECT_COLUMNS
    );

    match conn.query_row(&sql, params![email], read_row) {
        Ok(row) => Ok(Some(row.into_application()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Update the documents status on every application of a member
pub fn update_documents_status(conn: &Connection, email: &str, status: &str) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE applications SET documents_status = ?1 WHERE member_email = ?2",
        params![status, email],
    )?;
    Ok(rows > 0)
}

/// Row with JSON columns still encoded
struct ApplicationRow {
    application: Application,
    properties: String,
    cities: String,
    investment_goals: String,
    property_types: String,
}

impl ApplicationRow {
    fn into_application(self) -> Result<Application> {
        let mut application = self.application;
        application.properties = decode_list(&self.properties)?;
        application.cities = decode_list(&self.cities)?;
        application.investment_goals = decode_list(&self.investment_goals)?;
        application.property_types = decode_list(&self.property_types)?;
        Ok(application)
    }
}

fn decode_list(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<ApplicationRow> {
    Ok(ApplicationRow {
        application: Application {
            id: row.get(0)?,
            application_id: row.get(1)?,
            member_email: row.get(2)?,
            full_name: row.get(3)?,
            path: row.get(4)?,
            properties: Vec::new(),
            cities: Vec::new(),
            budget_range: row.get(7)?,
            share_range: row.get(8)?,
            investment_goals: Vec::new(),
            timeline: row.get(10)?,
            property_types: Vec::new(),
            risk_tolerance: row.get(12)?,
            budget_min: row.get(13)?,
            budget_max: row.get(14)?,
            status: row.get(15)?,
            kyc_status: row.get(16)?,
            documents_status: row.get(17)?,
            created_at: row.get(18)?,
        },
        properties: row.get(5)?,
        cities: row.get(6)?,
        investment_goals: row.get(9)?,
        property_types: row.get(11)?,
    })
}

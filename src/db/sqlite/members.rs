//! Member management

use crate::db::sqlite::models::{Member, NewMember};
use crate::error::{AppError, Result};
use crate::security::SecurityManager;
use rusqlite::{params, Connection};

/// Verify member credentials
pub fn verify_member(
    conn: &Connection,
    email: &str,
    password: &str,
    security: &SecurityManager,
) -> Result<Option<Member>> {
    let result = conn.query_row(
        "SELECT id, email, full_name, phone, country, is_admin, created_at, password_hash
         FROM members WHERE email = ?",
        [email],
        |row| {
            Ok((
                Member {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    full_name: row.get(2)?,
                    phone: row.get(3)?,
                    country: row.get(4)?,
                    is_admin: row.get::<_, i32>(5)? == 1,
                    created_at: row.get(6)?,
                },
                row.get::<_, String>(7)?,
            ))
        },
    );

    match result {
        Ok((member, password_hash)) => {
            if password_hash.is_empty() {
                return Ok(None);
            }
            if security.verify_password(password, &password_hash)? {
                Ok(Some(member))
            } else {
                Ok(None)
            }
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Create a new member
pub fn create_member(
    conn: &Connection,
    member: &NewMember,
    password: &str,
    security: &SecurityManager,
) -> Result<Member> {
    if member_exists(conn, &member.email)? {
        return Err(AppError::Conflict(
            "An account with this email already exists.".to_string(),
        ));
    }

    let password_hash = security.hash_password(password)?;

    conn.execute(
        "INSERT INTO members (email, full_name, phone, country, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            member.email,
            member.full_name,
            member.phone,
            member.country,
            password_hash
        ],
    )?;

    let id = conn.last_insert_rowid();

    Ok(Member {
        id,
        email: member.email.clone(),
        full_name: member.full_name.clone(),
        phone: member.phone.clone(),
        country: member.country.clone(),
        is_admin: false,
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Check whether a member is registered under an email
pub fn member_exists(conn: &Connection, email: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM members WHERE email = ?)",
        [email],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Grant or revoke admin access
pub fn set_admin(conn: &Connection, email: &str, is_admin: bool) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE members SET is_admin = ?1, updated_at = datetime('now') WHERE email = ?2",
        params![is_admin as i32, email],
    )?;
    Ok(rows > 0)
}

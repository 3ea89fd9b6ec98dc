// src/auth/sessions.rs
//
// Identity is delegated: an external login layer issues sessions with
// `create_session`; this crate only resolves them to a username.
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::errors::StoreError;

pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7; // 7 days

pub fn create_session(conn: &Connection, username: &str, now: i64) -> Result<String, StoreError> {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);

    let raw_token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw);

    let hash = Sha256::digest(raw_token.as_bytes());
    let expires_at = now + SESSION_TTL_SECS;

    conn.execute(
        r#"
        insert into sessions (username, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![username, hash.as_slice(), now, expires_at],
    )?;

    Ok(raw_token)
}

/// Username for a live (unexpired, unrevoked) session token.
pub fn load_user_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<String>, StoreError> {
    let hash = Sha256::digest(raw_token.as_bytes());

    Ok(conn
        .query_row(
            r#"
        select username
        from sessions
        where token_hash = ?
          and expires_at > ?
          and revoked_at is null
        "#,
            params![hash.as_slice(), now],
            |row| row.get(0),
        )
        .optional()?)
}

/// Value of cookie `name` in a raw `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

//! SQL schema for the Registrar SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS terms (
    term_id             TEXT PRIMARY KEY,
    starts_on           TEXT NOT NULL,    -- ISO 8601 date
    ends_on             TEXT NOT NULL,
    next_term_starts_on TEXT,             -- start date of the successor term, or NULL
    days_open           INTEGER NOT NULL,
    session             TEXT NOT NULL,    -- e.g. '2024/2025'
    term                TEXT NOT NULL,    -- 'first' | 'second' | 'third'
    status              TEXT NOT NULL,    -- 'active' | 'inactive'
    created_at          TEXT NOT NULL,    -- RFC 3339 UTC; server-assigned
    UNIQUE (session, term)
);

CREATE INDEX IF NOT EXISTS terms_starts_on_idx ON terms(starts_on);
CREATE INDEX IF NOT EXISTS terms_status_idx    ON terms(status);

PRAGMA user_version = 1;
";

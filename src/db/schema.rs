//! Database schema and migrations for filehub.
//!
//! Migrations are applied in order when the database is first opened or
//! upgraded; `schema_version` records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: owners
    r#"
-- Owners of uploaded files. Ids are random 8-digit numbers.
CREATE TABLE users (
    id          INTEGER PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL,           -- login key, checked at registration
    password    TEXT NOT NULL,           -- as produced by the password scheme
    gender      TEXT NOT NULL DEFAULT ''
);

CREATE INDEX idx_users_email ON users(email);
"#,
    // v2: file records
    r#"
CREATE TABLE files (
    id              INTEGER PRIMARY KEY,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    storage_locator TEXT NOT NULL UNIQUE,
    public_url      TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    owner_id        INTEGER NOT NULL REFERENCES users(id)
);

CREATE INDEX idx_files_owner_id ON files(owner_id);
"#,
];

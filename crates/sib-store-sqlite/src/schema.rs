//! SQL schema for the social graph SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT UNIQUE,     -- NULL until linked; at least one of
    phone         TEXT UNIQUE,     -- email/phone is set at registration
    password_hash TEXT NOT NULL,   -- PHC string; plaintext never stored
    image_url     TEXT,
    friend_count  INTEGER NOT NULL DEFAULT 0 CHECK (friend_count >= 0),
    created_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- One friendship is two directed rows, (a,b) and (b,a), written in the
-- same transaction as the friend_count updates on both users.
CREATE TABLE IF NOT EXISTS friend_edges (
    user_id   TEXT NOT NULL REFERENCES users(user_id),
    friend_id TEXT NOT NULL REFERENCES users(user_id),
    PRIMARY KEY (user_id, friend_id),
    CHECK (user_id != friend_id)
);

CREATE TABLE IF NOT EXISTS posts (
    post_id    TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES users(user_id),
    body_html  TEXT NOT NULL,   -- entity-escaped at creation
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS post_tags (
    post_id TEXT NOT NULL REFERENCES posts(post_id),
    tag     TEXT NOT NULL,
    PRIMARY KEY (post_id, tag)
);

-- Comments are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS post_comments (
    comment_id TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(post_id),
    author_id  TEXT NOT NULL REFERENCES users(user_id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_author_idx   ON posts(author_id);
CREATE INDEX IF NOT EXISTS posts_created_idx  ON posts(created_at);
CREATE INDEX IF NOT EXISTS comments_post_idx  ON post_comments(post_id);

PRAGMA user_version = 1;
";

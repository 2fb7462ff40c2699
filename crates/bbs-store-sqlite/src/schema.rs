//! SQL schema for the board's SQLite store.
//!
//! Executed once at connection startup. Column names and order match each
//! entity's `COLUMNS` list in `bbs-core`; the store reads and writes rows
//! purely from that list. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS members (
    member_id      TEXT PRIMARY KEY,
    username       TEXT NOT NULL UNIQUE,   -- stored lowercase
    email          TEXT NOT NULL,
    display_name   TEXT,
    role           TEXT NOT NULL,          -- 'member' | 'moderator' | 'administrator'
    account_status TEXT NOT NULL,          -- 'active' | 'suspended' | 'disabled'
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

-- Kept apart from `members` so that member rows never carry a hash.
CREATE TABLE IF NOT EXISTS credentials (
    member_id     TEXT PRIMARY KEY REFERENCES members(member_id),
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT                       -- soft delete
);

CREATE TABLE IF NOT EXISTS topics (
    topic_id    TEXT PRIMARY KEY,
    category_id TEXT NOT NULL REFERENCES categories(category_id),
    author_id   TEXT NOT NULL REFERENCES members(member_id),
    title       TEXT NOT NULL,
    body        TEXT NOT NULL,
    status      TEXT NOT NULL,             -- 'open' | 'locked' | 'pinned'
    tags        TEXT NOT NULL DEFAULT '[]', -- JSON array of tag names
    reply_count INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS replies (
    reply_id   TEXT PRIMARY KEY,
    topic_id   TEXT NOT NULL REFERENCES topics(topic_id),
    author_id  TEXT NOT NULL REFERENCES members(member_id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id     TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    report_id   TEXT PRIMARY KEY,
    reporter_id TEXT NOT NULL REFERENCES members(member_id),
    target_kind TEXT NOT NULL,             -- 'topic' | 'reply'
    target_id   TEXT NOT NULL,
    reason      TEXT NOT NULL,
    status      TEXT NOT NULL,             -- 'pending' | 'resolved' | 'dismissed'
    resolved_by TEXT REFERENCES members(member_id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Append-only audit trail.
CREATE TABLE IF NOT EXISTS moderation_actions (
    action_id    TEXT PRIMARY KEY,
    moderator_id TEXT NOT NULL REFERENCES members(member_id),
    report_id    TEXT REFERENCES reports(report_id),
    kind         TEXT NOT NULL,
    target_kind  TEXT NOT NULL,
    target_id    TEXT NOT NULL,
    note         TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suspensions (
    suspension_id TEXT PRIMARY KEY,
    member_id     TEXT NOT NULL REFERENCES members(member_id),
    moderator_id  TEXT NOT NULL REFERENCES members(member_id),
    reason        TEXT NOT NULL,
    ends_at       TEXT,                    -- NULL = indefinite
    lifted_at     TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Names are unique under Unicode case folding; `fold` is registered by the
-- store before this script runs.
CREATE UNIQUE INDEX IF NOT EXISTS categories_name_key ON categories(fold(name));
CREATE UNIQUE INDEX IF NOT EXISTS tags_name_key       ON tags(fold(name));

CREATE INDEX IF NOT EXISTS topics_category_idx   ON topics(category_id);
CREATE INDEX IF NOT EXISTS topics_created_idx    ON topics(created_at);
CREATE INDEX IF NOT EXISTS replies_topic_idx     ON replies(topic_id);
CREATE INDEX IF NOT EXISTS reports_target_idx    ON reports(target_id);
CREATE INDEX IF NOT EXISTS suspensions_member_idx ON suspensions(member_id);

PRAGMA user_version = 1;
";

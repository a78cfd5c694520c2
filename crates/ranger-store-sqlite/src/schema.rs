//! SQL schema for the Ranger SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sites (
    site_id   INTEGER PRIMARY KEY,
    code      TEXT NOT NULL UNIQUE,
    name      TEXT,
    block     INTEGER NOT NULL,
    tenure    TEXT NOT NULL,   -- 'private' | 'public'
    forest    TEXT NOT NULL,   -- 'dry' | 'wet'
    location  TEXT             -- WKT 'POINT(lon lat)' or NULL
);

CREATE TABLE IF NOT EXISTS species (
    species_id      INTEGER PRIMARY KEY,
    scientific_name TEXT NOT NULL UNIQUE,
    common_name     TEXT NOT NULL,
    native          INTEGER NOT NULL,   -- boolean
    taxa            TEXT NOT NULL,      -- closed enum, lower-case token
    indicator       INTEGER NOT NULL,
    reportable      INTEGER NOT NULL
);

-- Observations are append-only fact rows.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS observations (
    observation_id   INTEGER PRIMARY KEY,
    site_id          INTEGER NOT NULL REFERENCES sites(site_id),
    species_id       INTEGER NOT NULL REFERENCES species(species_id),
    timestamp        TEXT NOT NULL,     -- RFC 3339 UTC
    method           TEXT NOT NULL,     -- 'audio' | 'camera' | 'observed'
    appearance_start INTEGER,
    appearance_end   INTEGER,
    temperature      INTEGER,
    narrative        TEXT,
    confidence       REAL
);

CREATE INDEX IF NOT EXISTS observations_site_idx      ON observations(site_id);
CREATE INDEX IF NOT EXISTS observations_species_idx   ON observations(species_id);
CREATE INDEX IF NOT EXISTS observations_timestamp_idx ON observations(timestamp);

PRAGMA user_version = 1;
";

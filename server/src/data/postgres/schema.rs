//! PostgreSQL schema definitions
//!
//! Baseline schema (version 1). Constraint names are fixed because the API
//! maps them to client messages.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Name recorded for the baseline in `schema_migrations`
pub const BASELINE_NAME: &str = "baseline";

/// Complete schema SQL for PostgreSQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at BIGINT NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success BOOLEAN NOT NULL DEFAULT TRUE
);

-- =============================================================================
-- 1. Beers
-- =============================================================================
CREATE TABLE IF NOT EXISTS beers (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(60) NOT NULL,
    style VARCHAR(50),
    abv NUMERIC(3, 1) NOT NULL CONSTRAINT beers_abv_check CHECK (abv >= 0),
    price NUMERIC(6, 2) NOT NULL CONSTRAINT beers_price_check CHECK (price > 0)
);

-- =============================================================================
-- 2. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(60) NOT NULL,
    email VARCHAR(60) NOT NULL CONSTRAINT users_email_key UNIQUE,
    password VARCHAR(128) NOT NULL,
    address VARCHAR(60),
    phone VARCHAR(12)
);

-- =============================================================================
-- 3. Orders (references beers + users)
-- =============================================================================
CREATE TABLE IF NOT EXISTS orders (
    id BIGSERIAL PRIMARY KEY,
    beer_id BIGINT NOT NULL CONSTRAINT orders_beer_id_fkey REFERENCES beers(id),
    user_id BIGINT NOT NULL CONSTRAINT orders_user_id_fkey REFERENCES users(id),
    qty INTEGER NOT NULL,
    ordered_at TIMESTAMPTZ NOT NULL,
    price_paid NUMERIC(8, 2) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_beer ON orders(beer_id);
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

-- =============================================================================
-- 4. Stock (one row per beer)
-- =============================================================================
CREATE TABLE IF NOT EXISTS stock (
    id BIGSERIAL PRIMARY KEY,
    beer_id BIGINT NOT NULL
        CONSTRAINT stock_beer_id_key UNIQUE
        CONSTRAINT stock_beer_id_fkey REFERENCES beers(id),
    date_of_arrival DATE NOT NULL,
    qty_in_stock INTEGER NOT NULL
);
"#;

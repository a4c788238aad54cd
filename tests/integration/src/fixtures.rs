//! Test fixtures: tables with the key shapes the installer has to handle
//!
//! All builders take the quoted schema name returned by `TestSchema::name`.

/// `orders`: SERIAL key, three rows (ids 1..=3)
pub fn orders_table(schema: &str) -> String {
    format!(
        r"CREATE TABLE {schema}.orders (
    id       SERIAL PRIMARY KEY,
    customer TEXT    NOT NULL,
    total    NUMERIC NOT NULL,
    tags     TEXT[]  NOT NULL DEFAULT '{{}}'
);
INSERT INTO {schema}.orders (customer, total, tags) VALUES
    ('alice', 12.50, ARRAY['rush']),
    ('bob',   99.00, ARRAY[]::TEXT[]),
    ('carol',  3.10, ARRAY['gift', 'rush']);"
    )
}

/// `notes`: BIGINT key, two rows (ids 10 and 20)
pub fn notes_table(schema: &str) -> String {
    format!(
        r"CREATE TABLE {schema}.notes (
    id   BIGINT PRIMARY KEY,
    body TEXT
);
INSERT INTO {schema}.notes VALUES (10, 'first'), (20, NULL);"
    )
}

/// `order_tags`: composite key, never audited
pub fn composite_key_table(schema: &str) -> String {
    format!(
        r"CREATE TABLE {schema}.order_tags (
    order_id INTEGER,
    tag      TEXT,
    PRIMARY KEY (order_id, tag)
);"
    )
}

/// `alembic_version`: migration bookkeeping, excluded by the default patterns
pub fn migration_table(schema: &str) -> String {
    format!(
        r"CREATE TABLE {schema}.alembic_version (
    id          INTEGER PRIMARY KEY,
    version_num TEXT NOT NULL
);
INSERT INTO {schema}.alembic_version VALUES (1, 'abc123');"
    )
}

/// `name`: INTEGER key with rows `1..=rows`
pub fn numbered_table(schema: &str, name: &str, rows: i32) -> String {
    format!(
        r#"CREATE TABLE {schema}."{name}" (id INTEGER PRIMARY KEY, label TEXT NOT NULL);
INSERT INTO {schema}."{name}" SELECT g, 'row ' || g FROM generate_series(1, {rows}) g;"#
    )
}

/// Every fixture table at once
pub fn all_tables(schema: &str) -> String {
    [
        orders_table(schema),
        notes_table(schema),
        composite_key_table(schema),
        migration_table(schema),
    ]
    .join("\n")
}

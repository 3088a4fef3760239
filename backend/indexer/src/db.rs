//! Database layer — migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{CarbonEvent, EventKind, EventRecord, ListingRecord};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events and fold listing-visibility changes into
/// the `listings` snapshot. Events that share the same
/// `(ledger, tx_hash, event_type, project_id)` tuple are silently ignored
/// to make the indexer idempotent.
///
/// The nullable key columns are stored as `''` rather than NULL — SQLite
/// treats NULLs as distinct in UNIQUE indexes, so a NULL `project_id`
/// (auditor / admin events) or a missing tx hash would defeat the
/// deduplication on replay. Reads map `''` back to NULL via `NULLIF`.
///
/// Each event row and its listing effect commit in one transaction, so a
/// crash can never leave an event recorded with its snapshot change lost
/// (a replayed event is ignored and would skip the effect forever).
pub async fn insert_events(pool: &SqlitePool, events: &[CarbonEvent]) -> Result<usize> {
    let mut count = 0usize;
    for ev in events {
        let mut tx = pool.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_type, project_id, actor, counterparty, amount,
                 certificate_id, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ev.event_type)
        .bind(ev.project_id.as_deref().unwrap_or(""))
        .bind(&ev.actor)
        .bind(&ev.counterparty)
        .bind(&ev.amount)
        .bind(&ev.certificate_id)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(ev.tx_hash.as_deref().unwrap_or(""))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected > 0 {
            apply_listing_effect(&mut tx, ev).await?;
        }
        tx.commit().await?;

        count += rows_affected as usize;
    }
    Ok(count)
}

/// Maintain the `listings` snapshot: a `listed` event upserts the row, while
/// `delisted` and `sold` remove it. Only applied for newly inserted events so
/// replays cannot resurrect a withdrawn listing.
async fn apply_listing_effect(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    ev: &CarbonEvent,
) -> Result<()> {
    let Some(project_id) = ev.project_id.as_deref() else {
        return Ok(());
    };

    match ev.event_type.as_str() {
        t if t == EventKind::ProjectListed.as_str() => {
            sqlx::query(
                r#"
                INSERT INTO listings (project_id, seller, price, updated_ledger)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(project_id) DO UPDATE
                SET seller = ?2, price = ?3, updated_ledger = ?4
                "#,
            )
            .bind(project_id)
            .bind(&ev.actor)
            .bind(&ev.amount)
            .bind(ev.ledger)
            .execute(&mut **tx)
            .await?;
        }
        t if t == EventKind::ProjectDelisted.as_str()
            || t == EventKind::ProjectSold.as_str() =>
        {
            sqlx::query("DELETE FROM listings WHERE project_id = ?1")
                .bind(project_id)
                .execute(&mut **tx)
                .await?;
        }
        _ => {}
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given project, ordered by ledger ascending.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, NULLIF(project_id, '') AS project_id, actor,
               counterparty, amount, certificate_id, ledger, timestamp,
               contract_id, NULLIF(tx_hash, '') AS tx_hash, created_at
        FROM   events
        WHERE  project_id = ?1
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, NULLIF(project_id, '') AS project_id, actor,
               counterparty, amount, certificate_id, ledger, timestamp,
               contract_id, NULLIF(tx_hash, '') AS tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch the current active-listing snapshot, cheapest first.
pub async fn get_active_listings(pool: &SqlitePool) -> Result<Vec<ListingRecord>> {
    let rows = sqlx::query_as::<_, ListingRecord>(
        r#"
        SELECT project_id, seller, price, updated_ledger
        FROM   listings
        ORDER  BY CAST(price AS INTEGER) ASC, project_id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

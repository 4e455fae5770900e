//! Grievance table operations

use chrono::{DateTime, Utc};
use grievance_common::{AnalysisData, Error, Grievance, GrievanceRecord, Result, UserInfo};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Columns selected by every read query (grievance LEFT JOIN analysis)
const RECORD_COLUMNS: &str = r#"
    g.id, g.raw_text, g.user_info, g.origin, g.submitted_at,
    a.category, a.sentiment, a.urgency, a.clean_text, a.confidence, a.processed_at
"#;

/// Join target picking the earliest analysis row of each grievance, so every
/// read returns one record per grievance
const EARLIEST_ANALYSIS: &str =
    "analysis_results a ON a.id = (SELECT MIN(id) FROM analysis_results WHERE grievance_id = g.id)";

/// Insert a grievance and return the stored row
///
/// Text is trimmed before storage; empty text is a `Validation` error and
/// nothing is written. `user_info` is stored only if it carries a value.
pub async fn insert_grievance(
    pool: &SqlitePool,
    raw_text: &str,
    user_info: Option<&UserInfo>,
    origin: &str,
) -> Result<Grievance> {
    let text = raw_text.trim();
    if text.is_empty() {
        return Err(Error::Validation(
            "grievance text is empty".to_string(),
        ));
    }

    let user_info = user_info
        .map(UserInfo::normalized)
        .filter(|info| !info.is_empty());
    let user_info_json = user_info
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Storage(format!("Failed to serialize user_info: {}", e)))?;

    let submitted_at = Utc::now();

    let id = sqlx::query(
        r#"
        INSERT INTO user_grievances (raw_text, user_info, origin, submitted_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(text)
    .bind(&user_info_json)
    .bind(origin)
    .bind(submitted_at.to_rfc3339())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(Grievance {
        id,
        raw_text: text.to_string(),
        user_info,
        origin: origin.to_string(),
        submitted_at,
    })
}

/// Load one grievance with its analysis, if any
///
/// `NotFound` if no grievance has this id.
pub async fn find_grievance(pool: &SqlitePool, id: i64) -> Result<GrievanceRecord> {
    let query = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM user_grievances g
        LEFT JOIN {EARLIEST_ANALYSIS}
        WHERE g.id = ?
        "#
    );

    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Grievance not found: {}", id)))?;
    record_from_row(&row)
}

/// Most recent grievances first, analyzed or not
pub async fn recent_grievances(pool: &SqlitePool, limit: i64) -> Result<Vec<GrievanceRecord>> {
    let query = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM user_grievances g
        LEFT JOIN {EARLIEST_ANALYSIS}
        ORDER BY g.submitted_at DESC, g.id DESC
        LIMIT ?
        "#
    );

    let rows = sqlx::query(&query).bind(limit).fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

/// Case-insensitive substring search over the complaint text
pub async fn search_grievances(pool: &SqlitePool, term: &str) -> Result<Vec<GrievanceRecord>> {
    let term = term.trim();
    if term.is_empty() {
        return Err(Error::Validation("search term is empty".to_string()));
    }

    // instr() rather than LIKE so '%' and '_' in the term match literally
    let query = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM user_grievances g
        LEFT JOIN {EARLIEST_ANALYSIS}
        WHERE instr(lower(g.raw_text), lower(?)) > 0
        ORDER BY g.submitted_at DESC, g.id DESC
        "#
    );

    let rows = sqlx::query(&query).bind(term).fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

/// Analyzed grievances with the given category label
pub async fn grievances_by_category(
    pool: &SqlitePool,
    category: &str,
) -> Result<Vec<GrievanceRecord>> {
    let query = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM user_grievances g
        INNER JOIN {EARLIEST_ANALYSIS}
        WHERE a.category = ?
        ORDER BY g.submitted_at DESC, g.id DESC
        "#
    );

    let rows = sqlx::query(&query).bind(category).fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

/// Total number of stored grievances
pub async fn count_grievances(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM user_grievances")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn record_from_row(row: &SqliteRow) -> Result<GrievanceRecord> {
    let user_info: Option<String> = row.try_get("user_info")?;
    let user_info = user_info
        .map(|json| serde_json::from_str::<UserInfo>(&json))
        .transpose()
        .map_err(|e| Error::Storage(format!("Failed to deserialize user_info: {}", e)))?;

    let submitted_at: String = row.try_get("submitted_at")?;

    let category: Option<String> = row.try_get("category")?;
    let (analysis, processed_at) = match category {
        Some(category) => {
            let confidence: Option<String> = row.try_get("confidence")?;
            let confidence = confidence
                .map(|json| serde_json::from_str(&json))
                .transpose()
                .map_err(|e| Error::Storage(format!("Failed to deserialize confidence: {}", e)))?;
            let processed_at: String = row.try_get("processed_at")?;

            let analysis = AnalysisData {
                category,
                sentiment: row.try_get("sentiment")?,
                urgency: row.try_get("urgency")?,
                clean_text: row.try_get("clean_text")?,
                confidence,
            };
            (Some(analysis), Some(parse_timestamp(&processed_at)?))
        }
        None => (None, None),
    };

    Ok(GrievanceRecord {
        id: row.try_get("id")?,
        raw_text: row.try_get("raw_text")?,
        user_info,
        origin: row.try_get("origin")?,
        submitted_at: parse_timestamp(&submitted_at)?,
        analysis,
        processed_at,
    })
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse timestamp '{}': {}", value, e)))
}

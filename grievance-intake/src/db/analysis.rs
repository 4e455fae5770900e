//! Analysis result table operations

use chrono::Utc;
use grievance_common::{AnalysisData, AnalysisResult, Error, Result};
use sqlx::{Row, SqlitePool};

use super::grievances::parse_timestamp;

/// Insert the analysis for an existing grievance
///
/// The grievance must already exist: a missing id is a `Storage` error and
/// nothing is written. Label values are stored as given.
pub async fn insert_analysis_result(
    pool: &SqlitePool,
    grievance_id: i64,
    data: &AnalysisData,
) -> Result<AnalysisResult> {
    let confidence_json = data
        .confidence
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Storage(format!("Failed to serialize confidence: {}", e)))?;
    let processed_at = Utc::now();

    let mut tx = pool.begin().await?;

    let exists: i64 =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_grievances WHERE id = ?)")
            .bind(grievance_id)
            .fetch_one(&mut *tx)
            .await?;
    if exists == 0 {
        return Err(Error::Storage(format!(
            "grievance {} does not exist",
            grievance_id
        )));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO analysis_results
            (grievance_id, category, sentiment, urgency, clean_text, confidence, processed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(grievance_id)
    .bind(&data.category)
    .bind(&data.sentiment)
    .bind(&data.urgency)
    .bind(&data.clean_text)
    .bind(&confidence_json)
    .bind(processed_at.to_rfc3339())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;

    Ok(AnalysisResult {
        id,
        grievance_id,
        category: data.category.clone(),
        sentiment: data.sentiment.clone(),
        urgency: data.urgency.clone(),
        clean_text: data.clean_text.clone(),
        confidence: data.confidence.clone(),
        processed_at,
    })
}

/// All analysis rows linked to a grievance, oldest first
pub async fn analysis_for_grievance(
    pool: &SqlitePool,
    grievance_id: i64,
) -> Result<Vec<AnalysisResult>> {
    let rows = sqlx::query(
        r#"
        SELECT id, grievance_id, category, sentiment, urgency, clean_text, confidence, processed_at
        FROM analysis_results
        WHERE grievance_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(grievance_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<AnalysisResult> {
            let confidence: Option<String> = row.try_get("confidence")?;
            let confidence = confidence
                .map(|json| serde_json::from_str(&json))
                .transpose()
                .map_err(|e| {
                    Error::Storage(format!("Failed to deserialize confidence: {}", e))
                })?;
            let processed_at: String = row.try_get("processed_at")?;

            Ok(AnalysisResult {
                id: row.try_get("id")?,
                grievance_id: row.try_get("grievance_id")?,
                category: row.try_get("category")?,
                sentiment: row.try_get("sentiment")?,
                urgency: row.try_get("urgency")?,
                clean_text: row.try_get("clean_text")?,
                confidence,
                processed_at: parse_timestamp(&processed_at)?,
            })
        })
        .collect()
}

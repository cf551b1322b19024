//! Operator-maintained exclusion keywords.

use sqlx::PgPool;

use crate::DbError;

/// Returns every active keyword, in insertion order.
///
/// Normalisation (case, blanks, duplicates) is left to the caller.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_exclusion_keywords(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let keywords = sqlx::query_scalar::<_, String>(
        "SELECT keyword FROM exclusion_keywords WHERE is_active = true ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(keywords)
}

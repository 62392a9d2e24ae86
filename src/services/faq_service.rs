//! Saved FAQ sets: persistence and export.
//!
//! All queries filter by `user_id`, so a user can never read or delete
//! another user's sets; foreign ids behave exactly like missing ones.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::faq::{CreateFaqSetRequest, Faq, FaqItem, FaqSet, FaqSetResponse},
};

/// A save repeated within this many seconds returns the first set.
const DUPLICATE_WINDOW_SECS: f64 = 5.0;

/// List the user's sets, newest first, each with its items in order.
pub async fn list_sets(pool: &DbPool, user_id: Uuid) -> Result<Vec<FaqSetResponse>, AppError> {
    let sets = sqlx::query_as::<_, FaqSet>(
        r#"
        SELECT id, title, source_url, description, seo_score, created_at
        FROM faq_sets
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let set_ids: Vec<Uuid> = sets.iter().map(|set| set.id).collect();

    let faqs = sqlx::query_as::<_, Faq>(
        r#"
        SELECT id, faq_set_id, question, answer, position
        FROM faqs
        WHERE faq_set_id = ANY($1)
        ORDER BY position ASC
        "#,
    )
    .bind(&set_ids)
    .fetch_all(pool)
    .await?;

    let mut by_set: HashMap<Uuid, Vec<Faq>> = HashMap::new();
    for faq in faqs {
        by_set.entry(faq.faq_set_id).or_default().push(faq);
    }

    Ok(sets
        .into_iter()
        .map(|set| {
            let items = by_set.remove(&set.id).unwrap_or_default();
            FaqSetResponse::new(set, items)
        })
        .collect())
}

/// Save a new set with its items.
///
/// # Process
///
/// 1. Validate the title
/// 2. If a source URL is given, return a set with the same user, URL and
///    title created in the last five seconds instead of inserting again
/// 3. Insert the set and its items in one database transaction
pub async fn create_set(
    pool: &DbPool,
    user_id: Uuid,
    request: CreateFaqSetRequest,
) -> Result<FaqSetResponse, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Title and FAQs are required".to_string(),
        ));
    }

    if let Some(ref source_url) = request.source_url {
        if let Some(existing) = sqlx::query_as::<_, FaqSet>(
            r#"
            SELECT id, title, source_url, description, seo_score, created_at
            FROM faq_sets
            WHERE user_id = $1
              AND source_url = $2
              AND title = $3
              AND created_at >= NOW() - make_interval(secs => $4)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(source_url)
        .bind(&request.title)
        .bind(DUPLICATE_WINDOW_SECS)
        .fetch_optional(pool)
        .await?
        {
            tracing::debug!(faq_set_id = %existing.id, "duplicate save suppressed");
            let items = set_items(pool, existing.id).await?;
            return Ok(FaqSetResponse::new(existing, items));
        }
    }

    let mut tx = pool.begin().await?;

    let set = sqlx::query_as::<_, FaqSet>(
        r#"
        INSERT INTO faq_sets (user_id, title, source_url, description, seo_score)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, source_url, description, seo_score, created_at
        "#,
    )
    .bind(user_id)
    .bind(&request.title)
    .bind(&request.source_url)
    .bind(&request.description)
    .bind(&request.seo_score)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(request.faqs.len());
    for (position, item) in request.faqs.into_iter().enumerate() {
        let faq = sqlx::query_as::<_, Faq>(
            r#"
            INSERT INTO faqs (faq_set_id, user_id, question, answer, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, faq_set_id, question, answer, position
            "#,
        )
        .bind(set.id)
        .bind(user_id)
        .bind(item.question)
        .bind(item.answer)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .fetch_one(&mut *tx)
        .await?;
        items.push(faq);
    }

    tx.commit().await?;

    tracing::info!(faq_set_id = %set.id, items = items.len(), "FAQ set saved");

    Ok(FaqSetResponse::new(set, items))
}

async fn set_items(pool: &DbPool, set_id: Uuid) -> Result<Vec<Faq>, AppError> {
    let items = sqlx::query_as::<_, Faq>(
        r#"
        SELECT id, faq_set_id, question, answer, position
        FROM faqs
        WHERE faq_set_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(set_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Delete a set and (by cascade) its items.
///
/// # Errors
///
/// - `NotFound`: No such set, or it belongs to someone else
pub async fn delete_set(pool: &DbPool, user_id: Uuid, set_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM faq_sets WHERE id = $1 AND user_id = $2")
        .bind(set_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("FAQ set not found or unauthorized"));
    }

    tracing::info!(faq_set_id = %set_id, "FAQ set deleted");

    Ok(())
}

/// The question/answer pairs of one of the user's sets, in order.
pub async fn export_items(
    pool: &DbPool,
    user_id: Uuid,
    set_id: Uuid,
) -> Result<Vec<FaqItem>, AppError> {
    let owned: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM faq_sets WHERE id = $1 AND user_id = $2)")
            .bind(set_id)
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    if !owned {
        return Err(AppError::NotFound("FAQ set not found or unauthorized"));
    }

    Ok(set_items(pool, set_id)
        .await?
        .into_iter()
        .map(|faq| FaqItem {
            question: faq.question,
            answer: faq.answer,
        })
        .collect())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Self-contained HTML snippet, ready to paste into a page.
pub fn render_html(items: &[FaqItem]) -> String {
    let mut html = String::from("<!-- FAQ HTML snippet -->\n<div class=\"faq-container\">\n");

    for item in items {
        html.push_str(&format!(
            "  <div class=\"faq-item\">\n    <h3 class=\"faq-question\">{}</h3>\n    <p class=\"faq-answer\">{}</p>\n  </div>\n",
            escape_html(&item.question),
            escape_html(&item.answer)
        ));
    }

    html.push_str(
        "</div>\n\
         <style>\n\
         .faq-container { max-width: 800px; margin: 0 auto; font-family: sans-serif; }\n\
         .faq-item { margin-bottom: 20px; }\n\
         .faq-question { font-size: 18px; font-weight: bold; margin-bottom: 5px; }\n\
         .faq-answer { font-size: 16px; color: #444; }\n\
         </style>\n",
    );

    html
}

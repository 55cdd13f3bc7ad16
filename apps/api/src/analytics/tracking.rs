//! Selection tracking: one analytics row per recorded selection.
//!
//! Runs on the caller's connection so it shares the selection transaction:
//! the post update and the analytics insert commit or roll back together.

use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use crate::models::analytics::AnalyticsRow;
use crate::models::post::{PostRow, SelectedOption};

/// Recorded when a post has no provider label (should not happen for new posts).
const UNKNOWN_MODEL: &str = "unknown";

/// Metrics derived from a post and the option the user picked.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMetrics {
    pub ai_model: String,
    pub prompt_length: i32,
    pub caption_length: i32,
    pub hashtag_count: i32,
    pub response_time: i32,
}

/// Lengths are counted in characters, not bytes.
pub fn selection_metrics(post: &PostRow, selected: SelectedOption) -> SelectionMetrics {
    let chosen = post.option(selected);
    SelectionMetrics {
        ai_model: post
            .ai_model
            .clone()
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
        prompt_length: count_i32(post.prompt.chars().count()),
        caption_length: count_i32(chosen.caption.chars().count()),
        hashtag_count: count_i32(chosen.hashtags.len()),
        response_time: post.response_time.unwrap_or(0),
    }
}

fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Inserts the analytics row for a selection. `analytics.post_id` is unique,
/// so a second insert for the same post fails instead of double counting.
pub async fn track_selection(
    conn: &mut PgConnection,
    post: &PostRow,
    selected: SelectedOption,
) -> Result<AnalyticsRow, sqlx::Error> {
    let metrics = selection_metrics(post, selected);

    let row = sqlx::query_as::<_, AnalyticsRow>(
        r#"
        INSERT INTO analytics
            (id, post_id, user_id, selected_option, ai_model,
             prompt_length, caption_length, hashtag_count, response_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post.id)
    .bind(post.user_id)
    .bind(selected)
    .bind(&metrics.ai_model)
    .bind(metrics.prompt_length)
    .bind(metrics.caption_length)
    .bind(metrics.hashtag_count)
    .bind(metrics.response_time)
    .fetch_one(conn)
    .await?;

    debug!(
        "Tracked selection {} for post {} (caption_length={}, hashtags={})",
        selected.as_str(),
        post.id,
        metrics.caption_length,
        metrics.hashtag_count
    );

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::{ContentOption, ContentType};
    use chrono::Utc;
    use sqlx::types::Json;

    fn post(ai_model: Option<&str>, response_time: Option<i32>) -> PostRow {
        PostRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            prompt: "Café da manhã".to_string(),
            content_type: ContentType::Post,
            option_a: Json(ContentOption {
                caption: "Bom dia ☕".to_string(),
                hashtags: vec!["cafe".to_string(), "manha".to_string()],
            }),
            option_b: Json(ContentOption {
                caption: "A longer caption for option B".to_string(),
                hashtags: vec!["b".to_string()],
            }),
            selected_option: None,
            ai_model: ai_model.map(String::from),
            response_time,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_metrics_use_selected_option() {
        let p = post(Some("openai"), Some(2400));

        let a = selection_metrics(&p, SelectedOption::A);
        assert_eq!(a.caption_length, 9);
        assert_eq!(a.hashtag_count, 2);

        let b = selection_metrics(&p, SelectedOption::B);
        assert_eq!(b.caption_length, 29);
        assert_eq!(b.hashtag_count, 1);
        assert_eq!(b.ai_model, "openai");
        assert_eq!(b.response_time, 2400);
    }

    #[test]
    fn test_prompt_length_counts_characters() {
        let p = post(Some("google"), Some(10));
        // "Café da manhã" is 13 characters but 15 bytes
        assert_eq!(selection_metrics(&p, SelectedOption::A).prompt_length, 13);
    }

    #[test]
    fn test_missing_model_and_time_defaults() {
        let p = post(None, None);
        let m = selection_metrics(&p, SelectedOption::A);
        assert_eq!(m.ai_model, "unknown");
        assert_eq!(m.response_time, 0);
    }
}

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::post::SelectedOption;

/// One row per recorded selection.
#[derive(Debug, Clone, FromRow)]
pub struct AnalyticsRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub selected_option: SelectedOption,
    pub ai_model: String,
    pub prompt_length: i32,
    pub caption_length: i32,
    pub hashtag_count: i32,
    pub response_time: i32,
    pub created_at: DateTime<Utc>,
}

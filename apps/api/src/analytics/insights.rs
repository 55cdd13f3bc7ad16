//! Analytics aggregations: per-user insights, platform-wide insights, and
//! caption suggestions derived from a user's recent selections.
//!
//! SQL does the grouping; the `build_*` functions turn rows into wire shapes
//! and are kept pure so they can be tested without a database.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analytics::AnalyticsRow;
use crate::models::post::{ContentOption, ContentType, SelectedOption};

/// Posts scanned for popular hashtags.
const HASHTAG_SCAN_LIMIT: i64 = 100;
const POPULAR_HASHTAG_COUNT: usize = 10;
/// Selections considered when suggesting caption shape.
const SUGGESTION_WINDOW: i64 = 20;

const LONG_CAPTION_THRESHOLD: i64 = 150;
const SHORT_CAPTION_THRESHOLD: i64 = 50;

const TIP_LONG: &str = "You tend to prefer longer, story-telling captions. Keep engaging your audience with detailed content!";
const TIP_SHORT: &str = "You prefer concise captions. Consider adding more context occasionally for deeper engagement.";
const TIP_BALANCED: &str = "Your caption length is well-balanced. Keep mixing short and long content for variety!";
const TIP_NO_HISTORY: &str = "Generate a few posts and pick your favourite option to get personalised suggestions.";

// ────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPreference {
    pub option_a: i64,
    pub option_b: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    pub model: String,
    pub count: i64,
    pub avg_response_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageMetrics {
    pub prompt_length: i64,
    pub caption_length: i64,
    pub hashtag_count: i64,
    pub response_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ContentTypeCount {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HourlyCount {
    pub hour: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInsights {
    pub total_posts: i64,
    pub selection_preference: SelectionPreference,
    pub ai_model_usage: Vec<ModelUsage>,
    pub average_metrics: AverageMetrics,
    pub content_type_preference: Vec<ContentTypeCount>,
    pub posts_by_hour: Vec<HourlyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagCount {
    pub tag: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPerformance {
    pub model: String,
    pub usage_count: i64,
    pub avg_response_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInsights {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_selections: i64,
    pub popular_hashtags: Vec<HashtagCount>,
    pub ai_model_performance: Vec<ModelPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    pub ideal_caption_length: i64,
    pub ideal_hashtag_count: i64,
    pub tip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Suggestions,
}

// ────────────────────────────────────────────────────────────────────────────
// Row types
// ────────────────────────────────────────────────────────────────────────────

/// Per-provider count and mean response time (NULL when the group is empty).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ModelStatRow {
    pub ai_model: String,
    pub count: i64,
    pub avg_response_time: Option<f64>,
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct AverageRow {
    pub prompt_length: Option<f64>,
    pub caption_length: Option<f64>,
    pub hashtag_count: Option<f64>,
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentPostRow {
    pub option_a: Json<ContentOption>,
    pub option_b: Json<ContentOption>,
    pub selected_option: Option<SelectedOption>,
}

// ────────────────────────────────────────────────────────────────────────────
// Queries
// ────────────────────────────────────────────────────────────────────────────

async fn model_stats(pool: &PgPool, user_id: Option<Uuid>) -> Result<Vec<ModelStatRow>, sqlx::Error> {
    sqlx::query_as::<_, ModelStatRow>(
        r#"
        SELECT ai_model, COUNT(*) AS count, AVG(response_time)::float8 AS avg_response_time
        FROM analytics
        WHERE ($1::uuid IS NULL OR user_id = $1)
        GROUP BY ai_model
        ORDER BY count DESC, ai_model
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Per-user insights over every selection the user has recorded.
pub async fn user_insights(pool: &PgPool, user_id: Uuid) -> Result<UserInsights, sqlx::Error> {
    let selections = sqlx::query_as::<_, (SelectedOption, i64)>(
        "SELECT selected_option, COUNT(*) FROM analytics WHERE user_id = $1 GROUP BY selected_option",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let models = model_stats(pool, Some(user_id)).await?;

    let averages = sqlx::query_as::<_, AverageRow>(
        r#"
        SELECT
            AVG(prompt_length)::float8  AS prompt_length,
            AVG(caption_length)::float8 AS caption_length,
            AVG(hashtag_count)::float8  AS hashtag_count,
            AVG(response_time)::float8  AS response_time
        FROM analytics
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let content_types = sqlx::query_as::<_, ContentTypeCount>(
        r#"
        SELECT p.content_type, COUNT(a.id) AS count
        FROM analytics a
        JOIN posts p ON a.post_id = p.id
        WHERE a.user_id = $1
        GROUP BY p.content_type
        ORDER BY p.content_type
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let by_hour = sqlx::query_as::<_, HourlyCount>(
        r#"
        SELECT EXTRACT(HOUR FROM a.created_at AT TIME ZONE 'UTC')::int4 AS hour,
               COUNT(*) AS count
        FROM analytics a
        WHERE a.user_id = $1
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(build_user_insights(
        &selections,
        models,
        averages,
        content_types,
        by_hour,
    ))
}

/// Platform-wide totals, popular hashtags and provider performance.
pub async fn global_insights(pool: &PgPool) -> Result<GlobalInsights, sqlx::Error> {
    let (total_users, total_posts, total_selections) = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users),
            (SELECT COUNT(*) FROM posts),
            (SELECT COUNT(*) FROM analytics)
        "#,
    )
    .fetch_one(pool)
    .await?;

    let recent = sqlx::query_as::<_, RecentPostRow>(
        "SELECT option_a, option_b, selected_option FROM posts ORDER BY created_at DESC LIMIT $1",
    )
    .bind(HASHTAG_SCAN_LIMIT)
    .fetch_all(pool)
    .await?;

    let models = model_stats(pool, None).await?;

    Ok(GlobalInsights {
        total_users,
        total_posts,
        total_selections,
        popular_hashtags: popular_hashtags(&recent),
        ai_model_performance: models
            .into_iter()
            .map(|m| ModelPerformance {
                model: m.ai_model,
                usage_count: m.count,
                avg_response_time: round_avg(m.avg_response_time),
            })
            .collect(),
    })
}

/// Suggestions from the user's most recent selections.
pub async fn suggestions(pool: &PgPool, user_id: Uuid) -> Result<SuggestionsResponse, sqlx::Error> {
    let recent = sqlx::query_as::<_, AnalyticsRow>(
        "SELECT * FROM analytics WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(SUGGESTION_WINDOW)
    .fetch_all(pool)
    .await?;

    Ok(SuggestionsResponse {
        suggestions: build_suggestions(&recent),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

/// Rounds a SQL average to the nearest integer; no data → 0.
pub fn round_avg(avg: Option<f64>) -> i64 {
    avg.filter(|v| v.is_finite()).map(|v| v.round() as i64).unwrap_or(0)
}

pub fn build_user_insights(
    selections: &[(SelectedOption, i64)],
    models: Vec<ModelStatRow>,
    averages: AverageRow,
    content_type_preference: Vec<ContentTypeCount>,
    posts_by_hour: Vec<HourlyCount>,
) -> UserInsights {
    let count_for = |option: SelectedOption| {
        selections
            .iter()
            .filter(|(o, _)| *o == option)
            .map(|(_, c)| *c)
            .sum::<i64>()
    };

    UserInsights {
        total_posts: selections.iter().map(|(_, c)| *c).sum(),
        selection_preference: SelectionPreference {
            option_a: count_for(SelectedOption::A),
            option_b: count_for(SelectedOption::B),
        },
        ai_model_usage: models
            .into_iter()
            .map(|m| ModelUsage {
                model: m.ai_model,
                count: m.count,
                avg_response_time: round_avg(m.avg_response_time),
            })
            .collect(),
        average_metrics: AverageMetrics {
            prompt_length: round_avg(averages.prompt_length),
            caption_length: round_avg(averages.caption_length),
            hashtag_count: round_avg(averages.hashtag_count),
            response_time: round_avg(averages.response_time),
        },
        content_type_preference,
        posts_by_hour,
    }
}

/// Counts hashtags of the selected option of each selected post; top 10,
/// highest count first, ties by tag.
pub fn popular_hashtags(posts: &[RecentPostRow]) -> Vec<HashtagCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();

    for post in posts {
        let chosen = match post.selected_option {
            Some(SelectedOption::A) => &post.option_a.0,
            Some(SelectedOption::B) => &post.option_b.0,
            None => continue,
        };
        for tag in &chosen.hashtags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<HashtagCount> = counts
        .into_iter()
        .map(|(tag, count)| HashtagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    ranked.truncate(POPULAR_HASHTAG_COUNT);
    ranked
}

pub fn build_suggestions(recent: &[AnalyticsRow]) -> Suggestions {
    if recent.is_empty() {
        return Suggestions {
            ideal_caption_length: 0,
            ideal_hashtag_count: 0,
            tip: TIP_NO_HISTORY.to_string(),
        };
    }

    let n = recent.len() as f64;
    let caption_total: i64 = recent.iter().map(|a| a.caption_length as i64).sum();
    let hashtag_total: i64 = recent.iter().map(|a| a.hashtag_count as i64).sum();

    let ideal_caption_length = round_avg(Some(caption_total as f64 / n));
    let ideal_hashtag_count = round_avg(Some(hashtag_total as f64 / n));

    Suggestions {
        ideal_caption_length,
        ideal_hashtag_count,
        tip: caption_tip(ideal_caption_length).to_string(),
    }
}

fn caption_tip(avg_caption_length: i64) -> &'static str {
    if avg_caption_length > LONG_CAPTION_THRESHOLD {
        TIP_LONG
    } else if avg_caption_length < SHORT_CAPTION_THRESHOLD {
        TIP_SHORT
    } else {
        TIP_BALANCED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn option(tags: &[&str]) -> Json<ContentOption> {
        Json(ContentOption {
            caption: "caption".to_string(),
            hashtags: tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    fn recent(a: &[&str], b: &[&str], selected: Option<SelectedOption>) -> RecentPostRow {
        RecentPostRow {
            option_a: option(a),
            option_b: option(b),
            selected_option: selected,
        }
    }

    fn analytics(caption_length: i32, hashtag_count: i32) -> AnalyticsRow {
        AnalyticsRow {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            selected_option: SelectedOption::A,
            ai_model: "openai".to_string(),
            prompt_length: 20,
            caption_length,
            hashtag_count,
            response_time: 1500,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_avg() {
        assert_eq!(round_avg(None), 0);
        assert_eq!(round_avg(Some(1234.5)), 1235);
        assert_eq!(round_avg(Some(7.49)), 7);
        assert_eq!(round_avg(Some(f64::NAN)), 0);
    }

    #[test]
    fn test_popular_hashtags_only_counts_selected_option() {
        let posts = vec![
            recent(&["food", "brunch"], &["ignored"], Some(SelectedOption::A)),
            recent(&["ignored"], &["food", "coffee"], Some(SelectedOption::B)),
            recent(&["food", "never"], &["never"], None),
        ];
        let tags = popular_hashtags(&posts);
        assert_eq!(
            tags,
            vec![
                HashtagCount { tag: "food".to_string(), count: 2 },
                HashtagCount { tag: "brunch".to_string(), count: 1 },
                HashtagCount { tag: "coffee".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_popular_hashtags_caps_at_ten() {
        let many: Vec<String> = (0..15).map(|i| format!("tag{i:02}")).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let posts = vec![recent(&refs, &[], Some(SelectedOption::A))];
        let tags = popular_hashtags(&posts);
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0].tag, "tag00");
        assert_eq!(tags[9].tag, "tag09");
    }

    #[test]
    fn test_build_user_insights_empty() {
        let insights = build_user_insights(&[], vec![], AverageRow::default(), vec![], vec![]);
        assert_eq!(insights.total_posts, 0);
        assert_eq!(insights.selection_preference, SelectionPreference::default());
        assert_eq!(insights.average_metrics, AverageMetrics::default());
    }

    #[test]
    fn test_build_user_insights_shape() {
        let insights = build_user_insights(
            &[(SelectedOption::A, 3), (SelectedOption::B, 5)],
            vec![ModelStatRow {
                ai_model: "openai".to_string(),
                count: 8,
                avg_response_time: Some(2100.4),
            }],
            AverageRow {
                prompt_length: Some(42.6),
                caption_length: Some(180.2),
                hashtag_count: Some(7.5),
                response_time: Some(2100.4),
            },
            vec![ContentTypeCount {
                content_type: ContentType::Story,
                count: 8,
            }],
            vec![HourlyCount { hour: 9, count: 8 }],
        );

        assert_eq!(insights.total_posts, 8);
        let value = serde_json::to_value(&insights).unwrap();
        assert_eq!(value["selectionPreference"]["optionA"], 3);
        assert_eq!(value["selectionPreference"]["optionB"], 5);
        assert_eq!(value["aiModelUsage"][0]["avgResponseTime"], 2100);
        assert_eq!(value["averageMetrics"]["promptLength"], 43);
        assert_eq!(value["averageMetrics"]["hashtagCount"], 8);
        assert_eq!(value["contentTypePreference"][0]["type"], "STORY");
        assert_eq!(value["postsByHour"][0]["hour"], 9);
    }

    #[test]
    fn test_suggestions_without_history() {
        let s = build_suggestions(&[]);
        assert_eq!(s.ideal_caption_length, 0);
        assert_eq!(s.ideal_hashtag_count, 0);
        assert_eq!(s.tip, TIP_NO_HISTORY);
    }

    #[test]
    fn test_suggestions_tips_follow_caption_length() {
        let long = build_suggestions(&[analytics(400, 8), analytics(200, 6)]);
        assert_eq!(long.ideal_caption_length, 300);
        assert_eq!(long.ideal_hashtag_count, 7);
        assert_eq!(long.tip, TIP_LONG);

        let short = build_suggestions(&[analytics(30, 5)]);
        assert_eq!(short.tip, TIP_SHORT);

        let balanced = build_suggestions(&[analytics(150, 5), analytics(50, 5)]);
        assert_eq!(balanced.ideal_caption_length, 100);
        assert_eq!(balanced.tip, TIP_BALANCED);
    }

    #[test]
    fn test_suggestions_response_wraps_payload() {
        let value = serde_json::to_value(SuggestionsResponse {
            suggestions: build_suggestions(&[analytics(120, 9)]),
        })
        .unwrap();
        assert_eq!(value["suggestions"]["idealCaptionLength"], 120);
        assert_eq!(value["suggestions"]["idealHashtagCount"], 9);
    }
}

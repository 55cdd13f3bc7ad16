use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Instagram content type a post is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum ContentType {
    Post,
    Story,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "POST",
            ContentType::Story => "STORY",
        }
    }
}

/// Which of the two generated alternatives the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum SelectedOption {
    A,
    B,
}

impl SelectedOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectedOption::A => "A",
            SelectedOption::B => "B",
        }
    }
}

/// One generated alternative: a caption plus hashtags (stored without `#`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentOption {
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub content_type: ContentType,
    pub option_a: Json<ContentOption>,
    pub option_b: Json<ContentOption>,
    pub selected_option: Option<SelectedOption>,
    pub ai_model: Option<String>,
    /// Milliseconds spent generating both options.
    pub response_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRow {
    /// The option matching `selected`.
    pub fn option(&self, selected: SelectedOption) -> &ContentOption {
        match selected {
            SelectedOption::A => &self.option_a.0,
            SelectedOption::B => &self.option_b.0,
        }
    }
}

/// A post joined with the owning user's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    #[sqlx(flatten)]
    pub post: PostRow,
    pub author_full_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// Wire shape of a post returned by every posts endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub prompt: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub option_a: ContentOption,
    pub option_b: ContentOption,
    pub selected_option: Option<SelectedOption>,
    pub ai_model: Option<String>,
    pub response_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user: PostAuthor,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(row: PostWithAuthor) -> Self {
        let PostWithAuthor {
            post,
            author_full_name,
            author_email,
        } = row;
        Self {
            id: post.id,
            prompt: post.prompt,
            content_type: post.content_type,
            option_a: post.option_a.0,
            option_b: post.option_b.0,
            selected_option: post.selected_option,
            ai_model: post.ai_model,
            response_time: post.response_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
            user_id: post.user_id,
            user: PostAuthor {
                id: post.user_id,
                full_name: author_full_name,
                email: author_email,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(selected: Option<SelectedOption>) -> PostWithAuthor {
        PostWithAuthor {
            post: PostRow {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                prompt: "Coffee shop opening".to_string(),
                content_type: ContentType::Story,
                option_a: Json(ContentOption {
                    caption: "Fresh brews today".to_string(),
                    hashtags: vec!["coffee".to_string()],
                }),
                option_b: Json(ContentOption {
                    caption: "Grand opening!".to_string(),
                    hashtags: vec!["opening".to_string(), "local".to_string()],
                }),
                selected_option: selected,
                ai_model: Some("openai".to_string()),
                response_time: Some(1830),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            author_full_name: "Ana Souza".to_string(),
            author_email: "ana@example.com".to_string(),
        }
    }

    #[test]
    fn test_content_type_wire_values() {
        assert_eq!(serde_json::to_value(ContentType::Post).unwrap(), "POST");
        let parsed: ContentType = serde_json::from_str("\"STORY\"").unwrap();
        assert_eq!(parsed, ContentType::Story);
        assert!(serde_json::from_str::<ContentType>("\"REEL\"").is_err());
    }

    #[test]
    fn test_selected_option_rejects_other_letters() {
        assert!(serde_json::from_str::<SelectedOption>("\"C\"").is_err());
        let b: SelectedOption = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(b.as_str(), "B");
    }

    #[test]
    fn test_content_option_hashtags_default_to_empty() {
        let option: ContentOption = serde_json::from_str(r#"{"caption": "Hi"}"#).unwrap();
        assert!(option.hashtags.is_empty());
    }

    #[test]
    fn test_option_accessor_follows_selection() {
        let row = sample_row(None);
        assert_eq!(row.post.option(SelectedOption::B).caption, "Grand opening!");
        assert_eq!(row.post.option(SelectedOption::A).hashtags, vec!["coffee"]);
    }

    #[test]
    fn test_post_response_shape() {
        let response = PostResponse::from(sample_row(Some(SelectedOption::A)));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "STORY");
        assert_eq!(value["selectedOption"], "A");
        assert_eq!(value["optionB"]["hashtags"][1], "local");
        assert_eq!(value["aiModel"], "openai");
        assert_eq!(value["responseTime"], 1830);
        assert_eq!(value["user"]["fullName"], "Ana Souza");
        assert_eq!(value["user"]["id"], value["userId"]);
    }

    #[test]
    fn test_unselected_post_serializes_null() {
        let value = serde_json::to_value(PostResponse::from(sample_row(None))).unwrap();
        assert!(value["selectedOption"].is_null());
    }
}

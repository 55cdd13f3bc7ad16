pub mod analytics;
pub mod post;
pub mod user;

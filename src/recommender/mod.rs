mod service;

pub use service::{APOLOGY_TEXT, RecommendationService, ReplyText};

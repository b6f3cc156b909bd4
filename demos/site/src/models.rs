//! The demo's only model.

use chrono::NaiveDate;
use fbv::db::{Model, ModelMeta, Value};

static ARTICLE: ModelMeta = ModelMeta::new("site", "article");

/// A blog article.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub published: NaiveDate,
    pub is_draft: bool,
}

impl Model for Article {
    fn meta() -> &'static ModelMeta {
        &ARTICLE
    }

    fn pk(&self) -> Value {
        Value::Int(self.id)
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::Int(self.id)),
            ("title", Value::from(self.title.as_str())),
            ("published", Value::Date(self.published)),
            ("is_draft", Value::Bool(self.is_draft)),
        ]
    }
}

/// In-memory articles.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    articles: Vec<Article>,
}

impl ArticleStore {
    pub fn with_sample_data() -> Self {
        let article = |id, title: &str, day, is_draft| Article {
            id,
            title: title.to_string(),
            published: NaiveDate::from_ymd_opt(2024, 3, day).unwrap_or_default(),
            is_draft,
        };
        Self {
            articles: vec![
                article(1, "Function-based views", 1, false),
                article(2, "Rendering JSON", 8, false),
                article(3, "Method flags", 15, true),
            ],
        }
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, id: i64) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }
}

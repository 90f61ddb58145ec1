use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scraped post or comment as stored by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ContentRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_utc: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub emotion_score: Option<f64>,
    #[serde(default)]
    pub pain_score: Option<f64>,
    #[serde(default)]
    pub lead_type: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub roi_weight: Option<f64>,
    #[serde(default)]
    pub community_type: Option<String>,
    #[serde(default, rename = "type")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "type"))]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub insight_processed: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            title: None,
            body: None,
            subreddit: None,
            created_utc: None,
            last_active: None,
            processed_at: None,
            relevance_score: None,
            emotion_score: None,
            pain_score: None,
            lead_type: None,
            tags: None,
            roi_weight: None,
            community_type: None,
            content_type: None,
            insight_processed: false,
            created_at: None,
        }
    }

    /// Community label, treating an empty string as absent.
    pub fn community(&self) -> Option<&str> {
        self.subreddit.as_deref().filter(|s| !s.is_empty())
    }

    /// Comma separated tags, each trimmed. Empty segments are dropped.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Title for list display, falling back to the start of the body.
    pub fn display_title(&self, max_chars: usize) -> String {
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => title.to_string(),
            None => {
                let body = self.body.as_deref().unwrap_or_default();
                format!("{}...", truncate_chars(body, max_chars))
            }
        }
    }

    /// Body shortened to `max_chars`, with an ellipsis when anything was cut.
    pub fn body_excerpt(&self, max_chars: usize) -> Option<String> {
        let body = self.body.as_deref()?;
        let excerpt = truncate_chars(body, max_chars);
        if excerpt.len() < body.len() {
            Some(format!("{}...", excerpt))
        } else {
            Some(excerpt.to_string())
        }
    }
}

/// One month of model spend as recorded by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CostRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub month: String,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub input_tokens: Option<i64>,
    #[serde(default)]
    pub output_tokens: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub monthly_budget: Option<f64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CostRecord {
    pub fn new(id: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            month: month.into(),
            total_cost: None,
            input_tokens: None,
            output_tokens: None,
            model: None,
            monthly_budget: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// The two collections the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Content,
    Cost,
}

impl RecordKind {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Content => &[
                "id",
                "url",
                "title",
                "body",
                "subreddit",
                "created_utc",
                "last_active",
                "processed_at",
                "relevance_score",
                "emotion_score",
                "pain_score",
                "lead_type",
                "tags",
                "roi_weight",
                "community_type",
                "type",
                "insight_processed",
                "created_at",
            ],
            RecordKind::Cost => &[
                "id",
                "month",
                "total_cost",
                "input_tokens",
                "output_tokens",
                "model",
                "monthly_budget",
                "created_at",
                "updated_at",
            ],
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Content => "content",
            RecordKind::Cost => "cost",
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Store timestamps arrive either as RFC 3339 or as naive ISO strings.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value))),
        }
    }
}

/// Column decoders that read null as the column default, matching the
/// `coalesce` casts of the Postgres backend.
pub mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Int(i64),
        Uint(u64),
        Float(f64),
    }

    impl Key {
        fn into_string(self) -> String {
            match self {
                Key::Text(text) => text,
                Key::Int(n) => n.to_string(),
                Key::Uint(n) => n.to_string(),
                Key::Float(n) => n.to_string(),
            }
        }
    }

    /// Identifier given as a string or a number. Null is still an error.
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Key>::deserialize(deserializer)? {
            Some(key) => Ok(key.into_string()),
            None => Err(D::Error::custom("record id is null")),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Key>::deserialize(deserializer)?
            .map(Key::into_string)
            .unwrap_or_default())
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
    }
}

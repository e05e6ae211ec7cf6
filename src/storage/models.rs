use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, SfError};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: u64,
    pub video_url: String,
    pub title: String,
    pub tags: Vec<String>,
}

impl Clip {
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

/// Payload for adding a clip. Field order in [`NewClip::from_value`] is the
/// order in which validation errors are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClip {
    pub video_url: String,
    pub title: String,
    pub tags: Vec<String>,
}

impl NewClip {
    pub fn new(video_url: impl Into<String>, title: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            video_url: video_url.into(),
            title: title.into(),
            tags,
        }
    }

    /// Decode an untyped request body, reporting the first violated rule.
    pub fn from_value(value: &Value) -> Result<NewClip> {
        let obj = value
            .as_object()
            .ok_or_else(|| SfError::invalid("Invalid payload"))?;

        let video_url = match obj.get("videoUrl") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(SfError::invalid("videoUrl required")),
        };

        let title = match obj.get("title") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(SfError::invalid("title required")),
        };

        let tags = match obj.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|t| t.as_str().map(String::from))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| SfError::invalid("tags must contain only strings"))?,
            _ => return Err(SfError::invalid("tags must be array")),
        };

        Ok(NewClip {
            video_url,
            title,
            tags,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.video_url.is_empty() {
            return Err(SfError::invalid("videoUrl required"));
        }
        if self.title.is_empty() {
            return Err(SfError::invalid("title required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl ClipQuery {
    /// Build a query from raw `key=value` pairs. The first occurrence of a
    /// key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        ClipQuery {
            q: first("q").filter(|s| !s.is_empty()).map(String::from),
            tag: first("tag").filter(|s| !s.is_empty()).map(String::from),
            page: first("page").map(parse_number).unwrap_or(0),
            limit: first("limit").map(parse_number).unwrap_or(0),
        }
    }

    pub fn effective_page(&self) -> i64 {
        self.page.max(1)
    }

    /// Zero means "not given"; anything else is clamped to `1..=100`.
    pub fn effective_limit(&self) -> i64 {
        if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.clamp(1, MAX_PAGE_SIZE)
        }
    }

    pub fn offset(&self) -> usize {
        (self.effective_page() - 1).saturating_mul(self.effective_limit()) as usize
    }

    pub fn search_term(&self) -> Option<String> {
        normalized(self.q.as_deref())
    }

    pub fn tag_term(&self) -> Option<String> {
        normalized(self.tag.as_deref())
    }
}

fn normalized(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

// Non-numeric input falls back to the default, like an absent parameter.
fn parse_number(raw: &str) -> i64 {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_clips: usize,
    pub distinct_tags: usize,
    pub tags: Vec<TagCount>,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

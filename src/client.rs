//! Blocking client for the shortflix HTTP API.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::errors::{Result, SfError};
use crate::storage::models::{CatalogStats, Clip, ClipQuery, NewClip};

const SHORTS_PATH: &str = "api/shorts";
const STATS_PATH: &str = "api/stats";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| SfError::Config(format!("invalid API url {:?}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SfError::Config(format!("API url must be http or https: {}", base_url)));
        }
        // Endpoints are joined relative to the base, so a path prefix must end in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SfError::Config(e.to_string()))
    }

    pub fn list(&self, query: &ClipQuery) -> Result<Vec<Clip>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(ref q) = query.q {
            params.push(("q", q.clone()));
        }
        if let Some(ref tag) = query.tag {
            params.push(("tag", tag.clone()));
        }
        if query.page != 0 {
            params.push(("page", query.page.to_string()));
        }
        if query.limit != 0 {
            params.push(("limit", query.limit.to_string()));
        }
        let response = self.http.get(self.endpoint(SHORTS_PATH)?).query(&params).send()?;
        decode(response)
    }

    pub fn add(&self, clip: &NewClip) -> Result<Clip> {
        let response = self.http.post(self.endpoint(SHORTS_PATH)?).json(clip).send()?;
        decode(response)
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        let response = self.http.get(self.endpoint(STATS_PATH)?).send()?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json()?);
    }
    let body = response.text()?;
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });
    Err(SfError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Split comma-separated tags, trimming each and dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

pub fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Apply the add-form checks before anything is sent to the server.
pub fn prepare_new_clip(video_url: &str, title: &str, tags_raw: &str) -> Result<NewClip> {
    let video_url = video_url.trim();
    let title = title.trim();
    if video_url.is_empty() || title.is_empty() {
        return Err(SfError::invalid("Video URL and Title are required."));
    }
    if !is_http_url(video_url) {
        return Err(SfError::invalid("Please enter a valid URL (http/https)."));
    }
    Ok(NewClip::new(video_url, title, parse_tags(tags_raw)))
}

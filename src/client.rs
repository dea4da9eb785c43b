//! HTTP access to the resources endpoint

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::PaperError;
use crate::models::{PaperRecord, ResourcesResponse, SearchFilter};

/// Anything that can answer list and search queries for paper records.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Fetch the unfiltered collection
    async fn list_papers(&self) -> Result<ResourcesResponse, PaperError>;

    /// Fetch the collection filtered by the given form values
    async fn search_papers(&self, filter: &SearchFilter) -> Result<ResourcesResponse, PaperError>;
}

/// Error body some deployments return alongside non-2xx statuses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(alias = "detail")]
    message: String,
}

/// reqwest-backed client for the paper archive
#[derive(Debug, Clone)]
pub struct PaperClient {
    client: Client,
    base_url: Url,
    resources_url: Url,
}

impl PaperClient {
    pub fn new(config: &Config) -> Result<Self, PaperError> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base()?,
            resources_url: config.resources_url()?,
        })
    }

    /// Request for the full collection, no query string
    pub fn list_request(&self) -> RequestBuilder {
        self.client.get(self.resources_url.clone())
    }

    /// Request for a filtered search. All four parameters are always attached.
    pub fn search_request(&self, filter: &SearchFilter) -> RequestBuilder {
        self.client
            .get(self.resources_url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&filter.query_pairs())
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<ResourcesResponse, PaperError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("GET {} -> {}", response.url(), status);

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(PaperError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| PaperError::Decode { source })
    }

    /// Turn a record's `url`/`file` value into an absolute URL.
    ///
    /// Relative media paths are joined onto the base URL.
    pub fn resolve_download_url(&self, target: &str) -> Result<Url, PaperError> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base_url
                .join(target)
                .map_err(|e| PaperError::InvalidUrl(format!("{}: {}", target, e))),
        }
    }

    /// Download the paper file a record points at into `output_dir`
    pub async fn download(&self, record: &PaperRecord, output_dir: &Path) -> Result<PathBuf, PaperError> {
        let target = record
            .download_target()
            .ok_or_else(|| PaperError::MissingDownloadTarget(record.name.clone()))?;
        self.download_file(target, &record.name, output_dir).await
    }

    /// Fetch `target` and save it under `output_dir`, named after the URL path
    pub async fn download_file(
        &self,
        target: &str,
        title: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, PaperError> {
        let url = self.resolve_download_url(target)?;

        info!("Downloading '{}' from {}", title, url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await?;
            return Err(PaperError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let content = response.bytes().await?;

        std::fs::create_dir_all(output_dir)?;
        let output_path = output_dir.join(download_file_name(&url, title));
        std::fs::write(&output_path, content)?;

        info!("Saved {}", output_path.display());
        Ok(output_path)
    }
}

#[async_trait]
impl PaperSource for PaperClient {
    async fn list_papers(&self) -> Result<ResourcesResponse, PaperError> {
        self.fetch(self.list_request()).await
    }

    async fn search_papers(&self, filter: &SearchFilter) -> Result<ResourcesResponse, PaperError> {
        debug!("Searching with {:?}", filter);
        self.fetch(self.search_request(filter)).await
    }
}

/// File name for a download: last URL path segment, else a slug of the title
pub fn download_file_name(url: &Url, fallback_name: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    match segment {
        Some(name) => name,
        None => {
            let slug: String = fallback_name
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect();
            let slug = slug.trim_matches('-');
            if slug.is_empty() {
                "paper.bin".to_string()
            } else {
                format!("{}.bin", slug)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> PaperClient {
        let config = Config::default().with_base_url(Some("http://papers.test:8000"));
        PaperClient::new(&config).unwrap()
    }

    #[test]
    fn test_search_request_query_string() {
        let filter = SearchFilter {
            course: "btech".to_string(),
            session: "2023".to_string(),
            subject: "Data".to_string(),
            semester: "1".to_string(),
        };

        let request = client().search_request(&filter).build().unwrap();
        let url = request.url();
        assert_eq!(url.path(), "/api/resources/");

        let pairs: HashMap<String, String> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs["course"], "btech");
        assert_eq!(pairs["session"], "2023");
        assert_eq!(pairs["subject"], "data");
        assert_eq!(pairs["semester"], "1");
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_search_request_sends_empty_values() {
        let request = client().search_request(&SearchFilter::default()).build().unwrap();
        assert_eq!(
            request.url().query(),
            Some("course=&session=&semester=&subject=")
        );
    }

    #[test]
    fn test_list_request_has_no_query() {
        let request = client().list_request().build().unwrap();
        assert_eq!(request.url().as_str(), "http://papers.test:8000/api/resources/");
        assert!(request.url().query().is_none());
    }

    #[test]
    fn test_resolve_download_url() {
        let client = client();
        assert_eq!(
            client.resolve_download_url("/media/resources/ds.pdf").unwrap().as_str(),
            "http://papers.test:8000/media/resources/ds.pdf"
        );
        assert_eq!(
            client.resolve_download_url("https://cdn.example.com/x.pdf").unwrap().as_str(),
            "https://cdn.example.com/x.pdf"
        );
    }

    #[test]
    fn test_download_file_name() {
        let url = Url::parse("http://papers.test/media/resources/ds-2023.pdf").unwrap();
        assert_eq!(download_file_name(&url, "ignored"), "ds-2023.pdf");

        let bare = Url::parse("http://papers.test/").unwrap();
        assert_eq!(download_file_name(&bare, "B.Tech DBMS Final"), "b-tech-dbms-final.bin");
        assert_eq!(download_file_name(&bare, "???"), "paper.bin");
    }

    #[tokio::test]
    async fn test_download_without_target_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let record = PaperRecord {
            name: "Orphan".to_string(),
            ..Default::default()
        };
        let result = client().download(&record, temp_dir.path()).await;
        assert!(matches!(result, Err(PaperError::MissingDownloadTarget(name)) if name == "Orphan"));
    }
}

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One exam-paper entry as served by the resources endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub course: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub session: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub subject: String,
    /// Sent as either a string or a number by the backend
    #[serde(default, deserialize_with = "text_or_empty")]
    pub semester: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub created_by: String,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<ResourceCategory>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, deserialize_with = "lenient")]
    pub uid: Option<Uuid>,
    #[serde(default, deserialize_with = "timestamp_or_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaperRecord {
    /// Download target: `url` wins over `file`, blank values are skipped
    pub fn download_target(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.file.as_deref().filter(|f| !f.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
}

/// Envelope returned by `GET /api/resources/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcesResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<PaperRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceCategory {
    Note,
    QuestionPaper,
    Presentation,
    Other(String),
}

impl ResourceCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceCategory::Note => "Note",
            ResourceCategory::QuestionPaper => "Question Paper",
            ResourceCategory::Presentation => "Presentation",
            ResourceCategory::Other(s) => s,
        }
    }
}

impl From<String> for ResourceCategory {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "note" => ResourceCategory::Note,
            "question paper" => ResourceCategory::QuestionPaper,
            "presentation" => ResourceCategory::Presentation,
            _ => ResourceCategory::Other(value),
        }
    }
}

impl From<ResourceCategory> for String {
    fn from(value: ResourceCategory) -> Self {
        match value {
            ResourceCategory::Note => "note".to_string(),
            ResourceCategory::QuestionPaper => "question paper".to_string(),
            ResourceCategory::Presentation => "presentation".to_string(),
            ResourceCategory::Other(s) => s,
        }
    }
}

/// File kind of the uploaded resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Video,
    Image,
    Pdf,
    Ppt,
    Doc,
    Docx,
    Xls,
    Xlsx,
    Zip,
    Rar,
    Other(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Video => "Video",
            ResourceType::Image => "Image",
            ResourceType::Pdf => "PDF",
            ResourceType::Ppt => "PPT",
            ResourceType::Doc => "DOC",
            ResourceType::Docx => "DOCX",
            ResourceType::Xls => "XLS",
            ResourceType::Xlsx => "XLSX",
            ResourceType::Zip => "ZIP",
            ResourceType::Rar => "RAR",
            ResourceType::Other(s) => s,
        }
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "video" => ResourceType::Video,
            "image" => ResourceType::Image,
            "pdf" => ResourceType::Pdf,
            "ppt" => ResourceType::Ppt,
            "doc" => ResourceType::Doc,
            "docx" => ResourceType::Docx,
            "xls" => ResourceType::Xls,
            "xlsx" => ResourceType::Xlsx,
            "zip" => ResourceType::Zip,
            "rar" => ResourceType::Rar,
            _ => ResourceType::Other(value),
        }
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Other(s) => s,
            known => known.as_str().to_lowercase(),
        }
    }
}

/// Filter values taken from the search form. Empty means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub course: String,
    pub session: String,
    pub subject: String,
    pub semester: String,
}

impl SearchFilter {
    /// Query parameters for the resources endpoint.
    ///
    /// All four keys are always sent, even when blank. Subject is lower-cased.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("course", self.course.clone()),
            ("session", self.session.clone()),
            ("semester", self.semester.clone()),
            ("subject", self.subject.to_lowercase()),
        ]
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// Decode an optional field, treating anything malformed as absent.
/// Strings are retried as JSON so `"200"` still reads as a number.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value::<T>(v.clone()) {
        Ok(parsed) => Some(parsed),
        Err(_) => match v {
            serde_json::Value::String(s) => serde_json::from_str(&s).ok(),
            _ => None,
        },
    }))
}

/// RFC 3339 timestamps, or naive ones (read as UTC) from servers without time zone support
fn timestamp_or_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(text)) = value else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    Ok(["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive)))
}

fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialization() {
        let sample = r#"{
            "uid": "3b241101-e2bb-4255-8caf-4136c566a962",
            "created_at": "2024-05-01T10:00:00Z",
            "name": "B.Tech Data Structures Mid-Term 2023",
            "description": "Mid-term paper",
            "file": "/media/resources/ds.pdf",
            "category": "question paper",
            "type": "pdf",
            "course": "btech",
            "subject": "Data Structures",
            "session": "2023",
            "semester": 3,
            "created_by": "admin",
            "tags": [{"name": "midterm"}, {"name": "ds"}]
        }"#;

        let record: PaperRecord = serde_json::from_str(sample).unwrap();
        assert_eq!(record.name, "B.Tech Data Structures Mid-Term 2023");
        assert_eq!(record.semester, "3");
        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.tags[1].name, "ds");
        assert_eq!(record.category, Some(ResourceCategory::QuestionPaper));
        assert_eq!(record.resource_type, Some(ResourceType::Pdf));
        assert!(record.uid.is_some());
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let record: PaperRecord =
            serde_json::from_str(r#"{"name": "Physics", "tags": null, "semester": null}"#).unwrap();
        assert!(record.tags.is_empty());
        assert_eq!(record.semester, "");
        assert_eq!(record.course, "");
        assert!(record.download_target().is_none());
    }

    #[test]
    fn test_malformed_extras_do_not_fail_response() {
        let sample = r#"{
            "status": "200",
            "data": [
                {"name": "Naive", "created_at": "2024-05-01T10:00:00.123456", "uid": "not-a-uuid"},
                {"name": "Spaced", "created_at": "2024-05-01 10:00:00"},
                {"name": "Garbage", "created_at": 17, "uid": 42}
            ]
        }"#;

        let response: ResourcesResponse = serde_json::from_str(sample).unwrap();
        assert_eq!(response.status, Some(200));

        let data = response.data.unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(
            data[0].created_at.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00.123456+00:00"
        );
        assert!(data[0].uid.is_none());
        assert_eq!(data[1].created_at.unwrap().to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert!(data[2].created_at.is_none());
        assert!(data[2].uid.is_none());

        let odd: ResourcesResponse =
            serde_json::from_str(r#"{"status": "ok", "data": []}"#).unwrap();
        assert!(odd.status.is_none());
    }

    #[test]
    fn test_download_target_prefers_url() {
        let record = PaperRecord {
            url: Some("https://cdn.example.com/a.pdf".to_string()),
            file: Some("/media/resources/a.pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(record.download_target(), Some("https://cdn.example.com/a.pdf"));

        let file_only = PaperRecord {
            url: Some(String::new()),
            file: Some("/media/resources/a.pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(file_only.download_target(), Some("/media/resources/a.pdf"));
    }

    #[test]
    fn test_response_without_data() {
        let response: ResourcesResponse =
            serde_json::from_str(r#"{"status": 200, "message": "ok"}"#).unwrap();
        assert!(response.data.is_none());
    }

    #[test]
    fn test_query_pairs_always_include_all_keys() {
        let filter = SearchFilter {
            course: "btech".to_string(),
            session: "2023".to_string(),
            subject: "Data".to_string(),
            semester: "1".to_string(),
        };
        let pairs = filter.query_pairs();
        assert_eq!(pairs[0], ("course", "btech".to_string()));
        assert_eq!(pairs[1], ("session", "2023".to_string()));
        assert_eq!(pairs[2], ("semester", "1".to_string()));
        assert_eq!(pairs[3], ("subject", "data".to_string()));

        let empty = SearchFilter::default().query_pairs();
        assert!(empty.iter().all(|(_, v)| v.is_empty()));
        assert_eq!(empty.len(), 4);
    }

    #[test]
    fn test_unknown_category_kept() {
        let category = ResourceCategory::from("Syllabus".to_string());
        assert_eq!(category.as_str(), "Syllabus");
        assert_eq!(String::from(ResourceType::Pdf), "pdf");
    }
}

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

const OFFICE_VIEWER: &str = "https://view.officeapps.live.com/op/embed.aspx";
const OFFICE_EXTENSIONS: &[&str] = &["doc", "docx", "xls", "xlsx", "ppt", "pptx"];
const UNTITLED_DISPLAY: &str = "Untitled file";
pub const KEYWORD_DISPLAY_LIMIT: usize = 4;

/// One search result item as the backend sent it. Fields of an unexpected
/// JSON type read as absent so one odd field never rejects the record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub doc_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub file_paths: Vec<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub snippet: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub keywords: Vec<String>,
}

impl DocumentRecord {
    /// Missing and NaN scores rank as zero.
    pub fn effective_score(&self) -> f64 {
        match self.score {
            Some(score) if !score.is_nan() => score,
            _ => 0.0,
        }
    }

    /// Body excerpt; older backends send it as `summary`.
    pub fn snippet_text(&self) -> Option<&str> {
        self.snippet.as_deref().or(self.summary.as_deref())
    }

    pub fn has_attachable_files(&self) -> bool {
        !self.file_paths.is_empty() || self.kind.as_deref() == Some("file")
    }

    /// First attached file path, falling back to the page url.
    pub fn resolved_url(&self) -> Option<&str> {
        self.file_paths
            .first()
            .map(String::as_str)
            .or(self.url.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Web,
    Pdf,
    Word,
    Excel,
    Ppt,
    Zip,
    File,
}

impl DocType {
    pub const ALL: [DocType; 7] = [
        DocType::Web,
        DocType::Pdf,
        DocType::Word,
        DocType::Excel,
        DocType::Ppt,
        DocType::Zip,
        DocType::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Web => "web",
            DocType::Pdf => "pdf",
            DocType::Word => "word",
            DocType::Excel => "excel",
            DocType::Ppt => "ppt",
            DocType::Zip => "zip",
            DocType::File => "file",
        }
    }

    pub fn parse(raw: &str) -> Option<DocType> {
        let raw = raw.trim();
        DocType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn all() -> BTreeSet<DocType> {
        DocType::ALL.into_iter().collect()
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record augmented with its resolved file url and classified type.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDocument {
    pub record: DocumentRecord,
    pub file_url: Option<String>,
    pub doc_type: DocType,
}

impl CanonicalDocument {
    pub fn from_record(record: DocumentRecord) -> Self {
        let file_url = record.resolved_url().map(ToOwned::to_owned);
        let doc_type = classify(record.kind.as_deref(), file_url.as_deref());
        Self {
            record,
            file_url,
            doc_type,
        }
    }

    pub fn score(&self) -> f64 {
        self.record.effective_score()
    }

    fn link(&self) -> &str {
        self.file_url.as_deref().unwrap_or("")
    }

    fn is_page(&self) -> bool {
        self.record.kind.as_deref() == Some("web")
            || matches!(extension(self.link()).as_str(), "html" | "htm")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewTarget {
    /// Web page, opened as is.
    Page(String),
    /// Office document routed through the online viewer.
    OfficeViewer(String),
    File(String),
}

impl PreviewTarget {
    pub fn as_str(&self) -> &str {
        match self {
            PreviewTarget::Page(link)
            | PreviewTarget::OfficeViewer(link)
            | PreviewTarget::File(link) => link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    Open(String),
    Download(String),
}

impl DownloadTarget {
    pub fn as_str(&self) -> &str {
        match self {
            DownloadTarget::Open(link) | DownloadTarget::Download(link) => link,
        }
    }
}

pub fn classify_type(doc: &CanonicalDocument) -> DocType {
    classify(doc.record.kind.as_deref(), doc.file_url.as_deref())
}

fn classify(kind: Option<&str>, link: Option<&str>) -> DocType {
    if kind == Some("web") {
        return DocType::Web;
    }
    match extension(link.unwrap_or("")).as_str() {
        "pdf" => DocType::Pdf,
        "doc" | "docx" => DocType::Word,
        "xls" | "xlsx" | "csv" => DocType::Excel,
        "ppt" | "pptx" => DocType::Ppt,
        "zip" | "rar" | "7z" => DocType::Zip,
        "html" | "htm" => DocType::Web,
        _ => DocType::File,
    }
}

/// Lowercased text after the last dot; the whole link when there is none.
fn extension(link: &str) -> String {
    link.rsplit('.').next().unwrap_or("").to_lowercase()
}

pub fn preview_target(doc: &CanonicalDocument, origin: &Url) -> Option<PreviewTarget> {
    if doc.is_page() {
        let page = doc.record.url.as_deref().unwrap_or(doc.link());
        return Some(PreviewTarget::Page(page.to_string()));
    }
    let link = doc.link();
    if link.is_empty() {
        return None;
    }
    let base = if link.starts_with("http") {
        link.to_string()
    } else {
        served_path(origin, "file", link)
    };
    if OFFICE_EXTENSIONS.contains(&extension(link).as_str()) {
        let viewer = Url::parse_with_params(OFFICE_VIEWER, &[("src", base.as_str())]).ok()?;
        return Some(PreviewTarget::OfficeViewer(viewer.to_string()));
    }
    Some(PreviewTarget::File(base))
}

pub fn download_target(doc: &CanonicalDocument, origin: &Url) -> Option<DownloadTarget> {
    if doc.is_page() {
        let page = doc.record.url.as_deref().unwrap_or(doc.link());
        return Some(DownloadTarget::Open(page.to_string()));
    }
    let link = doc.link();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("http") {
        Some(DownloadTarget::Download(link.to_string()))
    } else {
        Some(DownloadTarget::Download(served_path(origin, "download", link)))
    }
}

fn served_path(origin: &Url, route: &str, path: &str) -> String {
    let origin = origin.origin().ascii_serialization();
    format!("{origin}/{route}/{}", path.trim_start_matches('/'))
}

pub fn display_title(doc: &CanonicalDocument) -> &str {
    match doc.record.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title,
        _ => UNTITLED_DISPLAY,
    }
}

pub fn score_label(doc: &CanonicalDocument) -> String {
    match doc.record.score {
        Some(score) => format!("{score:.2}"),
        None => "N/A".to_string(),
    }
}

pub fn display_keywords(doc: &CanonicalDocument) -> &[String] {
    let keywords = &doc.record.keywords;
    &keywords[..keywords.len().min(KEYWORD_DISPLAY_LIMIT)]
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    })
}

/// Numbers pass through, numeric strings are parsed, anything else is absent.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Keeps the string and number entries of an array; a non-array is empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(text) => Some(text),
            serde_json::Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc(kind: Option<&str>, url: Option<&str>, files: &[&str]) -> CanonicalDocument {
        CanonicalDocument::from_record(DocumentRecord {
            kind: kind.map(ToOwned::to_owned),
            url: url.map(ToOwned::to_owned),
            file_paths: files.iter().map(|f| f.to_string()).collect(),
            ..DocumentRecord::default()
        })
    }

    fn origin() -> Url {
        Url::parse("http://search.local:5000/api/search").unwrap()
    }

    #[rstest]
    #[case(Some("web"), Some("http://a.edu/x.pdf"), DocType::Web)]
    #[case(None, Some("http://a.edu/x.PDF"), DocType::Pdf)]
    #[case(None, Some("notes.docx"), DocType::Word)]
    #[case(None, Some("grades.csv"), DocType::Excel)]
    #[case(None, Some("slides.pptx"), DocType::Ppt)]
    #[case(None, Some("bundle.7z"), DocType::Zip)]
    #[case(None, Some("http://a.edu/index.htm"), DocType::Web)]
    #[case(None, Some("http://a.edu/"), DocType::File)]
    #[case(Some("file"), None, DocType::File)]
    fn classifies_by_type_then_extension(
        #[case] kind: Option<&str>,
        #[case] url: Option<&str>,
        #[case] expected: DocType,
    ) {
        assert_eq!(doc(kind, url, &[]).doc_type, expected);
    }

    #[test]
    fn file_paths_take_precedence_over_url() {
        let d = doc(None, Some("http://a.edu/page.html"), &["files/a.pdf", "files/b.doc"]);
        assert_eq!(d.file_url.as_deref(), Some("files/a.pdf"));
        assert_eq!(d.doc_type, DocType::Pdf);
        assert_eq!(classify_type(&d), DocType::Pdf);
    }

    #[test]
    fn record_accepts_summary_numeric_id_and_nulls() {
        let raw = r#"{"doc_id": 42, "title": null, "summary": "text", "file_paths": null, "score": 3}"#;
        let record: DocumentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.doc_id.as_deref(), Some("42"));
        assert_eq!(record.title, None);
        assert_eq!(record.snippet_text(), Some("text"));
        assert!(record.file_paths.is_empty());
        assert_eq!(record.effective_score(), 3.0);
    }

    #[test]
    fn snippet_wins_over_summary_when_both_are_sent() {
        let raw = r#"{"title": "B", "snippet": "x", "summary": "y"}"#;
        let record: DocumentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.snippet_text(), Some("x"));
        assert_eq!(record.summary.as_deref(), Some("y"));
    }

    #[test]
    fn odd_field_types_read_as_absent() {
        let raw = r#"{"title": 7, "score": "2.5", "keywords": "a,b",
                      "file_paths": ["a.pdf", null, 3], "type": ["pdf"]}"#;
        let record: DocumentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.title, None);
        assert_eq!(record.score, Some(2.5));
        assert!(record.keywords.is_empty());
        assert_eq!(record.file_paths, vec!["a.pdf".to_string(), "3".to_string()]);
        assert_eq!(record.kind, None);

        let record: DocumentRecord = serde_json::from_str(r#"{"score": true}"#).unwrap();
        assert_eq!(record.effective_score(), 0.0);
    }

    #[test]
    fn page_preview_opens_original_url() {
        let d = doc(Some("web"), Some("http://a.edu/news"), &[]);
        assert_eq!(
            preview_target(&d, &origin()),
            Some(PreviewTarget::Page("http://a.edu/news".into()))
        );
        assert_eq!(
            download_target(&d, &origin()),
            Some(DownloadTarget::Open("http://a.edu/news".into()))
        );
    }

    #[test]
    fn local_files_are_served_from_origin() {
        let d = doc(None, None, &["full/report.pdf"]);
        assert_eq!(
            preview_target(&d, &origin()),
            Some(PreviewTarget::File("http://search.local:5000/file/full/report.pdf".into()))
        );
        assert_eq!(
            download_target(&d, &origin()),
            Some(DownloadTarget::Download(
                "http://search.local:5000/download/full/report.pdf".into()
            ))
        );
    }

    #[test]
    fn office_documents_use_online_viewer() {
        let d = doc(None, None, &["http://a.edu/plan.docx"]);
        let target = preview_target(&d, &origin()).unwrap();
        match target {
            PreviewTarget::OfficeViewer(link) => {
                assert!(link.starts_with(OFFICE_VIEWER));
                assert!(link.contains("src=http%3A%2F%2Fa.edu%2Fplan.docx"));
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn missing_links_yield_no_targets() {
        let d = doc(None, None, &[]);
        assert_eq!(preview_target(&d, &origin()), None);
        assert_eq!(download_target(&d, &origin()), None);
    }

    #[test]
    fn display_helpers() {
        let mut d = doc(None, None, &[]);
        assert_eq!(display_title(&d), UNTITLED_DISPLAY);
        assert_eq!(score_label(&d), "N/A");
        d.record.title = Some("  Course list ".into());
        d.record.score = Some(1.0 / 3.0);
        d.record.keywords = ["a", "b", "c", "d", "e"].map(String::from).to_vec();
        assert_eq!(display_title(&d), "Course list");
        assert_eq!(score_label(&d), "0.33");
        assert_eq!(display_keywords(&d).len(), KEYWORD_DISPLAY_LIMIT);
    }
}

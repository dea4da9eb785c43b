//! Turns paper records into cards and tracks what the results panel shows

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::PaperRecord;

pub const NO_RESULTS_MESSAGE: &str = "No papers found matching your criteria.";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading papers. Please try again later.";
pub const SEARCH_ERROR_MESSAGE: &str = "Error searching papers. Please try again later.";

/// Width of the title column in plain-text cards
const TITLE_WIDTH: usize = 48;

/// Display form of one paper record
#[derive(Debug, Clone, PartialEq)]
pub struct PaperCard {
    pub title: String,
    pub session: String,
    /// Upper-cased course code
    pub course: String,
    pub subject: String,
    pub semester: String,
    pub created_by: String,
    /// Tag badges, already prefixed with `#`
    pub tags: Vec<String>,
    pub download_target: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

impl PaperCard {
    pub fn from_record(record: &PaperRecord) -> Self {
        Self {
            title: record.name.clone(),
            session: record.session.clone(),
            course: record.course.to_uppercase(),
            subject: record.subject.clone(),
            semester: record.semester.clone(),
            created_by: record.created_by.clone(),
            tags: record.tags.iter().map(|t| format!("#{}", t.name)).collect(),
            download_target: record.download_target().map(str::to_string),
            description: record
                .description
                .as_ref()
                .filter(|d| !d.trim().is_empty())
                .cloned(),
            kind: match (&record.category, &record.resource_type) {
                (Some(c), Some(t)) => Some(format!("{} · {}", c.as_str(), t.as_str())),
                (Some(c), None) => Some(c.as_str().to_string()),
                (None, Some(t)) => Some(t.as_str().to_string()),
                (None, None) => None,
            },
        }
    }

    pub fn byline(&self) -> String {
        format!("by {}", self.created_by)
    }

    pub fn tag_line(&self) -> String {
        self.tags.join(" ")
    }

    pub fn download_label(&self) -> &str {
        self.download_target.as_deref().unwrap_or("No download available")
    }

    /// Plain-text rendering used by the CLI
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("{} [{}]", pad_to_width(&self.title, TITLE_WIDTH), self.session),
            format!("  Course:   {}", self.course),
            format!("  Subject:  {}", self.subject),
            format!("  Semester: {}", self.semester),
            format!("  {}", self.byline()),
        ];
        if !self.tags.is_empty() {
            lines.push(format!("  {}", self.tag_line()));
        }
        lines.push(format!("  Download: {}", self.download_label()));
        lines.join("\n")
    }
}

/// Message shown in place of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notice {
    pub visible: bool,
    pub text: String,
}

/// The results area: a notice line plus the card list
#[derive(Debug, Clone, Default)]
pub struct ResultsPanel {
    notice: Notice,
    results_visible: bool,
    cards: Vec<PaperCard>,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the panel contents with one card per record, in order.
    ///
    /// An empty or absent sequence hides the results and shows the no-results notice.
    pub fn render(&mut self, records: Option<&[PaperRecord]>) {
        match records {
            Some(records) if !records.is_empty() => {
                self.notice.visible = false;
                self.results_visible = true;
                self.cards.clear();
                self.cards.extend(records.iter().map(PaperCard::from_record));
            }
            _ => self.show_notice(NO_RESULTS_MESSAGE),
        }
    }

    /// Show an error in place of the results
    pub fn show_error(&mut self, message: &str) {
        self.show_notice(message);
    }

    fn show_notice(&mut self, message: &str) {
        self.notice = Notice {
            visible: true,
            text: message.to_string(),
        };
        self.results_visible = false;
        self.cards.clear();
    }

    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn cards(&self) -> &[PaperCard] {
        &self.cards
    }

    /// Plain-text rendering of the whole panel
    pub fn to_text(&self) -> String {
        if self.notice.visible {
            return self.notice.text.clone();
        }
        let mut out: Vec<String> = self.cards.iter().map(PaperCard::to_text).collect();
        out.push(format!("Total: {} papers", self.cards.len()));
        out.join("\n\n")
    }
}

/// Pad or truncate to an exact display width (Unicode-aware)
pub fn pad_to_width(s: &str, max_width: usize) -> String {
    let display_width = s.width();
    if display_width <= max_width {
        let padding = max_width - display_width;
        format!("{}{}", s, " ".repeat(padding))
    } else {
        let target_width = max_width.saturating_sub(1);
        let mut truncated = String::new();
        let mut current_width = 0;

        for ch in s.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > target_width {
                break;
            }
            truncated.push(ch);
            current_width += ch_width;
        }

        let padding_needed = max_width.saturating_sub(current_width + 1);
        format!("{}…{}", truncated, " ".repeat(padding_needed))
    }
}

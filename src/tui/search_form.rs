//! Search form: course and session selectors, subject and semester inputs, search button

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::SearchFilter;
use crate::tui::ui::{InputField, SelectableList, Styles};

/// Focusable parts of the form, in Tab order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Course,
    Session,
    Subject,
    Semester,
    SearchButton,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Course,
        FormField::Session,
        FormField::Subject,
        FormField::Semester,
        FormField::SearchButton,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FormField::Course => "Course",
            FormField::Session => "Session",
            FormField::Subject => "Subject",
            FormField::Semester => "Semester",
            FormField::SearchButton => "Search",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FormField::Subject | FormField::Semester)
    }
}

/// Selector option. An empty value means "any"; a custom option takes its value from typed text.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub custom: bool,
}

impl SelectOption {
    fn any() -> Self {
        Self {
            label: "Any".to_string(),
            value: String::new(),
            custom: false,
        }
    }

    fn custom() -> Self {
        Self {
            label: "Custom...".to_string(),
            value: String::new(),
            custom: true,
        }
    }
}

pub struct SearchForm {
    pub current: Option<FormField>,
    pub course_list: SelectableList<SelectOption>,
    pub session_list: SelectableList<SelectOption>,
    /// Typed value used while the course selector is on "Custom..."
    pub course_input: InputField,
    pub session_input: InputField,
    pub subject_input: InputField,
    pub semester_input: InputField,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchForm {
    pub fn new() -> Self {
        let mut form = Self {
            current: Some(FormField::Course),
            course_list: SelectableList::new(vec![SelectOption::any(), SelectOption::custom()]),
            session_list: SelectableList::new(vec![SelectOption::any(), SelectOption::custom()]),
            course_input: InputField::new("Course (custom)").with_placeholder("course id"),
            session_input: InputField::new("Session (custom)").with_placeholder("session id"),
            subject_input: InputField::new("Subject").with_placeholder("e.g. data structures"),
            semester_input: InputField::new("Semester").with_placeholder("e.g. 3"),
        };
        form.update_field_focus();
        form
    }

    /// Replace course options with "Any", the given values, and "Custom...", keeping the current pick
    pub fn set_course_options(&mut self, courses: &[String]) {
        replace_options(&mut self.course_list, courses, |c| c.to_uppercase());
    }

    /// Replace session options with "Any", the given values, and "Custom...", keeping the current pick
    pub fn set_session_options(&mut self, sessions: &[String]) {
        replace_options(&mut self.session_list, sessions, |s| s.to_string());
    }

    pub fn focus(&mut self, field: Option<FormField>) {
        self.current = field;
        self.update_field_focus();
    }

    pub fn update_field_focus(&mut self) {
        let course_typed = self.current == Some(FormField::Course) && is_custom(&self.course_list);
        let session_typed = self.current == Some(FormField::Session) && is_custom(&self.session_list);

        self.course_input.set_focus(course_typed);
        self.session_input.set_focus(session_typed);
        self.subject_input.set_focus(self.current == Some(FormField::Subject));
        self.semester_input.set_focus(self.current == Some(FormField::Semester));
    }

    /// Whether typed characters go into `field` rather than acting as shortcuts
    pub fn accepts_text(&self, field: FormField) -> bool {
        match field {
            FormField::Course => is_custom(&self.course_list),
            FormField::Session => is_custom(&self.session_list),
            other => other.is_text(),
        }
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current {
            Some(FormField::Course) if is_custom(&self.course_list) => Some(&mut self.course_input),
            Some(FormField::Session) if is_custom(&self.session_list) => Some(&mut self.session_input),
            Some(FormField::Subject) => Some(&mut self.subject_input),
            Some(FormField::Semester) => Some(&mut self.semester_input),
            _ => None,
        }
    }

    pub fn handle_char_input(&mut self, c: char) {
        if let Some(input) = self.current_input() {
            input.insert_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.current_input() {
            input.delete_char();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.current_input() {
            input.delete_char_forward();
        }
    }

    pub fn handle_cursor_left(&mut self) {
        if let Some(input) = self.current_input() {
            input.move_cursor_left();
        }
    }

    pub fn handle_cursor_right(&mut self) {
        if let Some(input) = self.current_input() {
            input.move_cursor_right();
        }
    }

    pub fn handle_cursor_home(&mut self) {
        if let Some(input) = self.current_input() {
            input.move_cursor_to_start();
        }
    }

    pub fn handle_cursor_end(&mut self) {
        if let Some(input) = self.current_input() {
            input.move_cursor_to_end();
        }
    }

    /// Cycle the focused selector forward
    pub fn select_next(&mut self) {
        match self.current {
            Some(FormField::Course) => self.course_list.next(),
            Some(FormField::Session) => self.session_list.next(),
            _ => {}
        }
        self.update_field_focus();
    }

    /// Cycle the focused selector backward
    pub fn select_previous(&mut self) {
        match self.current {
            Some(FormField::Course) => self.course_list.previous(),
            Some(FormField::Session) => self.session_list.previous(),
            _ => {}
        }
        self.update_field_focus();
    }

    /// Current form values. Nothing is trimmed or validated.
    pub fn filter(&self) -> SearchFilter {
        SearchFilter {
            course: chosen_value(&self.course_list, &self.course_input),
            session: chosen_value(&self.session_list, &self.session_input),
            subject: self.subject_input.value.clone(),
            semester: self.semester_input.value.clone(),
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20), // Course
                Constraint::Percentage(20), // Session
                Constraint::Percentage(28), // Subject
                Constraint::Percentage(18), // Semester
                Constraint::Percentage(14), // Search button
            ])
            .split(area);

        self.draw_selector(f, chunks[0], FormField::Course, &self.course_list, &self.course_input);
        self.draw_selector(f, chunks[1], FormField::Session, &self.session_list, &self.session_input);
        self.subject_input.render(f, chunks[2]);
        self.semester_input.render(f, chunks[3]);
        self.draw_search_button(f, chunks[4]);
    }

    fn draw_selector(
        &self,
        f: &mut Frame,
        area: Rect,
        field: FormField,
        list: &SelectableList<SelectOption>,
        input: &InputField,
    ) {
        if is_custom(list) {
            input.render(f, area);
            return;
        }

        let label = list
            .selected()
            .map(|o| o.label.as_str())
            .unwrap_or("Any");

        let focused = self.current == Some(field);
        let (text, border) = if focused {
            (format!("◀ {} ▶", label), Styles::active_border())
        } else {
            (label.to_string(), Styles::inactive_border())
        };

        let widget = Paragraph::new(text).block(
            Block::default()
                .title(field.as_str())
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(widget, area);
    }

    fn draw_search_button(&self, f: &mut Frame, area: Rect) {
        let focused = self.current == Some(FormField::SearchButton);
        let (style, border) = if focused {
            (Styles::lifted(), Styles::active_border())
        } else {
            (Styles::error(), Styles::inactive_border())
        };

        let button = Paragraph::new("Search")
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(button, area);
    }
}

fn is_custom(list: &SelectableList<SelectOption>) -> bool {
    list.selected().map(|o| o.custom).unwrap_or(false)
}

fn selected_value(list: &SelectableList<SelectOption>) -> String {
    list.selected().map(|o| o.value.clone()).unwrap_or_default()
}

fn chosen_value(list: &SelectableList<SelectOption>, input: &InputField) -> String {
    if is_custom(list) {
        input.value.clone()
    } else {
        selected_value(list)
    }
}

fn replace_options(
    list: &mut SelectableList<SelectOption>,
    values: &[String],
    label: impl Fn(&str) -> String,
) {
    let was_custom = is_custom(list);
    let current = selected_value(list);

    list.items = std::iter::once(SelectOption::any())
        .chain(values.iter().map(|v| SelectOption {
            label: label(v),
            value: v.clone(),
            custom: false,
        }))
        .chain(std::iter::once(SelectOption::custom()))
        .collect();

    let index = if was_custom {
        list.items.len() - 1
    } else {
        list.items
            .iter()
            .position(|o| !o.custom && o.value == current)
            .unwrap_or(0)
    };
    list.select(Some(index));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_blank() {
        let form = SearchForm::new();
        assert_eq!(form.filter(), SearchFilter::default());
    }

    #[test]
    fn test_selector_options_and_filter() {
        let mut form = SearchForm::new();
        form.set_course_options(&["btech".to_string(), "mtech".to_string()]);
        form.set_session_options(&["2023".to_string()]);

        form.focus(Some(FormField::Course));
        form.select_next();
        assert_eq!(form.course_list.selected().unwrap().label, "BTECH");

        form.focus(Some(FormField::Session));
        form.select_next();

        form.focus(Some(FormField::Subject));
        for c in "Data".chars() {
            form.handle_char_input(c);
        }
        form.focus(Some(FormField::Semester));
        form.handle_char_input('1');

        let filter = form.filter();
        assert_eq!(filter.course, "btech");
        assert_eq!(filter.session, "2023");
        assert_eq!(filter.subject, "Data");
        assert_eq!(filter.semester, "1");
    }

    #[test]
    fn test_replacing_options_keeps_selection() {
        let mut form = SearchForm::new();
        form.set_course_options(&["bsc".to_string(), "btech".to_string()]);
        form.focus(Some(FormField::Course));
        form.select_next();
        form.select_next();
        assert_eq!(form.filter().course, "btech");

        form.set_course_options(&["btech".to_string(), "mca".to_string()]);
        assert_eq!(form.filter().course, "btech");

        form.set_course_options(&["mca".to_string()]);
        assert_eq!(form.filter().course, "");
    }

    #[test]
    fn test_typing_ignored_on_selectors() {
        let mut form = SearchForm::new();
        form.focus(Some(FormField::Course));
        form.handle_char_input('x');
        assert!(form.subject_input.is_empty());
        assert!(form.semester_input.is_empty());
        assert!(form.course_input.is_empty());
    }

    #[test]
    fn test_custom_entry_sends_typed_ids() {
        let mut form = SearchForm::new();
        form.set_course_options(&["btech".to_string()]);

        // Any -> btech -> Custom...
        form.focus(Some(FormField::Course));
        assert!(!form.accepts_text(FormField::Course));
        form.select_previous();
        assert!(form.accepts_text(FormField::Course));
        assert!(form.course_input.is_focused);

        let id = "3b241101-e2bb-4255-8caf-4136c566a962";
        for c in id.chars() {
            form.handle_char_input(c);
        }
        assert_eq!(form.filter().course, id);

        // New options from a reload keep the custom pick and its text
        form.set_course_options(&["btech".to_string(), "mca".to_string()]);
        assert_eq!(form.filter().course, id);

        form.focus(Some(FormField::Session));
        form.select_previous();
        form.handle_char_input('7');
        assert_eq!(form.filter().session, "7");

        // Leaving the custom entry goes back to plain option values
        form.select_next();
        assert_eq!(form.filter().session, "");
        assert!(!form.session_input.is_focused);
    }
}

//! Scrollable list of paper cards

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::render::{PaperCard, ResultsPanel, LOAD_ERROR_MESSAGE, SEARCH_ERROR_MESSAGE};
use crate::tui::ui::Styles;

#[derive(Debug, Default)]
pub struct CardList {
    pub state: ListState,
}

impl CardList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset selection after the panel was re-rendered
    pub fn reset(&mut self, count: usize) {
        self.state.select(if count == 0 { None } else { Some(0) });
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn navigate_down(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < count => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn navigate_up(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.state.select(Some(i));
    }

    pub fn go_to_first(&mut self, count: usize) {
        self.reset(count);
    }

    pub fn go_to_last(&mut self, count: usize) {
        self.state.select(count.checked_sub(1));
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, panel: &ResultsPanel, focused: bool) {
        let border = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        if panel.notice().visible || !panel.results_visible() {
            // Nothing rendered yet: the initial load is still in flight
            let text = if panel.notice().visible {
                panel.notice().text.as_str()
            } else {
                "Loading papers..."
            };
            let style = if text == LOAD_ERROR_MESSAGE || text == SEARCH_ERROR_MESSAGE {
                Styles::error()
            } else {
                Styles::inactive()
            };
            let notice = Paragraph::new(text)
                .style(style)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title("Papers")
                        .borders(Borders::ALL)
                        .border_style(border),
                );
            f.render_widget(notice, area);
            return;
        }

        let items: Vec<ListItem> = panel.cards().iter().map(card_item).collect();

        let title = format!("Papers ({})", panel.cards().len());
        let highlight = if focused { Styles::selected() } else { Style::default() };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border),
            )
            .highlight_style(highlight)
            .highlight_symbol(if focused { ">> " } else { "   " });

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

fn card_item(card: &PaperCard) -> ListItem<'static> {
    let mut header = vec![
        Span::styled(card.title.clone(), Styles::title()),
        Span::raw("  "),
        Span::styled(format!("[{}]", card.session), Styles::badge()),
    ];
    if let Some(kind) = &card.kind {
        header.push(Span::raw("  "));
        header.push(Span::styled(kind.clone(), Styles::inactive()));
    }

    let mut lines = vec![
        Line::from(header),
        Line::from(format!(
            "  Course: {} | Subject: {} | Semester: {}",
            card.course, card.subject, card.semester
        )),
        Line::from(vec![
            Span::styled(format!("  {}", card.byline()), Styles::inactive()),
            Span::raw("  "),
            Span::styled(card.tag_line(), Styles::info()),
        ]),
    ];

    if let Some(description) = &card.description {
        lines.push(Line::from(Span::styled(
            format!("  {}", description),
            Styles::inactive(),
        )));
    }

    let download_style = if card.download_target.is_some() {
        Styles::success()
    } else {
        Styles::warning()
    };
    lines.push(Line::from(Span::styled(
        format!("  ⬇ {}", card.download_label()),
        download_style,
    )));
    lines.push(Line::from(""));

    ListItem::new(Text::from(lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_is_clamped() {
        let mut list = CardList::new();
        list.reset(3);
        list.navigate_up(3);
        assert_eq!(list.selected(), Some(0));
        list.navigate_down(3);
        list.navigate_down(3);
        list.navigate_down(3);
        assert_eq!(list.selected(), Some(2));
        list.go_to_first(3);
        assert_eq!(list.selected(), Some(0));
        list.go_to_last(3);
        assert_eq!(list.selected(), Some(2));

        list.reset(0);
        assert_eq!(list.selected(), None);
        list.navigate_down(0);
        assert_eq!(list.selected(), None);
    }
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::model_picker::{ModelPicker, PickerRow};
use crate::store::SettingsStore;

const DEFAULT_WIDTH: u16 = 60;

const PRIMARY_COLOR: Color = Color::Cyan;
const CREATE_COLOR: Color = Color::Blue;
const CHECK_COLOR: Color = Color::Green;
const BORDER_COLOR: Color = Color::DarkGray;
const DIM_TEXT: Color = Color::Gray;

const SEARCH_PLACEHOLDER: &str = "Type to search or create...";
const EMPTY_TEXT: &str = "No results found";

pub fn draw(f: &mut Frame, picker: &ModelPicker, store: &SettingsStore) {
    let size = f.area();
    let width = picker.props().width.unwrap_or(DEFAULT_WIDTH).min(size.width);
    let column = Rect {
        width,
        ..size
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Trigger
            Constraint::Min(0),    // Popup
            Constraint::Length(1), // Footer
        ])
        .split(column);

    draw_trigger(f, picker, store, chunks[0]);
    if picker.is_open() {
        draw_popup(f, picker, store, chunks[1]);
    }
    draw_footer(f, picker, chunks[2]);
}

fn draw_trigger(f: &mut Frame, picker: &ModelPicker, store: &SettingsStore, area: Rect) {
    let label = picker.trigger_label(store);
    let label_style = if picker.props().disabled {
        Style::default().fg(DIM_TEXT).add_modifier(Modifier::DIM)
    } else if picker.value().is_empty() {
        Style::default().fg(DIM_TEXT)
    } else {
        Style::default().fg(PRIMARY_COLOR)
    };
    let arrow = if picker.is_open() { " ▴" } else { " ▾" };

    let trigger = Paragraph::new(Line::from(vec![
        Span::styled(label, label_style),
        Span::styled(arrow, Style::default().fg(DIM_TEXT)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER_COLOR))
            .title(" Model "),
    );
    f.render_widget(trigger, area);
}

fn draw_popup(f: &mut Frame, picker: &ModelPicker, store: &SettingsStore, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PRIMARY_COLOR));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let no_matches = picker.filtered_entries(store).is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                     // Search
            Constraint::Length(u16::from(no_matches)), // Empty state
            Constraint::Min(0),                        // Rows
        ])
        .split(inner);

    let search_line = if picker.search().is_empty() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(PRIMARY_COLOR)),
            Span::styled(SEARCH_PLACEHOLDER, Style::default().fg(DIM_TEXT)),
        ])
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(PRIMARY_COLOR)),
            Span::raw(picker.search().to_string()),
        ])
    };
    f.render_widget(Paragraph::new(search_line), chunks[0]);

    if no_matches {
        let empty = Paragraph::new(Span::styled(EMPTY_TEXT, Style::default().fg(DIM_TEXT)));
        f.render_widget(empty, chunks[1]);
    }

    let rows = picker.rows(store);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            PickerRow::Entry(entry) => {
                let check = if picker.is_checked(entry) { "✓ " } else { "  " };
                let mut spans = vec![
                    Span::styled(check, Style::default().fg(CHECK_COLOR)),
                    Span::raw(entry.label.clone()),
                ];
                if entry.is_custom {
                    spans.push(Span::styled(" (custom)", Style::default().fg(DIM_TEXT)));
                }
                ListItem::new(Line::from(spans))
            }
            PickerRow::Create(search) => ListItem::new(Line::from(Span::styled(
                format!("+ Create \"{}\"", search),
                Style::default().fg(CREATE_COLOR),
            ))),
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(Some(picker.highlighted()));
    f.render_stateful_widget(list, chunks[2], &mut state);
}

fn draw_footer(f: &mut Frame, picker: &ModelPicker, area: Rect) {
    let help = if picker.is_open() {
        "↑↓ move · Enter select · Ctrl-D delete custom · Esc close"
    } else {
        "Enter open · Esc quit"
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(DIM_TEXT))),
        area,
    );
}

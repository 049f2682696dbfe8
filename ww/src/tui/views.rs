//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module draws the UI from
//! AppState, but never modifies state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use tracing::trace;

use super::state::{AppState, ConfirmDialog, InteractionMode};
use crate::controller::View;
use crate::domain::{Budget, GeneratedItinerary, NO_PLACES_TEXT, PlaceCard, TripPreferences, Vibe};
use crate::form::{FormField, TripForm};

/// Placeholder for an empty history
pub const EMPTY_HISTORY: &str = "No planned trips yet.";

/// Characters of itinerary text shown per history entry
const PREVIEW_CHARS: usize = 60;

mod colors {
    use ratatui::style::Color;

    pub const BRAND: Color = Color::Rgb(0, 191, 165); // Teal
    pub const ACCENT: Color = Color::Rgb(255, 183, 77); // Amber
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const RATING: Color = Color::Rgb(255, 215, 0); // Gold
    pub const LINK: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    match state.view() {
        View::Form { error } => render_form(&state.form, error.as_deref(), frame, chunks[1]),
        View::Loading { prefs } => render_loading(state, prefs, frame, chunks[1]),
        View::Result { trip } => render_result(trip, state.result_scroll, frame, chunks[1]),
        View::History => render_history(state, frame, chunks[1]),
    }

    render_footer(state, frame, chunks[2]);

    let full = frame.area();
    match &state.interaction_mode {
        InteractionMode::Help => render_help_overlay(frame, full),
        InteractionMode::Confirm(dialog) => render_confirm_dialog(dialog, frame, full),
        InteractionMode::Normal => {}
    }
}

/// Header bar: brand, screen tabs, request status
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let view = state.view();
    let tab = |key: &'static str, label: &'static str, active: bool, enabled: bool| {
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(colors::BRAND)
                .add_modifier(Modifier::BOLD)
        } else if enabled {
            Style::default()
        } else {
            Style::default().fg(colors::DIM)
        };
        vec![
            Span::styled(format!(" {} ", key), Style::default().fg(colors::KEYBIND)),
            Span::styled(format!(" {} ", label), style),
            Span::raw(" "),
        ]
    };

    let mut spans = vec![
        Span::styled(
            "Weekend Wanderer ",
            Style::default().fg(colors::BRAND).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
    ];
    spans.extend(tab(
        "F2",
        "Plan New",
        matches!(view, View::Form { .. } | View::Loading { .. }),
        true,
    ));
    spans.extend(tab(
        "F3",
        "Current Trip",
        matches!(view, View::Result { .. }),
        state.controller.current().is_some(),
    ));
    spans.extend(tab("F4", "History", matches!(view, View::History), true));

    spans.push(Span::raw("│ "));
    if let Some(prefs) = state.controller.pending() {
        spans.push(Span::styled(
            format!("{} {}", state.spinner(), prefs.destination),
            Style::default().fg(colors::ACCENT),
        ));
    } else {
        spans.push(Span::styled(
            format!("{} saved", state.controller.trips().len()),
            Style::default().fg(colors::DIM),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.model)),
    );
    frame.render_widget(header, area);
}

/// Preferences form
fn render_form(form: &TripForm, error: Option<&str>, frame: &mut Frame, area: Rect) {
    trace!("render_form: called");
    let area = centered_rect(70, 80, area);
    let focused = |field: FormField| form.focus == field;
    let label_style = |field: FormField| {
        if focused(field) {
            Style::default().fg(colors::BRAND).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Where to this weekend?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            format!("✗ {}", message),
            Style::default().fg(colors::ERROR).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    // Destination
    lines.push(Line::from(Span::styled("Destination", label_style(FormField::Destination))));
    let cursor = if focused(FormField::Destination) { "█" } else { "" };
    let input = if form.destination.is_empty() && !focused(FormField::Destination) {
        Span::styled("e.g. Kyoto, Napa Valley, Taipei", Style::default().fg(colors::DIM))
    } else {
        Span::raw(format!("{}{}", form.destination, cursor))
    };
    lines.push(Line::from(vec![Span::raw("  > "), input]));
    lines.push(Line::from(""));

    // Vibe
    lines.push(Line::from(Span::styled("Vibe", label_style(FormField::Vibe))));
    let mut vibe_spans = vec![Span::raw("  ")];
    for vibe in Vibe::ALL {
        vibe_spans.push(choice_span(vibe.label(), vibe == form.vibe, focused(FormField::Vibe)));
        vibe_spans.push(Span::raw(" "));
    }
    lines.push(Line::from(vibe_spans));
    lines.push(Line::from(""));

    // Budget
    lines.push(Line::from(Span::styled("Budget", label_style(FormField::Budget))));
    let mut budget_spans = vec![Span::raw("  ")];
    for budget in Budget::ALL {
        let label = format!("{} {}", budget.symbol(), budget.label());
        budget_spans.push(choice_span(
            &label,
            budget == form.budget,
            focused(FormField::Budget),
        ));
        budget_spans.push(Span::raw(" "));
    }
    lines.push(Line::from(budget_spans));
    lines.push(Line::from(""));

    // Submit
    let submit_style = if !form.can_submit() {
        Style::default().fg(colors::DIM)
    } else if focused(FormField::Submit) {
        Style::default()
            .fg(Color::Black)
            .bg(colors::BRAND)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::BRAND).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(" Plan My Weekend ", submit_style),
    ]));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Plan a Trip "))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn choice_span(label: &str, selected: bool, focused: bool) -> Span<'static> {
    let style = match (selected, focused) {
        (true, true) => Style::default()
            .fg(Color::Black)
            .bg(colors::BRAND)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(colors::BRAND).add_modifier(Modifier::BOLD),
        (false, _) => Style::default().fg(colors::DIM),
    };
    Span::styled(format!(" {} ", label), style)
}

/// Spinner while the request runs
fn render_loading(state: &AppState, prefs: &TripPreferences, frame: &mut Frame, area: Rect) {
    trace!("render_loading: called");
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} {}...", state.spinner(), state.loading_word),
            Style::default().fg(colors::ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Crafting a {} weekend in {} on a {} budget",
            prefs.vibe,
            prefs.destination,
            prefs.budget
        )),
        Line::from(Span::styled(
            format!("{}s", state.loading_elapsed()),
            Style::default().fg(colors::DIM),
        )),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Planning "));
    frame.render_widget(widget, centered_rect(60, 40, area));
}

/// Itinerary body with place cards alongside
fn render_result(trip: &GeneratedItinerary, scroll: u16, frame: &mut Frame, area: Rect) {
    trace!(id = %trip.id, "render_result: called");
    let places = trip.places();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);
    let (body_area, places_area) = (chunks[0], chunks[1]);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", trip.preferences.vibe.label()),
                Style::default().fg(colors::ACCENT),
            ),
            Span::raw("· "),
            Span::styled(
                format!("{} {} ", trip.preferences.budget.symbol(), trip.preferences.budget.label()),
                Style::default().fg(colors::ACCENT),
            ),
            Span::raw("· "),
            Span::styled(trip.created_date(), Style::default().fg(colors::DIM)),
        ]),
        Line::from(""),
    ];
    let markdown: Text = tui_markdown::from_str(&trip.text);
    lines.extend(markdown.lines);

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", trip.title())),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(body, body_area);

    render_places(&places, frame, places_area);
}

fn render_places(places: &[PlaceCard], frame: &mut Frame, area: Rect) {
    trace!(count = places.len(), "render_places: called");
    let mut lines = Vec::new();
    if places.is_empty() {
        lines.push(Line::from(Span::styled(NO_PLACES_TEXT, Style::default().fg(colors::DIM))));
    }
    for place in places {
        lines.extend(place_card_lines(place));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Places "))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

/// Lines for one place card: title, link, rating
fn place_card_lines(place: &PlaceCard) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        place.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let mut link = vec![Span::styled(
        format!("  {}", place.link_label()),
        Style::default().fg(colors::LINK),
    )];
    if let Some(uri) = &place.uri {
        link.push(Span::styled(format!(" {}", uri), Style::default().fg(colors::DIM)));
    }
    lines.push(Line::from(link));

    if let Some(rating) = place.rating_line() {
        lines.push(Line::from(Span::styled(
            format!("  {}", rating),
            Style::default().fg(colors::RATING),
        )));
    }
    lines
}

/// Saved trips list
fn render_history(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_history: called");
    let trips = state.controller.trips();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" History ({}) ", trips.len()));

    if trips.is_empty() {
        frame.render_widget(block, area);
        render_empty_message(frame, area, EMPTY_HISTORY);
        return;
    }

    let current_id = state.controller.current().map(|t| t.id.as_str());
    let items: Vec<ListItem> = trips
        .iter()
        .map(|trip| {
            let marker = if Some(trip.id.as_str()) == current_id { "● " } else { "  " };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(colors::BRAND)),
                    Span::styled(trip.title(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!(
                            "  {} · {} · {}",
                            trip.preferences.vibe.label(),
                            trip.preferences.budget.symbol(),
                            trip.created_date()
                        ),
                        Style::default().fg(colors::DIM),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("    {}", trip.preview(PREVIEW_CHARS)),
                    Style::default().fg(colors::DIM),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(colors::SELECTED_BG));
    let mut list_state = ListState::default().with_selected(Some(state.history_selection.selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Footer with context-sensitive keys
fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = match state.view() {
        View::Form { .. } => &[
            ("Tab", "next field"),
            ("←→", "choose"),
            ("Enter", "plan"),
            ("F1", "help"),
            ("Ctrl+C", "quit"),
        ],
        View::Loading { .. } => &[("n", "plan new"), ("h", "history"), ("?", "help"), ("q", "quit")],
        View::Result { .. } => &[
            ("↑↓", "scroll"),
            ("d", "delete"),
            ("Esc", "back"),
            ("h", "history"),
            ("q", "quit"),
        ],
        View::History => &[
            ("↑↓", "select"),
            ("Enter", "open"),
            ("d", "delete"),
            ("Esc", "back"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, desc) in hints {
        spans.push(Span::styled(format!(" {} ", key), Style::default().fg(colors::KEYBIND)));
        spans.push(Span::styled(format!("{} ", desc), Style::default().fg(colors::DIM)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
    };
    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::BRAND),
        )),
        Line::from(""),
        section("Global"),
        key_line("F1 / ?", "Toggle help"),
        key_line("F2 / n", "Plan new trip"),
        key_line("F3 / c", "Current trip"),
        key_line("F4 / h", "History"),
        key_line("q", "Quit"),
        key_line("Ctrl+C", "Quit immediately"),
        Line::from(""),
        section("Plan"),
        key_line("Tab / ↑↓", "Move between fields"),
        key_line("←→", "Change vibe or budget"),
        key_line("Enter", "Plan my weekend"),
        key_line("Esc", "Clear destination"),
        Line::from(""),
        section("Trip / History"),
        key_line("↑↓ / j k", "Scroll or select"),
        key_line("Enter", "Open trip"),
        key_line("d", "Delete trip"),
        key_line("Esc / b", "Back to the form"),
    ];

    let widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(widget, popup_area);
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

fn render_confirm_dialog(dialog: &ConfirmDialog, frame: &mut Frame, area: Rect) {
    trace!("render_confirm_dialog: called");
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let yes_style = if dialog.selected_button {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let no_style = if !dialog.selected_button {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };

    let content = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" No ", no_style),
            Span::raw("    "),
            Span::styled(" Yes ", yes_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab/←→: switch  Enter: confirm  Esc: cancel",
            Style::default().fg(colors::DIM),
        )),
    ];

    let widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center);
    frame.render_widget(widget, popup_area);
}

fn render_empty_message(frame: &mut Frame, area: Rect, message: &str) {
    trace!(%message, "render_empty_message: called");
    let inner = area.inner(Margin {
        horizontal: 2,
        vertical: 2,
    });

    let empty = Paragraph::new(message)
        .style(Style::default().fg(colors::DIM))
        .alignment(Alignment::Center);
    frame.render_widget(empty, inner);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

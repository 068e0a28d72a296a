pub mod charting;
pub mod screen;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, InputTab, Message};
use crate::pace::{format_hms, format_mm_ss, pace_table, pace_to_five_k_seconds};
use crate::profile::Sex;
use crate::ui::charting::{chart_bounds, format_label, to_minutes};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;
const HALF_MARATHON_KM: f64 = 21.0975;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.stage()).render(app, f);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// Title, body, message line, legend.
fn frame_layout(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .horizontal_margin(HORIZONTAL_MARGIN)
    .vertical_margin(VERTICAL_MARGIN)
    .areas(area)
}

fn render_chrome(app: &App, f: &mut Frame, title: &str, legend: &str) -> Rect {
    let [title_area, body, message_area, legend_area] = frame_layout(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(title, bold().fg(Color::Cyan))).alignment(Alignment::Center),
        title_area,
    );

    if let Some(message) = &app.message {
        let (text, style) = match message {
            Message::Error(text) => (text.as_str(), bold().fg(Color::Red)),
            Message::Info(text) => (text.as_str(), Style::default().fg(Color::Green)),
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, style)).wrap(Wrap { trim: true }),
            message_area,
        );
    }

    f.render_widget(Paragraph::new(Span::styled(legend, italic())), legend_area);
    body
}

pub(crate) fn render_input(app: &App, f: &mut Frame) {
    let body = render_chrome(
        app,
        f,
        "Half marathon estimate: describe yourself",
        "(enter) submit / (↑↓) history / (^d)elete / (^l) clear / (tab) pace table / (esc)ape",
    );
    let [tabs_area, pane] = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(body);

    let selected = match app.input_tab {
        InputTab::Describe => 0,
        InputTab::PaceTable => 1,
    };
    f.render_widget(
        Tabs::new(["Description", "Pace table"])
            .select(selected)
            .highlight_style(bold().fg(Color::Yellow)),
        tabs_area,
    );

    match app.input_tab {
        InputTab::Describe => render_draft(app, f, pane),
        InputTab::PaceTable => render_pace_table(f, pane),
    }
}

fn render_draft(app: &App, f: &mut Frame, area: Rect) {
    let history = app.wizard.history();
    let (before, after) = history.position_hint();
    let [hint_area, editor_area, previous_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "entry {} of {}  ({before} older, {after} newer)",
                history.cursor() + 1,
                history.entries().len()
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
        hint_area,
    );

    let placeholder = app.draft.is_empty();
    let text = if placeholder {
        Line::from(vec![
            Span::styled("█", bold()),
            Span::styled(
                "e.g. Mam 30 lat, jestem mężczyzną, mój czas na 5km to 22:15",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![Span::raw(app.draft.as_str()), Span::styled("█", bold())])
    };
    f.render_widget(
        Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" age, sex, 5 km time or pace ({} chars) ", app.draft.width())),
            )
            .wrap(Wrap { trim: false }),
        editor_area,
    );

    if let Some(previous) = app.wizard.profile() {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!(
                    "last accepted: {}, {}, 5 km in {}",
                    previous.age(),
                    sex_label(previous.sex()),
                    previous.time_5k_label()
                ),
                italic().fg(Color::Gray),
            )),
            previous_area,
        );
    }
}

fn render_pace_table(f: &mut Frame, area: Rect) {
    let rows: Vec<Row> = pace_table()
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(format!("{}/km", row.pace)),
                Cell::from(format_mm_ss(pace_to_five_k_seconds(row.seconds_per_km as f64))),
                Cell::from(format!("{:.2} km/h", row.speed_kmh)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(10), Constraint::Length(8), Constraint::Length(12)],
    )
    .header(Row::new(vec!["pace", "5 km", "speed"]).style(bold().fg(Color::Yellow)))
    .block(Block::default().borders(Borders::ALL).title(" pace to speed "));

    f.render_widget(table, area);
}

pub(crate) fn render_summary(app: &App, f: &mut Frame) {
    let body = render_chrome(
        app,
        f,
        "Is this you?",
        "(enter/c)onfirm / (b)ack / (esc)ape",
    );

    let Some(profile) = app.wizard.profile() else {
        return;
    };

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:>12}  "), Style::default().fg(Color::Gray)),
            Span::styled(value, bold()),
        ])
    };
    let lines = vec![
        field("age", profile.age().to_string()),
        field("sex", sex_label(profile.sex()).to_string()),
        field("5 km time", profile.time_5k_label()),
        field("pace", profile.pace_label()),
    ];

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" profile ")),
        body,
    );
}

pub(crate) fn render_results(app: &App, f: &mut Frame) {
    let body = render_chrome(
        app,
        f,
        "Your half marathon estimate",
        "(r)estart / (f) same sex only / (←→) year / (esc)ape",
    );

    let (Some(profile), Some(prediction)) = (app.wizard.profile(), app.wizard.prediction()) else {
        return;
    };
    let predicted = prediction.predicted_total_seconds;

    let [headline_area, standing_area, chart_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(3),
    ])
    .areas(body);

    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(format_hms(predicted), bold().fg(Color::Green))),
            Line::from(format!(
                "{}/km over 21.1 km",
                format_mm_ss(predicted / HALF_MARATHON_KM)
            )),
        ])
        .alignment(Alignment::Center),
        headline_area,
    );

    let year = app
        .year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string());
    let field = if app.same_sex {
        sex_label(profile.sex())
    } else {
        "all runners"
    };

    let report = match app.report() {
        Some(Ok(report)) => report,
        Some(Err(reason)) => {
            f.render_widget(
                Paragraph::new(Span::styled(
                    format!("{year}: {reason}"),
                    Style::default().fg(Color::Yellow),
                ))
                .alignment(Alignment::Center),
                standing_area,
            );
            return;
        }
        None => return,
    };

    let standing = report.standing;
    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!(
                "{year} ({field}): place {} of {}, faster than {:.1}%",
                standing.position, standing.field_size, standing.percentile
            )),
            Line::from(Span::styled(
                format!(
                    "field mean {}  sd {}",
                    format_hms(report.mean_finish_seconds),
                    format_mm_ss(report.std_dev_finish_seconds)
                ),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center),
        standing_area,
    );

    let field_points = to_minutes(&report.points);
    let you = [(profile.age() as f64, predicted / 60.0)];
    let (x_bounds, y_bounds) = chart_bounds(&field_points, you[0]);

    let datasets = vec![
        Dataset::default()
            .name(field)
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Magenta))
            .data(&field_points),
        Dataset::default()
            .name("you")
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(bold().fg(Color::Green))
            .data(&you),
    ];

    let axis_labels = |bounds: [f64; 2]| {
        vec![
            Span::styled(format_label(bounds[0]), bold()),
            Span::styled(format_label(bounds[1]), bold()),
        ]
    };

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("age")
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title("minutes")
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    f.render_widget(chart, chart_area);
}

fn sex_label(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "men",
        Sex::Female => "women",
    }
}

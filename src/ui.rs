use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthChar;

use crate::app::{App, BackendStatus, Focus, PLACEHOLDER};

const SEND_BUTTON_WIDTH: u16 = 10;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match &app.backend_status {
        BackendStatus::Unknown => Span::styled("checking", Style::default().fg(Color::Gray)),
        BackendStatus::Online(message) => Span::styled(
            format!("online ({message})"),
            Style::default().fg(Color::Green),
        ),
        BackendStatus::Offline => Span::styled("offline", Style::default().fg(Color::Red)),
    };

    let title = Line::from(vec![
        Span::styled(" chatline ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(format!("{} ", app.client.base_url())),
        status,
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_row, response_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    let [input_area, send_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(SEND_BUTTON_WIDTH)])
            .areas(input_row);

    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    render_input(app, frame, input_area);
    render_send_button(app, frame, send_area);
    render_response(app, frame, response_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.input_enabled();
    let focused = app.focus == Focus::Input;

    let border_color = if focused && enabled {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ");

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_x) = visible_window(&app.draft, app.cursor, inner_width);

    let mut input = if app.draft.is_empty() {
        Paragraph::new(PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };
    if !enabled {
        input = input.add_modifier(Modifier::DIM);
    }

    frame.render_widget(input.block(block), area);

    if focused && enabled {
        let cursor_x = cursor_x.min(inner_width.saturating_sub(1)) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_send_button(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.input_enabled();
    let label = if app.in_flight { "..." } else { "Send" };

    let style = if !enabled {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else if app.focus == Focus::SendButton {
        Style::default()
            .bg(Color::White)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(button, area);
}

fn render_response(app: &mut App, frame: &mut Frame, area: Rect) {
    // Nothing to show until the first reply lands
    if app.response.is_empty() || area.height < 3 {
        app.response_area = None;
        app.response_lines = 0;
        app.response_scroll = 0;
        return;
    }

    let text = Text::from(
        app.response
            .split('\n')
            .map(|line| Line::raw(line.to_string()))
            .collect::<Vec<_>>(),
    );
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });

    // Count rows with the same word wrapping the panel renders with
    let inner_width = area.width.saturating_sub(2);
    app.response_area = Some(area);
    app.response_height = area.height.saturating_sub(2);
    app.response_lines = paragraph
        .line_count(inner_width)
        .min(u16::MAX as usize) as u16;
    app.response_scroll = app
        .response_scroll
        .min(app.response_lines.saturating_sub(app.response_height));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Response ");

    let response = paragraph.block(block).scroll((app.response_scroll, 0));

    frame.render_widget(response, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mode = if app.in_flight {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        Span::styled(
            format!(" WAITING{dots:<3} "),
            Style::default().bg(Color::Yellow).fg(Color::Black),
        )
    } else {
        Span::styled(" CHAT ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let mut hints = vec![mode, Span::styled(" ", label_style)];
    if app.input_enabled() {
        hints.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
        ]);
    }
    if app.response_area.is_some() {
        hints.extend(vec![
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Slice of `draft` that fits in `width` terminal columns with the cursor
/// kept in view, plus the cursor's column inside that slice.
///
/// Columns are display widths, so wide CJK and emoji characters count as two.
fn visible_window(draft: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = draft.chars().collect();
    let cursor = cursor.min(chars.len());
    let col = |c: &char| c.width().unwrap_or(0);

    // Drop characters off the left until the cursor has a free column
    let mut start = 0;
    while start < cursor && chars[start..cursor].iter().map(col).sum::<usize>() >= width {
        start += 1;
    }

    let mut used = 0;
    let visible: String = chars[start..]
        .iter()
        .take_while(|c| {
            used += col(*c);
            used <= width
        })
        .collect();
    let cursor_x = chars[start..cursor].iter().map(col).sum();

    (visible, cursor_x)
}

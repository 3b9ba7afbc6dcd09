use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::run::default_export_path;
use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(6)])
        .split(area);

    render_export(f, chunks[0], app);
    render_mail(f, chunks[1], app);
}

fn label(text: &str) -> Span<'static> {
    Span::styled(format!("  {text:<14}"), theme::dim_style())
}

fn render_export(f: &mut Frame, area: Rect, app: &App) {
    let path = default_export_path(None);
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            label("Rows"),
            Span::styled(
                format!("{} (whole ledger)", app.transaction_count),
                theme::normal_style(),
            ),
        ]),
        Line::from(vec![
            label("Default file"),
            Span::styled(path.display().to_string(), theme::normal_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press e to export here, or :export <path>",
            theme::dim_style(),
        )),
    ];
    if let Some(result) = &app.last_export {
        lines.push(Line::from(Span::styled(
            format!("  {result}"),
            Style::default().fg(theme::GREEN),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Export CSV ", theme::title_style()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_mail(f: &mut Frame, area: Rect, app: &App) {
    let mail = &app.settings.mail;
    let server = if mail.is_configured() {
        Span::styled(
            format!("{} via {}:{}", mail.from, mail.smtp_host, mail.smtp_port),
            theme::normal_style(),
        )
    } else {
        Span::styled(
            "not configured (set mail in config.json)",
            Style::default().fg(theme::YELLOW),
        )
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![label("Sender"), server]),
        Line::from(""),
        Line::from(Span::styled(
            "  :mail <recipient> sends the report for the current range",
            theme::dim_style(),
        )),
    ];
    if let Some(result) = &app.last_mail {
        let color = if result.starts_with("Report sent") {
            theme::GREEN
        } else {
            theme::RED
        };
        lines.push(Line::from(Span::styled(
            format!("  {result}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Email Report ", theme::title_style()));
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

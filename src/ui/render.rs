use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use std::collections::BTreeMap;

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    render_screen(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let num = format!("{}", i + 1);
            if *s == app.screen {
                Line::from(vec![
                    Span::styled(format!("{num}:"), Style::default().fg(theme::TEXT_DIM)),
                    Span::styled(
                        format!("{s}"),
                        Style::default()
                            .fg(theme::ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(Span::styled(
                    format!("{num}:{s}"),
                    Style::default().fg(theme::TEXT_DIM),
                ))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

fn render_screen(f: &mut Frame, area: Rect, app: &App) {
    match app.screen {
        Screen::Overview => super::screens::overview::render(f, area, app),
        Screen::Transactions => super::screens::transactions::render(f, area, app),
        Screen::Goals => super::screens::goals::render(f, area, app),
        Screen::Export => super::screens::export::render(f, area, app),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
        InputMode::Command => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::GREEN)
            .add_modifier(Modifier::BOLD),
        InputMode::Confirm => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::RED)
            .add_modifier(Modifier::BOLD),
    };

    let info = format!(
        " {} | {} | {} txns",
        app.screen,
        app.range(),
        app.transaction_count
    );

    let right = match app.screen {
        Screen::Overview => " H/L month | :range | ? help ",
        Screen::Transactions => " D delete | :add | ? help ",
        Screen::Goals => " D remove | :goal set | ? help ",
        Screen::Export => " e export | :mail | ? help ",
    };

    let eval = &app.snapshot.evaluation;
    let alert = if !eval.exceeded.is_empty() {
        Some((format!(" {} over goal ", eval.exceeded.len()), theme::RED))
    } else if !eval.near_limit.is_empty() {
        Some((format!(" {} near goal ", eval.near_limit.len()), theme::YELLOW))
    } else {
        None
    };

    let alert_len = alert.as_ref().map_or(0, |(text, _)| text.len());
    let used = mode_label.len() + info.chars().count() + alert_len + right.len();
    let pad = (area.width as usize).saturating_sub(used);

    let mut spans = vec![
        Span::styled(mode_label, mode_style),
        Span::styled(info, theme::status_bar_style()),
    ];
    if let Some((text, color)) = alert {
        spans.push(Span::styled(
            text,
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(" ".repeat(pad), theme::status_bar_style()));
    spans.push(Span::styled(right, theme::status_bar_style()));
    let bar = Paragraph::new(Line::from(spans));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.len() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

const KEY_HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, Up/Down", "Move cursor"),
            ("g/G", "Top / bottom"),
            ("Ctrl-d/u", "Page down / up"),
            ("1-4, Tab", "Switch tabs"),
            ("H/L", "Previous / next month"),
            ("Ctrl-q", "Quit"),
        ],
    ),
    (
        "Actions",
        &[
            (":", "Command mode"),
            ("D", "Delete selected transaction or goal"),
            ("e", "Export the ledger (Export tab)"),
            ("Esc", "Clear message"),
        ],
    ),
];

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {text}"),
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(" SpendTrack Help ", theme::title_style())),
        Line::from(""),
    ];
    for (section, keys) in KEY_HELP {
        lines.push(heading(section));
        lines.extend(keys.iter().map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("  {key:<16}"), Style::default().fg(theme::ACCENT)),
                Span::styled(what.to_string(), theme::normal_style()),
            ])
        }));
        lines.push(Line::from(""));
    }

    // One line per command, under its longest name
    lines.push(heading("Commands"));
    let mut by_description: BTreeMap<&str, &str> = BTreeMap::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        let entry = by_description.entry(cmd.description).or_insert(name);
        if name.len() > entry.len() {
            *entry = name;
        }
    }
    let mut cmds: Vec<(&str, &str)> = by_description.into_iter().map(|(d, n)| (n, d)).collect();
    cmds.sort_unstable();
    lines.extend(cmds.into_iter().map(|(name, desc)| {
        Line::from(vec![
            Span::styled(format!("  :{name:<15}"), Style::default().fg(theme::ACCENT)),
            Span::styled(desc.to_string(), theme::normal_style()),
        ])
    }));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Press any key to close ", theme::dim_style())));
    lines
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let help_text = help_lines();

    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 72.min(area.width.saturating_sub(4));
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(popup_width) / 2,
        area.y + area.height.saturating_sub(popup_height) / 2,
        popup_width,
        popup_height,
    );

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Indicator cards
            Constraint::Min(10),   // Category chart + alerts
            Constraint::Length(5), // Daily evolution
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    render_indicator_cards(f, chunks[0], app);
    render_category_chart(f, middle[0], app);
    render_alerts(f, middle[1], app);
    render_daily_sparkline(f, chunks[2], app);
}

fn render_indicator_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let ind = &app.snapshot.indicators;
    let symbol = app.currency();
    let uncounted = app.snapshot.transactions.len() - ind.counted;

    render_card(
        f,
        cards[0],
        "Total Spent",
        format_amount(ind.total, symbol),
        theme::RED,
        app.range().to_string(),
    );
    render_card(
        f,
        cards[1],
        "Transactions",
        app.snapshot.transactions.len().to_string(),
        theme::ACCENT,
        if uncounted > 0 {
            format!("{uncounted} without amount")
        } else {
            String::new()
        },
    );
    render_card(
        f,
        cards[2],
        "Average Expense",
        format_amount(ind.mean, symbol),
        theme::YELLOW,
        String::new(),
    );
    let (top_name, top_amount) = match &ind.top_category {
        Some((name, amount)) => (truncate(name, 18), format_amount(*amount, symbol)),
        None => ("-".to_string(), String::new()),
    };
    render_card(f, cards[3], "Top Category", top_name, theme::GREEN, top_amount);
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, subtitle: String) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Spending by Category ", theme::title_style()));

    if app.snapshot.totals.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No spending in this range. Import a CSV with :import",
            theme::dim_style(),
        )))
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let mut totals: Vec<_> = app.snapshot.totals.iter().collect();
    totals.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let bars: Vec<Bar> = totals
        .iter()
        .take(12)
        .map(|(name, amt)| {
            let color = app
                .snapshot
                .evaluation
                .statuses
                .iter()
                .find(|s| &s.category == *name)
                .map(|s| theme::tier_color(s.tier))
                .unwrap_or(theme::ACCENT);
            Bar::default()
                .value(amt.round().to_u64().unwrap_or(0))
                .label(Line::from(truncate(name, 10)))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_alerts(f: &mut Frame, area: Rect, app: &App) {
    let eval = &app.snapshot.evaluation;
    let mut lines: Vec<Line> = Vec::new();

    if eval.statuses.is_empty() {
        lines.push(Line::from(Span::styled("No goals set", theme::dim_style())));
        lines.push(Line::from(Span::styled(
            "Use :goal <category> <limit>",
            theme::dim_style(),
        )));
    } else if !eval.has_alerts() {
        lines.push(Line::from(Span::styled(
            "All categories within their goals",
            Style::default().fg(theme::GREEN),
        )));
    }

    for status in eval.statuses.iter().filter(|s| s.tier != crate::budget::Tier::Ok) {
        let color = theme::tier_color(status.tier);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<11}", status.tier.as_str()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(truncate(&status.category, 14), theme::normal_style()),
            Span::styled(
                format!(" {}", format_percent(status.percent)),
                Style::default().fg(color),
            ),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Goal Alerts ", theme::title_style()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_daily_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .snapshot
        .daily
        .iter()
        .map(|(_, amt)| amt.round().to_u64().unwrap_or(0))
        .collect();

    let title = match (app.snapshot.daily.first(), app.snapshot.daily.last()) {
        (Some((first, _)), Some((last, _))) => format!(" Daily Spending {first} .. {last} "),
        _ => " Daily Spending ".to_string(),
    };

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(title, theme::title_style())),
        )
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}

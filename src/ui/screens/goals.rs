use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let statuses = &app.snapshot.evaluation.statuses;
    if statuses.is_empty() {
        render_empty(f, area, app);
        return;
    }

    let symbol = app.currency();
    let items: Vec<ListItem> = statuses
        .iter()
        .enumerate()
        .skip(app.goal_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, status)| {
            let color = theme::tier_color(status.tier);
            let style = if i == app.goal_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let remaining = status.remaining();
            let remaining_text = if remaining >= Decimal::ZERO {
                format!("  {} left", format_amount(remaining, symbol))
            } else {
                format!("  {} over", format_amount(remaining.abs(), symbol))
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", truncate(&status.category, 17)), style),
                Span::styled(
                    format!(
                        "{:>12} / {:<12} ",
                        format_amount(status.spent, symbol),
                        format_amount(status.limit, symbol)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("[{}]", progress_bar(status.percent, 20)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {:>7} {:<10}", format_percent(status.percent), status.tier),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(remaining_text, theme::dim_style()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Goals for {} ", app.range()),
                theme::title_style(),
            )),
    );
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("No goals to show", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Use :goal <category> <limit> to set a monthly limit",
            theme::dim_style(),
        )),
    ];
    if !app.categories.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Categories: {}", app.categories.join(", ")),
            theme::dim_style(),
        )));
    }

    let msg = Paragraph::new(lines).centered().block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Goals ", theme::title_style())),
    );
    f.render_widget(msg, area);
}

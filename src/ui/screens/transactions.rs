use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let total = app.snapshot.listed_len();
    if total == 0 {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No transactions in {}", app.range()),
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Import a CSV with :import <file> or add one with :add",
                theme::dim_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Transactions (0) ", theme::title_style()));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Date", "Category", "Description", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .snapshot
        .listed()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let style = if i == app.transaction_index {
                theme::selected_style()
            } else if !txn.is_complete() {
                theme::dim_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            // Rows imported without a readable amount are listed but not counted
            let amount_cell = match txn.amount {
                Some(a) => Cell::from(Span::styled(
                    format_amount(a, app.currency()),
                    theme::expense_style(),
                )),
                None => Cell::from(Span::styled("n/a", theme::dim_style())),
            };

            Row::new(vec![
                Cell::from(format!("  {}", txn.date_label())),
                Cell::from(truncate(&txn.category, 18)),
                Cell::from(truncate(&txn.description, 40)),
                amount_cell,
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(20),
        Constraint::Min(20),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                title(app),
                theme::title_style(),
            )),
    );

    f.render_widget(table, area);
}

fn title(app: &App) -> String {
    let undated = app.snapshot.undated.len();
    if undated == 0 {
        format!(" Transactions in {} ({}) ", app.range(), app.snapshot.transactions.len())
    } else {
        format!(
            " Transactions in {} ({}) + {undated} without a date ",
            app.range(),
            app.snapshot.transactions.len()
        )
    }
}

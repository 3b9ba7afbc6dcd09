use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::{App, PendingAction, Screen};
use crate::db::Database;
use crate::import::{manual_entry, parse_amount};
use crate::models::{canonical_category, DateRange};
use crate::report::{self, SmtpMailer};
use crate::run::{default_export_path, import_file, shellexpand};
use crate::ui::util::format_amount;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SpendTrack", cmd_quit, r);
    register_command!("quit", "Quit SpendTrack", cmd_quit, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("o", "Go to Overview", cmd_overview, r);
    register_command!("overview", "Go to Overview", cmd_overview, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("goals", "Go to Goals", cmd_goals, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 2024-01-15 Food 12.50 lunch)",
        cmd_add,
        r
    );
    register_command!(
        "goal",
        "Set monthly goal (e.g. :goal Food 500)",
        cmd_goal,
        r
    );
    register_command!(
        "unset-goal",
        "Remove a goal (e.g. :unset-goal Food)",
        cmd_unset_goal,
        r
    );
    register_command!(
        "range",
        "Set date range (e.g. :range 2024-01-01 2024-03-31; empty = whole ledger)",
        cmd_range,
        r
    );
    register_command!("month", "Show one month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Show one month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "import",
        "Import CSV (e.g. :import ~/expenses.csv [%d/%m/%Y])",
        cmd_import,
        r
    );
    register_command!("i", "Import CSV file", cmd_import, r);
    register_command!(
        "export",
        "Export the whole ledger to CSV (e.g. :export ~/spending.csv)",
        cmd_export,
        r
    );
    register_command!(
        "mail",
        "Email the report (e.g. :mail me@example.com)",
        cmd_mail,
        r
    );
    register_command!(
        "delete",
        "Delete selected transaction or goal",
        cmd_delete,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_overview(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Overview;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    Ok(())
}

fn cmd_goals(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Goals;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.splitn(4, ' ').collect();
    if parts.len() < 3 {
        app.set_status("Usage: :add <date> <category> <amount> [description]");
        return Ok(());
    }

    let description = parts.get(3).copied().unwrap_or("");
    let txn = match manual_entry(parts[0], parts[1], parts[2], description, &app.categories) {
        Ok(t) => t,
        Err(e) => {
            app.set_status(format!("{e}"));
            return Ok(());
        }
    };

    db.insert_transaction(&txn)?;
    app.refresh(db)?;
    let amount = format_amount(txn.counted_amount(), app.currency());
    app.set_status(format!(
        "Added: {} {} {amount}",
        txn.date_label(),
        txn.category
    ));
    Ok(())
}

fn cmd_goal(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    // Last token is the limit, everything before is the category name
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :goal <category> <limit>. Example: :goal Food 500");
        return Ok(());
    }

    let limit = match parse_amount(parts[0]) {
        Ok(l) => l,
        Err(e) => {
            app.set_status(format!("{e}"));
            return Ok(());
        }
    };
    let category = canonical_category(parts[1], &app.categories);
    db.upsert_goal(&category, limit)?;
    app.refresh(db)?;
    app.screen = Screen::Goals;
    let limit = format_amount(limit, app.currency());
    app.set_status(format!("Goal set: {category} = {limit} per month"));
    Ok(())
}

fn cmd_unset_goal(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :unset-goal <category>");
        return Ok(());
    }
    let category = canonical_category(args, &app.categories);
    if db.delete_goal(&category)? {
        app.refresh(db)?;
        app.set_status(format!("Goal removed: {category}"));
    } else {
        app.set_status(format!("No goal set for {category}"));
    }
    Ok(())
}

fn cmd_range(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_range(None, db)?;
        app.set_status("Showing whole ledger");
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d");
    match parts.as_slice() {
        [start, end] => match (parse(start), parse(end)) {
            (Ok(s), Ok(e)) => {
                let range = DateRange::new(s, e);
                app.set_range(Some(range), db)?;
                app.set_status(format!("Range: {range}"));
            }
            _ => app.set_status("Invalid date. Use YYYY-MM-DD"),
        },
        _ => app.set_status("Usage: :range <start> <end> (YYYY-MM-DD)"),
    }
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_range(Some(DateRange::current_month()), db)?;
        app.set_status(format!("Month: {}", app.range()));
        return Ok(());
    }

    // Accept "2024-01", "2024-1", "01" and "1"
    let month = if args.len() <= 2 {
        let year = app.range().start.format("%Y").to_string();
        format!("{year}-{args:0>2}")
    } else {
        args.to_string()
    };

    match DateRange::parse_month(&month) {
        Some(range) => {
            app.set_range(Some(range), db)?;
            app.set_status(format!("Month: {range}"));
        }
        None => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, 1)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, -1)
}

/// Step to the neighbouring month. From a multi-month range the step
/// starts at the month the range begins in.
fn advance_month(app: &mut App, db: &mut Database, delta: i32) -> anyhow::Result<()> {
    let current = app.range();
    let target = if current.is_single_month() {
        current.shift_months(delta)
    } else {
        current.shift_months(delta.min(0))
    };
    if let Some(range) = target {
        app.set_range(Some(range), db)?;
        app.set_status(format!("Month: {range}"));
    }
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv> [date-format]");
        return Ok(());
    }

    let mut parts = args.splitn(2, ' ');
    let path = PathBuf::from(shellexpand(parts.next().unwrap_or("")));
    let date_format = parts.next().map(str::trim).filter(|f| !f.is_empty());

    let categories = app.categories.clone();
    match import_file(db, &path, date_format, &categories) {
        Ok(outcome) => {
            app.set_range(None, db)?;
            app.screen = Screen::Transactions;
            app.set_status(outcome.summary());
        }
        Err(e) => app.set_status(format!("Import failed: {e:#}")),
    }
    Ok(())
}

/// Writes the whole ledger, including rows stored without a date.
fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        default_export_path(None)
    } else {
        PathBuf::from(shellexpand(args))
    };

    let txns = db.get_transactions(None)?;
    if txns.is_empty() {
        app.set_status("No transactions to export");
        return Ok(());
    }

    let message = match crate::export::export_to_path(&path, &txns) {
        Ok(count) => format!("Exported {count} transactions to {}", path.display()),
        Err(e) => format!("Export failed: {e:#}"),
    };
    app.last_export = Some(message.clone());
    app.set_status(message);
    Ok(())
}

fn cmd_mail(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :mail <recipient>");
        return Ok(());
    }

    let snap = &app.snapshot;
    let body = report::render_report(
        &snap.range,
        &snap.transactions,
        &snap.evaluation,
        app.currency(),
    );
    let subject = report::report_subject(&snap.range);
    let sent = SmtpMailer::new(&app.settings.mail)
        .and_then(|mailer| report::send_report(&mailer, args, &subject, &body));

    let message = match sent {
        Ok(()) => format!("Report sent to {args}"),
        Err(e) => format!("Report not sent: {e}"),
    };
    app.last_mail = Some(message.clone());
    app.set_status(message);
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match app.screen {
        Screen::Transactions => {
            let Some(txn) = app.snapshot.listed().nth(app.transaction_index) else {
                app.set_status("No transaction selected");
                return Ok(());
            };
            if let Some(id) = txn.id {
                let description = if txn.description.is_empty() {
                    format!("{} {}", txn.date_label(), txn.category)
                } else {
                    txn.description.clone()
                };
                app.confirm(
                    format!("Delete '{description}'?"),
                    PendingAction::DeleteTransaction { id, description },
                );
            }
        }
        Screen::Goals => {
            let Some(status) = app.snapshot.evaluation.statuses.get(app.goal_index) else {
                app.set_status("No goal selected");
                return Ok(());
            };
            let category = status.category.clone();
            app.confirm(
                format!("Remove goal for {category}?"),
                PendingAction::DeleteGoal { category },
            );
        }
        _ => app.set_status("Select a transaction or goal first"),
    }
    Ok(())
}

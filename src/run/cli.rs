use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::{default_export_path, import_file, known_categories, shellexpand};
use crate::analytics::{self, Snapshot};
use crate::config::Settings;
use crate::db::Database;
use crate::import::{manual_entry, parse_amount};
use crate::models::{canonical_category, DateRange};
use crate::report::{self, SmtpMailer};
use crate::ui::util::{format_amount, format_percent, truncate};

/// Flags that take a value; everything else is positional.
const VALUE_FLAGS: &[&str] = &["--from", "--to", "--month", "--date-format"];

pub(crate) fn as_cli(
    args: &[String],
    db: &mut Database,
    settings: &Settings,
    config_path: &Path,
) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "import" | "i" => cli_import(rest, db, settings),
        "add" | "a" => cli_add(rest, db, settings),
        "goal" | "g" => cli_goal(rest, db, settings),
        "unset-goal" => cli_unset_goal(rest, db, settings),
        "goals" => cli_goals(db, settings),
        "status" => cli_status(rest, db, settings),
        "summary" | "s" => cli_summary(rest, db, settings),
        "list" | "ls" => cli_list(rest, db, settings),
        "delete" => cli_delete(rest, db),
        "report" | "r" => cli_report(rest, db, settings),
        "export" | "e" => cli_export(rest, db, settings),
        "mail" => cli_mail(rest, db, settings),
        "config" => cli_config(settings, config_path),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendtrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SpendTrack - local expense tracker with monthly category goals");
    println!();
    println!("Usage: spendtrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  import <file.csv>                   Import expenses (detects column headers)");
    println!("    --date-format <fmt>               Date format to try first (e.g. %d/%m/%Y)");
    println!("  add <date> <category> <amount> [description]");
    println!("                                      Record an expense (date may be 'today')");
    println!("  goal <category> <limit>             Set a monthly goal for a category");
    println!("  unset-goal <category>               Remove a category goal");
    println!("  goals                               List goals and categories without one");
    println!("  status                              Check spending against goals");
    println!("  summary                             Totals, average and top category");
    println!("  list                                List transactions with their ids,");
    println!("                                      then any rows without a date");
    println!("  delete <id>                         Delete a transaction");
    println!("  report                              Print the expense report");
    println!("  export [path]                       Export the whole ledger to CSV");
    println!("                                      (only the range when range options are given)");
    println!("  mail <recipient>                    Email the expense report");
    println!("  config                              Show settings and config file location");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
    println!();
    println!("Range options (status, summary, list, report, export, mail):");
    println!("  --month <YYYY-MM>                   A single month");
    println!("  --from <YYYY-MM-DD> --to <YYYY-MM-DD>");
    println!("                                      Inclusive range (default: whole ledger)");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_flag_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {flag} date '{value}' (expected YYYY-MM-DD)"))
}

/// `--month` wins over `--from`/`--to`; missing bounds come from the ledger span.
fn resolve_range(args: &[String], span: Option<DateRange>) -> Result<DateRange> {
    if let Some(month) = flag_value(args, "--month") {
        return DateRange::parse_month(month)
            .ok_or_else(|| anyhow::anyhow!("Invalid month '{month}' (expected YYYY-MM)"));
    }
    let fallback = analytics::default_range(span);
    let from = flag_value(args, "--from")
        .map(|v| parse_flag_date(v, "--from"))
        .transpose()?;
    let to = flag_value(args, "--to")
        .map(|v| parse_flag_date(v, "--to"))
        .transpose()?;
    Ok(DateRange::new(
        from.unwrap_or(fallback.start),
        to.unwrap_or(fallback.end),
    ))
}

fn has_range_flag(args: &[String]) -> bool {
    ["--month", "--from", "--to"]
        .iter()
        .any(|flag| flag_value(args, flag).is_some())
}

fn load_snapshot(args: &[String], db: &Database, settings: &Settings) -> Result<Snapshot> {
    let range = resolve_range(args, db.get_date_span()?)?;
    Snapshot::load(db, range, settings.zero_spend_goals)
}

// ── Commands ─────────────────────────────────────────────────

fn cli_import(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    let Some(file_path) = pos.first() else {
        anyhow::bail!("Usage: spendtrack import <file.csv> [--date-format <fmt>]");
    };

    let path = PathBuf::from(shellexpand(file_path));
    let known = known_categories(settings, db)?;
    let outcome = import_file(db, &path, flag_value(args, "--date-format"), &known)?;
    println!("{}", outcome.summary());
    Ok(())
}

fn cli_add(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    if pos.len() < 3 {
        anyhow::bail!("Usage: spendtrack add <date> <category> <amount> [description]");
    }

    let known = known_categories(settings, db)?;
    let description = pos[3..].join(" ");
    let txn = manual_entry(pos[0], pos[1], pos[2], &description, &known)?;
    let id = db.insert_transaction(&txn)?;
    println!(
        "Added #{id}: {} {} {}",
        txn.date_label(),
        txn.category,
        format_amount(txn.counted_amount(), &settings.currency_symbol)
    );
    Ok(())
}

fn cli_goal(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    if pos.len() < 2 {
        anyhow::bail!("Usage: spendtrack goal <category> <limit>");
    }

    // Last token is the limit, everything before it is the category name
    let limit = parse_amount(pos[pos.len() - 1])?;
    let known = known_categories(settings, db)?;
    let category = canonical_category(&pos[..pos.len() - 1].join(" "), &known);
    db.upsert_goal(&category, limit)?;
    println!(
        "Goal set: {category} = {} per month",
        format_amount(limit, &settings.currency_symbol)
    );
    Ok(())
}

fn cli_unset_goal(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    if pos.is_empty() {
        anyhow::bail!("Usage: spendtrack unset-goal <category>");
    }

    let known = known_categories(settings, db)?;
    let category = canonical_category(&pos.join(" "), &known);
    if db.delete_goal(&category)? {
        println!("Goal removed: {category}");
    } else {
        println!("No goal set for {category}");
    }
    Ok(())
}

fn cli_goals(db: &Database, settings: &Settings) -> Result<()> {
    let goals = db.get_goals()?;
    if goals.is_empty() {
        println!("No goals set. Use: spendtrack goal <category> <limit>");
    } else {
        println!("{:<24} {:>14}", "Category", "Monthly limit");
        println!("{}", "─".repeat(39));
        for goal in &goals {
            println!(
                "{:<24} {:>14}",
                truncate(&goal.category, 24),
                format_amount(goal.monthly_limit, &settings.currency_symbol)
            );
        }
    }

    let without: Vec<String> = known_categories(settings, db)?
        .into_iter()
        .filter(|c| crate::models::Goal::find_by_category(&goals, c).is_none())
        .collect();
    if !without.is_empty() {
        println!();
        println!("Without a goal: {}", without.join(", "));
    }
    Ok(())
}

fn cli_status(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let snap = load_snapshot(args, db, settings)?;
    let eval = &snap.evaluation;
    let symbol = &settings.currency_symbol;

    println!("Goals for {}", snap.range);
    println!("{}", "─".repeat(72));
    if eval.statuses.is_empty() {
        println!("No goals to check. Use: spendtrack goal <category> <limit>");
        return Ok(());
    }

    for status in &eval.statuses {
        println!(
            "  {:<20} {:>12} / {:>12} {:>8}  {}",
            truncate(&status.category, 20),
            format_amount(status.spent, symbol),
            format_amount(status.limit, symbol),
            format_percent(status.percent),
            status.tier
        );
    }

    if !eval.exceeded.is_empty() {
        println!();
        println!("Exceeded: {}", eval.exceeded.join(", "));
    }
    if !eval.near_limit.is_empty() {
        if eval.exceeded.is_empty() {
            println!();
        }
        println!("Near limit: {}", eval.near_limit.join(", "));
    }
    if !eval.has_alerts() {
        println!();
        println!("All categories within their goals");
    }
    Ok(())
}

fn cli_summary(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let snap = load_snapshot(args, db, settings)?;
    let ind = &snap.indicators;
    let symbol = &settings.currency_symbol;

    println!("SpendTrack - {}", snap.range);
    println!("{}", "─".repeat(40));
    println!("  Total spent:   {}", format_amount(ind.total, symbol));
    println!("  Transactions:  {}", snap.transactions.len());
    println!("  Average:       {}", format_amount(ind.mean, symbol));
    match &ind.top_category {
        Some((name, amount)) => {
            println!("  Top category:  {name} ({})", format_amount(*amount, symbol))
        }
        None => println!("  Top category:  -"),
    }
    println!("  Ledger total:  {} transactions", db.get_transaction_count()?);

    if !snap.totals.is_empty() {
        println!();
        println!("Spending by Category:");
        for (name, amount) in &snap.totals {
            println!("  {name:<24} {}", format_amount(*amount, symbol));
        }
    }
    Ok(())
}

fn cli_list(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let snap = load_snapshot(args, db, settings)?;
    if snap.listed_len() == 0 {
        println!("No transactions in {}", snap.range);
        return Ok(());
    }

    println!(
        "{:<6} {:<10}  {:<16} {:<28} {:>12}",
        "ID", "Date", "Category", "Description", "Amount"
    );
    println!("{}", "─".repeat(76));
    for txn in snap.listed() {
        let amount = txn
            .amount
            .map(|a| format_amount(a, &settings.currency_symbol))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "{:<6} {:<10}  {:<16} {:<28} {:>12}",
            txn.id.unwrap_or(0),
            txn.date_label(),
            truncate(&txn.category, 16),
            truncate(&txn.description, 28),
            amount
        );
    }
    Ok(())
}

fn cli_delete(args: &[String], db: &Database) -> Result<()> {
    let pos = positional(args);
    let Some(raw) = pos.first() else {
        anyhow::bail!("Usage: spendtrack delete <id>");
    };
    let id: i64 = raw
        .trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid transaction id: {raw}"))?;
    if db.delete_transaction(id)? {
        println!("Deleted transaction #{id}");
    } else {
        println!("No transaction with id {id}");
    }
    Ok(())
}

fn cli_report(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let snap = load_snapshot(args, db, settings)?;
    print!(
        "{}",
        report::render_report(
            &snap.range,
            &snap.transactions,
            &snap.evaluation,
            &settings.currency_symbol
        )
    );
    Ok(())
}

/// Without range flags the whole ledger is written, undated rows included.
fn cli_export(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let (range, txns) = if has_range_flag(args) {
        let snap = load_snapshot(args, db, settings)?;
        (Some(snap.range), snap.transactions)
    } else {
        (None, db.get_transactions(None)?)
    };
    let path = positional(args)
        .first()
        .map(|p| PathBuf::from(shellexpand(p)))
        .unwrap_or_else(|| default_export_path(range.as_ref()));

    if txns.is_empty() {
        match range {
            Some(r) => println!("No transactions in {r}"),
            None => println!("No transactions to export"),
        }
        return Ok(());
    }
    let count = crate::export::export_to_path(&path, &txns)?;
    println!("Exported {count} transactions to {}", path.display());
    Ok(())
}

fn cli_mail(args: &[String], db: &Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    let Some(recipient) = pos.first() else {
        anyhow::bail!("Usage: spendtrack mail <recipient>");
    };

    let snap = load_snapshot(args, db, settings)?;
    let body = report::render_report(
        &snap.range,
        &snap.transactions,
        &snap.evaluation,
        &settings.currency_symbol,
    );
    let subject = report::report_subject(&snap.range);

    let sent = SmtpMailer::new(&settings.mail)
        .and_then(|mailer| report::send_report(&mailer, recipient, &subject, &body));
    match sent {
        Ok(()) => println!("Report sent to {recipient}"),
        Err(e) => eprintln!("Report not sent: {e}"),
    }
    Ok(())
}

fn cli_config(settings: &Settings, config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        settings.save(config_path)?;
        println!("Wrote default settings to {}", config_path.display());
    } else {
        println!("Config file: {}", config_path.display());
    }
    println!();
    println!(
        "  zero_spend_goals: {}",
        serde_json::to_string(&settings.zero_spend_goals)?
    );
    println!("  currency_symbol:  {}", settings.currency_symbol);
    println!("  categories:       {}", settings.categories.join(", "));
    if settings.mail.is_configured() {
        println!(
            "  mail:             {} via {}:{}",
            settings.mail.from, settings.mail.smtp_host, settings.mail.smtp_port
        );
    } else {
        println!("  mail:             not configured");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_positional_skips_flag_values() {
        let a = args(&["out.csv", "--month", "2024-01", "extra"]);
        assert_eq!(positional(&a), vec!["out.csv", "extra"]);
    }

    #[test]
    fn test_resolve_range_month_flag() {
        let a = args(&["--month", "2024-02"]);
        let range = resolve_range(&a, None).unwrap();
        assert_eq!(range.start, d(2024, 2, 1));
        assert_eq!(range.end, d(2024, 2, 29));
    }

    #[test]
    fn test_resolve_range_defaults_to_span() {
        let span = DateRange::new(d(2024, 1, 5), d(2024, 3, 9));
        let range = resolve_range(&[], Some(span)).unwrap();
        assert_eq!(range, span);

        let a = args(&["--from", "2024-02-01"]);
        let range = resolve_range(&a, Some(span)).unwrap();
        assert_eq!(range, DateRange::new(d(2024, 2, 1), d(2024, 3, 9)));
    }

    #[test]
    fn test_resolve_range_rejects_bad_dates() {
        assert!(resolve_range(&args(&["--from", "01/02/2024"]), None).is_err());
        assert!(resolve_range(&args(&["--month", "2024-13"]), None).is_err());
    }

    #[test]
    fn test_goal_command_joins_category_words() {
        let db = Database::open_in_memory().unwrap();
        let settings = Settings::default();
        cli_goal(&args(&["eating", "out", "150"]), &db, &settings).unwrap();
        cli_goal(&args(&["food", "200"]), &db, &settings).unwrap();
        let goals = db.load_goals().unwrap();
        assert_eq!(goals.len(), 2);
        assert!(goals.contains_key("eating out"));
        assert!(goals.contains_key("Food"));
    }

    #[test]
    fn test_add_then_delete() {
        let db = Database::open_in_memory().unwrap();
        let settings = Settings::default();
        cli_add(&args(&["2024-01-02", "Food", "12.5", "corner", "shop"]), &db, &settings)
            .unwrap();
        let txns = db.get_transactions(None).unwrap();
        assert_eq!(txns[0].description, "corner shop");

        let id = txns[0].id.unwrap().to_string();
        cli_delete(&args(&[id.as_str()]), &db).unwrap();
        assert_eq!(db.get_transaction_count().unwrap(), 0);
    }

    #[test]
    fn test_export_keeps_rows_without_a_date() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("in.csv");
        std::fs::write(
            &csv_path,
            "date,category,description,amount\n15/01/2024,Food,a,10\nnotadate,Food,b,20\n",
        )
        .unwrap();
        let mut db = Database::open_in_memory().unwrap();
        let settings = Settings::default();
        let csv_arg = csv_path.display().to_string();
        cli_import(&args(&[csv_arg.as_str()]), &mut db, &settings).unwrap();
        assert_eq!(db.get_transaction_count().unwrap(), 2);

        let out = dir.path().join("out.csv");
        let out_arg = out.display().to_string();
        cli_export(&args(&[out_arg.as_str()]), &db, &settings).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"2024-01-15,Food,a,10"));
        assert!(lines.contains(&",Food,b,20"));

        // A range export leaves the undated row out
        let jan = dir.path().join("jan.csv");
        let jan_arg = jan.display().to_string();
        cli_export(&args(&[jan_arg.as_str(), "--month", "2024-01"]), &db, &settings).unwrap();
        assert_eq!(std::fs::read_to_string(&jan).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_undated_rows_can_be_listed_and_deleted() {
        let mut db = Database::open_in_memory().unwrap();
        let settings = Settings::default();
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("in.csv");
        std::fs::write(&csv_path, "date,category,description,amount\n??,Food,b,20\n").unwrap();
        let csv_arg = csv_path.display().to_string();
        cli_import(&args(&[csv_arg.as_str()]), &mut db, &settings).unwrap();

        let snap = load_snapshot(&args(&[]), &db, &settings).unwrap();
        assert_eq!(snap.listed_len(), 1);
        let id = snap.listed().next().unwrap().id.unwrap().to_string();
        cli_list(&args(&[]), &db, &settings).unwrap();
        cli_delete(&args(&[id.as_str()]), &db).unwrap();
        assert_eq!(db.get_transaction_count().unwrap(), 0);
    }

    #[test]
    fn test_add_rejects_bad_amount() {
        let db = Database::open_in_memory().unwrap();
        let res = cli_add(&args(&["2024-01-02", "Food", "lots"]), &db, &Settings::default());
        assert!(res.is_err());
    }
}

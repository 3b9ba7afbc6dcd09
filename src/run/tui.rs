use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Settings;
use crate::db::Database;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database, settings: Settings) -> Result<()> {
    let mut app = App::new(settings);
    app.refresh(db)?;
    if app.snapshot.evaluation.has_alerts() {
        app.set_status(alert_summary(&app));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab bar, status bar, command bar, borders and table header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

fn alert_summary(app: &App) -> String {
    let eval = &app.snapshot.evaluation;
    let mut parts = Vec::new();
    if !eval.exceeded.is_empty() {
        parts.push(format!("Over goal: {}", eval.exceeded.join(", ")));
    }
    if !eval.near_limit.is_empty() {
        parts.push(format!("Near goal: {}", eval.near_limit.join(", ")));
    }
    parts.join(" | ")
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, Screen::Overview),
        KeyCode::Char('2') => switch_screen(app, Screen::Transactions),
        KeyCode::Char('3') => switch_screen(app, Screen::Goals),
        KeyCode::Char('4') => switch_screen(app, Screen::Export),
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, screens[next]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, screens[prev]);
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app, db)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, db)?,
        KeyCode::Char('D') | KeyCode::Delete
            if matches!(app.screen, Screen::Transactions | Screen::Goals) =>
        {
            commands::handle_command("delete", app, db)?;
        }
        KeyCode::Char('e') if app.screen == Screen::Export => {
            commands::handle_command("export", app, db)?;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            debug!("Command: {input}");
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                run_pending(action, app, db)?;
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

fn run_pending(action: PendingAction, app: &mut App, db: &mut Database) -> Result<()> {
    match action {
        PendingAction::DeleteTransaction { id, description } => {
            db.delete_transaction(id)?;
            app.refresh(db)?;
            app.set_status(format!("Deleted: {description}"));
        }
        PendingAction::DeleteGoal { category } => {
            db.delete_goal(&category)?;
            app.refresh(db)?;
            app.set_status(format!("Goal removed: {category}"));
        }
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, screen: Screen) {
    app.screen = screen;
    app.set_status(format!("{screen}"));
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Transactions => scroll_down(
            &mut app.transaction_index,
            &mut app.transaction_scroll,
            app.snapshot.listed_len(),
            page,
        ),
        Screen::Goals => scroll_down(
            &mut app.goal_index,
            &mut app.goal_scroll,
            app.snapshot.evaluation.statuses.len(),
            page,
        ),
        _ => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Transactions => scroll_up(&mut app.transaction_index, &mut app.transaction_scroll),
        Screen::Goals => scroll_up(&mut app.goal_index, &mut app.goal_scroll),
        _ => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Transactions => {
            scroll_to_top(&mut app.transaction_index, &mut app.transaction_scroll)
        }
        Screen::Goals => scroll_to_top(&mut app.goal_index, &mut app.goal_scroll),
        _ => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Transactions => scroll_to_bottom(
            &mut app.transaction_index,
            &mut app.transaction_scroll,
            app.snapshot.listed_len(),
            page,
        ),
        Screen::Goals => scroll_to_bottom(
            &mut app.goal_index,
            &mut app.goal_scroll,
            app.snapshot.evaluation.statuses.len(),
            page,
        ),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::KeyEvent;
    use rust_decimal_macros::dec;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_rows(db: &Database, n: u32) -> App {
        for day in 1..=n {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            db.insert_transaction(&crate::models::Transaction::new(
                date,
                "Food".into(),
                format!("row {day}"),
                dec!(1),
            ))
            .unwrap();
        }
        let mut app = App::new(Settings::default());
        app.refresh(db).unwrap();
        app
    }

    #[test]
    fn test_confirmed_delete_removes_transaction() {
        let mut db = Database::open_in_memory().unwrap();
        let mut app = app_with_rows(&db, 3);
        app.screen = Screen::Transactions;

        handle_normal_input(key(KeyCode::Char('D')), &mut app, &mut db).unwrap();
        assert_eq!(app.input_mode, InputMode::Confirm);
        handle_confirm_input(key(KeyCode::Char('y')), &mut app, &mut db).unwrap();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(db.get_transaction_count().unwrap(), 2);
        // newest first, so the deleted row was the 3rd of January
        assert!(app.status_message.contains("row 3"));
    }

    #[test]
    fn test_cancelled_delete_keeps_transaction() {
        let mut db = Database::open_in_memory().unwrap();
        let mut app = app_with_rows(&db, 2);
        app.screen = Screen::Transactions;

        handle_normal_input(key(KeyCode::Char('D')), &mut app, &mut db).unwrap();
        handle_confirm_input(key(KeyCode::Esc), &mut app, &mut db).unwrap();
        assert_eq!(db.get_transaction_count().unwrap(), 2);
        assert_eq!(app.status_message, "Cancelled");
    }

    #[test]
    fn test_command_line_typing() {
        let mut db = Database::open_in_memory().unwrap();
        let mut app = app_with_rows(&db, 1);
        handle_normal_input(key(KeyCode::Char(':')), &mut app, &mut db).unwrap();
        for c in "goal Food 1.2".chars() {
            handle_command_input(key(KeyCode::Char(c)), &mut app, &mut db).unwrap();
        }
        handle_command_input(key(KeyCode::Enter), &mut app, &mut db).unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.snapshot.evaluation.near_limit, vec!["Food".to_string()]);
    }

    #[test]
    fn test_movement_stays_in_bounds() {
        let mut db = Database::open_in_memory().unwrap();
        let mut app = app_with_rows(&db, 3);
        app.screen = Screen::Transactions;
        for _ in 0..10 {
            handle_normal_input(key(KeyCode::Char('j')), &mut app, &mut db).unwrap();
        }
        assert_eq!(app.transaction_index, 2);
        handle_normal_input(key(KeyCode::Char('g')), &mut app, &mut db).unwrap();
        assert_eq!(app.transaction_index, 0);
    }

    #[test]
    fn test_alert_summary() {
        let db = Database::open_in_memory().unwrap();
        let mut app = app_with_rows(&db, 3);
        db.upsert_goal("Food", dec!(2)).unwrap();
        app.refresh(&db).unwrap();
        assert_eq!(alert_summary(&app), "Over goal: Food");
    }
}

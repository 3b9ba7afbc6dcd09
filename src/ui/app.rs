use anyhow::Result;

use crate::analytics::{self, Snapshot};
use crate::config::Settings;
use crate::db::Database;
use crate::models::DateRange;
use crate::ui::util::clamp_cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Overview,
    Transactions,
    Goals,
    Export,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Overview,
            Self::Transactions,
            Self::Goals,
            Self::Export,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overview => write!(f, "Overview"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Goals => write!(f, "Goals"),
            Self::Export => write!(f, "Export"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteTransaction { id: i64, description: String },
    DeleteGoal { category: String },
}

/// All dashboard state. Every change to the ledger or the range goes
/// through [`App::refresh`], which rebuilds the snapshot from the database.
pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) settings: Settings,
    /// `None` follows the ledger span; `Some` is a range the user picked.
    pub(crate) chosen_range: Option<DateRange>,
    pub(crate) snapshot: Snapshot,
    pub(crate) categories: Vec<String>,
    pub(crate) transaction_count: i64,

    // Transactions
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,

    // Goals
    pub(crate) goal_index: usize,
    pub(crate) goal_scroll: usize,

    // Export / mail results shown on the Export tab
    pub(crate) last_export: Option<String>,
    pub(crate) last_mail: Option<String>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            running: true,
            screen: Screen::Overview,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            settings,
            chosen_range: None,
            snapshot: Snapshot::empty(DateRange::current_month()),
            categories: Vec::new(),
            transaction_count: 0,

            transaction_index: 0,
            transaction_scroll: 0,

            goal_index: 0,
            goal_scroll: 0,

            last_export: None,
            last_mail: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn range(&self) -> DateRange {
        self.snapshot.range
    }

    /// Reload transactions, totals, goals and evaluation for the range.
    pub(crate) fn refresh(&mut self, db: &Database) -> Result<()> {
        let range = match self.chosen_range {
            Some(r) => r,
            None => analytics::default_range(db.get_date_span()?),
        };
        self.snapshot = Snapshot::load(db, range, self.settings.zero_spend_goals)?;
        self.categories = crate::run::known_categories(&self.settings, db)?;
        self.transaction_count = db.get_transaction_count()?;

        clamp_cursor(
            &mut self.transaction_index,
            &mut self.transaction_scroll,
            self.snapshot.listed_len(),
        );
        clamp_cursor(
            &mut self.goal_index,
            &mut self.goal_scroll,
            self.snapshot.evaluation.statuses.len(),
        );
        Ok(())
    }

    pub(crate) fn set_range(&mut self, range: Option<DateRange>, db: &Database) -> Result<()> {
        self.chosen_range = range;
        self.transaction_index = 0;
        self.transaction_scroll = 0;
        self.goal_index = 0;
        self.goal_scroll = 0;
        self.refresh(db)
    }

    pub(crate) fn currency(&self) -> &str {
        &self.settings.currency_symbol
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    pub(crate) fn confirm(&mut self, message: String, action: PendingAction) {
        self.confirm_message = message;
        self.pending_action = Some(action);
        self.input_mode = InputMode::Confirm;
    }
}

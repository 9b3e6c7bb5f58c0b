//! Shell context, command dispatch, and the command implementations.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigManager},
    currency::format_amount,
    errors::LedgerError,
    export::{write_csv_to_path, DEFAULT_EXPORT_FILE_NAME},
    input::{normalize_price, normalize_quantity},
    ledger::Ledger,
    session::{EditState, SalesSession},
    storage::{JsonStorage, StorageBackend},
    utils::PathResolver,
};

use super::io as cli_io;
use super::output;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";
const DEFAULT_LEDGER_NAME: &str = "sales";

/// Shell-level failures that abort the CLI loop.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Interaction(String),
}

/// Failures local to a single command; reported and the loop continues.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Interaction failed: {0}")]
    Interaction(String),
}

impl From<dialoguer::Error> for CommandError {
    fn from(err: dialoguer::Error) -> Self {
        CommandError::Interaction(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub(crate) type CommandResult = Result<LoopControl, CommandError>;

const COMMANDS: &[(&str, &str, &str)] = &[
    (
        "date",
        "date <YYYY-MM-DD>",
        "Select the active date (future dates are rejected)",
    ),
    (
        "add",
        "add <name> <quantity> <price>",
        "Record a sale for the active date",
    ),
    ("list", "list", "Show entries for the active date"),
    ("edit", "edit <index>", "Stage the entry at <index> for update"),
    (
        "update",
        "update <name> <quantity> <price>",
        "Replace the staged entry",
    ),
    (
        "delete",
        "delete <index>",
        "Delete the entry at <index> for the active date",
    ),
    (
        "total",
        "total [YYYY-MM-DD]",
        "Per-date total (defaults to the active date)",
    ),
    ("export", "export [path]", "Write the full ledger as CSV"),
    ("new", "new [name]", "Start an empty ledger"),
    ("save", "save [name]", "Save the ledger to storage"),
    ("load", "load <name>", "Load a ledger from storage"),
    ("ledgers", "ledgers", "List stored ledgers"),
    ("help", "help", "Show available commands"),
    ("exit", "exit", "Leave the shell"),
];

/// Holds everything one shell run needs: the session, storage, and config.
pub struct ShellContext {
    mode: CliMode,
    session: SalesSession,
    storage: JsonStorage,
    config_manager: ConfigManager,
    config: Config,
    theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let storage = JsonStorage::new_default()?;
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let session = SalesSession::new(Ledger::new(DEFAULT_LEDGER_NAME));

        let mut context = ShellContext {
            mode,
            session,
            storage,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_opened_ledger.clone() else {
            return;
        };
        if let Ok(ledger) = self.storage.load(&name) {
            self.session.replace_ledger(ledger);
            cli_io::print_success(format!("Automatically loaded last ledger `{}`.", name));
        }
    }

    pub(crate) fn prompt(&self) -> String {
        match self.session.selected_date() {
            Some(date) => format!("sales[{}]> ", date.format(DATE_FORMAT)),
            None => "sales> ".to_string(),
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|(name, _, _)| *name).collect()
    }

    pub(crate) fn report_error(&mut self, err: CommandError) -> Result<(), CliError> {
        cli_io::print_error(err);
        Ok(())
    }

    pub(crate) fn print_warning(&self, message: &str) {
        output::warning(message);
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Leave the shell?", false)
            .map_err(|err| CliError::Interaction(err.to_string()))
    }

    pub(crate) fn dispatch(&mut self, command: &str, raw: &str, args: &[&str]) -> CommandResult {
        match command {
            "date" => self.cmd_date(args),
            "add" => self.cmd_add(args),
            "list" => self.cmd_list(),
            "edit" => self.cmd_edit(args),
            "update" => self.cmd_update(args),
            "delete" => self.cmd_delete(args),
            "total" => self.cmd_total(args),
            "export" => self.cmd_export(args),
            "new" => self.cmd_new(args),
            "save" => self.cmd_save(args),
            "load" => self.cmd_load(args),
            "ledgers" => self.cmd_ledgers(),
            "help" => self.cmd_help(),
            "exit" | "quit" => Ok(LoopControl::Exit),
            _ => {
                self.report_unknown(raw);
                Ok(LoopControl::Continue)
            }
        }
    }

    fn report_unknown(&self, raw: &str) {
        match suggest_command(raw) {
            Some(suggestion) => self.print_warning(&format!(
                "Unknown command `{}`. Did you mean `{}`?",
                raw, suggestion
            )),
            None => self.print_warning(&format!(
                "Unknown command `{}`. Type `help` for the command list.",
                raw
            )),
        }
    }

    fn selected_date(&self) -> Result<NaiveDate, CommandError> {
        self.session
            .selected_date()
            .ok_or_else(|| CommandError::Input("select a date first (`date <YYYY-MM-DD>`)".into()))
    }

    fn cmd_date(&mut self, args: &[&str]) -> CommandResult {
        let raw = single_arg(args, "date <YYYY-MM-DD>")?;
        let candidate = parse_date(raw)?;
        self.session
            .select_date(candidate, Local::now().date_naive())?;
        cli_io::print_info(format!("Date: {}", candidate.format(DISPLAY_DATE_FORMAT)));
        cli_io::print_info(format!(
            "Total: {}",
            format_amount(self.session.total_for_selected(), &self.config.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_add(&mut self, args: &[&str]) -> CommandResult {
        let date = self.selected_date()?;
        let [name, quantity, price] = exact_args::<3>(args, "add <name> <quantity> <price>")?;
        let quantity = normalize_quantity(quantity);
        let price = normalize_price(price);
        self.session.add_entry(date, name, quantity, price)?;
        cli_io::print_success(format!(
            "Recorded {} x {} @ {}",
            quantity,
            name,
            format_amount(price, &self.config.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_list(&mut self) -> CommandResult {
        let date = self.selected_date()?;
        let entries = self.session.ledger().entries_for(date);
        if entries.is_empty() {
            cli_io::print_info(format!(
                "No products recorded for {}.",
                date.format(DISPLAY_DATE_FORMAT)
            ));
            return Ok(LoopControl::Continue);
        }

        let width = entries
            .iter()
            .map(|entry| entry.name.len())
            .max()
            .unwrap_or(0)
            .max("Name".len());
        output::section(format!("Products for {}", date.format(DISPLAY_DATE_FORMAT)));
        for (index, entry) in entries.iter().enumerate() {
            let marker = match self.session.edit_state() {
                EditState::Editing {
                    date: edited,
                    index: staged,
                } if edited == date && staged == index => " (editing)",
                _ => "",
            };
            println!(
                "  [{index}] {:<width$}  qty {:>5}  {:>10}{marker}",
                entry.name,
                entry.quantity,
                format_amount(entry.price, &self.config.currency),
            );
        }
        cli_io::print_info(format!(
            "Total: {}",
            format_amount(self.session.ledger().total_for_date(date), &self.config.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_edit(&mut self, args: &[&str]) -> CommandResult {
        let date = self.selected_date()?;
        let index = parse_index(single_arg(args, "edit <index>")?)?;
        let staged = self.session.begin_edit(date, index)?;
        cli_io::print_info(format!(
            "Editing [{index}] {} (qty {}, {}). Commit with `update <name> <quantity> <price>`.",
            staged.name,
            staged.quantity,
            format_amount(staged.price, &self.config.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_update(&mut self, args: &[&str]) -> CommandResult {
        let [name, quantity, price] = exact_args::<3>(args, "update <name> <quantity> <price>")?;
        let quantity = normalize_quantity(quantity);
        let price = normalize_price(price);
        self.session.commit_edit(name, quantity, price)?;
        cli_io::print_success(format!(
            "Updated to {} x {} @ {}",
            quantity,
            name,
            format_amount(price, &self.config.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_delete(&mut self, args: &[&str]) -> CommandResult {
        let date = self.selected_date()?;
        let index = parse_index(single_arg(args, "delete <index>")?)?;
        if self.mode == CliMode::Interactive {
            let prompt = format!(
                "Delete entry [{index}] for {}?",
                date.format(DISPLAY_DATE_FORMAT)
            );
            if !cli_io::confirm_action(&self.theme, &prompt, false)? {
                cli_io::print_info("Delete cancelled.");
                return Ok(LoopControl::Continue);
            }
        }
        let removed = self.session.delete_entry(date, index)?;
        cli_io::print_success(format!("Deleted {} x {}.", removed.quantity, removed.name));
        Ok(LoopControl::Continue)
    }

    fn cmd_total(&mut self, args: &[&str]) -> CommandResult {
        let date = match args {
            [] => self.selected_date()?,
            [raw] => parse_date(raw)?,
            _ => return Err(usage("total [YYYY-MM-DD]")),
        };
        let total = self.session.ledger().total_for_date(date);
        cli_io::print_info(format!(
            "Total for {}: {}",
            date.format(DISPLAY_DATE_FORMAT),
            format_amount(total, &self.config.currency)
        ));
        Ok(LoopControl::Continue)
    }

    fn cmd_export(&mut self, args: &[&str]) -> CommandResult {
        if self.session.ledger().is_empty() {
            self.print_warning("No products to export.");
            return Ok(LoopControl::Continue);
        }
        let path = match args {
            [] => PathResolver::export_dir_in(self.storage.base_dir())
                .join(DEFAULT_EXPORT_FILE_NAME),
            [raw] => PathBuf::from(raw),
            _ => return Err(usage("export [path]")),
        };
        write_csv_to_path(self.session.ledger(), &path)?;
        cli_io::print_success(format!("Exported ledger to {}.", path.display()));
        Ok(LoopControl::Continue)
    }

    fn cmd_new(&mut self, args: &[&str]) -> CommandResult {
        let name = match args {
            [] => DEFAULT_LEDGER_NAME,
            [name] => *name,
            _ => return Err(usage("new [name]")),
        };
        self.session.replace_ledger(Ledger::new(name));
        cli_io::print_success(format!("New ledger created: `{}`.", name));
        Ok(LoopControl::Continue)
    }

    fn cmd_save(&mut self, args: &[&str]) -> CommandResult {
        let name = match args {
            [] => self.session.ledger().name.clone(),
            [name] => (*name).to_string(),
            _ => return Err(usage("save [name]")),
        };
        self.storage.save(self.session.ledger(), &name)?;
        self.config.last_opened_ledger = Some(name.clone());
        self.config_manager.save(&self.config)?;
        cli_io::print_success(format!("Ledger saved as `{}`.", name));
        Ok(LoopControl::Continue)
    }

    fn cmd_load(&mut self, args: &[&str]) -> CommandResult {
        let name = single_arg(args, "load <name>")?;
        let ledger = self.storage.load(name)?;
        self.session.replace_ledger(ledger);
        self.config.last_opened_ledger = Some(name.to_string());
        self.config_manager.save(&self.config)?;
        cli_io::print_success(format!("Loaded ledger `{}`.", name));
        Ok(LoopControl::Continue)
    }

    fn cmd_ledgers(&mut self) -> CommandResult {
        let names = self.storage.list()?;
        if names.is_empty() {
            cli_io::print_info("No ledgers in storage yet.");
            return Ok(LoopControl::Continue);
        }
        output::section("Stored ledgers");
        for name in names {
            println!("  {name}");
        }
        Ok(LoopControl::Continue)
    }

    fn cmd_help(&mut self) -> CommandResult {
        output::section("Commands");
        let width = COMMANDS
            .iter()
            .map(|(_, usage, _)| usage.len())
            .max()
            .unwrap_or(0);
        for (_, usage, description) in COMMANDS {
            println!("  {usage:<width$}  {description}");
        }
        Ok(LoopControl::Continue)
    }
}

fn suggest_command(raw: &str) -> Option<&'static str> {
    let needle = raw.to_lowercase();
    COMMANDS
        .iter()
        .map(|(name, _, _)| (*name, levenshtein(&needle, name)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

fn usage(expected: &str) -> CommandError {
    CommandError::Input(format!("usage: {expected}"))
}

fn single_arg<'a>(args: &[&'a str], expected: &str) -> Result<&'a str, CommandError> {
    match args {
        [only] => Ok(*only),
        _ => Err(usage(expected)),
    }
}

fn exact_args<'a, const N: usize>(
    args: &[&'a str],
    expected: &str,
) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| usage(expected))
}

fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| CommandError::Input(format!("`{raw}` is not a valid YYYY-MM-DD date")))
}

fn parse_index(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .map_err(|_| CommandError::Input(format!("`{raw}` is not a valid entry index")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_cover_near_misses() {
        assert_eq!(suggest_command("exprot"), Some("export"));
        assert_eq!(suggest_command("dat"), Some("date"));
        assert_eq!(suggest_command("zzzzzzz"), None);
    }

    #[test]
    fn date_parsing_requires_iso_format() {
        assert!(parse_date("2024-01-05").is_ok());
        assert!(parse_date("05-01-2024").is_err());
        assert!(parse_date("not-a-date").is_err());
    }
}

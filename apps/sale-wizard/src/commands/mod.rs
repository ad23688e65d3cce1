//! # Terminal Commands Module
//!
//! Parses the lines typed at the wizard prompt.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Command enum, parser, help)
//! └── session.rs  ◄─── Executes commands against the controller
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Terminal Command Flow                                │
//! │                                                                         │
//! │  stdin                                                                  │
//! │  ─────                                                                  │
//! │  > qty 2 5                                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command::parse("qty 2 5")                                              │
//! │    → Command::Quantity { line: 1, raw: "5" }   (positions are 1-based   │
//! │         │                                        on screen, 0-based     │
//! │         ▼                                        inside)                │
//! │  Session::handle_line                                                   │
//! │    → controller.update_quantity(1, "5")                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  DraftEvent::Changed ──► render                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod session;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use gest_core::{PaymentMethod, WizardStep};

use crate::error::{AppError, AppResult};

pub use session::{Reply, Session};

/// Text printed by `help`.
pub const HELP: &str = "\
Step 1  customer <id> <name>     select the customer
        seller <id> <name>       select the seller
        date now | <YYYY-MM-DD> [HH:MM]
        pay <method>             cash, credit, debit, transfer, cheque, store_credit
        notes [text]             set (or clear) the notes
Step 2  search <term>            search products (3+ characters)
        pick <n>                 add one unit of search result n
        add <n> <qty>            add qty units of search result n
        qty <line> <qty>         change a line's quantity
        disc <line> <percent>    change a line's discount
        rm <line>                remove a line (asks first)
        odisc <percent>          order discount
Step 3  tender <amount>          change owed for the amount received
        submit                   save the sale
Any     next | back | step <n>   move between steps
        show                     print the draft
        clear                    discard every product (asks first)
        help | quit";

/// When the sale happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    /// Resolved to the local clock when executed.
    Now,
    At(NaiveDateTime),
}

/// One parsed terminal line. Line and result positions are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Customer { id: i64, name: String },
    Seller { id: i64, name: String },
    Date(DateInput),
    PaymentMethod(PaymentMethod),
    Notes(String),
    Search(String),
    Pick { hit: usize },
    Add { hit: usize, raw_qty: String },
    Quantity { line: usize, raw: String },
    Discount { line: usize, raw: String },
    Remove { line: usize },
    OrderDiscount(String),
    Tender(String),
    Next,
    Back,
    Step(WizardStep),
    Show,
    Submit,
    Clear,
    Help,
    Quit,
}

impl Command {
    /// Parses one line.
    ///
    /// ## Example
    /// ```rust
    /// use sale_wizard::commands::Command;
    ///
    /// assert_eq!(Command::parse("rm 2").unwrap(), Command::Remove { line: 1 });
    /// assert!(Command::parse("rm 0").is_err());
    /// ```
    pub fn parse(line: &str) -> AppResult<Command> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "customer" | "cliente" => {
                let (id, name) = id_and_name(rest, "customer")?;
                Command::Customer { id, name }
            }
            "seller" | "vendedor" => {
                let (id, name) = id_and_name(rest, "seller")?;
                Command::Seller { id, name }
            }
            "date" | "fecha" => Command::Date(parse_date(rest)?),
            "pay" | "method" => Command::PaymentMethod(rest.parse::<PaymentMethod>()?),
            "notes" => Command::Notes(rest.to_string()),
            "search" | "s" => Command::Search(rest.to_string()),
            "pick" => Command::Pick {
                hit: position(rest, "search result")?,
            },
            "add" => {
                let (hit, qty) = rest
                    .split_once(char::is_whitespace)
                    .unwrap_or((rest, "1"));
                Command::Add {
                    hit: position(hit, "search result")?,
                    raw_qty: qty.trim().to_string(),
                }
            }
            "qty" => {
                let (line, raw) = position_and_value(rest)?;
                Command::Quantity { line, raw }
            }
            "disc" => {
                let (line, raw) = position_and_value(rest)?;
                Command::Discount { line, raw }
            }
            "rm" | "remove" => Command::Remove {
                line: position(rest, "line")?,
            },
            "odisc" => Command::OrderDiscount(rest.to_string()),
            "tender" => Command::Tender(rest.to_string()),
            "next" | "n" => Command::Next,
            "back" | "b" => Command::Back,
            "step" => {
                let step = rest
                    .parse::<u8>()
                    .ok()
                    .and_then(WizardStep::from_number)
                    .ok_or_else(|| AppError::unknown_command("usage: step <1|2|3>"))?;
                Command::Step(step)
            }
            "show" => Command::Show,
            "submit" => Command::Submit,
            "clear" => Command::Clear,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => return Err(AppError::unknown_command("empty command")),
            other => {
                return Err(AppError::unknown_command(format!(
                    "unknown command '{}', type 'help'",
                    other
                )))
            }
        };

        Ok(command)
    }
}

/// Converts a 1-based screen position to a 0-based index.
fn position(raw: &str, what: &str) -> AppResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(AppError::unknown_command(format!(
            "expected a {} number starting at 1, got '{}'",
            what, raw
        ))),
    }
}

fn position_and_value(rest: &str) -> AppResult<(usize, String)> {
    let (line, raw) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| AppError::unknown_command("usage: <line> <value>"))?;
    Ok((position(line, "line")?, raw.trim().to_string()))
}

fn id_and_name(rest: &str, what: &str) -> AppResult<(i64, String)> {
    let usage = || AppError::unknown_command(format!("usage: {} <id> <name>", what));
    let (id, name) = rest.split_once(char::is_whitespace).ok_or_else(usage)?;
    let id = id.parse::<i64>().map_err(|_| usage())?;
    let name = name.trim();
    if name.is_empty() {
        return Err(usage());
    }
    Ok((id, name.to_string()))
}

/// Accepts `now`, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` and `YYYY-MM-DDTHH:MM`.
fn parse_date(raw: &str) -> AppResult<DateInput> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("now") {
        return Ok(DateInput::Now);
    }

    let normalized = raw.replacen('T', " ", 1);
    if let Ok(at) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M") {
        return Ok(DateInput::At(at));
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateInput::At(day.and_time(NaiveTime::MIN)));
    }

    Err(AppError::validation(format!(
        "sale date has invalid format: '{}', expected YYYY-MM-DD [HH:MM]",
        raw
    )))
}

//! # Wizard Session
//!
//! Executes parsed commands against the controller.
//!
//! ## Output Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Each Line Comes From                           │
//! │                                                                         │
//! │  handle_line("qty 1 12")                                                │
//! │        │                                                                │
//! │        ├── parse error / missing search result ──► Reply.lines         │
//! │        │   (never reached the controller)                               │
//! │        │                                                                │
//! │        └── controller call                                              │
//! │              ├── ok    ──► DraftEvent::Changed  ──► render             │
//! │              └── error ──► DraftEvent::Rejected ──► render             │
//! │                                                                         │
//! │  Controller errors are printed once, from the event, never from the    │
//! │  reply.                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Removal and clear ask first. The question goes into the reply and the
//! next line typed answers it.

use std::sync::Arc;

use chrono::Local;
use gest_core::validation::parse_quantity;
use gest_core::{CurrencyFormat, CustomerRef, ProductHit, SellerRef, WizardStep};
use gest_lookup::{SaleSink, SearchEvent, SearchHandle};
use tracing::{debug, info, warn};

use crate::commands::{Command, DateInput, HELP};
use crate::error::{AppError, ErrorCode};
use crate::render;
use crate::state::SaleDraftController;

/// Output of one handled line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Reply {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Reply { lines, quit: false }
    }
}

/// A question waiting for y/n.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Remove { line: usize },
    Clear,
}

/// Why a command stopped.
enum Failure {
    /// The controller already emitted `Rejected`.
    Reported,
    Local(AppError),
}

impl From<AppError> for Failure {
    fn from(err: AppError) -> Self {
        Failure::Local(err)
    }
}

type Outcome = Result<Reply, Failure>;

pub struct Session {
    controller: SaleDraftController,
    search: SearchHandle,
    sink: Arc<dyn SaleSink>,
    currency: CurrencyFormat,
    /// Results of the newest search, numbered from 1 on screen.
    hits: Vec<ProductHit>,
    pending: Option<Pending>,
}

impl Session {
    pub fn new(
        controller: SaleDraftController,
        search: SearchHandle,
        sink: Arc<dyn SaleSink>,
        currency: CurrencyFormat,
    ) -> Self {
        Session {
            controller,
            search,
            sink,
            currency,
            hits: Vec::new(),
            pending: None,
        }
    }

    pub fn controller(&self) -> &SaleDraftController {
        &self.controller
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    /// Prompt shown before each input line.
    pub fn prompt(&self) -> String {
        match self.pending {
            Some(_) => "[y/n] > ".to_string(),
            None => format!("[{}/3] > ", self.controller.current_step().number()),
        }
    }

    /// Handles one line typed by the user.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if let Some(pending) = self.pending.take() {
            return self.answer(pending, line);
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => return Reply::line(format!("! {}", e)),
        };
        debug!(?command, "Command");

        match self.execute(command).await {
            Ok(reply) => reply,
            Err(Failure::Reported) => Reply::default(),
            Err(Failure::Local(e)) => {
                if e.code == ErrorCode::Internal {
                    warn!(error = %e, "Command failed");
                }
                Reply::line(format!("! {}", e))
            }
        }
    }

    /// Records search output and returns the lines to print.
    pub fn on_search_event(&mut self, event: &SearchEvent) -> Vec<String> {
        let mut lines = render::search_event(event);
        match event {
            SearchEvent::Results { hits, .. } => {
                self.hits = hits.clone();
                lines.extend(render::search_hits(&self.hits, &self.currency));
            }
            SearchEvent::Prompt { .. } | SearchEvent::Failed { .. } => self.hits.clear(),
            SearchEvent::Started { .. } => {}
        }
        lines
    }

    /// Stops the search debouncer.
    pub async fn shutdown(&self) {
        if let Err(e) = self.search.shutdown().await {
            debug!(error = %e, "Search debouncer already stopped");
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    async fn execute(&mut self, command: Command) -> Outcome {
        let c = &mut self.controller;
        match command {
            Command::Customer { id, name } => c.set_customer(CustomerRef { id, name }),
            Command::Seller { id, name } => c.set_seller(SellerRef { id, name }),
            Command::Date(DateInput::Now) => c.set_sale_date(Local::now().naive_local()),
            Command::Date(DateInput::At(at)) => c.set_sale_date(at),
            Command::PaymentMethod(method) => c.set_payment_method(method),
            Command::Notes(notes) => c.set_notes(&notes),

            Command::Search(term) => {
                self.search.input(term).await.map_err(AppError::from)?;
            }
            Command::Pick { hit } => {
                let hit = self.hit(hit)?;
                self.controller.select_search_result(&hit).map_err(reported)?;
            }
            Command::Add { hit, raw_qty } => {
                let hit = self.hit(hit)?;
                let qty = parse_quantity(&raw_qty).map_err(AppError::from)?;
                self.controller
                    .add_line_item(hit.id, &hit.name, hit.price, hit.stock, qty)
                    .map_err(reported)?;
            }
            Command::Quantity { line, raw } => {
                c.update_quantity(line, &raw).map_err(reported)?;
            }
            Command::Discount { line, raw } => {
                c.update_discount(line, &raw).map_err(reported)?;
            }
            Command::Remove { line } => {
                let prompt = c.removal_prompt(line)?;
                self.pending = Some(Pending::Remove { line });
                return Ok(Reply::line(format!("? {} [y/n]", prompt)));
            }
            Command::OrderDiscount(raw) => {
                c.set_order_discount(&raw);
            }
            Command::Tender(raw) => {
                let change = c.change_for(&raw);
                return Ok(Reply::line(format!("Change: {}", self.currency.format(change))));
            }

            Command::Next => {
                c.advance().map_err(reported)?;
            }
            Command::Back => {
                c.retreat();
            }
            Command::Step(step) => {
                c.go_to(step).map_err(reported)?;
            }
            Command::Show => return Ok(self.show()),
            Command::Submit => return self.submit().await,
            Command::Clear => {
                if c.draft().is_empty() {
                    return Ok(Reply::line("Nothing to clear"));
                }
                self.pending = Some(Pending::Clear);
                return Ok(Reply::line(format!(
                    "? {} [y/n]",
                    SaleDraftController::CLEAR_PROMPT
                )));
            }
            Command::Help => return Ok(Reply::lines(HELP.lines().map(String::from).collect())),
            Command::Quit => {
                info!("Quit requested");
                return Ok(Reply {
                    lines: Vec::new(),
                    quit: true,
                });
            }
        }
        Ok(Reply::default())
    }

    fn hit(&self, index: usize) -> Result<ProductHit, Failure> {
        self.hits
            .get(index)
            .cloned()
            .ok_or_else(|| Failure::Local(AppError::not_found("search result", index + 1)))
    }

    /// Resolves a pending confirmation with the user's answer.
    fn answer(&mut self, pending: Pending, line: &str) -> Reply {
        let answer = line.trim().to_lowercase();
        let yes = matches!(answer.as_str(), "y" | "yes" | "s" | "si" | "sí");
        let mut gate = |_: &str| yes;

        let done = match pending {
            Pending::Remove { line } => self
                .controller
                .remove_line_item(line, &mut gate)
                .unwrap_or(false),
            Pending::Clear => self.controller.clear(&mut gate),
        };

        if done {
            Reply::default()
        } else {
            Reply::line("Kept as is")
        }
    }

    fn show(&self) -> Reply {
        let mut lines = vec![format!("══ Step {} ══", self.controller.current_step())];
        match (self.controller.current_step(), self.controller.summary()) {
            (WizardStep::Confirm, Some(summary)) => {
                lines.extend(render::confirmation(summary, &self.currency));
            }
            _ => lines.extend(render::draft_view(&self.controller.view(), &self.currency)),
        }
        Reply::lines(lines)
    }

    async fn submit(&mut self) -> Outcome {
        if self.controller.current_step() != WizardStep::Confirm {
            return Err(AppError::new(
                ErrorCode::Navigation,
                "Go to step 3 to review the sale before submitting",
            )
            .into());
        }

        let payload = self.controller.prepare_submission().map_err(reported)?;
        let outcome = self.sink.submit(&payload).await.map_err(|e| {
            warn!(error = %e, "Sale submission failed");
            AppError::from(e)
        })?;

        self.controller.complete_submission(outcome.sale_id);
        self.hits.clear();
        Ok(Reply::default())
    }
}

/// Marks a controller error as already shown through its `Rejected` event.
fn reported(err: AppError) -> Failure {
    debug!(code = ?err.code, "Rejected by controller");
    Failure::Reported
}

//! `mosi`: terminal front end for the marketplace cart.
//!
//! ## Commands
//!
//! - `mosi show`
//! - `mosi count`
//! - `mosi add <PRODUCT_ID> <OPTION> [--quantity N]`
//! - `mosi quantity <PRODUCT_ID> <OPTION> <N>`
//! - `mosi remove <PRODUCT_ID> <OPTION>`
//! - `mosi remove-selected [--deselect KEY]...`
//! - `mosi clear`
//! - `mosi checkout [--deselect KEY]...`
//! - `mosi summary`
//!
//! ## Exit codes
//!
//! - 0: success
//! - 1: rejected by the server, declined, or nothing to do
//! - 2: login required
//! - 3: infrastructure error (configuration, network, usage)

pub mod render;
pub mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mosi_api_client::{
    ApiClient, ApiFailure, CartApi, CartKey, ClientConfig, Decoded, ErrorCategory, HttpCartApi,
};
use mosi_cart::{
    BulkRemoveOutcome, CartCollaborators, CartController, CheckoutOutcome, CountBadge,
    FileSessionStore, LoadOutcome, MutationOutcome, PaymentSummary, SessionStore,
    read_selected_items,
};

use crate::terminal::{TerminalNavigator, TerminalPrompter};

#[derive(Debug, Parser)]
#[command(name = "mosi", version, about = "Marketplace cart from the terminal")]
pub struct Cli {
    /// Client config file (defaults to $MOSI_CONFIG, then ~/.config/mosi/client.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend origin, overriding the config file.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Raw Cookie header carrying the server session (e.g. JSESSIONID=...).
    #[arg(long, global = true, value_name = "COOKIE")]
    pub session_cookie: Option<String>,

    /// Directory for the checkout handoff.
    #[arg(long, global = true, value_name = "DIR")]
    pub session_dir: Option<PathBuf>,

    /// Answer yes to every confirmation.
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Debug logging on stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show cart lines, selection and subtotal.
    Show,
    /// Print the number of items in the cart.
    Count,
    /// Add a product option to the cart.
    Add(AddArgs),
    /// Set the quantity of a line (0 removes it).
    Quantity(QuantityArgs),
    /// Remove one line.
    Remove(LineArgs),
    /// Remove every selected line after confirmation.
    RemoveSelected(SelectionArgs),
    /// Remove every line after confirmation.
    Clear,
    /// Hand the selected lines to the order page.
    Checkout(SelectionArgs),
    /// Show the payment summary of the lines handed to checkout.
    Summary,
}

#[derive(Debug, Args)]
pub struct LineArgs {
    pub product_id: i64,
    pub option_type: String,
}

impl LineArgs {
    fn key(&self) -> CartKey {
        CartKey::new(self.product_id, self.option_type.clone())
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub line: LineArgs,

    #[arg(long, short = 'q', default_value_t = 1)]
    pub quantity: u32,
}

#[derive(Debug, Args)]
pub struct QuantityArgs {
    #[command(flatten)]
    pub line: LineArgs,

    pub quantity: u32,
}

#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Leave a line unselected, as `<productId>-<optionType>`. Repeatable.
    #[arg(long, value_name = "KEY")]
    pub deselect: Vec<CartKey>,
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Rejected,
    LoginRequired,
    Infrastructure,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Rejected => 1,
            Self::LoginRequired => 2,
            Self::Infrastructure => 3,
        }
    }

    /// A failure with no HTTP status never reached the server.
    fn for_failure(failure: &ApiFailure) -> Self {
        if failure.category == ErrorCategory::Transport && failure.status.is_none() {
            Self::Infrastructure
        } else {
            Self::Rejected
        }
    }

    fn for_mutation(outcome: &MutationOutcome) -> Self {
        match outcome {
            MutationOutcome::Applied => Self::Success,
            MutationOutcome::Rejected(failure) => Self::for_failure(failure),
            MutationOutcome::Declined | MutationOutcome::Busy => Self::Rejected,
            MutationOutcome::Unauthenticated => Self::LoginRequired,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

struct App {
    controller: CartController,
    api: Arc<dyn CartApi>,
    session: Arc<dyn SessionStore>,
}

impl App {
    fn build(cli: &Cli) -> anyhow::Result<Self> {
        let mut config =
            ClientConfig::load(cli.config.as_deref()).context("failed to load client config")?;
        if let Some(base_url) = &cli.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(cookie) = &cli.session_cookie {
            config.session_cookie = Some(cookie.clone());
        }
        if let Some(dir) = &cli.session_dir {
            config.session.dir = dir.to_string_lossy().into_owned();
        }
        config.validate().context("invalid client config")?;
        tracing::debug!(base_url = %config.base_url, "client configured");

        let navigator = Arc::new(TerminalNavigator::new(config.route_paths()));
        let client = ApiClient::new(&config, navigator.clone())?;
        let api: Arc<dyn CartApi> = Arc::new(HttpCartApi::new(client));
        let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_dir()));

        let controller = CartController::new(CartCollaborators {
            api: api.clone(),
            badge: Arc::new(CountBadge::new(api.clone())),
            prompter: Arc::new(TerminalPrompter::new(cli.yes)),
            session: session.clone(),
            navigator,
        });

        Ok(Self {
            controller,
            api,
            session,
        })
    }

    /// Loads the cart; `Some(exit)` when the command cannot continue.
    async fn load(&self) -> Option<Exit> {
        match self.controller.load().await {
            LoadOutcome::Loaded => None,
            LoadOutcome::Unauthenticated => Some(Exit::LoginRequired),
            LoadOutcome::Failed(failure) => {
                eprintln!("Could not load the cart: {failure}");
                Some(Exit::for_failure(&failure))
            }
            LoadOutcome::Busy => Some(Exit::Rejected),
        }
    }

    fn print_cart(&self) {
        println!("{}", render::cart(&self.controller.state()));
    }

    fn deselect(&self, keys: &[CartKey]) {
        for key in keys {
            if !self.controller.toggle_item(key, false) {
                tracing::debug!(%key, "not selected, nothing to deselect");
            }
        }
    }

    fn mutated(&self, outcome: MutationOutcome) -> Exit {
        if outcome.is_applied() {
            self.print_cart();
        }
        Exit::for_mutation(&outcome)
    }
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<Exit> {
    let app = App::build(&cli)?;

    let exit = match &cli.command {
        Command::Show => match app.load().await {
            Some(exit) => exit,
            None => {
                app.print_cart();
                Exit::Success
            }
        },
        Command::Count => match app.api.item_count().await? {
            Decoded::Ok(count) => {
                println!("{}", render::count(count.count));
                Exit::Success
            }
            Decoded::Err(failure) => {
                eprintln!("Could not read the cart count: {failure}");
                Exit::for_failure(&failure)
            }
            Decoded::Unauthenticated => Exit::LoginRequired,
        },
        Command::Add(args) => {
            let outcome = app.controller.add_item(&args.line.key(), args.quantity).await;
            app.mutated(outcome)
        }
        Command::Quantity(args) => match app.load().await {
            Some(exit) => exit,
            None => {
                let outcome = app
                    .controller
                    .change_quantity(&args.line.key(), args.quantity)
                    .await;
                app.mutated(outcome)
            }
        },
        Command::Remove(args) => match app.load().await {
            Some(exit) => exit,
            None => {
                let outcome = app.controller.remove_item(&args.key()).await;
                app.mutated(outcome)
            }
        },
        Command::RemoveSelected(args) => match app.load().await {
            Some(exit) => exit,
            None => {
                app.deselect(&args.deselect);
                match app.controller.remove_selected().await {
                    BulkRemoveOutcome::Completed(report) => {
                        for row in render::bulk_failures(&report) {
                            println!("{row}");
                        }
                        if report.aborted_by_auth() {
                            Exit::LoginRequired
                        } else {
                            app.print_cart();
                            if report.is_complete() {
                                Exit::Success
                            } else {
                                Exit::Rejected
                            }
                        }
                    }
                    BulkRemoveOutcome::NothingSelected
                    | BulkRemoveOutcome::Declined
                    | BulkRemoveOutcome::Busy => Exit::Rejected,
                }
            }
        },
        Command::Clear => match app.load().await {
            Some(exit) => exit,
            None => {
                let outcome = app.controller.clear_cart().await;
                app.mutated(outcome)
            }
        },
        Command::Checkout(args) => match app.load().await {
            Some(exit) => exit,
            None => {
                app.deselect(&args.deselect);
                match app.controller.proceed_to_checkout()? {
                    CheckoutOutcome::HandedOff(lines) => {
                        println!(
                            "{}",
                            render::payment_summary(&PaymentSummary::from_lines(&lines))
                        );
                        Exit::Success
                    }
                    CheckoutOutcome::NothingSelected | CheckoutOutcome::Busy => Exit::Rejected,
                }
            }
        },
        Command::Summary => {
            let lines = read_selected_items(app.session.as_ref())?;
            if lines.is_empty() {
                println!("No items were handed off to checkout.");
                Exit::Rejected
            } else {
                println!(
                    "{}",
                    render::payment_summary(&PaymentSummary::from_lines(&lines))
                );
                Exit::Success
            }
        }
    };

    tracing::debug!(code = exit.code(), "command finished");
    Ok(exit)
}

// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod client;
mod command;
mod error;
mod http;
mod manager;
mod metadata;
mod session;
mod storage;

use std::{path::PathBuf, process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use log::{error, warn};
use session::Session;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Logout(command::logout::Command),
    Register(command::register::Command),
    Feed(command::feed::Command),
    Event(command::event::Command),
    Save(command::save::Command),
    Saved(command::saved::Command),
    Search(command::search::Command),
    Friends(command::friends::Command),
    Tickets(command::tickets::Command),
    Account(command::account::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, ctx: &command::Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Register(cmd) => cmd.execute(ctx).await,
            Self::Feed(cmd) => cmd.execute(ctx).await,
            Self::Event(cmd) => cmd.execute(ctx).await,
            Self::Save(cmd) => cmd.execute(ctx).await,
            Self::Saved(cmd) => cmd.execute(ctx).await,
            Self::Search(cmd) => cmd.execute(ctx).await,
            Self::Friends(cmd) => cmd.execute(ctx).await,
            Self::Tickets(cmd) => cmd.execute(ctx).await,
            Self::Account(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the API to talk to.
    #[arg(
        long,
        env = "EVENTBUDDY_URL",
        default_value = "https://api.eventbuddy.app/api/v1",
        value_parser = Url::parse
    )]
    base_url: Url,

    /// Do not persist the session; it lasts until the process exits.
    #[arg(long)]
    no_store_session: bool,

    /// Store the session at this path instead of the platform data
    /// directory.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    session_file: Option<PathBuf>,

    /// Keep the stored token when the server answers with a 5xx. By default
    /// any server error is treated like a session-invalidating failure.
    #[arg(long)]
    keep_token_on_server_error: bool,

    #[clap(subcommand)]
    command: Command,
}

fn get_session_storage(args: &Args) -> Box<dyn storage::Storage<Session>> {
    if args.no_store_session {
        return Box::new(storage::Memory::new());
    }

    if let Some(ref path) = args.session_file {
        return Box::new(storage::File::with_path(path.clone()));
    }

    match storage::File::new("session.json") {
        Ok(file_storage) => Box::new(file_storage),
        Err(e) => {
            warn!(
                "The session cannot be persisted and will last until exit: {}",
                e
            );
            Box::new(storage::Memory::new())
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let (api, events) = http::HttpApi::new(http::Config {
        base_url: args.base_url.clone(),
        clear_token_on_server_error: !args.keep_token_on_server_error,
    })?;

    let manager = Arc::new(manager::SessionManager::new(
        api.clone(),
        get_session_storage(&args),
    ));
    let listener = tokio::spawn(Arc::clone(&manager).run_invalidation_listener(events));

    let _state = manager.load().await;

    let scope = CancellationToken::new();
    let interrupt = scope.clone();
    let _interrupt_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let ctx = command::Context {
        api: api.scoped(scope),
        manager,
    };
    let result = command::Command::execute(args.command, &ctx).await;

    listener.abort();
    result
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("EVENTBUDDY_LOG", "warn")
        .write_style("EVENTBUDDY_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}

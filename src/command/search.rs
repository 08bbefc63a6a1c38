// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{settings::Style, Table};

use crate::error::Result;

/// Free-text search for users and events.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The text to search for.
    #[clap()]
    query: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let results = ctx.api.search(session.user_id(), &self.query).await?;

        if !results.users.is_empty() {
            println!("Users:");
            println!("{}", Table::new(&results.users).with(Style::rounded()));
        }
        if !results.events.is_empty() {
            println!("Events:");
            println!("{}", Table::new(&results.events).with(Style::rounded()));
        }
        if results.users.is_empty() && results.events.is_empty() {
            println!("No results.");
        }
        Ok(())
    }
}

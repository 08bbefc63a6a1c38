// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{settings::Style, Table};

use crate::error::Result;

/// List the events you have saved.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let events = ctx.api.get_saved_events(session.user_id()).await;

        if events.is_empty() {
            println!("No saved events.");
        } else {
            println!("{}", Table::new(&events).with(Style::rounded()));
        }
        Ok(())
    }
}

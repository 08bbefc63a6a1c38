// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{settings::Style, Table};

use crate::error::Result;

/// Show the personalized event feed, section by section.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let feed = ctx.api.get_feed(session.user_id()).await?;

        let mut sections: Vec<_> = feed.into_iter().collect();
        sections.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (title, events) in sections {
            println!("{}", title);
            if events.is_empty() {
                println!("  (no events)");
            } else {
                println!("{}", Table::new(&events).with(Style::rounded()));
            }
        }
        Ok(())
    }
}

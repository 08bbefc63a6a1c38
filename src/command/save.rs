// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::error::Result;

/// Save an event to your list.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The numeric id of the event to save.
    #[clap()]
    event_id: i64,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let ack = ctx.api.save_event(session.user_id(), self.event_id).await?;
        println!("{}", ack);
        Ok(())
    }
}

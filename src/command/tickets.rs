// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table};

use crate::error::{self, Error, Result};

/// View, purchase, and verify event tickets.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List your tickets.
    List,
    /// Purchase a ticket for an event.
    Purchase {
        /// The numeric id of the event.
        event_id: i64,
    },
    /// Verify a scanned ticket QR code.
    Verify {
        /// The QR code payload to verify.
        qr_code: String,
    },
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let user_id = session.user_id();

        match self.action {
            Action::List => {
                let tickets = ctx.api.get_user_tickets(user_id).await;
                if tickets.is_empty() {
                    println!("No tickets.");
                } else {
                    println!("{}", Table::new(&tickets).with(Style::rounded()));
                }
            }
            Action::Purchase { event_id } => {
                let ticket = ctx.api.purchase_ticket(user_id, event_id).await?;
                println!("Purchased ticket #{} for event {}.", ticket.id, ticket.event_id);
            }
            Action::Verify { qr_code } => match ctx.api.verify_ticket(&qr_code).await {
                Ok(scan) => {
                    println!(
                        "Ticket accepted: {}",
                        scan.info.unwrap_or_else(|| "valid".to_owned())
                    );
                }
                Err(Error::Api(error::Api::Status(status))) => {
                    println!("Ticket rejected (HTTP {}).", status);
                }
                Err(e) => return Err(e),
            },
        }
        Ok(())
    }
}

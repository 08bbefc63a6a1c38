// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table};

use crate::{client::NewEvent, error::Result};

/// Inspect events or publish your own.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Show an event in detail, along with related events.
    Show {
        /// The numeric id of the event.
        event_id: i64,
    },
    /// Publish a new event with yourself as the organizer.
    Create {
        /// The event title.
        title: String,

        #[clap(long, default_value = "")]
        description: String,

        #[clap(long, default_value = "")]
        image_url: String,

        /// Start of the event, as an ISO 8601 timestamp.
        #[clap(long)]
        start_date: String,

        /// End of the event, as an ISO 8601 timestamp.
        #[clap(long)]
        end_date: String,

        #[clap(long, allow_negative_numbers = true, default_value_t = 0.0)]
        latitude: f64,

        #[clap(long, allow_negative_numbers = true, default_value_t = 0.0)]
        longitude: f64,
    },
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;

        match self.action {
            Action::Show { event_id } => {
                let bundle = ctx.api.get_event(session.user_id(), event_id).await?;

                let event = &bundle.event;
                println!("{} (#{})", event.title, event.id);
                if !event.description.is_empty() {
                    println!("{}", event.description);
                }
                if let Some(ref start) = event.start_date {
                    println!("Starts: {}", start);
                }
                if let Some(ref end) = event.end_date {
                    println!("Ends: {}", end);
                }
                println!("Saved by {} users.", event.saved_count);

                if !bundle.similar_events.is_empty() {
                    println!("\nSimilar events:");
                    println!(
                        "{}",
                        Table::new(&bundle.similar_events).with(Style::rounded())
                    );
                }
                if !bundle.organizer_events.is_empty() {
                    println!("\nMore from this organizer:");
                    println!(
                        "{}",
                        Table::new(&bundle.organizer_events).with(Style::rounded())
                    );
                }
            }
            Action::Create {
                title,
                description,
                image_url,
                start_date,
                end_date,
                latitude,
                longitude,
            } => {
                ctx.api
                    .create_event(&NewEvent {
                        title: title.clone(),
                        description,
                        image_url,
                        start_date,
                        end_date,
                        latitude,
                        longitude,
                        organizer_id: session.user_id(),
                    })
                    .await?;
                println!("Created event {:?}.", title);
            }
        }
        Ok(())
    }
}

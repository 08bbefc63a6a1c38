// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table};

use crate::{client::FriendRequestStatus, error::Result};

/// Manage your friends and friend requests.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List your friends.
    List,
    /// List friend requests you have received.
    Requests,
    /// Send a friend request to another user.
    Send {
        /// The numeric id of the user to befriend.
        to_user_id: i64,
    },
    /// Accept or decline a received friend request.
    Respond {
        /// The numeric id of the request.
        request_id: i64,
        /// What to do with it.
        #[clap(value_enum)]
        status: FriendRequestStatus,
    },
    /// Remove a friend.
    Remove {
        /// The numeric id of the friend to remove.
        friend_id: i64,
    },
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let user_id = session.user_id();

        match self.action {
            Action::List => {
                let friends = ctx.api.get_friends(user_id).await;
                if friends.is_empty() {
                    println!("No friends yet.");
                } else {
                    println!("{}", Table::new(&friends).with(Style::rounded()));
                }
            }
            Action::Requests => {
                let requests = ctx.api.get_friend_requests(user_id).await;
                if requests.is_empty() {
                    println!("No pending friend requests.");
                } else {
                    println!("{}", Table::new(&requests).with(Style::rounded()));
                }
            }
            Action::Send { to_user_id } => {
                if ctx.api.send_friend_request(user_id, to_user_id).await {
                    println!("Friend request sent.");
                } else {
                    println!("Could not send the friend request.");
                }
            }
            Action::Respond { request_id, status } => {
                if ctx
                    .api
                    .respond_friend_request(user_id, request_id, status)
                    .await
                {
                    println!("Responded with {}.", status);
                } else {
                    println!("Could not respond to the friend request.");
                }
            }
            Action::Remove { friend_id } => {
                println!("{}", ctx.api.remove_friend(user_id, friend_id).await);
            }
        }
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    client::Preferences,
    error::{self, Result},
};

/// Inspect and maintain your account.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Show your profile as the server sees it.
    Show,
    /// Update your discovery preferences.
    Preferences {
        #[clap(long, default_value_t = 0)]
        event_size: u32,
        #[clap(long, default_value_t = 0)]
        interactivity: u32,
        #[clap(long, default_value_t = 0)]
        noisiness: u32,
        #[clap(long, default_value_t = 0)]
        crowdedness: u32,
        #[clap(long, allow_negative_numbers = true, default_value_t = 0.0)]
        latitude: f64,
        #[clap(long, allow_negative_numbers = true, default_value_t = 0.0)]
        longitude: f64,
        /// Search radius in kilometers.
        #[clap(long, default_value_t = 25.0)]
        radius: f64,
    },
    /// Change your password.
    ChangePassword,
    /// Exchange the current bearer token for a fresh one.
    RefreshToken,
    /// Permanently delete your account.
    Delete,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let session = ctx.manager.require_session().await?;
        let user_id = session.user_id();

        match self.action {
            Action::Show => {
                let user = ctx.api.get_user(user_id).await?;
                println!("{} (user id {})", user.username, user.id);
                if let Some(email) = user.email {
                    println!("Email: {}", email);
                }
            }
            Action::Preferences {
                event_size,
                interactivity,
                noisiness,
                crowdedness,
                latitude,
                longitude,
                radius,
            } => {
                let updated = ctx
                    .api
                    .update_preferences(
                        user_id,
                        &Preferences {
                            preferred_event_size: event_size,
                            preferred_interactivity: interactivity,
                            preferred_noisiness: noisiness,
                            preferred_crowdedness: crowdedness,
                            latitude,
                            longitude,
                            radius,
                        },
                    )
                    .await;
                if updated {
                    println!("Preferences updated.");
                } else {
                    println!("Could not update preferences.");
                }
            }
            Action::ChangePassword => {
                let current =
                    rpassword::prompt_password("Current password: ").map(SecretString::new)?;
                let new = rpassword::prompt_password("New password: ").map(SecretString::new)?;
                let confirmation =
                    rpassword::prompt_password("Confirm new password: ").map(SecretString::new)?;
                if new.expose_secret() != confirmation.expose_secret() {
                    return Err(error::Validation::PasswordMismatch.into());
                }

                let ack = ctx.api.change_password(user_id, &current, &new).await?;
                println!("{}", ack);
            }
            Action::RefreshToken => {
                ctx.api.refresh_token().await?;
                println!("Token refreshed; it lasts until the process exits or the next sign-in.");
            }
            Action::Delete => {
                let password = rpassword::prompt_password("Password: ").map(SecretString::new)?;
                let ack = ctx.api.delete_user(user_id, &password).await?;
                println!("{}", ack);
                ctx.manager.sign_out().await;
            }
        }
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    client::Registration,
    error::{self, Result},
};

/// Create an account and sign in with it.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The username to register.
    #[clap()]
    username: String,

    /// The email address for the new account.
    #[clap(long)]
    email: String,

    /// An optional phone number.
    #[clap(long)]
    phone: Option<String>,

    /// The display name shown to other users.
    #[clap(long)]
    buddy_name: Option<String>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let password = rpassword::prompt_password("Password: ").map(SecretString::new)?;
        let confirmation =
            rpassword::prompt_password("Confirm password: ").map(SecretString::new)?;
        if password.expose_secret() != confirmation.expose_secret() {
            return Err(error::Validation::PasswordMismatch.into());
        }

        let session = ctx
            .manager
            .sign_up(&Registration {
                username: self.username,
                email: self.email,
                phone: self.phone,
                password,
                buddy_name: self.buddy_name,
            })
            .await?;
        println!(
            "Registered and signed in as {} (user id {}).",
            session.username(),
            session.user_id()
        );
        Ok(())
    }
}

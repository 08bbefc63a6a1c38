// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use secrecy::SecretString;

use crate::error::Result;

/// Sign in and store the session for subsequent commands.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The username to authenticate as.
    #[clap()]
    username: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &super::Context) -> Result<()> {
        let password = rpassword::prompt_password("Password: ").map(SecretString::new)?;
        let session = ctx.manager.sign_in(&self.username, &password).await?;
        println!(
            "Signed in as {} (user id {}).",
            session.username(),
            session.user_id()
        );
        Ok(())
    }
}

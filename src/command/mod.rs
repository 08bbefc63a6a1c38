// SPDX-FileCopyrightText: 2025 The EventBuddy Developers
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::Result, http::HttpApi, manager::SessionManager};

pub(crate) mod account;
pub(crate) mod event;
pub(crate) mod feed;
pub(crate) mod friends;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod register;
pub(crate) mod save;
pub(crate) mod saved;
pub(crate) mod search;
pub(crate) mod tickets;

pub(crate) struct Context {
    pub(crate) api: HttpApi,
    pub(crate) manager: Arc<SessionManager<HttpApi>>,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: &Context) -> Result<()>;
}

// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::counter::TicketCounter;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::client::{Client, InteractionClient};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use type_map::concurrent::TypeMap;

/// Everything an event handler needs, cloned into each handler task.
#[derive(Clone)]
pub struct BotContext {
	pub http: Arc<Client>,
	pub application_id: Id<ApplicationMarker>,
	pub cache: Arc<DefaultInMemoryCache>,
	pub config: Arc<ConfigData>,
	pub counter: Arc<TicketCounter>,
	pub state: Arc<RwLock<TypeMap>>,
}

impl BotContext {
	pub fn interaction(&self) -> InteractionClient<'_> {
		self.http.interaction(self.application_id)
	}
}

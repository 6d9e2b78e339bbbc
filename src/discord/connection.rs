// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, route_command};
use super::context::BotContext;
use super::events::route_events;
use super::interactions::{route_interaction, route_modal_submit};
use crate::config::{ConfigData, PresenceConfig};
use crate::counter::TicketCounter;
use miette::IntoDiagnostic;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{ConfigBuilder, EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use twilight_model::gateway::payload::outgoing::update_presence::UpdatePresencePayload;
use twilight_model::gateway::presence::{ActivityType, MinimalActivity, Status};
use type_map::concurrent::TypeMap;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

fn presence(config: &PresenceConfig) -> miette::Result<UpdatePresencePayload> {
	let activity = MinimalActivity {
		kind: ActivityType::Streaming,
		name: config.activity.clone(),
		url: Some(config.url.clone()),
	};
	UpdatePresencePayload::new(vec![activity.into()], false, None::<u64>, Status::Idle).into_diagnostic()
}

pub async fn run_bot(config: Arc<ConfigData>, http_client: Arc<Client>, counter: Arc<TicketCounter>) -> miette::Result<()> {
	let intents = Intents::GUILDS | Intents::GUILD_VOICE_STATES;

	let shard_config = ConfigBuilder::new(config.discord.bot_token.clone(), intents)
		.presence(presence(&config.presence)?)
		.build();
	let mut shard = Shard::with_config(ShardId::ONE, shard_config);

	let cache = Arc::new(
		DefaultInMemoryCache::builder()
			.resource_types(
				ResourceType::CHANNEL
					| ResourceType::GUILD
					| ResourceType::USER
					| ResourceType::MEMBER
					| ResourceType::VOICE_STATE,
			)
			.build(),
	);

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
		tracing::info!(count = commands.len(), "registered application commands");
	}

	let context = BotContext {
		http: http_client,
		application_id,
		cache: Arc::clone(&cache),
		config,
		counter,
		state: Arc::new(RwLock::new(TypeMap::new())),
	};

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};
		cache.update(&event);

		let latency = shard.latency().average();
		tokio::spawn(handle_event(event, context.clone(), latency));
	}

	Ok(())
}

async fn handle_event(event: Event, context: BotContext, latency: Option<Duration>) {
	let event_result = handle_event_route(event, &context, latency).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(event: Event, context: &BotContext, latency: Option<Duration>) -> miette::Result<()> {
	tracing::trace!("Incoming gateway message: {:?}", event);
	match &event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(interaction, command_data, context, latency).await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(interaction, interaction_data, context).await?;
			}
			Some(InteractionData::ModalSubmit(modal_data)) => {
				route_modal_submit(interaction, modal_data, context).await?;
			}
			_ => (),
		},
		Event::VoiceStateUpdate(_) | Event::ChannelDelete(_) => route_events(&event, context).await?,
		Event::Ready(ready) => {
			tracing::info!(user = %ready.user.name, guilds = ready.guilds.len(), "Discord gateway is ready");
		}
		_ => (),
	}
	Ok(())
}

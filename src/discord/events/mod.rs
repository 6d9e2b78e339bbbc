// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::context::BotContext;
use twilight_model::gateway::event::Event;

pub mod voice;

/// Handles the gateway events that affect watched calls. Runs after the cache has seen the event.
pub async fn route_events(event: &Event, context: &BotContext) -> miette::Result<()> {
	match event {
		Event::VoiceStateUpdate(voice_state) => {
			if let Some(guild_id) = voice_state.0.guild_id {
				voice::reconcile_guild_calls(context, guild_id).await;
			}
		}
		Event::ChannelDelete(channel) => {
			let channel_id = channel.0.id;
			if voice::forget_call(context, channel_id).await.is_some() {
				tracing::debug!(channel = %channel_id, "watched call was deleted");
			}
		}
		_ => (),
	}

	Ok(())
}

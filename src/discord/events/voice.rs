// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::state::calls::{CallWatch, CallWatches, WatchAction};
use crate::discord::utils::embeds::call_inactive_log;
use crate::discord::utils::log::send_log;
use crate::discord::utils::tickets::delete_channel_if_exists;
use crate::discord::utils::timestamp::describe_duration;
use crate::discord::utils::users::describe_opener;
use miette::IntoDiagnostic;
use tokio::time::sleep;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker};

/// Starts watching a new ticket call. The call starts out empty, so its timer is armed right away.
pub async fn watch_call(context: &BotContext, watch: CallWatch) {
	let guild_id = watch.guild_id;
	{
		let mut state = context.state.write().await;
		let call_watches = state.entry::<CallWatches>().or_insert_with(CallWatches::default);
		call_watches.insert(watch);
	}
	reconcile_guild_calls(context, guild_id).await;
}

/// Stops watching a call, cancelling its timer.
pub async fn forget_call(context: &BotContext, voice_channel: Id<ChannelMarker>) -> Option<CallWatch> {
	let mut state = context.state.write().await;
	state
		.get_mut::<CallWatches>()
		.and_then(|call_watches| call_watches.remove(voice_channel))
}

/// Arms or disarms the timers of every watched call in the guild based on who's in each call now.
pub async fn reconcile_guild_calls(context: &BotContext, guild_id: Id<GuildMarker>) {
	let mut state = context.state.write().await;
	let Some(call_watches) = state.get_mut::<CallWatches>() else {
		return;
	};

	for voice_channel in call_watches.channels_in_guild(guild_id) {
		let occupants = context
			.cache
			.voice_channel_states(voice_channel)
			.map(|states| states.count())
			.unwrap_or(0);
		let Some(watch) = call_watches.get(voice_channel) else {
			continue;
		};
		match watch.action_for(occupants) {
			WatchAction::Arm => {
				let generation = call_watches.next_generation();
				let timer = tokio::spawn(expire_call(context.clone(), voice_channel, generation));
				call_watches.arm(voice_channel, generation, timer.abort_handle());
				tracing::debug!(channel = %voice_channel, generation, "call is empty; inactivity timer started");
			}
			WatchAction::Disarm => {
				call_watches.disarm(voice_channel);
				tracing::debug!(channel = %voice_channel, occupants, "call is in use; inactivity timer cancelled");
			}
			WatchAction::Keep => (),
		}
	}
}

async fn expire_call(context: BotContext, voice_channel: Id<ChannelMarker>, generation: u64) {
	sleep(context.config.tickets.call_inactivity).await;

	let watch = {
		let mut state = context.state.write().await;
		state
			.get_mut::<CallWatches>()
			.and_then(|call_watches| call_watches.take_if_current(voice_channel, generation))
	};
	let Some(watch) = watch else {
		return;
	};

	if let Err(error) = delete_inactive_call(&context, &watch).await {
		tracing::error!(source = ?error, channel = %voice_channel, "failed to delete inactive call");
	}
}

async fn delete_inactive_call(context: &BotContext, watch: &CallWatch) -> miette::Result<()> {
	let deleted = delete_channel_if_exists(&context.http, watch.voice_channel)
		.await
		.into_diagnostic()?;
	if !deleted {
		tracing::debug!(channel = %watch.voice_channel, "inactive call was already deleted");
		return Ok(());
	}

	let inactive_for = describe_duration(context.config.tickets.call_inactivity);
	tracing::info!(
		channel = %watch.voice_channel,
		ticket = watch.ticket_number,
		"deleted call after {} of inactivity",
		inactive_for
	);

	let notice = format!(
		"The call for this ticket was deleted after {} without anyone in it.",
		inactive_for
	);
	if let Err(error) = context.http.create_message(watch.ticket_channel).content(&notice).await {
		tracing::warn!(source = ?error, channel = %watch.ticket_channel, "failed to post inactivity notice");
	}

	let opener = describe_opener(&context.http, watch.guild_id, watch.opener).await;
	let log_embed = call_inactive_log(
		watch.ticket_number,
		&watch.voice_channel_name,
		watch.voice_channel,
		&opener,
		&inactive_for,
	);
	send_log(&context.http, &context.config, log_embed).await;

	Ok(())
}

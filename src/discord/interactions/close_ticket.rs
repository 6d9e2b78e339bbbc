// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{CurrentTicket, current_ticket};
use crate::discord::context::BotContext;
use crate::discord::events::voice::forget_call;
use crate::discord::utils::embeds::{TicketClosedLog, ticket_closed_log, ticket_closing_embed};
use crate::discord::utils::log::send_log;
use crate::discord::utils::permissions::interaction_member_is_staff;
use crate::discord::utils::responses::{NOT_A_TICKET, NOT_STAFF_CLOSE, respond_ephemeral};
use crate::discord::utils::tickets::{delete_channel_if_exists, find_call_channel, guild_channels};
use crate::discord::utils::timestamp::{created_at_tag, describe_duration};
use crate::discord::utils::users::{avatar_url, cached_user_tag, describe_opener, user_tag};
use miette::{IntoDiagnostic, bail};
use tokio::time::sleep;
use twilight_model::channel::Message;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// What the participant list needs to know about a message in the ticket
#[derive(Debug)]
struct HistoryEntry {
	from_bot: bool,
	has_embeds: bool,
	author_tag: String,
}

impl From<&Message> for HistoryEntry {
	fn from(message: &Message) -> Self {
		Self {
			from_bot: message.author.bot,
			has_embeds: !message.embeds.is_empty(),
			author_tag: user_tag(&message.author.name, message.author.discriminator),
		}
	}
}

/// Lists each human who wrote in the ticket once, in the order they're first seen.
fn collect_participants(history: impl IntoIterator<Item = HistoryEntry>) -> Vec<String> {
	let mut participants: Vec<String> = Vec::new();
	for entry in history {
		if entry.from_bot || entry.has_embeds {
			continue;
		}
		if !participants.contains(&entry.author_tag) {
			participants.push(entry.author_tag);
		}
	}
	participants
}

pub async fn handle_close(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	if !interaction_member_is_staff(interaction, &context.config.tickets.staff_roles) {
		return respond_ephemeral(context, interaction, NOT_STAFF_CLOSE).await;
	}
	let Some(ticket) = current_ticket(interaction, context).await? else {
		return respond_ephemeral(context, interaction, NOT_A_TICKET).await;
	};
	let Some(user) = interaction.author() else {
		bail!("Ticket closed without an author: {:?}", interaction);
	};

	let close_delay = context.config.tickets.close_delay;
	respond_ephemeral(
		context,
		interaction,
		format!("This ticket will be closed in {}.", describe_duration(close_delay)),
	)
	.await?;

	let closing_embed = ticket_closing_embed(ticket.number).into_diagnostic()?;
	if let Err(error) = context
		.http
		.create_message(ticket.channel.id)
		.embeds(&[closing_embed])
		.await
	{
		tracing::warn!(source = ?error, channel = %ticket.channel.id, "failed to post ticket closing notice");
	}

	let call_members = close_call(context, &ticket).await;
	let participants = ticket_participants(context, ticket.channel.id).await;
	let opener = describe_opener(&context.http, ticket.guild_id, ticket.channel.opener()).await;
	let closer_avatar = avatar_url(user.id, user.avatar.as_ref());

	let log = TicketClosedLog {
		number: ticket.number,
		closed_by: user.id,
		closed_by_avatar: closer_avatar.as_deref(),
		channel_name: &ticket.name,
		channel_id: ticket.channel.id,
		participants: &participants,
		call_members: &call_members,
		opener: &opener,
		opened_at: created_at_tag(ticket.channel.id),
	};
	send_log(&context.http, &context.config, ticket_closed_log(&log)).await;
	tracing::info!(ticket = ticket.number, channel = %ticket.channel.id, closed_by = %user.id, "ticket closed");

	tokio::spawn(delete_ticket_channel(context.clone(), ticket.channel.id));

	Ok(())
}

/// Deletes the ticket's call, if it has one, and returns who was in it.
async fn close_call(context: &BotContext, ticket: &CurrentTicket) -> Vec<String> {
	let channels = guild_channels(&context.cache, ticket.guild_id);
	let Some(voice_channel) = find_call_channel(&channels, &ticket.name).map(|channel| channel.id) else {
		return Vec::new();
	};

	let members: Vec<String> = match context.cache.voice_channel_states(voice_channel) {
		Some(states) => states
			.map(|state| cached_user_tag(&context.cache, state.user_id()))
			.collect(),
		None => Vec::new(),
	};

	forget_call(context, voice_channel).await;
	if let Err(error) = delete_channel_if_exists(&context.http, voice_channel).await {
		tracing::error!(source = ?error, channel = %voice_channel, "failed to delete call of closed ticket");
	}

	members
}

async fn ticket_participants(context: &BotContext, channel_id: Id<ChannelMarker>) -> Vec<String> {
	let messages = match fetch_history(context, channel_id).await {
		Ok(messages) => messages,
		Err(error) => {
			tracing::warn!(source = ?error, channel = %channel_id, "failed to fetch ticket history");
			return Vec::new();
		}
	};
	collect_participants(messages.iter().map(HistoryEntry::from))
}

async fn fetch_history(context: &BotContext, channel_id: Id<ChannelMarker>) -> miette::Result<Vec<Message>> {
	let messages = context
		.http
		.channel_messages(channel_id)
		.limit(context.config.tickets.history_limit)
		.await
		.into_diagnostic()?
		.models()
		.await
		.into_diagnostic()?;
	Ok(messages)
}

async fn delete_ticket_channel(context: BotContext, channel_id: Id<ChannelMarker>) {
	sleep(context.config.tickets.close_delay).await;
	match delete_channel_if_exists(&context.http, channel_id).await {
		Ok(true) => tracing::debug!(channel = %channel_id, "ticket channel deleted"),
		Ok(false) => tracing::debug!(channel = %channel_id, "ticket channel was already deleted"),
		Err(error) => tracing::error!(source = ?error, channel = %channel_id, "failed to delete ticket channel"),
	}
}

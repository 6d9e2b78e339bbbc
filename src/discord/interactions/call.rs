// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{CurrentTicket, current_ticket};
use crate::discord::context::BotContext;
use crate::discord::events::voice::{forget_call, watch_call};
use crate::discord::state::calls::CallWatch;
use crate::discord::utils::components::{call_deletion_confirmation, link_button};
use crate::discord::utils::embeds::{call_created_log, call_deleted_log, call_exists_embed};
use crate::discord::utils::log::send_log;
use crate::discord::utils::permissions::{interaction_member_is_staff, ticket_voice_overwrites};
use crate::discord::utils::responses::{
	NOT_A_TICKET, NOT_STAFF_CALL, NOT_STAFF_DELETE_CALL, replace_component_message, respond, respond_ephemeral,
};
use crate::discord::utils::tickets::{channel_url, delete_channel_if_exists, find_call_channel, guild_channels};
use crate::discord::utils::users::{avatar_url, describe_opener};
use miette::{IntoDiagnostic, bail};
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::InteractionResponseType;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

const CALL_NOT_FOUND: &str = "There's no call for this ticket.";

pub async fn handle_create_call(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	if !interaction_member_is_staff(interaction, &context.config.tickets.staff_roles) {
		return respond_ephemeral(context, interaction, NOT_STAFF_CALL).await;
	}
	let Some(ticket) = current_ticket(interaction, context).await? else {
		return respond_ephemeral(context, interaction, NOT_A_TICKET).await;
	};
	let Some(user) = interaction.author() else {
		bail!("Call requested without an author: {:?}", interaction);
	};

	if existing_call(context, &ticket).is_some() {
		let embed = call_exists_embed(context.config.panel.color).into_diagnostic()?;
		let response = InteractionResponseDataBuilder::new()
			.embeds([embed])
			.components([call_deletion_confirmation()])
			.flags(MessageFlags::EPHEMERAL)
			.build();
		return respond(context, interaction, InteractionResponseType::ChannelMessageWithSource, response).await;
	}

	let opener = ticket.channel.opener();
	let overwrites = ticket_voice_overwrites(ticket.guild_id, opener, &context.config.tickets.staff_roles);
	let mut request = context
		.http
		.create_guild_channel(ticket.guild_id, &ticket.name)
		.kind(ChannelType::GuildVoice)
		.permission_overwrites(&overwrites);
	if let Some(parent_id) = ticket.channel.parent_id {
		request = request.parent_id(parent_id);
	}
	let voice_channel = request.await.into_diagnostic()?.model().await.into_diagnostic()?;
	tracing::info!(ticket = ticket.number, channel = %voice_channel.id, "ticket call created");

	let response = InteractionResponseDataBuilder::new()
		.content("Call created!")
		.components([link_button("Join call", channel_url(ticket.guild_id, voice_channel.id))])
		.build();
	respond(context, interaction, InteractionResponseType::ChannelMessageWithSource, response).await?;

	watch_call(
		context,
		CallWatch::new(
			ticket.guild_id,
			voice_channel.id,
			ticket.name.clone(),
			ticket.channel.id,
			ticket.number,
			opener,
		),
	)
	.await;

	let opener_text = describe_opener(&context.http, ticket.guild_id, opener).await;
	let creator_avatar = avatar_url(user.id, user.avatar.as_ref());
	let log_embed = call_created_log(
		ticket.number,
		user.id,
		creator_avatar.as_deref(),
		voice_channel.id,
		&opener_text,
	);
	send_log(&context.http, &context.config, log_embed).await;

	Ok(())
}

pub async fn handle_confirm_delete(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	if !interaction_member_is_staff(interaction, &context.config.tickets.staff_roles) {
		return respond_ephemeral(context, interaction, NOT_STAFF_DELETE_CALL).await;
	}
	let Some(ticket) = current_ticket(interaction, context).await? else {
		return respond_ephemeral(context, interaction, NOT_A_TICKET).await;
	};
	let Some(user) = interaction.author() else {
		bail!("Call deletion confirmed without an author: {:?}", interaction);
	};
	let Some(voice_channel) = existing_call(context, &ticket) else {
		return replace_component_message(context, interaction, CALL_NOT_FOUND).await;
	};

	match delete_channel_if_exists(&context.http, voice_channel).await {
		Ok(true) => (),
		Ok(false) => {
			forget_call(context, voice_channel).await;
			return replace_component_message(context, interaction, CALL_NOT_FOUND).await;
		}
		Err(error) => {
			tracing::error!(source = ?error, channel = %voice_channel, "failed to delete ticket call");
			return replace_component_message(context, interaction, "The call couldn't be deleted. Please try again.")
				.await;
		}
	}
	forget_call(context, voice_channel).await;
	tracing::info!(ticket = ticket.number, channel = %voice_channel, "ticket call deleted manually");

	replace_component_message(context, interaction, "The call has been deleted.").await?;

	let opener_text = describe_opener(&context.http, ticket.guild_id, ticket.channel.opener()).await;
	let deleter_avatar = avatar_url(user.id, user.avatar.as_ref());
	let log_embed = call_deleted_log(
		ticket.number,
		user.id,
		deleter_avatar.as_deref(),
		&ticket.name,
		voice_channel,
		&opener_text,
	);
	send_log(&context.http, &context.config, log_embed).await;

	Ok(())
}

pub async fn handle_cancel_delete(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	replace_component_message(context, interaction, "The call was kept.").await
}

fn existing_call(context: &BotContext, ticket: &CurrentTicket) -> Option<Id<ChannelMarker>> {
	let channels = guild_channels(&context.cache, ticket.guild_id);
	find_call_channel(&channels, &ticket.name).map(|channel| channel.id)
}

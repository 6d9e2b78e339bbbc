// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::state::opening::PendingOpens;
use crate::discord::utils::components::{
	REASON_INPUT_ID, link_button, reason_modal_components, reason_modal_id, ticket_actions, ticket_menu,
};
use crate::discord::utils::embeds::{ticket_created_embed, ticket_created_log};
use crate::discord::utils::log::send_log;
use crate::discord::utils::permissions::ticket_text_overwrites;
use crate::discord::utils::responses::{
	ALREADY_OPENING, NOT_IN_GUILD, TICKET_OPEN_FAILED, already_open_message, respond, respond_ephemeral,
};
use crate::discord::utils::tickets::{TicketCategory, TicketChannelName, channel_url, find_open_ticket, guild_channels};
use crate::discord::utils::users::avatar_url;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::InteractionClient;
use twilight_http::request::application::interaction::UpdateResponse;
use twilight_mention::fmt::Mention;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::channel::message::MessageFlags;
use twilight_model::channel::{Channel, ChannelType};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::InteractionResponseType;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker};
use twilight_model::user::User;
use twilight_util::builder::InteractionResponseDataBuilder;

const GO_TO_TICKET: &str = "Go to ticket";

pub async fn handle_category_select(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	context: &BotContext,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		return respond_ephemeral(context, interaction, NOT_IN_GUILD).await;
	};
	let Some(user) = interaction.author() else {
		bail!("Ticket menu used without an author: {:?}", interaction);
	};
	let Some(category) = interaction_data
		.values
		.first()
		.and_then(|value| TicketCategory::from_value(value))
	else {
		bail!("Ticket menu submitted with an unknown category: {:?}", interaction_data.values);
	};

	let existing_ticket = existing_ticket(context, guild_id, user);
	match existing_ticket {
		Some(ticket_channel) => respond_already_open(context, interaction, guild_id, ticket_channel).await?,
		None => {
			let modal = InteractionResponseDataBuilder::new()
				.custom_id(reason_modal_id(category))
				.title(format!("{} ticket", category.label()))
				.components(reason_modal_components())
				.build();
			respond(context, interaction, InteractionResponseType::Modal, modal).await?;
		}
	}

	reset_panel_menu(context, interaction).await;
	Ok(())
}

pub async fn handle_reason_modal(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	category: TicketCategory,
	context: &BotContext,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		return respond_ephemeral(context, interaction, NOT_IN_GUILD).await;
	};
	let Some(user) = interaction.author() else {
		bail!("Ticket modal submitted without an author: {:?}", interaction);
	};

	let mut reason = String::new();
	for row in modal_data.components.iter() {
		for component in row.components.iter() {
			if component.custom_id == REASON_INPUT_ID {
				reason = component.value.clone().unwrap_or_default();
			}
		}
	}
	let reason = reason.trim();

	let began = {
		let mut state = context.state.write().await;
		let pending_opens = state.entry::<PendingOpens>().or_insert_with(PendingOpens::default);
		pending_opens.begin(user.id)
	};
	if !began {
		return respond_ephemeral(context, interaction, ALREADY_OPENING).await;
	}

	let open_result = open_ticket(interaction, context, guild_id, user, category, reason).await;

	{
		let mut state = context.state.write().await;
		if let Some(pending_opens) = state.get_mut::<PendingOpens>() {
			pending_opens.finish(user.id);
		}
	}

	open_result
}

async fn open_ticket(
	interaction: &InteractionCreate,
	context: &BotContext,
	guild_id: Id<GuildMarker>,
	user: &User,
	category: TicketCategory,
	reason: &str,
) -> miette::Result<()> {
	if let Some(ticket_channel) = existing_ticket(context, guild_id, user) {
		return respond_already_open(context, interaction, guild_id, ticket_channel).await;
	}

	let deferred = InteractionResponseDataBuilder::new()
		.flags(MessageFlags::EPHEMERAL)
		.build();
	respond(
		context,
		interaction,
		InteractionResponseType::DeferredChannelMessageWithSource,
		deferred,
	)
	.await?;

	let (number, channel) = match create_ticket_channel(context, guild_id, user).await {
		Ok(created) => created,
		Err(error) => {
			report_open_failure(context, interaction).await;
			return Err(error);
		}
	};
	tracing::info!(guild = %guild_id, user = %user.id, ticket = number, channel = %channel.id, "ticket opened");

	let opener_avatar = avatar_url(user.id, user.avatar.as_ref());
	let embed = ticket_created_embed(
		number,
		user.id,
		opener_avatar.as_deref(),
		category,
		reason,
		context.config.panel.color,
	)
	.into_diagnostic()?;
	let opener_mention = user.id.mention().to_string();
	let embeds = [embed];
	let components = [ticket_actions()];
	let welcome = context
		.http
		.create_message(channel.id)
		.content(&opener_mention)
		.embeds(&embeds)
		.components(&components)
		.await;
	if let Err(error) = welcome {
		tracing::warn!(channel = %channel.id, "ticket channel was created without its welcome message");
		report_open_failure(context, interaction).await;
		return Err(error).into_diagnostic();
	}

	let link = [link_button(GO_TO_TICKET, channel_url(guild_id, channel.id))];
	context
		.interaction()
		.update_response(&interaction.token)
		.content(Some("Your ticket has been created!"))
		.components(Some(&link[..]))
		.await
		.into_diagnostic()?;

	let log_embed = ticket_created_log(number, user.id, opener_avatar.as_deref(), channel.id, category, reason);
	send_log(&context.http, &context.config, log_embed).await;

	Ok(())
}

async fn create_ticket_channel(
	context: &BotContext,
	guild_id: Id<GuildMarker>,
	user: &User,
) -> miette::Result<(u64, Channel)> {
	let number = context.counter.next().await?;
	let name = TicketChannelName::new(&user.name, number).to_string();
	let topic = user.id.to_string();
	let overwrites = ticket_text_overwrites(guild_id, user.id, &context.config.tickets.staff_roles);

	let mut request = context
		.http
		.create_guild_channel(guild_id, &name)
		.kind(ChannelType::GuildText)
		.topic(&topic)
		.permission_overwrites(&overwrites);
	if let Some(category) = context.config.tickets.category {
		request = request.parent_id(category);
	}
	let channel = request.await.into_diagnostic()?.model().await.into_diagnostic()?;

	Ok((number, channel))
}

fn existing_ticket(context: &BotContext, guild_id: Id<GuildMarker>, user: &User) -> Option<Id<ChannelMarker>> {
	let channels = guild_channels(&context.cache, guild_id);
	find_open_ticket(&channels, context.config.tickets.category, user.id, &user.name).map(|channel| channel.id)
}

async fn respond_already_open(
	context: &BotContext,
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	ticket_channel: Id<ChannelMarker>,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(already_open_message(ticket_channel.mention()))
		.components([link_button(GO_TO_TICKET, channel_url(guild_id, ticket_channel))])
		.flags(MessageFlags::EPHEMERAL)
		.build();
	respond(context, interaction, InteractionResponseType::ChannelMessageWithSource, response).await
}

/// Replaces the deferred "thinking" reply with the failure notice.
async fn report_open_failure(context: &BotContext, interaction: &InteractionCreate) {
	let interaction_client = context.interaction();
	if let Err(error) = open_failure_update(&interaction_client, &interaction.token).await {
		tracing::warn!(source = ?error, "failed to report ticket creation failure");
	}
}

fn open_failure_update<'a>(interaction_client: &'a InteractionClient<'a>, token: &'a str) -> UpdateResponse<'a> {
	interaction_client
		.update_response(token)
		.content(Some(TICKET_OPEN_FAILED))
}

/// Clears the selection on the panel's menu so the same category can be picked again.
async fn reset_panel_menu(context: &BotContext, interaction: &InteractionCreate) {
	let Some(message) = interaction.message.as_ref() else {
		return;
	};
	let components = [ticket_menu()];
	if let Err(error) = context
		.http
		.update_message(message.channel_id, message.id)
		.components(Some(&components[..]))
		.await
	{
		tracing::warn!(source = ?error, message = %message.id, "failed to reset ticket panel menu");
	}
}

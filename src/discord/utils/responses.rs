// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use miette::IntoDiagnostic;
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

pub const NOT_IN_GUILD: &str = "This can only be used in a server.";
pub const NOT_STAFF_CLOSE: &str = "You don't have permission to close tickets.";
pub const NOT_STAFF_CALL: &str = "You don't have permission to create calls.";
pub const NOT_STAFF_DELETE_CALL: &str = "You don't have permission to delete calls.";
pub const NOT_A_TICKET: &str = "This can only be used in a ticket channel.";
pub const ALREADY_OPENING: &str = "Your ticket is already being created. Please wait a moment.";
pub const TICKET_OPEN_FAILED: &str = "Something went wrong while creating your ticket. Please try again later.";

pub async fn respond(
	context: &BotContext,
	interaction: &InteractionCreate,
	kind: InteractionResponseType,
	data: InteractionResponseData,
) -> miette::Result<()> {
	let response = InteractionResponse {
		kind,
		data: Some(data),
	};
	context
		.interaction()
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Replies with a message only the interacting user sees.
pub async fn respond_ephemeral(
	context: &BotContext,
	interaction: &InteractionCreate,
	content: impl Into<String>,
) -> miette::Result<()> {
	let data = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	respond(context, interaction, InteractionResponseType::ChannelMessageWithSource, data).await
}

/// Replaces the message the component was on, removing its embeds and components.
pub async fn replace_component_message(
	context: &BotContext,
	interaction: &InteractionCreate,
	content: impl Into<String>,
) -> miette::Result<()> {
	let data = InteractionResponseDataBuilder::new()
		.content(content)
		.embeds(Vec::new())
		.components(Vec::new())
		.build();
	respond(context, interaction, InteractionResponseType::UpdateMessage, data).await
}

pub fn already_open_message(channel_mention: impl std::fmt::Display) -> String {
	format!("You already have an open ticket: {}", channel_mention)
}

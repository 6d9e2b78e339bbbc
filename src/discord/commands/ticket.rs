// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::utils::components::ticket_menu;
use crate::discord::utils::embeds::panel_embed;
use crate::discord::utils::responses::{NOT_IN_GUILD, respond_ephemeral};
use crate::discord::utils::users::cached_guild_icon_url;
use miette::{IntoDiagnostic, bail};
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::CommandBuilder;

pub fn command_definition() -> Command {
	CommandBuilder::new("ticket", "Post the ticket panel in this channel", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_CHANNELS)
		.build()
}

pub async fn handle_command(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		return respond_ephemeral(context, interaction, NOT_IN_GUILD).await;
	};
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("Ticket panel command used without a channel: {:?}", interaction);
	};

	let guild_icon = cached_guild_icon_url(&context.cache, guild_id);
	let embed = panel_embed(&context.config.panel, guild_icon.as_deref()).into_diagnostic()?;
	let embeds = [embed];
	let components = [ticket_menu()];
	context
		.http
		.create_message(channel.id)
		.embeds(&embeds)
		.components(&components)
		.await
		.into_diagnostic()?;
	tracing::info!(guild = %guild_id, channel = %channel.id, "ticket panel posted");

	respond_ephemeral(context, interaction, "Ticket panel sent!").await
}

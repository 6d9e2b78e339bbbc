// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::context::BotContext;
use miette::bail;
use std::time::Duration;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod ping;
mod ticket;

pub fn command_definitions() -> Vec<Command> {
	vec![ping::command_definition(), ticket::command_definition()]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	context: &BotContext,
	latency: Option<Duration>,
) -> miette::Result<()> {
	match command_data.name.as_str() {
		"ping" => ping::handle_command(interaction, context, latency).await,
		"ticket" => ticket::handle_command(interaction, context).await,
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::application::interaction::InteractionContextType;

	#[test]
	fn every_command_is_guild_only() {
		let commands = command_definitions();
		let names: Vec<&str> = commands.iter().map(|command| command.name.as_str()).collect();
		assert_eq!(names, vec!["ping", "ticket"]);
		for command in commands {
			assert_eq!(command.contexts, Some(vec![InteractionContextType::Guild]));
		}
	}
}

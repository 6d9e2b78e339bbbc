// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use crate::discord::utils::responses::respond_ephemeral;
use std::time::Duration;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::CommandBuilder;

pub fn command_definition() -> Command {
	CommandBuilder::new("ping", "Check the bot's connection to Discord", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	context: &BotContext,
	latency: Option<Duration>,
) -> miette::Result<()> {
	respond_ephemeral(context, interaction, pong_message(latency)).await
}

fn pong_message(latency: Option<Duration>) -> String {
	match latency {
		Some(latency) => format!("Pong!\nAPI: {}ms", latency.as_millis()),
		None => String::from("Pong!\nAPI: unknown"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pong_reports_latency_when_known() {
		assert_eq!(pong_message(Some(Duration::from_millis(42))), "Pong!\nAPI: 42ms");
		assert_eq!(pong_message(None), "Pong!\nAPI: unknown");
	}
}

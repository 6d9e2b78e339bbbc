// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use twilight_http::client::Client;
use twilight_model::channel::message::embed::Embed;
use twilight_validate::embed::EmbedValidationError;

/// Posts an embed to the log channel. Does nothing if no log channel is configured, and never fails the caller.
pub async fn send_log(http_client: &Client, config: &ConfigData, embed: Result<Embed, EmbedValidationError>) {
	let Some(log_channel) = config.tickets.log_channel else {
		tracing::debug!("no log channel configured; skipping log message");
		return;
	};
	let embed = match embed {
		Ok(embed) => embed,
		Err(error) => {
			tracing::warn!(source = ?error, "failed to build log embed");
			return;
		}
	};
	let embeds = [embed];
	if let Err(error) = http_client.create_message(log_channel).embeds(&embeds).await {
		tracing::warn!(source = ?error, channel = %log_channel, "failed to send log message");
	}
}

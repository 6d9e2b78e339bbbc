// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlValue};
use miette::{IntoDiagnostic, Result, bail, ensure};
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::read_to_string;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};

pub const DEFAULT_CONFIG_PATH: &str = "config.kdl";
pub const CONFIG_PATH_VAR: &str = "TICKET_DESK_CONFIG";

pub const TOKEN_VAR: &str = "CLIENT_TOKEN";
pub const LOG_CHANNEL_VAR: &str = "LOG_CHANNEL_ID";
pub const TICKET_CATEGORY_VAR: &str = "TICKET_CATEGORY_ID";
pub const STAFF_ROLES_VAR: &str = "TICKET_STAFF_ROLES";

const DEFAULT_COUNTER_FILE: &str = "database/ticket.json";
const DEFAULT_CALL_INACTIVITY_SECS: u64 = 180;
const DEFAULT_CLOSE_DELAY_SECS: u64 = 5;
const DEFAULT_HISTORY_LIMIT: u16 = 35;
const MAX_HISTORY_LIMIT: u16 = 100;
const DEFAULT_ACTIVITY: &str = "Support tickets";
const DEFAULT_ACTIVITY_URL: &str = "https://www.twitch.tv/discord";
const DEFAULT_PANEL_AUTHOR: &str = "Support Tickets";
const DEFAULT_PANEL_COLOR: u32 = 0xbc3bcc;

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub tickets: TicketConfig,
	pub presence: PresenceConfig,
	pub panel: PanelConfig,
}

pub struct DiscordConfig {
	pub bot_token: String,
}

impl fmt::Debug for DiscordConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DiscordConfig").field("bot_token", &"<redacted>").finish()
	}
}

#[derive(Debug)]
pub struct TicketConfig {
	/// Category under which ticket channels are created. Without one, tickets land at the top of the channel list.
	pub category: Option<Id<ChannelMarker>>,
	/// Channel receiving the audit log embeds. Logging is skipped when unset.
	pub log_channel: Option<Id<ChannelMarker>>,
	/// Roles allowed to start calls and close tickets.
	pub staff_roles: Vec<Id<RoleMarker>>,
	pub counter_file: PathBuf,
	/// How long a ticket call may sit empty before it's deleted.
	pub call_inactivity: Duration,
	/// Delay between the closing notice and the deletion of the ticket channel.
	pub close_delay: Duration,
	/// Number of recent messages scanned for participants when a ticket closes.
	pub history_limit: u16,
}

#[derive(Debug)]
pub struct PresenceConfig {
	pub activity: String,
	pub url: String,
}

#[derive(Debug)]
pub struct PanelConfig {
	pub author: String,
	pub icon_url: Option<String>,
	pub color: u32,
}

/// Loads the configuration file at the given path (if it exists) and overlays the environment on top of it.
pub async fn load_config(config_path: &str) -> Result<ConfigData> {
	let mut partial = PartialConfig::default();
	match read_to_string(config_path).await {
		Ok(contents) => partial.apply_document(&parse_document(&contents)?)?,
		Err(error) if error.kind() == ErrorKind::NotFound => {
			tracing::info!(path = config_path, "No configuration file found; reading the environment only");
		}
		Err(error) => return Err(error).into_diagnostic(),
	}
	partial.apply_env(|name| std::env::var(name).ok());
	partial.build()
}

pub fn parse_document(contents: &str) -> Result<KdlDocument> {
	let document: KdlDocument = contents.parse()?;
	Ok(document)
}

#[derive(Debug, Default)]
struct PartialConfig {
	bot_token: Option<String>,
	category: Option<Id<ChannelMarker>>,
	log_channel: Option<Id<ChannelMarker>>,
	staff_roles: Option<Vec<Id<RoleMarker>>>,
	counter_file: Option<PathBuf>,
	call_inactivity_secs: Option<u64>,
	close_delay_secs: Option<u64>,
	history_limit: Option<u16>,
	activity: Option<String>,
	activity_url: Option<String>,
	panel_author: Option<String>,
	panel_icon_url: Option<String>,
	panel_color: Option<u32>,
}

impl PartialConfig {
	fn apply_document(&mut self, document: &KdlDocument) -> Result<()> {
		if let Some(discord) = document.get("discord").and_then(|node| node.children()) {
			if let Some(token) = discord.get_arg("bot-token") {
				self.bot_token = Some(string_value(token, "discord.bot-token")?);
			}
		}

		if let Some(tickets) = document.get("tickets").and_then(|node| node.children()) {
			if let Some(category) = tickets.get_arg("category") {
				self.category = Some(snowflake_value(category, "tickets.category")?);
			}
			if let Some(log_channel) = tickets.get_arg("log-channel") {
				self.log_channel = Some(snowflake_value(log_channel, "tickets.log-channel")?);
			}
			if tickets.get("staff-roles").is_some() {
				let roles = tickets
					.iter_args("staff-roles")
					.map(|value| snowflake_value(value, "tickets.staff-roles"))
					.collect::<Result<Vec<_>>>()?;
				self.staff_roles = Some(roles);
			}
			if let Some(path) = tickets.get_arg("counter-file") {
				self.counter_file = Some(PathBuf::from(string_value(path, "tickets.counter-file")?));
			}
			if let Some(secs) = tickets.get_arg("call-inactivity-seconds") {
				self.call_inactivity_secs = Some(integer_value(secs, "tickets.call-inactivity-seconds")?);
			}
			if let Some(secs) = tickets.get_arg("close-delay-seconds") {
				self.close_delay_secs = Some(integer_value(secs, "tickets.close-delay-seconds")?);
			}
			if let Some(limit) = tickets.get_arg("history-limit") {
				let limit: u64 = integer_value(limit, "tickets.history-limit")?;
				ensure!(
					(1..=u64::from(MAX_HISTORY_LIMIT)).contains(&limit),
					"tickets.history-limit must be between 1 and {}",
					MAX_HISTORY_LIMIT
				);
				self.history_limit = u16::try_from(limit).ok();
			}
		}

		if let Some(presence) = document.get("presence").and_then(|node| node.children()) {
			if let Some(activity) = presence.get_arg("activity") {
				self.activity = Some(string_value(activity, "presence.activity")?);
			}
			if let Some(url) = presence.get_arg("url") {
				self.activity_url = Some(string_value(url, "presence.url")?);
			}
		}

		if let Some(panel) = document.get("panel").and_then(|node| node.children()) {
			if let Some(author) = panel.get_arg("author") {
				self.panel_author = Some(string_value(author, "panel.author")?);
			}
			if let Some(icon_url) = panel.get_arg("icon-url") {
				self.panel_icon_url = Some(string_value(icon_url, "panel.icon-url")?);
			}
			if let Some(color) = panel.get_arg("color") {
				self.panel_color = Some(color_value(color)?);
			}
		}

		Ok(())
	}

	fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
		if let Some(token) = lookup(TOKEN_VAR).filter(|token| !token.is_empty()) {
			self.bot_token = Some(token);
		}
		if let Some(raw) = lookup(LOG_CHANNEL_VAR) {
			match env_snowflake(&raw) {
				Some(id) => self.log_channel = Some(id),
				None => tracing::warn!(value = %raw, "Ignoring invalid {}", LOG_CHANNEL_VAR),
			}
		}
		if let Some(raw) = lookup(TICKET_CATEGORY_VAR) {
			match env_snowflake(&raw) {
				Some(id) => self.category = Some(id),
				None => tracing::warn!(value = %raw, "Ignoring invalid {}", TICKET_CATEGORY_VAR),
			}
		}
		if let Some(raw) = lookup(STAFF_ROLES_VAR) {
			self.staff_roles = Some(parse_staff_roles(&raw));
		}
	}

	fn build(self) -> Result<ConfigData> {
		let Some(bot_token) = self.bot_token else {
			bail!(
				"No bot token configured; set {} or `discord {{ bot-token \"...\" }}` in the config file",
				TOKEN_VAR
			);
		};
		let staff_roles = self.staff_roles.unwrap_or_default();
		if staff_roles.is_empty() {
			tracing::warn!("No staff roles configured; nobody will be able to start calls or close tickets");
		}

		Ok(ConfigData {
			discord: DiscordConfig { bot_token },
			tickets: TicketConfig {
				category: self.category,
				log_channel: self.log_channel,
				staff_roles,
				counter_file: self.counter_file.unwrap_or_else(|| PathBuf::from(DEFAULT_COUNTER_FILE)),
				call_inactivity: Duration::from_secs(self.call_inactivity_secs.unwrap_or(DEFAULT_CALL_INACTIVITY_SECS)),
				close_delay: Duration::from_secs(self.close_delay_secs.unwrap_or(DEFAULT_CLOSE_DELAY_SECS)),
				history_limit: self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
			},
			presence: PresenceConfig {
				activity: self.activity.unwrap_or_else(|| String::from(DEFAULT_ACTIVITY)),
				url: self.activity_url.unwrap_or_else(|| String::from(DEFAULT_ACTIVITY_URL)),
			},
			panel: PanelConfig {
				author: self.panel_author.unwrap_or_else(|| String::from(DEFAULT_PANEL_AUTHOR)),
				icon_url: self.panel_icon_url,
				color: self.panel_color.unwrap_or(DEFAULT_PANEL_COLOR),
			},
		})
	}
}

/// Parses the staff role list from its JSON array form. Anything malformed leaves an empty (or partial) list rather
/// than stopping the bot.
pub fn parse_staff_roles(raw: &str) -> Vec<Id<RoleMarker>> {
	let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
		Ok(values) => values,
		Err(error) => {
			tracing::warn!(source = ?error, "{} is not a JSON array; no staff roles loaded", STAFF_ROLES_VAR);
			return Vec::new();
		}
	};

	values
		.into_iter()
		.filter_map(|value| {
			let id = match &value {
				serde_json::Value::String(id) => id.parse().ok(),
				serde_json::Value::Number(id) => id.as_u64(),
				_ => None,
			};
			let id = id.and_then(Id::new_checked);
			if id.is_none() {
				tracing::warn!(%value, "Skipping invalid staff role ID");
			}
			id
		})
		.collect()
}

fn env_snowflake<T>(raw: &str) -> Option<Id<T>> {
	raw.trim().parse().ok().and_then(Id::new_checked)
}

fn string_value(value: &KdlValue, key: &str) -> Result<String> {
	match value.as_string() {
		Some(value) => Ok(value.to_string()),
		None => bail!("{} must be a string", key),
	}
}

fn integer_value<T: TryFrom<i128>>(value: &KdlValue, key: &str) -> Result<T> {
	let Some(value) = value.as_integer() else {
		bail!("{} must be an integer", key);
	};
	match T::try_from(value) {
		Ok(value) => Ok(value),
		Err(_) => bail!("{} is out of range", key),
	}
}

fn snowflake_value<T>(value: &KdlValue, key: &str) -> Result<Id<T>> {
	let raw: Option<u64> = match value {
		KdlValue::Integer(id) => u64::try_from(*id).ok(),
		KdlValue::String(id) => id.parse().ok(),
		_ => None,
	};
	match raw.and_then(Id::new_checked) {
		Some(id) => Ok(id),
		None => bail!("{} must be a non-zero Discord ID", key),
	}
}

fn color_value(value: &KdlValue) -> Result<u32> {
	let color = match value {
		KdlValue::Integer(color) => u32::try_from(*color).ok(),
		KdlValue::String(color) => u32::from_str_radix(color.trim_start_matches('#'), 16).ok(),
		_ => None,
	};
	match color {
		Some(color) if color <= 0xffffff => Ok(color),
		_ => bail!("panel.color must be an RGB value such as \"#bc3bcc\""),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	const SAMPLE: &str = r##"
discord {
	bot-token "file-token"
}
tickets {
	category 1100000000000000001
	log-channel "1100000000000000002"
	staff-roles 1100000000000000003 "1100000000000000004"
	counter-file "data/counter.json"
	call-inactivity-seconds 60
	close-delay-seconds 10
	history-limit 50
}
presence {
	activity "Helping out"
	url "https://www.twitch.tv/example"
}
panel {
	author "Example Support"
	color "#112233"
}
"##;

	fn from_document(contents: &str) -> Result<PartialConfig> {
		let mut partial = PartialConfig::default();
		partial.apply_document(&parse_document(contents)?)?;
		Ok(partial)
	}

	#[test]
	fn reads_every_section() {
		let config = from_document(SAMPLE).unwrap().build().unwrap();
		assert_eq!(config.discord.bot_token, "file-token");
		assert_eq!(config.tickets.category, Some(Id::new(1100000000000000001)));
		assert_eq!(config.tickets.log_channel, Some(Id::new(1100000000000000002)));
		assert_eq!(
			config.tickets.staff_roles,
			vec![Id::new(1100000000000000003), Id::new(1100000000000000004)]
		);
		assert_eq!(config.tickets.counter_file, PathBuf::from("data/counter.json"));
		assert_eq!(config.tickets.call_inactivity, Duration::from_secs(60));
		assert_eq!(config.tickets.close_delay, Duration::from_secs(10));
		assert_eq!(config.tickets.history_limit, 50);
		assert_eq!(config.presence.activity, "Helping out");
		assert_eq!(config.panel.author, "Example Support");
		assert_eq!(config.panel.color, 0x112233);
		assert_eq!(config.panel.icon_url, None);
	}

	#[test]
	fn defaults_apply_with_only_a_token() {
		let mut partial = PartialConfig::default();
		partial.apply_env(|name| (name == TOKEN_VAR).then(|| String::from("env-token")));
		let config = partial.build().unwrap();
		assert_eq!(config.tickets.counter_file, PathBuf::from(DEFAULT_COUNTER_FILE));
		assert_eq!(config.tickets.call_inactivity, Duration::from_secs(180));
		assert_eq!(config.tickets.close_delay, Duration::from_secs(5));
		assert_eq!(config.tickets.history_limit, 35);
		assert!(config.tickets.staff_roles.is_empty());
		assert_eq!(config.tickets.log_channel, None);
		assert_eq!(config.panel.color, DEFAULT_PANEL_COLOR);
	}

	#[test]
	fn environment_overrides_the_file() {
		let env: HashMap<&str, &str> = HashMap::from([
			(TOKEN_VAR, "env-token"),
			(LOG_CHANNEL_VAR, "1200000000000000002"),
			(STAFF_ROLES_VAR, r#"["1200000000000000003"]"#),
		]);
		let mut partial = from_document(SAMPLE).unwrap();
		partial.apply_env(|name| env.get(name).map(|value| value.to_string()));
		let config = partial.build().unwrap();
		assert_eq!(config.discord.bot_token, "env-token");
		assert_eq!(config.tickets.log_channel, Some(Id::new(1200000000000000002)));
		assert_eq!(config.tickets.category, Some(Id::new(1100000000000000001)));
		assert_eq!(config.tickets.staff_roles, vec![Id::new(1200000000000000003)]);
	}

	#[test]
	fn invalid_environment_ids_are_ignored() {
		let mut partial = from_document(SAMPLE).unwrap();
		partial.apply_env(|name| (name == TICKET_CATEGORY_VAR).then(|| String::from("not-a-number")));
		let config = partial.build().unwrap();
		assert_eq!(config.tickets.category, Some(Id::new(1100000000000000001)));
	}

	#[test]
	fn missing_token_fails() {
		assert!(PartialConfig::default().build().is_err());
	}

	#[test]
	fn zero_snowflake_in_file_is_rejected() {
		let result = from_document("tickets {\n\tcategory 0\n}\n");
		assert!(result.is_err());
	}

	#[test]
	fn out_of_range_history_limit_is_rejected() {
		assert!(from_document("tickets {\n\thistory-limit 500\n}\n").is_err());
		assert!(from_document("tickets {\n\thistory-limit 0\n}\n").is_err());
	}

	#[test]
	fn staff_roles_accept_strings_and_numbers() {
		let roles: Vec<Id<RoleMarker>> = parse_staff_roles(r#"["1300000000000000001", 1300000000000000002]"#);
		assert_eq!(roles, vec![Id::new(1300000000000000001), Id::new(1300000000000000002)]);
	}

	#[test]
	fn malformed_staff_roles_degrade_to_empty() {
		assert!(parse_staff_roles("not json").is_empty());
		assert!(parse_staff_roles(r#"{"role": 1}"#).is_empty());
		assert_eq!(parse_staff_roles(r#"["0", "abc", "1300000000000000005"]"#), vec![Id::new(1300000000000000005)]);
	}

	#[test]
	fn debug_output_hides_the_token() {
		let discord = DiscordConfig {
			bot_token: String::from("secret"),
		};
		assert!(!format!("{:?}", discord).contains("secret"));
	}
}

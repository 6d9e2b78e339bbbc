// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::context::BotContext;
use miette::IntoDiagnostic;
use std::fmt;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::client::Client;
use twilight_http::error::{Error, ErrorType};
use twilight_http::response::StatusCode;
use twilight_model::channel::{Channel, ChannelType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

pub const TICKET_NAME_PREFIX: &str = "・";

/// The name given to both channels of a ticket: `・<username>-<number>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicketChannelName {
	pub username: String,
	pub number: u64,
}

impl TicketChannelName {
	pub fn new(username: &str, number: u64) -> Self {
		Self {
			username: username.to_lowercase(),
			number,
		}
	}

	/// Reads a ticket name back. Usernames may contain `-`, so the number is whatever follows the last one.
	pub fn parse(name: &str) -> Option<Self> {
		let rest = name.strip_prefix(TICKET_NAME_PREFIX)?;
		let (username, number) = rest.rsplit_once('-')?;
		if username.is_empty() {
			return None;
		}
		let number = number.parse().ok()?;
		Some(Self {
			username: username.to_lowercase(),
			number,
		})
	}
}

impl fmt::Display for TicketChannelName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}-{}", TICKET_NAME_PREFIX, self.username, self.number)
	}
}

/// The parts of a channel the ticket lookups care about
#[derive(Clone, Debug)]
pub struct ChannelSummary {
	pub id: Id<ChannelMarker>,
	pub kind: ChannelType,
	pub name: Option<String>,
	pub topic: Option<String>,
	pub parent_id: Option<Id<ChannelMarker>>,
}

impl From<&Channel> for ChannelSummary {
	fn from(channel: &Channel) -> Self {
		Self {
			id: channel.id,
			kind: channel.kind,
			name: channel.name.clone(),
			topic: channel.topic.clone(),
			parent_id: channel.parent_id,
		}
	}
}

impl ChannelSummary {
	pub fn ticket_name(&self) -> Option<TicketChannelName> {
		self.name.as_deref().and_then(TicketChannelName::parse)
	}

	/// The user who opened the ticket, as recorded in the channel topic.
	pub fn opener(&self) -> Option<Id<UserMarker>> {
		self.topic
			.as_deref()
			.and_then(|topic| topic.trim().parse().ok())
			.and_then(Id::new_checked)
	}
}

/// Finds the open ticket of a user among a guild's channels.
///
/// A text channel counts if its topic holds the user's ID or its name follows the ticket convention for the user's
/// name. When a ticket category is configured, only channels in it are considered.
pub fn find_open_ticket<'a>(
	channels: &'a [ChannelSummary],
	category: Option<Id<ChannelMarker>>,
	user_id: Id<UserMarker>,
	username: &str,
) -> Option<&'a ChannelSummary> {
	let username = username.to_lowercase();
	channels
		.iter()
		.filter(|channel| channel.kind == ChannelType::GuildText)
		.filter(|channel| category.is_none() || channel.parent_id == category)
		.find(|channel| {
			channel.opener() == Some(user_id)
				|| channel
					.ticket_name()
					.is_some_and(|ticket_name| ticket_name.username == username)
		})
}

/// Finds the voice channel belonging to the ticket whose text channel has the given name.
pub fn find_call_channel<'a>(channels: &'a [ChannelSummary], ticket_channel_name: &str) -> Option<&'a ChannelSummary> {
	channels
		.iter()
		.find(|channel| channel.kind == ChannelType::GuildVoice && channel.name.as_deref() == Some(ticket_channel_name))
}

/// Collects the cached channels of a guild.
pub fn guild_channels(cache: &DefaultInMemoryCache, guild_id: Id<GuildMarker>) -> Vec<ChannelSummary> {
	let Some(channel_ids) = cache.guild_channels(guild_id) else {
		return Vec::new();
	};
	channel_ids
		.value()
		.iter()
		.filter_map(|channel_id| cache.channel(*channel_id))
		.map(|channel| ChannelSummary::from(channel.value()))
		.collect()
}

/// Gets a channel from the cache, asking Discord when it isn't cached.
pub async fn channel_summary(context: &BotContext, channel_id: Id<ChannelMarker>) -> miette::Result<ChannelSummary> {
	if let Some(channel) = context.cache.channel(channel_id) {
		return Ok(ChannelSummary::from(channel.value()));
	}
	let channel = context
		.http
		.channel(channel_id)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;
	Ok(ChannelSummary::from(&channel))
}

/// Deletes a channel. Returns `false` if the channel was already gone.
pub async fn delete_channel_if_exists(http_client: &Client, channel_id: Id<ChannelMarker>) -> Result<bool, Error> {
	match http_client.delete_channel(channel_id).await {
		Ok(_) => Ok(true),
		Err(error) => {
			if let ErrorType::Response {
				status: StatusCode::NOT_FOUND,
				..
			} = error.kind()
			{
				Ok(false)
			} else {
				Err(error)
			}
		}
	}
}

pub fn channel_url(guild_id: Id<GuildMarker>, channel_id: Id<ChannelMarker>) -> String {
	format!("https://discord.com/channels/{}/{}", guild_id, channel_id)
}

/// The kinds of tickets offered on the panel
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketCategory {
	Financial,
	Question,
}

impl TicketCategory {
	pub fn all_categories() -> [Self; 2] {
		[Self::Financial, Self::Question]
	}

	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"financial-ticket" => Some(Self::Financial),
			"doubt-ticket" => Some(Self::Question),
			_ => None,
		}
	}

	pub fn value(&self) -> &'static str {
		match self {
			Self::Financial => "financial-ticket",
			Self::Question => "doubt-ticket",
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Financial => "Financial",
			Self::Question => "Question",
		}
	}

	pub fn description(&self) -> &'static str {
		match self {
			Self::Financial => "Get help with billing and payment matters.",
			Self::Question => "Ask about how the service works.",
		}
	}

	pub fn emoji(&self) -> &'static str {
		match self {
			Self::Financial => "🪙",
			Self::Question => "❓",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn summary(id: u64, kind: ChannelType, name: &str, topic: Option<&str>, parent: Option<u64>) -> ChannelSummary {
		ChannelSummary {
			id: Id::new(id),
			kind,
			name: Some(String::from(name)),
			topic: topic.map(String::from),
			parent_id: parent.map(Id::new),
		}
	}

	#[test]
	fn ticket_names_format_and_parse() {
		let name = TicketChannelName::new("Alice", 42);
		assert_eq!(name.to_string(), "・alice-42");
		assert_eq!(TicketChannelName::parse("・alice-42"), Some(name));
	}

	#[test]
	fn usernames_with_dashes_keep_everything_before_the_last_dash() {
		let parsed = TicketChannelName::parse("・some-user-name-7").unwrap();
		assert_eq!(parsed.username, "some-user-name");
		assert_eq!(parsed.number, 7);
	}

	#[test]
	fn non_ticket_names_do_not_parse() {
		assert_eq!(TicketChannelName::parse("general"), None);
		assert_eq!(TicketChannelName::parse("・alice"), None);
		assert_eq!(TicketChannelName::parse("・alice-"), None);
		assert_eq!(TicketChannelName::parse("・-3"), None);
		assert_eq!(TicketChannelName::parse("alice-3"), None);
		assert_eq!(TicketChannelName::parse("・alice-three"), None);
	}

	#[test]
	fn opener_comes_from_the_topic() {
		let channel = summary(10, ChannelType::GuildText, "・alice-1", Some("555"), None);
		assert_eq!(channel.opener(), Some(Id::new(555)));
		let no_topic = summary(11, ChannelType::GuildText, "・alice-1", None, None);
		assert_eq!(no_topic.opener(), None);
		let bad_topic = summary(12, ChannelType::GuildText, "・alice-1", Some("support"), None);
		assert_eq!(bad_topic.opener(), None);
	}

	#[test]
	fn existing_ticket_found_by_topic() {
		let channels = vec![
			summary(10, ChannelType::GuildText, "general", None, None),
			summary(11, ChannelType::GuildText, "・renamed-by-staff", Some("555"), Some(99)),
		];
		let found = find_open_ticket(&channels, Some(Id::new(99)), Id::new(555), "alice");
		assert_eq!(found.map(|channel| channel.id), Some(Id::new(11)));
	}

	#[test]
	fn existing_ticket_found_by_name() {
		let channels = vec![summary(11, ChannelType::GuildText, "・alice-3", None, None)];
		let found = find_open_ticket(&channels, None, Id::new(555), "Alice");
		assert_eq!(found.map(|channel| channel.id), Some(Id::new(11)));
	}

	#[test]
	fn other_users_and_voice_channels_do_not_count() {
		let channels = vec![
			summary(11, ChannelType::GuildText, "・bob-3", Some("777"), None),
			summary(12, ChannelType::GuildVoice, "・alice-3", Some("555"), None),
			summary(13, ChannelType::GuildText, "・alice-bob-4", None, None),
		];
		assert!(find_open_ticket(&channels, None, Id::new(555), "alice").is_none());
	}

	#[test]
	fn channels_outside_the_category_are_ignored() {
		let channels = vec![summary(11, ChannelType::GuildText, "・alice-3", Some("555"), Some(50))];
		assert!(find_open_ticket(&channels, Some(Id::new(99)), Id::new(555), "alice").is_none());
		assert!(find_open_ticket(&channels, Some(Id::new(50)), Id::new(555), "alice").is_some());
	}

	#[test]
	fn call_channel_matches_the_ticket_name() {
		let channels = vec![
			summary(11, ChannelType::GuildText, "・alice-3", Some("555"), None),
			summary(12, ChannelType::GuildVoice, "・alice-4", None, None),
			summary(13, ChannelType::GuildVoice, "・alice-3", None, None),
		];
		assert_eq!(find_call_channel(&channels, "・alice-3").map(|channel| channel.id), Some(Id::new(13)));
		assert!(find_call_channel(&channels, "・alice-5").is_none());
	}

	#[test]
	fn categories_round_trip_through_their_values() {
		for category in TicketCategory::all_categories() {
			assert_eq!(TicketCategory::from_value(category.value()), Some(category));
		}
		assert_eq!(TicketCategory::from_value("unknown"), None);
	}

	#[test]
	fn channel_urls_point_at_the_guild_channel() {
		assert_eq!(channel_url(Id::new(1), Id::new(2)), "https://discord.com/channels/1/2");
	}
}

// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::tickets::TicketCategory;
use super::timestamp::now_timestamp;
use crate::config::PanelConfig;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::embed::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};
use twilight_util::builder::embed::{EmbedAuthorBuilder, EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource};
use twilight_validate::embed::EmbedValidationError;

pub const COLOR_CREATED: u32 = 0x57f287;
pub const COLOR_INACTIVE: u32 = 0xe67e22;
pub const COLOR_REMOVED: u32 = 0xed4245;

const MAX_CODE_BLOCK_CONTENT: usize = 1000;

/// Formats a user as a mention followed by their ID.
pub fn user_with_id(user_id: Id<UserMarker>) -> String {
	format!("{} ``({})``", user_id.mention(), user_id)
}

pub fn channel_with_id(channel_id: Id<ChannelMarker>) -> String {
	format!("{} ``({})``", channel_id.mention(), channel_id)
}

/// Wraps text in a code block, keeping it within an embed field's length limit.
pub fn code_block(text: &str) -> String {
	let text = text.replace("```", "'''");
	let text: String = if text.chars().count() > MAX_CODE_BLOCK_CONTENT {
		let mut truncated: String = text.chars().take(MAX_CODE_BLOCK_CONTENT - 1).collect();
		truncated.push('…');
		truncated
	} else {
		text
	};
	format!("```{}```", text)
}

fn ticket_author(number: u64) -> EmbedAuthorBuilder {
	EmbedAuthorBuilder::new(format!("#{}", number))
}

fn with_thumbnail(embed: EmbedBuilder, url: Option<&str>) -> EmbedBuilder {
	match url.and_then(|url| ImageSource::url(url).ok()) {
		Some(image) => embed.thumbnail(image),
		None => embed,
	}
}

fn with_timestamp(embed: EmbedBuilder) -> EmbedBuilder {
	match now_timestamp() {
		Ok(timestamp) => embed.timestamp(timestamp),
		Err(_) => embed,
	}
}

/// The panel embed posted by `/ticket`.
pub fn panel_embed(panel: &PanelConfig, guild_icon_url: Option<&str>) -> Result<Embed, EmbedValidationError> {
	let mut author = EmbedAuthorBuilder::new(panel.author.clone());
	if let Some(icon) = panel.icon_url.as_deref().and_then(|url| ImageSource::url(url).ok()) {
		author = author.icon_url(icon);
	}
	let embed = EmbedBuilder::new()
		.color(panel.color)
		.author(author)
		.title(format!("Welcome to {}", panel.author))
		.description("To open a ticket, pick the category below that best matches your question.")
		.footer(EmbedFooterBuilder::new(
			"Misusing this tool may lead to punishment. Please use it responsibly.",
		));
	Ok(with_thumbnail(embed, guild_icon_url).validate()?.build())
}

/// The embed opening a new ticket channel.
pub fn ticket_created_embed(
	number: u64,
	opener: Id<UserMarker>,
	opener_avatar: Option<&str>,
	category: TicketCategory,
	reason: &str,
	color: u32,
) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.author(ticket_author(number))
		.title("Ticket Created!")
		.description("Your ticket has been created!\nA staff member will be with you shortly.")
		.field(EmbedFieldBuilder::new("Opened by:", user_with_id(opener)))
		.field(EmbedFieldBuilder::new("Category:", category.label()))
		.field(EmbedFieldBuilder::new("Reason:", code_block(reason)))
		.color(color);
	Ok(with_timestamp(with_thumbnail(embed, opener_avatar)).validate()?.build())
}

pub fn ticket_created_log(
	number: u64,
	opener: Id<UserMarker>,
	opener_avatar: Option<&str>,
	channel_id: Id<ChannelMarker>,
	category: TicketCategory,
	reason: &str,
) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.author(ticket_author(number))
		.title("Ticket Created!")
		.field(EmbedFieldBuilder::new("Opened by:", user_with_id(opener)))
		.field(EmbedFieldBuilder::new("Channel:", channel_with_id(channel_id)))
		.field(EmbedFieldBuilder::new("Category:", category.label()))
		.field(EmbedFieldBuilder::new("Reason:", code_block(reason)))
		.color(COLOR_CREATED);
	Ok(with_timestamp(with_thumbnail(embed, opener_avatar)).validate()?.build())
}

pub fn call_exists_embed(color: u32) -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title("Call Already Exists!")
		.description("There's already a call for this ticket. Do you want to delete it?")
		.color(color)
		.validate()?
		.build())
}

pub fn call_created_log(
	number: u64,
	created_by: Id<UserMarker>,
	created_by_avatar: Option<&str>,
	call_id: Id<ChannelMarker>,
	opener: &str,
) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.author(ticket_author(number))
		.title("Call Created!")
		.field(EmbedFieldBuilder::new("Call created by:", user_with_id(created_by)))
		.field(EmbedFieldBuilder::new("Channel:", channel_with_id(call_id)))
		.field(EmbedFieldBuilder::new("Ticket opened by:", opener))
		.color(COLOR_CREATED);
	Ok(with_timestamp(with_thumbnail(embed, created_by_avatar)).validate()?.build())
}

pub fn call_deleted_log(
	number: u64,
	deleted_by: Id<UserMarker>,
	deleted_by_avatar: Option<&str>,
	call_name: &str,
	call_id: Id<ChannelMarker>,
	opener: &str,
) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.author(ticket_author(number))
		.title("Call Deleted Manually!")
		.field(EmbedFieldBuilder::new("Deleted by:", user_with_id(deleted_by)))
		.field(EmbedFieldBuilder::new("Call:", format!("{} ``({})``", call_name, call_id)))
		.field(EmbedFieldBuilder::new("Ticket opened by:", opener))
		.color(COLOR_REMOVED);
	Ok(with_timestamp(with_thumbnail(embed, deleted_by_avatar)).validate()?.build())
}

pub fn call_inactive_log(
	number: u64,
	call_name: &str,
	call_id: Id<ChannelMarker>,
	opener: &str,
	inactive_for: &str,
) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.author(ticket_author(number))
		.title("Call Deleted for Inactivity!")
		.field(EmbedFieldBuilder::new(
			"Reason:",
			code_block(&format!("The call was deleted after {} without anyone in it.", inactive_for)),
		))
		.field(EmbedFieldBuilder::new("Call:", format!("{} ``({})``", call_name, call_id)))
		.field(EmbedFieldBuilder::new("Ticket opened by:", opener))
		.color(COLOR_INACTIVE);
	Ok(with_timestamp(embed).validate()?.build())
}

/// The notice posted in the ticket channel just before it's deleted.
pub fn ticket_closing_embed(number: u64) -> Result<Embed, EmbedValidationError> {
	let embed = EmbedBuilder::new()
		.author(ticket_author(number))
		.title("Ticket Closed!")
		.description("Your ticket has been closed.")
		.color(COLOR_REMOVED);
	Ok(with_timestamp(embed).validate()?.build())
}

/// Everything reported when a ticket is closed
pub struct TicketClosedLog<'a> {
	pub number: u64,
	pub closed_by: Id<UserMarker>,
	pub closed_by_avatar: Option<&'a str>,
	pub channel_name: &'a str,
	pub channel_id: Id<ChannelMarker>,
	pub participants: &'a [String],
	pub call_members: &'a [String],
	pub opener: &'a str,
	pub opened_at: Option<String>,
}

pub fn ticket_closed_log(log: &TicketClosedLog<'_>) -> Result<Embed, EmbedValidationError> {
	let participants = if log.participants.is_empty() {
		String::from("No participants")
	} else {
		log.participants.join(", ")
	};
	let call_members = if log.call_members.is_empty() {
		String::from("N/A")
	} else {
		log.call_members.join(", ")
	};

	let mut embed = EmbedBuilder::new()
		.author(ticket_author(log.number))
		.title("Ticket Closed!")
		.field(EmbedFieldBuilder::new("Closed by", user_with_id(log.closed_by)))
		.field(EmbedFieldBuilder::new(
			"Channel",
			format!("{} ``({})``", log.channel_name, log.channel_id),
		))
		.field(EmbedFieldBuilder::new("Participants", code_block(&participants)))
		.field(EmbedFieldBuilder::new("Call members", code_block(&call_members)))
		.field(EmbedFieldBuilder::new("Ticket opened by", log.opener));
	if let Some(opened_at) = &log.opened_at {
		embed = embed.field(EmbedFieldBuilder::new("Opened at", opened_at.as_str()));
	}
	let embed = embed.color(COLOR_REMOVED);
	Ok(with_timestamp(with_thumbnail(embed, log.closed_by_avatar)).validate()?.build())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn field_value<'a>(embed: &'a Embed, name: &str) -> Option<&'a str> {
		embed
			.fields
			.iter()
			.find(|field| field.name == name)
			.map(|field| field.value.as_str())
	}

	#[test]
	fn code_blocks_escape_fences_and_truncate() {
		assert_eq!(code_block("hello"), "```hello```");
		assert_eq!(code_block("a```b"), "```a'''b```");
		let long = "x".repeat(5000);
		let block = code_block(&long);
		assert!(block.chars().count() <= MAX_CODE_BLOCK_CONTENT + 6);
		assert!(block.ends_with("…```"));
	}

	#[test]
	fn user_fields_mention_and_show_the_id() {
		assert_eq!(user_with_id(Id::new(42)), "<@42> ``(42)``");
		assert_eq!(channel_with_id(Id::new(7)), "<#7> ``(7)``");
	}

	#[test]
	fn created_embed_carries_number_opener_and_reason() {
		let embed = ticket_created_embed(
			12,
			Id::new(42),
			None,
			TicketCategory::Question,
			"Need help",
			0xbc3bcc,
		)
		.unwrap();
		assert_eq!(embed.author.as_ref().map(|author| author.name.as_str()), Some("#12"));
		assert_eq!(field_value(&embed, "Opened by:"), Some("<@42> ``(42)``"));
		assert_eq!(field_value(&embed, "Category:"), Some("Question"));
		assert_eq!(field_value(&embed, "Reason:"), Some("```Need help```"));
		assert_eq!(embed.color, Some(0xbc3bcc));
		assert!(embed.timestamp.is_some());
	}

	#[test]
	fn closed_log_fills_in_placeholders() {
		let log = TicketClosedLog {
			number: 3,
			closed_by: Id::new(1),
			closed_by_avatar: None,
			channel_name: "・alice-3",
			channel_id: Id::new(2),
			participants: &[],
			call_members: &[],
			opener: "Unidentified",
			opened_at: None,
		};
		let embed = ticket_closed_log(&log).unwrap();
		assert_eq!(field_value(&embed, "Participants"), Some("```No participants```"));
		assert_eq!(field_value(&embed, "Call members"), Some("```N/A```"));
		assert_eq!(field_value(&embed, "Channel"), Some("・alice-3 ``(2)``"));
		assert_eq!(field_value(&embed, "Opened at"), None);
		assert_eq!(embed.color, Some(COLOR_REMOVED));
	}

	#[test]
	fn closed_log_lists_participants() {
		let participants = vec![String::from("alice"), String::from("bob")];
		let log = TicketClosedLog {
			number: 3,
			closed_by: Id::new(1),
			closed_by_avatar: Some("https://cdn.discordapp.com/avatars/1/abc.png"),
			channel_name: "・alice-3",
			channel_id: Id::new(2),
			participants: &participants,
			call_members: &[String::from("carol")],
			opener: "alice ``(5)``",
			opened_at: Some(String::from("<t:0:f>")),
		};
		let embed = ticket_closed_log(&log).unwrap();
		assert_eq!(field_value(&embed, "Participants"), Some("```alice, bob```"));
		assert_eq!(field_value(&embed, "Call members"), Some("```carol```"));
		assert_eq!(field_value(&embed, "Opened at"), Some("<t:0:f>"));
		assert!(embed.thumbnail.is_some());
	}

	#[test]
	fn panel_uses_the_configured_branding() {
		let panel = PanelConfig {
			author: String::from("Example Support"),
			icon_url: Some(String::from("https://example.com/icon.png")),
			color: 0x123456,
		};
		let embed = panel_embed(&panel, None).unwrap();
		assert_eq!(embed.title.as_deref(), Some("Welcome to Example Support"));
		assert_eq!(embed.color, Some(0x123456));
		assert!(embed.author.unwrap().icon_url.is_some());
	}
}

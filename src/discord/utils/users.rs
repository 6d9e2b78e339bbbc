// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::client::Client;
use twilight_http::error::Error;
use twilight_http::response::DeserializeBodyError;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};
use twilight_model::user::User;
use twilight_model::util::ImageHash;

/// User data obtained from guild member data
#[derive(Debug)]
pub struct UserData {
	pub tag: String,
}

impl From<&User> for UserData {
	fn from(user: &User) -> Self {
		Self {
			tag: user_tag(&user.name, user.discriminator),
		}
	}
}

/// Error data for getting user/member data
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum UserDataError {
	#[error("HTTP error: {0}")]
	Http(#[from] Error),
	#[error("deserialization error: {0}")]
	Deserialize(#[from] DeserializeBodyError),
}

/// The user's tag: the bare username, or `name#discriminator` for accounts that still have one.
pub fn user_tag(name: &str, discriminator: u16) -> String {
	if discriminator == 0 {
		String::from(name)
	} else {
		format!("{}#{:04}", name, discriminator)
	}
}

pub fn avatar_url(user_id: Id<UserMarker>, avatar: Option<&ImageHash>) -> Option<String> {
	avatar.map(|hash| format!("https://cdn.discordapp.com/avatars/{}/{}.png", user_id, hash))
}

pub fn guild_icon_url(guild_id: Id<GuildMarker>, icon: Option<&ImageHash>) -> Option<String> {
	icon.map(|hash| format!("https://cdn.discordapp.com/icons/{}/{}.png", guild_id, hash))
}

/// Gets the guild's icon from the cache.
pub fn cached_guild_icon_url(cache: &DefaultInMemoryCache, guild_id: Id<GuildMarker>) -> Option<String> {
	let guild = cache.guild(guild_id)?;
	guild_icon_url(guild_id, guild.icon())
}

/// Gets a user's tag from the cache, falling back to their ID.
pub fn cached_user_tag(cache: &DefaultInMemoryCache, user_id: Id<UserMarker>) -> String {
	match cache.user(user_id) {
		Some(user) => user_tag(&user.name, user.discriminator),
		None => user_id.to_string(),
	}
}

/// Gets member data. Users who have left the guild are not found.
pub async fn get_member_data(
	http_client: &Client,
	guild_id: Id<GuildMarker>,
	user_id: Id<UserMarker>,
) -> Result<UserData, UserDataError> {
	let member_response = http_client.guild_member(guild_id, user_id).await?;
	let member = member_response.model().await?;
	Ok(UserData::from(&member.user))
}

/// Describes a ticket's opener for the logs.
pub async fn describe_opener(http_client: &Client, guild_id: Id<GuildMarker>, opener: Option<Id<UserMarker>>) -> String {
	let Some(opener) = opener else {
		return String::from("Unidentified");
	};
	match get_member_data(http_client, guild_id, opener).await {
		Ok(user) => opener_text(Some(&user.tag), opener),
		Err(error) => {
			tracing::debug!(source = ?error, user = %opener, "ticket opener is not a guild member");
			opener_text(None, opener)
		}
	}
}

fn opener_text(tag: Option<&str>, opener: Id<UserMarker>) -> String {
	match tag {
		Some(tag) => format!("{} ``({})``", tag, opener),
		None => format!("Not found ({})", opener),
	}
}

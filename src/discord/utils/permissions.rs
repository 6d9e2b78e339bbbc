// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::application::interaction::Interaction;
use twilight_model::guild::Permissions;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

/// Whether any of the member's roles is a staff role. With no staff roles configured, nobody is staff.
pub fn is_staff(member_roles: &[Id<RoleMarker>], staff_roles: &[Id<RoleMarker>]) -> bool {
	member_roles.iter().any(|role| staff_roles.contains(role))
}

/// Whether the member who triggered the interaction is staff.
pub fn interaction_member_is_staff(interaction: &Interaction, staff_roles: &[Id<RoleMarker>]) -> bool {
	interaction
		.member
		.as_ref()
		.is_some_and(|member| is_staff(&member.roles, staff_roles))
}

pub fn opener_text_allow() -> Permissions {
	Permissions::VIEW_CHANNEL
		| Permissions::SEND_MESSAGES
		| Permissions::READ_MESSAGE_HISTORY
		| Permissions::ATTACH_FILES
		| Permissions::EMBED_LINKS
		| Permissions::USE_EXTERNAL_EMOJIS
		| Permissions::USE_EXTERNAL_STICKERS
}

pub fn opener_text_deny() -> Permissions {
	Permissions::MANAGE_CHANNELS
		| Permissions::USE_SLASH_COMMANDS
		| Permissions::CREATE_PRIVATE_THREADS
		| Permissions::CREATE_PUBLIC_THREADS
		| Permissions::CREATE_INVITE
		| Permissions::ADD_REACTIONS
		| Permissions::MENTION_EVERYONE
		| Permissions::MANAGE_THREADS
		| Permissions::MANAGE_WEBHOOKS
		| Permissions::MANAGE_NICKNAMES
		| Permissions::MANAGE_MESSAGES
		| Permissions::USE_EXTERNAL_SOUNDS
		| Permissions::USE_EMBEDDED_ACTIVITIES
		| Permissions::USE_SOUNDBOARD
		| Permissions::SEND_POLLS
}

pub fn staff_text_allow() -> Permissions {
	Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY | Permissions::MANAGE_CHANNELS
}

pub fn opener_voice_allow() -> Permissions {
	Permissions::VIEW_CHANNEL | Permissions::CONNECT | Permissions::SPEAK | Permissions::STREAM
}

pub fn opener_voice_deny() -> Permissions {
	Permissions::MANAGE_CHANNELS | Permissions::USE_SOUNDBOARD | Permissions::SEND_VOICE_MESSAGES | Permissions::SEND_POLLS
}

pub fn staff_voice_allow() -> Permissions {
	opener_voice_allow() | Permissions::MANAGE_CHANNELS
}

/// Overwrites for a ticket text channel: hidden from everyone, open to the opener and staff.
pub fn ticket_text_overwrites(
	guild_id: Id<GuildMarker>,
	opener: Id<UserMarker>,
	staff_roles: &[Id<RoleMarker>],
) -> Vec<PermissionOverwrite> {
	let mut overwrites = vec![
		everyone_hidden(guild_id),
		PermissionOverwrite {
			allow: opener_text_allow(),
			deny: opener_text_deny(),
			id: opener.cast(),
			kind: PermissionOverwriteType::Member,
		},
	];
	overwrites.extend(staff_overwrites(staff_roles, staff_text_allow()));
	overwrites
}

/// Overwrites for a ticket call. The opener entry is left out when the opener isn't known.
pub fn ticket_voice_overwrites(
	guild_id: Id<GuildMarker>,
	opener: Option<Id<UserMarker>>,
	staff_roles: &[Id<RoleMarker>],
) -> Vec<PermissionOverwrite> {
	let mut overwrites = vec![everyone_hidden(guild_id)];
	if let Some(opener) = opener {
		overwrites.push(PermissionOverwrite {
			allow: opener_voice_allow(),
			deny: opener_voice_deny(),
			id: opener.cast(),
			kind: PermissionOverwriteType::Member,
		});
	}
	overwrites.extend(staff_overwrites(staff_roles, staff_voice_allow()));
	overwrites
}

fn everyone_hidden(guild_id: Id<GuildMarker>) -> PermissionOverwrite {
	// The @everyone role shares the guild's ID.
	PermissionOverwrite {
		allow: Permissions::empty(),
		deny: Permissions::VIEW_CHANNEL,
		id: guild_id.cast(),
		kind: PermissionOverwriteType::Role,
	}
}

fn staff_overwrites(staff_roles: &[Id<RoleMarker>], allow: Permissions) -> impl Iterator<Item = PermissionOverwrite> + '_ {
	staff_roles.iter().map(move |role| PermissionOverwrite {
		allow,
		deny: Permissions::empty(),
		id: role.cast(),
		kind: PermissionOverwriteType::Role,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn staff_requires_a_shared_role() {
		let staff = [Id::new(10), Id::new(11)];
		assert!(is_staff(&[Id::new(1), Id::new(11)], &staff));
		assert!(!is_staff(&[Id::new(1), Id::new(2)], &staff));
		assert!(!is_staff(&[], &staff));
	}

	#[test]
	fn empty_staff_list_means_nobody_is_staff() {
		assert!(!is_staff(&[Id::new(1)], &[]));
	}

	#[test]
	fn text_overwrites_cover_everyone_opener_and_each_staff_role() {
		let guild_id = Id::new(100);
		let overwrites = ticket_text_overwrites(guild_id, Id::new(200), &[Id::new(300), Id::new(301)]);
		assert_eq!(overwrites.len(), 4);

		assert_eq!(overwrites[0].id, guild_id.cast());
		assert_eq!(overwrites[0].kind, PermissionOverwriteType::Role);
		assert_eq!(overwrites[0].deny, Permissions::VIEW_CHANNEL);

		assert_eq!(overwrites[1].id, Id::new(200));
		assert_eq!(overwrites[1].kind, PermissionOverwriteType::Member);
		let opener_allow = overwrites[1].allow;
		assert!(opener_allow.contains(Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES));
		assert!(overwrites[1].deny.contains(Permissions::MANAGE_CHANNELS | Permissions::SEND_POLLS));
		assert!(!opener_allow.intersects(opener_text_deny()));

		for overwrite in &overwrites[2..] {
			assert_eq!(overwrite.kind, PermissionOverwriteType::Role);
			assert!(overwrite.allow.contains(Permissions::MANAGE_CHANNELS));
			assert!(overwrite.deny.is_empty());
		}
	}

	#[test]
	fn voice_overwrites_skip_an_unknown_opener() {
		let with_opener = ticket_voice_overwrites(Id::new(100), Some(Id::new(200)), &[Id::new(300)]);
		assert_eq!(with_opener.len(), 3);
		assert!(with_opener[1].allow.contains(Permissions::CONNECT | Permissions::SPEAK));
		assert!(with_opener[1].deny.contains(Permissions::SEND_POLLS));
		assert!(!with_opener[1].allow.intersects(opener_voice_deny()));

		let without_opener = ticket_voice_overwrites(Id::new(100), None, &[Id::new(300)]);
		assert_eq!(without_opener.len(), 2);
		assert_eq!(without_opener[1].id, Id::new(300));
		assert!(without_opener[1].allow.contains(Permissions::STREAM | Permissions::MANAGE_CHANNELS));
	}
}

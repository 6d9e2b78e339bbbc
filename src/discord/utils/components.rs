// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::tickets::TicketCategory;
use twilight_model::channel::message::EmojiReactionType;
use twilight_model::channel::message::component::{
	ActionRow, Button, ButtonStyle, Component, SelectMenu, SelectMenuOption, SelectMenuType, TextInput, TextInputStyle,
};

// Custom IDs shared between the components built here and the interaction router.
pub const TICKET_MENU_ID: &str = "ticket_menu";
pub const TICKET_MODAL_ID: &str = "ticket_modal";
pub const REASON_INPUT_ID: &str = "reason";
pub const CLOSE_TICKET_ID: &str = "close_ticket";
pub const CREATE_CALL_ID: &str = "create_call";
pub const CONFIRM_DELETE_CALL_ID: &str = "confirm_delete_call";
pub const CANCEL_DELETE_CALL_ID: &str = "cancel_delete_call";

const MAX_REASON_LENGTH: u16 = 1000;

/// The category select menu shown under the ticket panel.
pub fn ticket_menu() -> Component {
	let options: Vec<SelectMenuOption> = TicketCategory::all_categories()
		.into_iter()
		.map(|category| SelectMenuOption {
			default: false,
			description: Some(String::from(category.description())),
			emoji: Some(EmojiReactionType::Unicode {
				name: String::from(category.emoji()),
			}),
			label: String::from(category.label()),
			value: String::from(category.value()),
		})
		.collect();
	let menu = SelectMenu {
		channel_types: None,
		custom_id: String::from(TICKET_MENU_ID),
		default_values: None,
		disabled: false,
		kind: SelectMenuType::Text,
		max_values: None,
		min_values: None,
		options: Some(options),
		placeholder: Some(String::from("Select an option")),
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::SelectMenu(menu)],
	})
}

/// The modal custom ID, carrying the category the ticket is being opened for.
pub fn reason_modal_id(category: TicketCategory) -> String {
	format!("{}/{}", TICKET_MODAL_ID, category.value())
}

pub fn reason_modal_components() -> Vec<Component> {
	let reason_input = Component::TextInput(TextInput {
		custom_id: String::from(REASON_INPUT_ID),
		label: String::from("Why are you opening this ticket?"),
		max_length: Some(MAX_REASON_LENGTH),
		min_length: None,
		placeholder: None,
		required: Some(true),
		style: TextInputStyle::Paragraph,
		value: None,
	});
	vec![Component::ActionRow(ActionRow {
		components: vec![reason_input],
	})]
}

/// The Close and Voice Call buttons posted in every new ticket.
pub fn ticket_actions() -> Component {
	let close_button = action_button(CLOSE_TICKET_ID, "Close Ticket", ButtonStyle::Danger);
	let call_button = action_button(CREATE_CALL_ID, "Voice Call", ButtonStyle::Success);
	Component::ActionRow(ActionRow {
		components: vec![close_button, call_button],
	})
}

pub fn call_deletion_confirmation() -> Component {
	let confirm_button = action_button(CONFIRM_DELETE_CALL_ID, "Yes, delete it", ButtonStyle::Danger);
	let cancel_button = action_button(CANCEL_DELETE_CALL_ID, "No, keep it", ButtonStyle::Secondary);
	Component::ActionRow(ActionRow {
		components: vec![confirm_button, cancel_button],
	})
}

/// A row with a single link button.
pub fn link_button(label: &str, url: String) -> Component {
	let button = Button {
		custom_id: None,
		disabled: false,
		emoji: None,
		label: Some(String::from(label)),
		style: ButtonStyle::Link,
		url: Some(url),
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(button)],
	})
}

fn action_button(custom_id: &str, label: &str, style: ButtonStyle) -> Component {
	Component::Button(Button {
		custom_id: Some(String::from(custom_id)),
		disabled: false,
		emoji: None,
		label: Some(String::from(label)),
		style,
		url: None,
		sku_id: None,
	})
}

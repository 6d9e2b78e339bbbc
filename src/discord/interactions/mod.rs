// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::context::BotContext;
use super::utils::components::{
	CANCEL_DELETE_CALL_ID, CLOSE_TICKET_ID, CONFIRM_DELETE_CALL_ID, CREATE_CALL_ID, TICKET_MENU_ID, TICKET_MODAL_ID,
};
use super::utils::tickets::{ChannelSummary, TicketCategory, channel_summary};
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

mod call;
mod close_ticket;
mod open_ticket;

#[derive(Debug, Eq, PartialEq)]
enum ComponentRoute {
	TicketMenu,
	CloseTicket,
	CreateCall,
	ConfirmDeleteCall,
	CancelDeleteCall,
}

fn component_route(custom_id: &str) -> Option<ComponentRoute> {
	let mut custom_id_path = custom_id.split('/');
	match custom_id_path.next() {
		Some(TICKET_MENU_ID) => Some(ComponentRoute::TicketMenu),
		Some(CLOSE_TICKET_ID) => Some(ComponentRoute::CloseTicket),
		Some(CREATE_CALL_ID) => Some(ComponentRoute::CreateCall),
		Some(CONFIRM_DELETE_CALL_ID) => Some(ComponentRoute::ConfirmDeleteCall),
		Some(CANCEL_DELETE_CALL_ID) => Some(ComponentRoute::CancelDeleteCall),
		_ => None,
	}
}

/// Gets the ticket category carried in a reason modal's custom ID.
fn modal_category(custom_id: &str) -> Option<TicketCategory> {
	let (modal, category) = custom_id.split_once('/')?;
	if modal != TICKET_MODAL_ID {
		return None;
	}
	TicketCategory::from_value(category)
}

/// The ticket whose channel an interaction happened in
struct CurrentTicket {
	guild_id: Id<GuildMarker>,
	channel: ChannelSummary,
	name: String,
	number: u64,
}

/// Looks up the ticket the interaction's channel belongs to. Returns `None` outside of ticket channels.
async fn current_ticket(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<Option<CurrentTicket>> {
	let (Some(guild_id), Some(channel)) = (interaction.guild_id, interaction.channel.as_ref()) else {
		return Ok(None);
	};
	let channel = channel_summary(context, channel.id).await?;
	let Some(ticket_name) = channel.ticket_name() else {
		return Ok(None);
	};
	let Some(name) = channel.name.clone() else {
		return Ok(None);
	};
	Ok(Some(CurrentTicket {
		guild_id,
		channel,
		name,
		number: ticket_name.number,
	}))
}

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	context: &BotContext,
) -> miette::Result<()> {
	let Some(route) = component_route(&interaction_data.custom_id) else {
		tracing::debug!(custom_id = %interaction_data.custom_id, "ignoring unknown component interaction");
		return Ok(());
	};

	match route {
		ComponentRoute::TicketMenu => open_ticket::handle_category_select(interaction, interaction_data, context).await,
		ComponentRoute::CloseTicket => close_ticket::handle_close(interaction, context).await,
		ComponentRoute::CreateCall => call::handle_create_call(interaction, context).await,
		ComponentRoute::ConfirmDeleteCall => call::handle_confirm_delete(interaction, context).await,
		ComponentRoute::CancelDeleteCall => call::handle_cancel_delete(interaction, context).await,
	}
}

pub async fn route_modal_submit(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	context: &BotContext,
) -> miette::Result<()> {
	let Some(category) = modal_category(&modal_data.custom_id) else {
		tracing::debug!(custom_id = %modal_data.custom_id, "ignoring unknown modal submission");
		return Ok(());
	};
	open_ticket::handle_reason_modal(interaction, modal_data, category, context).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::discord::utils::components::reason_modal_id;

	#[test]
	fn component_ids_route_to_their_handlers() {
		assert_eq!(component_route("ticket_menu"), Some(ComponentRoute::TicketMenu));
		assert_eq!(component_route("close_ticket"), Some(ComponentRoute::CloseTicket));
		assert_eq!(component_route("create_call"), Some(ComponentRoute::CreateCall));
		assert_eq!(component_route("confirm_delete_call"), Some(ComponentRoute::ConfirmDeleteCall));
		assert_eq!(component_route("cancel_delete_call"), Some(ComponentRoute::CancelDeleteCall));
		assert_eq!(component_route("something_else"), None);
		assert_eq!(component_route(""), None);
	}

	#[test]
	fn modal_ids_carry_the_category() {
		for category in TicketCategory::all_categories() {
			assert_eq!(modal_category(&reason_modal_id(category)), Some(category));
		}
		assert_eq!(modal_category("ticket_modal"), None);
		assert_eq!(modal_category("ticket_modal/unknown"), None);
		assert_eq!(modal_category("other_modal/doubt-ticket"), None);
	}
}

// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Users whose ticket is currently being created
#[derive(Debug, Default)]
pub struct PendingOpens {
	users: HashSet<Id<UserMarker>>,
}

impl PendingOpens {
	/// Marks the user as opening a ticket. Returns `false` if they already are.
	pub fn begin(&mut self, user_id: Id<UserMarker>) -> bool {
		self.users.insert(user_id)
	}

	pub fn finish(&mut self, user_id: Id<UserMarker>) {
		self.users.remove(&user_id);
	}
}

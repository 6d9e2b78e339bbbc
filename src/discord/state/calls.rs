// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use tokio::task::AbortHandle;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// Ticket calls being watched for inactivity, keyed by voice channel
#[derive(Debug, Default)]
pub struct CallWatches {
	watches: HashMap<Id<ChannelMarker>, CallWatch>,
	last_generation: u64,
}

#[derive(Debug)]
pub struct CallWatch {
	pub guild_id: Id<GuildMarker>,
	pub voice_channel: Id<ChannelMarker>,
	pub voice_channel_name: String,
	pub ticket_channel: Id<ChannelMarker>,
	pub ticket_number: u64,
	pub opener: Option<Id<UserMarker>>,
	timer: Option<WatchTimer>,
}

#[derive(Debug)]
struct WatchTimer {
	generation: u64,
	abort_handle: AbortHandle,
}

/// What to do with a watch's timer given how many people are in the call
#[derive(Debug, Eq, PartialEq)]
pub enum WatchAction {
	Arm,
	Disarm,
	Keep,
}

impl CallWatch {
	pub fn new(
		guild_id: Id<GuildMarker>,
		voice_channel: Id<ChannelMarker>,
		voice_channel_name: String,
		ticket_channel: Id<ChannelMarker>,
		ticket_number: u64,
		opener: Option<Id<UserMarker>>,
	) -> Self {
		Self {
			guild_id,
			voice_channel,
			voice_channel_name,
			ticket_channel,
			ticket_number,
			opener,
			timer: None,
		}
	}

	pub fn is_armed(&self) -> bool {
		self.timer.is_some()
	}

	pub fn action_for(&self, occupants: usize) -> WatchAction {
		match (occupants, self.is_armed()) {
			(0, false) => WatchAction::Arm,
			(1.., true) => WatchAction::Disarm,
			_ => WatchAction::Keep,
		}
	}

	fn cancel_timer(&mut self) {
		if let Some(timer) = self.timer.take() {
			timer.abort_handle.abort();
		}
	}
}

impl CallWatches {
	/// Starts watching a call. A watch already registered for the same channel is replaced and its timer cancelled.
	pub fn insert(&mut self, watch: CallWatch) {
		if let Some(mut previous) = self.watches.insert(watch.voice_channel, watch) {
			previous.cancel_timer();
		}
	}

	pub fn get(&self, voice_channel: Id<ChannelMarker>) -> Option<&CallWatch> {
		self.watches.get(&voice_channel)
	}

	pub fn channels_in_guild(&self, guild_id: Id<GuildMarker>) -> Vec<Id<ChannelMarker>> {
		self.watches
			.values()
			.filter(|watch| watch.guild_id == guild_id)
			.map(|watch| watch.voice_channel)
			.collect()
	}

	pub fn next_generation(&mut self) -> u64 {
		self.last_generation += 1;
		self.last_generation
	}

	/// Records the timer task for a watch. Returns `false` (and cancels the task) if the call isn't watched.
	pub fn arm(&mut self, voice_channel: Id<ChannelMarker>, generation: u64, abort_handle: AbortHandle) -> bool {
		match self.watches.get_mut(&voice_channel) {
			Some(watch) => {
				watch.cancel_timer();
				watch.timer = Some(WatchTimer {
					generation,
					abort_handle,
				});
				true
			}
			None => {
				abort_handle.abort();
				false
			}
		}
	}

	pub fn disarm(&mut self, voice_channel: Id<ChannelMarker>) {
		if let Some(watch) = self.watches.get_mut(&voice_channel) {
			watch.cancel_timer();
		}
	}

	/// Removes a watch for an expiring timer, but only if that timer is still the current one.
	///
	/// The timer itself isn't aborted, as this is called from the timer's own task.
	pub fn take_if_current(&mut self, voice_channel: Id<ChannelMarker>, generation: u64) -> Option<CallWatch> {
		let is_current = self
			.watches
			.get(&voice_channel)
			.and_then(|watch| watch.timer.as_ref())
			.is_some_and(|timer| timer.generation == generation);
		if is_current {
			self.watches.remove(&voice_channel)
		} else {
			None
		}
	}

	/// Stops watching a call, cancelling any pending timer.
	pub fn remove(&mut self, voice_channel: Id<ChannelMarker>) -> Option<CallWatch> {
		let mut watch = self.watches.remove(&voice_channel)?;
		watch.cancel_timer();
		Some(watch)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::future::pending;

	fn watch(guild: u64, channel: u64) -> CallWatch {
		CallWatch::new(
			Id::new(guild),
			Id::new(channel),
			format!("・alice-{}", channel),
			Id::new(channel + 1000),
			channel,
			Some(Id::new(5)),
		)
	}

	#[test]
	fn unarmed_watch_decisions() {
		let unarmed = watch(1, 10);
		assert_eq!(unarmed.action_for(0), WatchAction::Arm);
		assert_eq!(unarmed.action_for(2), WatchAction::Keep);
	}

	#[tokio::test]
	async fn armed_watch_decisions() {
		let mut watches = CallWatches::default();
		watches.insert(watch(1, 10));
		let task = tokio::spawn(pending::<()>());
		let generation = watches.next_generation();
		assert!(watches.arm(Id::new(10), generation, task.abort_handle()));

		let armed = watches.get(Id::new(10)).unwrap();
		assert!(armed.is_armed());
		assert_eq!(armed.action_for(0), WatchAction::Keep);
		assert_eq!(armed.action_for(1), WatchAction::Disarm);
		task.abort();
	}

	#[tokio::test]
	async fn disarming_cancels_the_timer() {
		let mut watches = CallWatches::default();
		watches.insert(watch(1, 10));
		let task = tokio::spawn(pending::<()>());
		let generation = watches.next_generation();
		watches.arm(Id::new(10), generation, task.abort_handle());

		watches.disarm(Id::new(10));
		assert!(!watches.get(Id::new(10)).unwrap().is_armed());
		assert!(task.await.unwrap_err().is_cancelled());
	}

	#[tokio::test]
	async fn stale_timers_do_not_take_the_watch() {
		let mut watches = CallWatches::default();
		watches.insert(watch(1, 10));

		let first_task = tokio::spawn(pending::<()>());
		let first = watches.next_generation();
		watches.arm(Id::new(10), first, first_task.abort_handle());
		watches.disarm(Id::new(10));

		let second_task = tokio::spawn(pending::<()>());
		let second = watches.next_generation();
		watches.arm(Id::new(10), second, second_task.abort_handle());

		assert!(watches.take_if_current(Id::new(10), first).is_none());
		assert!(watches.get(Id::new(10)).is_some());
		let taken = watches.take_if_current(Id::new(10), second).unwrap();
		assert_eq!(taken.ticket_number, 10);
		assert!(watches.get(Id::new(10)).is_none());
		second_task.abort();
	}

	#[tokio::test]
	async fn unarmed_watches_are_never_taken_by_a_timer() {
		let mut watches = CallWatches::default();
		watches.insert(watch(1, 10));
		assert!(watches.take_if_current(Id::new(10), 1).is_none());
		assert!(watches.get(Id::new(10)).is_some());
	}

	#[tokio::test]
	async fn removing_cancels_and_arming_a_missing_watch_fails() {
		let mut watches = CallWatches::default();
		watches.insert(watch(1, 10));
		let task = tokio::spawn(pending::<()>());
		let generation = watches.next_generation();
		watches.arm(Id::new(10), generation, task.abort_handle());

		assert!(watches.remove(Id::new(10)).is_some());
		assert!(task.await.unwrap_err().is_cancelled());

		let orphan = tokio::spawn(pending::<()>());
		let generation = watches.next_generation();
		assert!(!watches.arm(Id::new(10), generation, orphan.abort_handle()));
		assert!(orphan.await.unwrap_err().is_cancelled());
	}

	#[test]
	fn watches_are_grouped_by_guild() {
		let mut watches = CallWatches::default();
		watches.insert(watch(1, 10));
		watches.insert(watch(1, 11));
		watches.insert(watch(2, 12));
		let mut guild_one = watches.channels_in_guild(Id::new(1));
		guild_one.sort();
		assert_eq!(guild_one, vec![Id::new(10), Id::new(11)]);
		assert_eq!(watches.channels_in_guild(Id::new(3)), Vec::<Id<ChannelMarker>>::new());
	}

	#[test]
	fn generations_increase() {
		let mut watches = CallWatches::default();
		let first = watches.next_generation();
		assert!(watches.next_generation() > first);
	}
}

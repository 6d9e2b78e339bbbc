// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use twilight_model::util::datetime::{Timestamp, TimestampParseError};
use twilight_util::snowflake::Snowflake;

/// Gets the timestamp from the ID snowflake. If any failures occur in the conversion, returns `None`.
pub fn datetime_from_id(id: impl Snowflake) -> Option<DateTime<Utc>> {
	let timestamp = id.timestamp();
	Utc.timestamp_millis_opt(timestamp).single()
}

/// Gets a [Timestamp] for the current time, for use in embeds.
pub fn now_timestamp() -> Result<Timestamp, TimestampParseError> {
	Timestamp::from_micros(Utc::now().timestamp_micros())
}

/// Formats a time as a Discord timestamp tag showing the full date and time.
pub fn discord_timestamp(datetime: &DateTime<Utc>) -> String {
	format!("<t:{}:f>", datetime.timestamp())
}

/// Formats the creation time of anything with a snowflake ID as a Discord timestamp tag.
pub fn created_at_tag(id: impl Snowflake) -> Option<String> {
	datetime_from_id(id).map(|datetime| discord_timestamp(&datetime))
}

/// Describes a duration in whole minutes, or seconds for anything shorter or uneven.
pub fn describe_duration(duration: Duration) -> String {
	let seconds = duration.as_secs();
	if seconds >= 60 && seconds % 60 == 0 {
		let minutes = seconds / 60;
		if minutes == 1 {
			String::from("1 minute")
		} else {
			format!("{} minutes", minutes)
		}
	} else if seconds == 1 {
		String::from("1 second")
	} else {
		format!("{} seconds", seconds)
	}
}

// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use ticket_desk::config::{self, CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH};
use ticket_desk::counter::TicketCounter;
use ticket_desk::discord::{run_bot, set_up_client};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
	let _ = dotenvy::dotenv();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config_path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH));
	let config = Arc::new(config::load_config(&config_path).await?);

	let counter = Arc::new(TicketCounter::open(&config.tickets.counter_file).await?);
	tracing::info!(
		path = %config.tickets.counter_file.display(),
		current = counter.current().await,
		"Ticket counter loaded"
	);

	let http_client = set_up_client(&config);
	run_bot(config, http_client, counter).await
}

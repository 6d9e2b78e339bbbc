// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Key under which the counter is stored in the JSON file.
pub const COUNTER_KEY: &str = "ticketCounter";

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum CounterError {
	#[error("failed to access the ticket counter file {}", path.display())]
	#[diagnostic(code(ticket_desk::counter::io))]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("the ticket counter file {} is not valid JSON", path.display())]
	#[diagnostic(code(ticket_desk::counter::json))]
	Json {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("the ticket counter file {} must contain a JSON object", path.display())]
	#[diagnostic(
		code(ticket_desk::counter::not_an_object),
		help("remove the file to start counting from zero")
	)]
	NotAnObject { path: PathBuf },
}

/// The sequential ticket number store.
///
/// The whole file is held in memory and rewritten on every increment. Other keys in the file are carried along
/// untouched.
#[derive(Debug)]
pub struct TicketCounter {
	path: PathBuf,
	document: Mutex<Map<String, Value>>,
}

impl TicketCounter {
	pub async fn open(path: impl AsRef<Path>) -> Result<Self, CounterError> {
		let path = path.as_ref().to_path_buf();
		let document = match fs::read_to_string(&path).await {
			Ok(contents) if contents.trim().is_empty() => Map::new(),
			Ok(contents) => match serde_json::from_str::<Value>(&contents) {
				Ok(Value::Object(document)) => document,
				Ok(_) => return Err(CounterError::NotAnObject { path }),
				Err(source) => return Err(CounterError::Json { path, source }),
			},
			Err(error) if error.kind() == ErrorKind::NotFound => Map::new(),
			Err(source) => return Err(CounterError::Io { path, source }),
		};

		Ok(Self {
			path,
			document: Mutex::new(document),
		})
	}

	/// The last number handed out, or 0 if none has been yet.
	pub async fn current(&self) -> u64 {
		let document = self.document.lock().await;
		counter_value(&document)
	}

	/// Increments the counter, persists it, and returns the new value.
	///
	/// Calls are serialized, so concurrent callers always receive distinct numbers. If persisting fails, the in-memory
	/// value is left as it was.
	pub async fn next(&self) -> Result<u64, CounterError> {
		let mut document = self.document.lock().await;
		let next = counter_value(&document) + 1;

		let mut updated = document.clone();
		updated.insert(String::from(COUNTER_KEY), Value::from(next));
		self.persist(&updated).await?;

		*document = updated;
		Ok(next)
	}

	async fn persist(&self, document: &Map<String, Value>) -> Result<(), CounterError> {
		let io_error = |source| CounterError::Io {
			path: self.path.clone(),
			source,
		};

		if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent).await.map_err(io_error)?;
		}

		let contents = serde_json::to_vec_pretty(document).map_err(|source| CounterError::Json {
			path: self.path.clone(),
			source,
		})?;
		let temp_path = self.path.with_extension("json.tmp");
		fs::write(&temp_path, contents).await.map_err(io_error)?;
		fs::rename(&temp_path, &self.path).await.map_err(io_error)?;

		Ok(())
	}
}

fn counter_value(document: &Map<String, Value>) -> u64 {
	document.get(COUNTER_KEY).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	#[tokio::test]
	async fn missing_file_starts_at_zero() {
		let dir = tempfile::tempdir().unwrap();
		let counter = TicketCounter::open(dir.path().join("ticket.json")).await.unwrap();
		assert_eq!(counter.current().await, 0);
		assert_eq!(counter.next().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn sequential_calls_increment_by_one() {
		let dir = tempfile::tempdir().unwrap();
		let counter = TicketCounter::open(dir.path().join("ticket.json")).await.unwrap();
		for expected in 1..=5 {
			assert_eq!(counter.next().await.unwrap(), expected);
		}
		assert_eq!(counter.current().await, 5);
	}

	#[tokio::test]
	async fn value_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("ticket.json");
		{
			let counter = TicketCounter::open(&path).await.unwrap();
			counter.next().await.unwrap();
			counter.next().await.unwrap();
		}
		let counter = TicketCounter::open(&path).await.unwrap();
		assert_eq!(counter.current().await, 2);
		assert_eq!(counter.next().await.unwrap(), 3);
		assert!(!path.with_extension("json.tmp").exists());
	}

	#[tokio::test]
	async fn existing_file_and_other_keys_are_kept() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ticket.json");
		std::fs::write(&path, r#"{"ticketCounter": 41, "other": "value"}"#).unwrap();

		let counter = TicketCounter::open(&path).await.unwrap();
		assert_eq!(counter.next().await.unwrap(), 42);

		let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
		assert_eq!(saved[COUNTER_KEY], 42);
		assert_eq!(saved["other"], "value");
	}

	#[tokio::test]
	async fn non_numeric_counter_is_treated_as_zero() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ticket.json");
		std::fs::write(&path, r#"{"ticketCounter": "seven"}"#).unwrap();
		let counter = TicketCounter::open(&path).await.unwrap();
		assert_eq!(counter.next().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn non_object_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ticket.json");
		std::fs::write(&path, "[1, 2, 3]").unwrap();
		assert!(matches!(
			TicketCounter::open(&path).await,
			Err(CounterError::NotAnObject { .. })
		));

		std::fs::write(&path, "{ broken").unwrap();
		assert!(matches!(TicketCounter::open(&path).await, Err(CounterError::Json { .. })));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn concurrent_calls_get_distinct_numbers() {
		let dir = tempfile::tempdir().unwrap();
		let counter = Arc::new(TicketCounter::open(dir.path().join("ticket.json")).await.unwrap());

		let tasks: Vec<_> = (0..16)
			.map(|_| {
				let counter = Arc::clone(&counter);
				tokio::spawn(async move { counter.next().await.unwrap() })
			})
			.collect();
		let mut numbers = Vec::new();
		for task in tasks {
			numbers.push(task.await.unwrap());
		}
		numbers.sort_unstable();

		assert_eq!(numbers, (1..=16).collect::<Vec<u64>>());
		assert_eq!(counter.current().await, 16);
	}
}

//! Simple file-backed [`TokenStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::{self, BufWriter, ErrorKind},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, UserId},
	store::{StoreError, StoreFuture, TokenStore},
};

type RecordMap = HashMap<UserId, TokenRecord>;

/// Persists id_token records to a JSON file after each mutation.
///
/// Reads are served from memory; every save rewrites the whole snapshot.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	records: Arc<RwLock<RecordMap>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();
		let records = read_snapshot(&path)?;

		Ok(Self { path, records: Arc::new(RwLock::new(records)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	// Writes a sibling tmp file and renames it over the snapshot so readers of the file never
	// see a partial write.
	fn write_snapshot(&self, records: &RecordMap) -> Result<(), StoreError> {
		if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			fs::create_dir_all(dir).map_err(|e| backend("create", dir, e))?;
		}

		let mut sorted: Vec<&TokenRecord> = records.values().collect();

		sorted.sort_unstable_by(|a, b| a.user.cmp(&b.user));

		let tmp = self.path.with_extension("tmp");
		let file = File::create(&tmp).map_err(|e| backend("create", &tmp, e))?;
		let mut writer = BufWriter::new(file);

		serde_json::to_writer_pretty(&mut writer, &sorted).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to encode snapshot: {e}") }
		})?;
		writer
			.into_inner()
			.map_err(|e| backend("flush", &tmp, e.into_error()))?
			.sync_all()
			.map_err(|e| backend("sync", &tmp, e))?;

		fs::rename(&tmp, &self.path).map_err(|e| backend("replace", &self.path, e))
	}
}
impl TokenStore for FileStore {
	fn load<'a>(&'a self, user: &'a UserId) -> StoreFuture<'a, Option<TokenRecord>> {
		Box::pin(async move { Ok(self.records.read().get(user).cloned()) })
	}

	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut records = self.records.write();
			let user = record.user.clone();
			let previous = records.insert(user.clone(), record);
			let written = self.write_snapshot(&records);

			// Keep memory and disk in agreement when the write fails.
			if written.is_err() {
				match previous {
					Some(previous) => records.insert(user, previous),
					None => records.remove(&user),
				};
			}

			written
		})
	}
}

fn read_snapshot(path: &Path) -> Result<RecordMap, StoreError> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordMap::new()),
		Err(e) => return Err(backend("read", path, e)),
	};

	if bytes.is_empty() {
		return Ok(RecordMap::new());
	}

	let records: Vec<TokenRecord> =
		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})?;

	Ok(records.into_iter().map(|record| (record.user.clone(), record)).collect())
}

fn backend(action: &str, path: &Path, e: io::Error) -> StoreError {
	StoreError::Backend { message: format!("Failed to {action} {}: {e}", path.display()) }
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use time::macros;
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::IdToken;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"id_token_validator_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_record(token: &str) -> TokenRecord {
		TokenRecord::new(
			UserId::new("user-demo").expect("Failed to build user fixture."),
			IdToken::new(token),
			macros::datetime!(2025-01-01 01:00 UTC),
		)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let record = build_record("id-token-1");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(record.clone()))
			.expect("Failed to save fixture record to file store.");
		rt.block_on(store.save(record.renewed(
			IdToken::new("id-token-2"),
			macros::datetime!(2025-01-01 02:00 UTC),
		)))
		.expect("Failed to overwrite fixture record in file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.load(&record.user))
			.expect("Failed to load fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched.id_token.expose(), "id-token-2");
		assert_eq!(fetched.expires_at, macros::datetime!(2025-01-01 02:00 UTC));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_reported() {
		let path = temp_path();

		fs::write(&path, b"not json").expect("Failed to write corrupt snapshot.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot should fail to open.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}

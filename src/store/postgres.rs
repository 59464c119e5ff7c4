//! PostgreSQL-backed [`PetStore`] built on a shared `sqlx` connection pool.

// std
use std::time::Duration as StdDuration;
// crates.io
use sqlx::{
	Row,
	postgres::{PgPool, PgPoolOptions, PgRow},
};
// self
use crate::{
	_prelude::*,
	pet::{Pet, PetId},
	store::{PetStore, StoreError, StoreFuture},
};

const SCHEMA_DDL: &str = "\
CREATE TABLE IF NOT EXISTS pets (
	id   BIGINT PRIMARY KEY,
	name TEXT NOT NULL,
	tag  TEXT
)";
const SELECT_PETS: &str = "SELECT id, name, tag FROM pets";
const SELECT_PET: &str = "SELECT id, name, tag FROM pets WHERE id = $1";

/// Connection settings for [`PostgresStore::connect`].
#[derive(Clone)]
pub struct PostgresStoreConfig {
	/// Connection string.
	pub dsn: String,
	/// Maximum pooled connections.
	pub max_connections: u32,
	/// Time allowed to acquire a pooled connection.
	pub connect_timeout: StdDuration,
	/// Deadline applied to every statement.
	pub query_timeout: StdDuration,
}
impl PostgresStoreConfig {
	/// Creates settings for `dsn` with default pool sizing and timeouts.
	pub fn new(dsn: impl Into<String>) -> Self {
		Self {
			dsn: dsn.into(),
			max_connections: 10,
			connect_timeout: StdDuration::from_secs(10),
			query_timeout: StdDuration::from_secs(30),
		}
	}
}
impl Debug for PostgresStoreConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PostgresStoreConfig")
			.field("dsn", &"<redacted>")
			.field("max_connections", &self.max_connections)
			.field("connect_timeout", &self.connect_timeout)
			.field("query_timeout", &self.query_timeout)
			.finish()
	}
}

/// Relational storage backend over the `pets` table.
///
/// Each statement runs in autocommit mode; uniqueness is enforced by the primary key, so racing
/// creates resolve inside the database.
#[derive(Clone, Debug)]
pub struct PostgresStore {
	pool: PgPool,
	query_timeout: StdDuration,
}
impl PostgresStore {
	/// Connects a pool per `config` and ensures the schema exists.
	pub async fn connect(config: &PostgresStoreConfig) -> Result<Self, StoreError> {
		let pool = PgPoolOptions::new()
			.max_connections(config.max_connections)
			.acquire_timeout(config.connect_timeout)
			.connect(&config.dsn)
			.await
			.map_err(|e| StoreError::Backend {
				message: format!("Failed to connect to PostgreSQL: {e}"),
			})?;

		Self::open(pool, config.query_timeout).await
	}

	/// Wraps an existing pool and ensures the schema exists.
	pub async fn open(pool: PgPool, query_timeout: StdDuration) -> Result<Self, StoreError> {
		let store = Self { pool, query_timeout };

		store.ensure_schema().await?;

		Ok(store)
	}

	/// Exposes the underlying pool.
	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	async fn ensure_schema(&self) -> Result<(), StoreError> {
		self.with_timeout("ensure_schema", async {
			sqlx::query(SCHEMA_DDL).execute(&self.pool).await.map_err(|e| backend("ensure pets table", e))
		})
		.await?;

		tracing::debug!("pets table ready");

		Ok(())
	}

	async fn with_timeout<T, F>(&self, operation: &'static str, future: F) -> Result<T, StoreError>
	where
		F: Future<Output = Result<T, StoreError>>,
	{
		match tokio::time::timeout(self.query_timeout, future).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(operation, timeout = ?self.query_timeout, "store query timed out");

				Err(StoreError::Timeout { operation })
			},
		}
	}

	async fn list_now(&self, start: Option<PetId>, limit: u32) -> Result<Vec<Pet>, StoreError> {
		let rows = self
			.with_timeout("list", async {
				let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(SELECT_PETS);

				if let Some(floor) = start {
					builder.push(" WHERE id >= ").push_bind(floor);
				}

				builder.push(" ORDER BY id ASC");

				if limit > 0 {
					builder.push(" LIMIT ").push_bind(i64::from(limit));
				}

				builder.build().fetch_all(&self.pool).await.map_err(|e| backend("list pets", e))
			})
			.await?;

		rows.iter().map(row_to_pet).collect()
	}

	async fn create_now(&self, pet: Pet) -> Result<(), StoreError> {
		let id = pet.id;

		self.with_timeout("create", async {
			sqlx::query("INSERT INTO pets (id, name, tag) VALUES ($1, $2, $3)")
				.bind(pet.id)
				.bind(&pet.name)
				.bind(pet.tag.as_deref())
				.execute(&self.pool)
				.await
				.map_err(|e| match e {
					sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() =>
						StoreError::AlreadyExists { id },
					_ => backend("create pet", e),
				})
		})
		.await?;

		Ok(())
	}

	async fn get_now(&self, id: PetId) -> Result<Pet, StoreError> {
		let row = self
			.with_timeout("get", async {
				sqlx::query(SELECT_PET)
					.bind(id)
					.fetch_optional(&self.pool)
					.await
					.map_err(|e| backend("fetch pet", e))
			})
			.await?;

		match row {
			Some(row) => row_to_pet(&row),
			None => Err(StoreError::NotFound { id }),
		}
	}

	async fn update_now(&self, pet: Pet) -> Result<(), StoreError> {
		let id = pet.id;
		let result = self
			.with_timeout("update", async {
				sqlx::query("UPDATE pets SET name = $2, tag = $3 WHERE id = $1")
					.bind(pet.id)
					.bind(&pet.name)
					.bind(pet.tag.as_deref())
					.execute(&self.pool)
					.await
					.map_err(|e| backend("update pet", e))
			})
			.await?;

		if result.rows_affected() == 0 {
			return Err(StoreError::NotFound { id });
		}

		Ok(())
	}

	async fn delete_now(&self, id: PetId) -> Result<(), StoreError> {
		let result = self
			.with_timeout("delete", async {
				sqlx::query("DELETE FROM pets WHERE id = $1")
					.bind(id)
					.execute(&self.pool)
					.await
					.map_err(|e| backend("delete pet", e))
			})
			.await?;

		if result.rows_affected() == 0 {
			return Err(StoreError::NotFound { id });
		}

		Ok(())
	}
}
impl PetStore for PostgresStore {
	fn list(&self, start: Option<PetId>, limit: u32) -> StoreFuture<'_, Vec<Pet>> {
		Box::pin(self.list_now(start, limit))
	}

	fn create(&self, pet: Pet) -> StoreFuture<'_, ()> {
		Box::pin(self.create_now(pet))
	}

	fn get(&self, id: PetId) -> StoreFuture<'_, Pet> {
		Box::pin(self.get_now(id))
	}

	fn update(&self, pet: Pet) -> StoreFuture<'_, ()> {
		Box::pin(self.update_now(pet))
	}

	fn delete(&self, id: PetId) -> StoreFuture<'_, ()> {
		Box::pin(self.delete_now(id))
	}
}

fn row_to_pet(row: &PgRow) -> Result<Pet, StoreError> {
	let decode = |e: sqlx::Error| backend("decode pet row", e);

	Ok(Pet {
		id: row.try_get("id").map_err(decode)?,
		name: row.try_get("name").map_err(decode)?,
		tag: row.try_get("tag").map_err(decode)?,
	})
}

fn backend(action: &str, e: sqlx::Error) -> StoreError {
	StoreError::Backend { message: format!("Failed to {action}: {e}") }
}

// std
use std::time::Duration as StdDuration;
// self
use petstore::{
	_preludet::*,
	pet::Pet,
	store::{MemoryStore, PetStore, PostgresStore, PostgresStoreConfig, StoreError},
};

const DATABASE_URL_ENV: &str = "PETSTORE_TEST_DATABASE_URL";

async fn seed(store: &dyn PetStore, ids: &[i64]) {
	for id in ids {
		store
			.create(Pet::new(*id, format!("pet-{id}")))
			.await
			.expect("Seeding distinct ids should succeed.");
	}
}

fn ids(pets: &[Pet]) -> Vec<i64> {
	pets.iter().map(|pet| pet.id).collect()
}

async fn assert_store_contract(store: Arc<dyn PetStore>) {
	assert!(store.list(None, 0).await.expect("Listing an empty store should succeed.").is_empty());

	seed(store.as_ref(), &[5, 1, 3, 9]).await;

	let all = store.list(None, 0).await.expect("Unbounded list should succeed.");

	assert_eq!(ids(&all), vec![1, 3, 5, 9]);

	let capped = store.list(None, 3).await.expect("Capped list should succeed.");

	assert_eq!(ids(&capped), vec![1, 3, 5]);

	let resumed = store.list(Some(5), 0).await.expect("Resumed list should succeed.");

	assert_eq!(ids(&resumed), vec![5, 9]);

	let past_end = store.list(Some(10), 2).await.expect("List past the end should succeed.");

	assert!(past_end.is_empty());

	let duplicate = store.create(Pet::new(3, "again")).await;

	assert_eq!(duplicate, Err(StoreError::AlreadyExists { id: 3 }));
	assert_eq!(
		store.get(3).await.expect("Original pet should survive a duplicate create.").name,
		"pet-3"
	);

	let tagged = Pet::new(42, "Rex").with_tag("dog");

	store.create(tagged.clone()).await.expect("Tagged create should succeed.");

	assert_eq!(store.get(42).await.expect("Tagged pet should be retrievable."), tagged);
	assert_eq!(store.get(404).await, Err(StoreError::NotFound { id: 404 }));

	store
		.update(Pet::new(42, "Rex II"))
		.await
		.expect("Updating an existing pet should succeed.");

	let updated = store.get(42).await.expect("Updated pet should be retrievable.");

	assert_eq!(updated.name, "Rex II");
	assert_eq!(updated.tag, None);
	assert_eq!(store.update(Pet::new(404, "ghost")).await, Err(StoreError::NotFound { id: 404 }));

	store.delete(42).await.expect("Deleting an existing pet should succeed.");

	assert_eq!(store.get(42).await, Err(StoreError::NotFound { id: 42 }));
	assert_eq!(store.delete(42).await, Err(StoreError::NotFound { id: 42 }));

	let remaining = store.list(None, 0).await.expect("List after delete should succeed.");

	assert_eq!(ids(&remaining), vec![1, 3, 5, 9]);

	let racers: Vec<_> = (0..8)
		.map(|n| {
			let store = Arc::clone(&store);

			tokio::spawn(async move { store.create(Pet::new(77, format!("racer-{n}"))).await })
		})
		.collect();
	let mut created = 0;
	let mut conflicts = 0;

	for racer in racers {
		match racer.await.expect("Racing create task should not panic.") {
			Ok(()) => created += 1,
			Err(StoreError::AlreadyExists { id: 77 }) => conflicts += 1,
			Err(e) => panic!("Unexpected store error during race: {e}"),
		}
	}

	assert_eq!((created, conflicts), (1, 7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_store_satisfies_contract() {
	let store = Arc::new(MemoryStore::default());

	assert_store_contract(store.clone()).await;
	assert_eq!(store.len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_store_satisfies_contract() {
	let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
		eprintln!("{DATABASE_URL_ENV} is unset; skipping PostgreSQL contract run.");

		return;
	};
	let config = PostgresStoreConfig {
		query_timeout: StdDuration::from_secs(5),
		..PostgresStoreConfig::new(url)
	};
	let store = PostgresStore::connect(&config)
		.await
		.expect("Test database should accept connections.");

	sqlx::query("TRUNCATE pets")
		.execute(store.pool())
		.await
		.expect("Test table should truncate.");

	// Reopening must not fail on an existing table.
	let store = PostgresStore::open(store.pool().clone(), config.query_timeout)
		.await
		.expect("Schema creation should be idempotent.");

	assert_store_contract(Arc::new(store)).await;
}

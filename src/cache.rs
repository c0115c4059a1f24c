//! Persistent TTL cache for the Observatory weather map
//!
//! Repeated dashboard hits within the TTL window are served from disk
//! instead of re-fetching upstream. The store survives restarts, so a
//! freshly started service can answer from a still-fresh map. Callers go
//! through the typed weather-map functions; the byte-level machinery is
//! private.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::OnceCell;
use tokio::task;

use crate::weather::LocationWeather;

static GLOBAL_CACHE: OnceCell<WeatherStore> = OnceCell::const_new();

/// Single key under which the assembled per-station map is stored
const WEATHER_MAP_KEY: &str = "hko:weather_map";

#[derive(Serialize, Deserialize)]
struct Expiring<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

struct WeatherStore {
    store: Keyspace,
}

fn read_bytes(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl WeatherStore {
    fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("weather", fjall::KeyspaceCreateOptions::default)?;
        Ok(WeatherStore { store: items })
    }

    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = Expiring { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        let _ = task::spawn_blocking(move || store.insert(key, bytes)).await?;
        Ok(())
    }

    /// `None` for misses and for entries whose TTL has lapsed; expired
    /// entries are dropped on the way out.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || read_bytes(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: Expiring<T> = postcard::from_bytes(&bytes)?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        if now >= entry.expires_at {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            return Ok(None);
        }

        tracing::debug!("Key found and still fresh");
        Ok(Some(entry.value))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        let _ = task::spawn_blocking(move || store.remove(key)).await?;
        Ok(())
    }
}

/// Opens the global persistent cache. **Must be called once before use.**
pub fn init(path: impl AsRef<Path>) -> Result<()> {
    let cache = WeatherStore::open(path)?;
    GLOBAL_CACHE
        .set(cache)
        .map_err(|_| anyhow!("Cache already initialized"))?;
    Ok(())
}

/// Whether [`init`] has been called yet. The service runs cacheless when
/// it has not (tests, or an unwritable cache directory).
#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL_CACHE.get().is_some()
}

/// # Panics
/// Panics if the cache has not been initialized by calling `cache::init()` first.
fn get_cache() -> &'static WeatherStore {
    GLOBAL_CACHE
        .get()
        .expect("Cache not initialized. Call cache::init() first.")
}

/// A TTL with up to ±10% random jitter so cached upstream payloads do not
/// all expire on the same request.
#[must_use]
pub fn ttl_with_jitter(base: Duration) -> Duration {
    let jitter: f32 = rand::rng().random_range(0.9..1.1);
    Duration::from_secs((base.as_secs() as f32 * jitter) as u64)
}

/// The cached per-station weather map, if one is stored and still fresh.
pub async fn load_weather_map() -> Result<Option<HashMap<String, LocationWeather>>> {
    get_cache().get(WEATHER_MAP_KEY).await
}

/// Store a freshly assembled weather map until `ttl` lapses.
pub async fn store_weather_map(
    map: HashMap<String, LocationWeather>,
    ttl: Duration,
) -> Result<()> {
    get_cache().put(WEATHER_MAP_KEY, map, ttl).await
}

//! Neighbourhood location cache stored in `DuckDB`.
//!
//! Maps neighbourhood names to their geocoded bounding areas so repeated
//! lookups never reach the rate-limited external geocoder. Only
//! successful resolutions are stored; misses stay uncached so a later
//! session can retry them. Areas are never mutated once written.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use duckdb::Connection;
use wfps_map_geocoder::{CacheError, LocationCache};
use wfps_map_incident_models::NeighbourhoodArea;

use crate::DbError;

/// Durable location cache backed by a `DuckDB` file.
///
/// The connection is wrapped in a mutex so the cache can be shared across
/// the async pipeline; every operation is a short local-disk query.
pub struct LocationCacheDb {
    conn: Mutex<Connection>,
}

impl LocationCacheDb {
    /// Opens (or creates) the location cache at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens the location cache at the default path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open_default() -> Result<Self, DbError> {
        Self::open(&crate::paths::location_cache_db_path())
    }

    /// Returns every cached area, ordered by neighbourhood name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub fn entries(&self) -> Result<Vec<NeighbourhoodArea>, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT neighbourhood, min_lon, min_lat, max_lon, max_lat
             FROM neighbourhood_cache
             ORDER BY neighbourhood",
        )?;

        let mut areas = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            areas.push(NeighbourhoodArea {
                neighbourhood: row.get(0)?,
                min_lon: row.get(1)?,
                min_lat: row.get(2)?,
                max_lon: row.get(3)?,
                max_lat: row.get(4)?,
            });
        }

        Ok(areas)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn get_area(&self, neighbourhood: &str) -> Result<Option<NeighbourhoodArea>, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT min_lon, min_lat, max_lon, max_lat
             FROM neighbourhood_cache
             WHERE neighbourhood = ?",
        )?;

        let mut rows = stmt.query(duckdb::params![neighbourhood])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        Ok(Some(NeighbourhoodArea {
            neighbourhood: neighbourhood.to_string(),
            min_lon: row.get(0)?,
            min_lat: row.get(1)?,
            max_lon: row.get(2)?,
            max_lat: row.get(3)?,
        }))
    }

    fn set_area(&self, area: &NeighbourhoodArea) -> Result<(), DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "INSERT INTO neighbourhood_cache (neighbourhood, min_lon, min_lat, max_lon, max_lat)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (neighbourhood) DO NOTHING",
        )?;

        stmt.execute(duckdb::params![
            area.neighbourhood,
            area.min_lon,
            area.min_lat,
            area.max_lon,
            area.max_lat,
        ])?;

        Ok(())
    }
}

impl LocationCache for LocationCacheDb {
    fn get(&self, neighbourhood: &str) -> Result<Option<NeighbourhoodArea>, CacheError> {
        self.get_area(neighbourhood).map_err(|e| CacheError {
            message: e.to_string(),
        })
    }

    fn set(&self, area: &NeighbourhoodArea) -> Result<(), CacheError> {
        self.set_area(area).map_err(|e| CacheError {
            message: e.to_string(),
        })
    }
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS neighbourhood_cache (
            neighbourhood TEXT PRIMARY KEY,
            min_lon DOUBLE NOT NULL,
            min_lat DOUBLE NOT NULL,
            max_lon DOUBLE NOT NULL,
            max_lat DOUBLE NOT NULL,
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        );",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "wfps_location_cache_{}_{name}.duckdb",
            std::process::id()
        ))
    }

    fn downtown() -> NeighbourhoodArea {
        NeighbourhoodArea {
            neighbourhood: "Downtown".to_string(),
            min_lon: -97.15,
            min_lat: 49.89,
            max_lon: -97.13,
            max_lat: 49.91,
        }
    }

    #[test]
    fn round_trips_an_area() {
        let path = temp_db_path("round_trip");
        let _ = std::fs::remove_file(&path);

        let cache = LocationCacheDb::open(&path).unwrap();
        assert!(!cache.has("Downtown").unwrap());

        cache.set(&downtown()).unwrap();

        let area = cache.get("Downtown").unwrap().unwrap();
        assert_eq!(area.neighbourhood, "Downtown");
        assert!((area.max_lat - 49.91).abs() < f64::EPSILON);

        drop(cache);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn survives_reopen() {
        let path = temp_db_path("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let cache = LocationCacheDb::open(&path).unwrap();
            cache.set(&downtown()).unwrap();
        }

        let cache = LocationCacheDb::open(&path).unwrap();
        assert!(cache.has("Downtown").unwrap());

        drop(cache);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn first_write_wins() {
        let path = temp_db_path("first_write");
        let _ = std::fs::remove_file(&path);

        let cache = LocationCacheDb::open(&path).unwrap();
        cache.set(&downtown()).unwrap();

        let mut shifted = downtown();
        shifted.min_lon = -98.0;
        cache.set(&shifted).unwrap();

        let area = cache.get("Downtown").unwrap().unwrap();
        assert!((area.min_lon - -97.15).abs() < f64::EPSILON);

        drop(cache);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn lists_entries_sorted() {
        let path = temp_db_path("entries");
        let _ = std::fs::remove_file(&path);

        let cache = LocationCacheDb::open(&path).unwrap();
        let mut st_vital = downtown();
        st_vital.neighbourhood = "St. Vital".to_string();
        cache.set(&st_vital).unwrap();
        cache.set(&downtown()).unwrap();

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].neighbourhood, "Downtown");
        assert_eq!(entries[1].neighbourhood, "St. Vital");

        drop(cache);
        let _ = std::fs::remove_file(&path);
    }
}

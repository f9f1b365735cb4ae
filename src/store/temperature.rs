use std::path::Path;

use chrono::NaiveDate;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use validator::Validate;

use crate::error::Result;
use crate::models::{Observation, Station};

/// Batch size for multi-row inserts, kept well under SQLite's bind limit.
const INSERT_CHUNK_SIZE: usize = 100;

/// A station's coordinates joined with its observation for one date,
/// the input row shape for interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSample {
    pub easting: f64,
    pub northing: f64,
    pub tmax: i32,
    pub tmin: i32,
}

/// Durable store for station metadata and per-station daily temperatures.
///
/// An explicit handle passed into every operation; callers own the lifetime,
/// there is no process-wide connection. The (station, date) primary key makes
/// a duplicate insert an error rather than a silent overwrite.
pub struct TemperatureStore {
    pool: SqlitePool,
}

impl TemperatureStore {
    /// Open (creating if necessary) the SQLite database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let url = format!("sqlite://{}", path.display());
        if !Sqlite::database_exists(&url).await.unwrap_or(false) {
            Sqlite::create_database(&url).await?;
        }
        let pool = SqlitePool::connect(&url).await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// An in-memory store, used by tests. Pinned to a single connection so
    /// every query sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS station (
                id VARCHAR(11) NOT NULL,
                source VARCHAR(5),
                name VARCHAR(64),
                easting DOUBLE NOT NULL,
                northing DOUBLE NOT NULL,
                elevation DOUBLE,
                gsod_daily BOOLEAN,
                PRIMARY KEY (id)
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS gsod_daily_index ON station (gsod_daily)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS temperature (
                station VARCHAR(11) NOT NULL,
                tmin INT NOT NULL,
                tmax INT NOT NULL,
                date DATE NOT NULL,
                PRIMARY KEY (station, date)
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS temperature_station_index ON temperature (station)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS temperature_date_index ON temperature (date)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Number of stored observations for a date. Zero means the date has
    /// never been (successfully) ingested and triggers a fetch.
    pub async fn count_observations(&self, date: NaiveDate) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM temperature WHERE date = ?")
            .bind(date.to_string())
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }

    /// Insert a day's observations as one transaction: a process kill cannot
    /// leave a half-populated date.
    pub async fn insert_observations(&self, observations: &[Observation]) -> Result<usize> {
        if observations.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        for chunk in observations.chunks(INSERT_CHUNK_SIZE) {
            let mut qb = QueryBuilder::<Sqlite>::new(
                "INSERT INTO temperature (station, tmax, tmin, date) ",
            );
            qb.push_values(chunk, |mut b, obs| {
                b.push_bind(&obs.station)
                    .push_bind(obs.tmax)
                    .push_bind(obs.tmin)
                    .push_bind(obs.date.to_string());
            });
            qb.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(observations.len())
    }

    /// Stations whose GSOD record supplements the CPC daily report.
    pub async fn gsod_daily_stations(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM station WHERE gsod_daily = 1")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// All stations affiliated with the GSOD source, used when the CPC
    /// report is unavailable for the requested date.
    pub async fn gsod_source_stations(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM station WHERE source = ?")
            .bind(crate::utils::SOURCE_GSOD)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    /// Station coordinates joined with the date's observations — the point
    /// set handed to the interpolator.
    pub async fn samples_for_date(&self, date: NaiveDate) -> Result<Vec<StationSample>> {
        let rows = sqlx::query(
            "SELECT s.easting, s.northing, t.tmax, t.tmin
             FROM temperature t INNER JOIN station s ON s.id = t.station
             WHERE t.date = ?",
        )
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| StationSample {
                easting: r.get(0),
                northing: r.get(1),
                tmax: r.get(2),
                tmin: r.get(3),
            })
            .collect())
    }

    /// Bulk-load station metadata (bootstrap and test seeding). Each station
    /// is validated before any row is written.
    pub async fn insert_stations(&self, stations: &[Station]) -> Result<usize> {
        for station in stations {
            station.validate()?;
        }
        let mut tx = self.pool.begin().await?;
        for chunk in stations.chunks(INSERT_CHUNK_SIZE) {
            let mut qb = QueryBuilder::<Sqlite>::new(
                "INSERT INTO station (id, source, name, easting, northing, elevation, gsod_daily) ",
            );
            qb.push_values(chunk, |mut b, s| {
                b.push_bind(&s.id)
                    .push_bind(&s.source)
                    .push_bind(&s.name)
                    .push_bind(s.easting)
                    .push_bind(s.northing)
                    .push_bind(s.elevation)
                    .push_bind(s.gsod_daily);
            });
            qb.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(stations.len())
    }
}

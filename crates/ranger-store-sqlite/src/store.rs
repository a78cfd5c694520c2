//! [`SqliteStore`] — the SQLite implementation of [`ObservationStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use ranger_core::{
  observation::{NewObservation, Observation},
  site::{NewSite, Site},
  species::{NewSpecies, Species},
  stats::{
    BlockGroupRow, NativeSplitRow, SiteGroupRow, StatsFilter, TaxaGroupRow,
    TimeSeriesRow,
  },
  store::ObservationStore,
};

use crate::{
  encode::{encode_dt, RawObservation, RawSite, RawSpecies},
  schema::SCHEMA,
  Error, Result,
};

// ─── Filter marshalling ──────────────────────────────────────────────────────

/// SQL fragment shared by every statistics query. Each condition collapses to
/// TRUE when its bound parameter is NULL, so one statement serves all filter
/// combinations. Assumes aliases `o` (observations), `s` (sites), `sp`
/// (species).
const FILTER_SQL: &str = "(?1 IS NULL OR o.timestamp >= ?1)
   AND (?2 IS NULL OR o.timestamp < ?2)
   AND (?3 IS NULL OR s.block = ?3)
   AND (?4 IS NULL OR s.code = ?4)
   AND (?5 IS NULL OR sp.taxa = ?5)
   AND (?6 IS NULL OR LOWER(sp.common_name) = LOWER(?6))";

/// Owned bind values for [`FILTER_SQL`], movable into a `conn.call` closure.
#[derive(Clone)]
struct FilterParams {
  from:        Option<String>,
  to:          Option<String>,
  block:       Option<i32>,
  site_code:   Option<String>,
  taxa:        Option<String>,
  common_name: Option<String>,
}

impl FilterParams {
  fn new(filter: &StatsFilter) -> Self {
    Self {
      from:        filter.from.map(encode_dt),
      to:          filter.to.map(encode_dt),
      block:       filter.block,
      site_code:   filter.site_code.clone(),
      taxa:        filter.taxa.map(|t| t.as_str().to_owned()),
      common_name: filter.common_name.clone(),
    }
  }

  fn bind(&self) -> [&dyn rusqlite::ToSql; 6] {
    [
      &self.from,
      &self.to,
      &self.block,
      &self.site_code,
      &self.taxa,
      &self.common_name,
    ]
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ranger observation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ObservationStore impl ───────────────────────────────────────────────────

impl ObservationStore for SqliteStore {
  type Error = Error;

  // ── Sites ─────────────────────────────────────────────────────────────────

  async fn site_by_code(&self, code: &str) -> Result<Option<Site>> {
    let code = code.to_owned();

    let raw: Option<RawSite> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM sites WHERE code = ?1",
                RawSite::COLUMNS
              ),
              rusqlite::params![code],
              RawSite::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSite::into_site).transpose()
  }

  async fn list_sites(&self) -> Result<Vec<Site>> {
    let raws: Vec<RawSite> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM sites ORDER BY code",
          RawSite::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawSite::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSite::into_site).collect()
  }

  async fn create_site(&self, input: NewSite) -> Result<Site> {
    let code     = input.code.clone();
    let name     = input.name.clone();
    let block    = input.block;
    let tenure   = input.tenure.as_str();
    let forest   = input.forest.as_str();
    let location = input.location.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sites (code, name, block, tenure, forest, location)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![code, name, block, tenure, forest, location],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Site {
      id,
      code: input.code,
      name: input.name,
      block: input.block,
      tenure: input.tenure,
      forest: input.forest,
      location: input.location,
    })
  }

  // ── Species ───────────────────────────────────────────────────────────────

  async fn species_by_scientific_name(
    &self,
    scientific_name: &str,
  ) -> Result<Option<Species>> {
    let scientific_name = scientific_name.to_owned();

    let raw: Option<RawSpecies> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM species WHERE scientific_name = ?1",
                RawSpecies::COLUMNS
              ),
              rusqlite::params![scientific_name],
              RawSpecies::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSpecies::into_species).transpose()
  }

  async fn species_by_id(&self, id: i64) -> Result<Option<Species>> {
    let raw: Option<RawSpecies> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM species WHERE species_id = ?1",
                RawSpecies::COLUMNS
              ),
              rusqlite::params![id],
              RawSpecies::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSpecies::into_species).transpose()
  }

  async fn species_by_common_name(
    &self,
    common_name: &str,
  ) -> Result<Option<Species>> {
    let common_name = common_name.to_owned();

    let raw: Option<RawSpecies> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM species
                 WHERE LOWER(common_name) = LOWER(?1)",
                RawSpecies::COLUMNS
              ),
              rusqlite::params![common_name],
              RawSpecies::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSpecies::into_species).transpose()
  }

  async fn list_species(&self) -> Result<Vec<Species>> {
    let raws: Vec<RawSpecies> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM species ORDER BY scientific_name",
          RawSpecies::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawSpecies::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSpecies::into_species).collect()
  }

  async fn create_species(&self, input: NewSpecies) -> Result<Species> {
    let scientific_name = input.scientific_name.clone();
    let common_name     = input.common_name.clone();
    let native          = input.native;
    let taxa            = input.taxa.as_str();
    let indicator       = input.indicator;
    let reportable      = input.reportable;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO species (
             scientific_name, common_name, native, taxa, indicator, reportable
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            scientific_name,
            common_name,
            native,
            taxa,
            indicator,
            reportable,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Species {
      id,
      scientific_name: input.scientific_name,
      common_name: input.common_name,
      native: input.native,
      taxa: input.taxa,
      indicator: input.indicator,
      reportable: input.reportable,
    })
  }

  // ── Observations ──────────────────────────────────────────────────────────

  async fn observation_by_id(&self, id: i64) -> Result<Option<Observation>> {
    let raw: Option<RawObservation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM observations WHERE observation_id = ?1",
                RawObservation::COLUMNS
              ),
              rusqlite::params![id],
              RawObservation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawObservation::into_observation).transpose()
  }

  async fn list_observations(
    &self,
    limit: i64,
    offset: i64,
  ) -> Result<Vec<Observation>> {
    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM observations
           ORDER BY timestamp DESC, observation_id DESC
           LIMIT ?1 OFFSET ?2",
          RawObservation::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawObservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawObservation::into_observation)
      .collect()
  }

  async fn create_observation(
    &self,
    input: NewObservation,
  ) -> Result<Observation> {
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO observations (
             site_id, species_id, timestamp, method,
             appearance_start, appearance_end,
             temperature, narrative, confidence
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.site_id,
            row.species_id,
            encode_dt(row.timestamp),
            row.method.as_str(),
            row.appearance_start,
            row.appearance_end,
            row.temperature,
            row.narrative,
            row.confidence,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Observation {
      id,
      site_id: input.site_id,
      species_id: input.species_id,
      timestamp: input.timestamp,
      method: input.method,
      appearance_start: input.appearance_start,
      appearance_end: input.appearance_end,
      temperature: input.temperature,
      narrative: input.narrative,
      confidence: input.confidence,
    })
  }

  async fn create_observations(&self, batch: Vec<NewObservation>) -> Result<u64> {
    let count = self
      .conn
      .call(move |conn| {
        // One transaction per batch: a failure rolls the whole batch back.
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO observations (
               site_id, species_id, timestamp, method,
               appearance_start, appearance_end,
               temperature, narrative, confidence
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for obs in &batch {
            stmt.execute(rusqlite::params![
              obs.site_id,
              obs.species_id,
              encode_dt(obs.timestamp),
              obs.method.as_str(),
              obs.appearance_start,
              obs.appearance_end,
              obs.temperature,
              obs.narrative,
              obs.confidence,
            ])?;
          }
        }
        tx.commit()?;
        Ok(batch.len() as u64)
      })
      .await?;

    Ok(count)
  }

  // ── Statistics ────────────────────────────────────────────────────────────

  async fn count_species_by_native(
    &self,
    filter: &StatsFilter,
  ) -> Result<Vec<NativeSplitRow>> {
    let params = FilterParams::new(filter);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT sp.native,
                  COUNT(DISTINCT o.species_id),
                  COUNT(o.observation_id)
           FROM observations o
           JOIN sites   s  ON s.site_id     = o.site_id
           JOIN species sp ON sp.species_id = o.species_id
           WHERE {FILTER_SQL}
           GROUP BY sp.native
           ORDER BY sp.native DESC"
        ))?;
        let rows = stmt
          .query_map(&params.bind()[..], |row| {
            Ok(NativeSplitRow {
              native:            row.get(0)?,
              species_count:     row.get(1)?,
              observation_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn count_active_sites(&self, filter: &StatsFilter) -> Result<i64> {
    let params = FilterParams::new(filter);

    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "SELECT COUNT(DISTINCT o.site_id)
             FROM observations o
             JOIN sites   s  ON s.site_id     = o.site_id
             JOIN species sp ON sp.species_id = o.species_id
             WHERE {FILTER_SQL}"
          ),
          &params.bind()[..],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count)
  }

  async fn observations_by_taxa(
    &self,
    filter: &StatsFilter,
  ) -> Result<Vec<TaxaGroupRow>> {
    let params = FilterParams::new(filter);

    let raws: Vec<(String, i64, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT sp.taxa,
                  COUNT(DISTINCT o.species_id),
                  COUNT(o.observation_id)
           FROM observations o
           JOIN sites   s  ON s.site_id     = o.site_id
           JOIN species sp ON sp.species_id = o.species_id
           WHERE {FILTER_SQL}
           GROUP BY sp.taxa
           ORDER BY sp.taxa"
        ))?;
        let rows = stmt
          .query_map(&params.bind()[..], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(taxa, species_count, observation_count)| {
        Ok(TaxaGroupRow {
          taxa: ranger_core::enums::Taxa::parse(&taxa)?,
          species_count,
          observation_count,
        })
      })
      .collect()
  }

  async fn observations_by_site(
    &self,
    filter: &StatsFilter,
  ) -> Result<Vec<SiteGroupRow>> {
    let params = FilterParams::new(filter);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT s.code,
                  COUNT(DISTINCT o.species_id),
                  COUNT(o.observation_id)
           FROM observations o
           JOIN sites   s  ON s.site_id     = o.site_id
           JOIN species sp ON sp.species_id = o.species_id
           WHERE {FILTER_SQL}
           GROUP BY s.code
           ORDER BY s.code"
        ))?;
        let rows = stmt
          .query_map(&params.bind()[..], |row| {
            Ok(SiteGroupRow {
              site_code:         row.get(0)?,
              species_count:     row.get(1)?,
              observation_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn observations_by_block(
    &self,
    filter: &StatsFilter,
  ) -> Result<Vec<BlockGroupRow>> {
    let params = FilterParams::new(filter);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT s.block,
                  COUNT(DISTINCT o.species_id),
                  COUNT(o.observation_id)
           FROM observations o
           JOIN sites   s  ON s.site_id     = o.site_id
           JOIN species sp ON sp.species_id = o.species_id
           WHERE {FILTER_SQL}
           GROUP BY s.block
           ORDER BY s.block"
        ))?;
        let rows = stmt
          .query_map(&params.bind()[..], |row| {
            Ok(BlockGroupRow {
              block:             row.get(0)?,
              species_count:     row.get(1)?,
              observation_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn observation_time_series(
    &self,
    filter: &StatsFilter,
  ) -> Result<Vec<TimeSeriesRow>> {
    let params = FilterParams::new(filter);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT strftime('%Y-%m', o.timestamp) AS bucket,
                  sp.native,
                  COUNT(o.observation_id)
           FROM observations o
           JOIN sites   s  ON s.site_id     = o.site_id
           JOIN species sp ON sp.species_id = o.species_id
           WHERE {FILTER_SQL}
           GROUP BY bucket, sp.native
           ORDER BY bucket, sp.native DESC"
        ))?;
        let rows = stmt
          .query_map(&params.bind()[..], |row| {
            Ok(TimeSeriesRow {
              bucket:            row.get(0)?,
              native:            row.get(1)?,
              observation_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }
}

//! Import-scoped memoizer for site and species lookups.
//!
//! One cache instance is owned by a single import run; it is not shared
//! across runs or threads. It is a plain two-map memoizer, not an LRU — it
//! may grow unbounded for the run's duration, bounded in practice by the
//! number of distinct entities in one file.

use std::collections::HashMap;

use ranger_core::{site::Site, species::Species, store::ObservationStore};

/// Two-level lookup: in-memory map first, then the persistent store.
///
/// A store miss is reported as `Ok(None)` rather than resolved here, because
/// only the caller can decide whether to create the missing entity. After the
/// caller creates one, it registers it via [`insert_site`](Self::insert_site)
/// / [`insert_species`](Self::insert_species) so no further store round trip
/// is issued for that key — the cache is the run's sole de-duplication point.
pub struct ReferenceCache<'a, S> {
  store:   &'a S,
  sites:   HashMap<String, Site>,
  species: HashMap<String, Species>,
}

impl<'a, S: ObservationStore> ReferenceCache<'a, S> {
  pub fn new(store: &'a S) -> Self {
    Self {
      store,
      sites: HashMap::new(),
      species: HashMap::new(),
    }
  }

  /// Resolve a site by code. `Ok(None)` means neither the cache nor the
  /// store knows it; store errors propagate unchanged.
  pub async fn site(&mut self, code: &str) -> Result<Option<Site>, S::Error> {
    if let Some(site) = self.sites.get(code) {
      return Ok(Some(site.clone()));
    }
    match self.store.site_by_code(code).await? {
      Some(site) => {
        self.sites.insert(code.to_string(), site.clone());
        Ok(Some(site))
      }
      None => Ok(None),
    }
  }

  /// Register a site the caller just created, overwriting any prior entry.
  pub fn insert_site(&mut self, site: Site) {
    self.sites.insert(site.code.clone(), site);
  }

  /// Resolve a species by scientific name; semantics mirror [`Self::site`].
  pub async fn species(
    &mut self,
    scientific_name: &str,
  ) -> Result<Option<Species>, S::Error> {
    if let Some(species) = self.species.get(scientific_name) {
      return Ok(Some(species.clone()));
    }
    match self.store.species_by_scientific_name(scientific_name).await? {
      Some(species) => {
        self
          .species
          .insert(scientific_name.to_string(), species.clone());
        Ok(Some(species))
      }
      None => Ok(None),
    }
  }

  /// Register a species the caller just created.
  pub fn insert_species(&mut self, species: Species) {
    self
      .species
      .insert(species.scientific_name.clone(), species);
  }
}

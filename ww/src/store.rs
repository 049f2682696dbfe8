//! Trip store
//!
//! Ordered, persisted collection of generated itineraries, newest first.
//! Every mutation writes the whole sequence back to a single JSON file.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::GeneratedItinerary;

/// Errors from encoding, decoding or writing the trip file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Persisted trip data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Decode a persisted trip list
pub fn decode_trips(content: &str) -> Result<Vec<GeneratedItinerary>, StoreError> {
    debug!(len = content.len(), "decode_trips: called");
    Ok(serde_json::from_str(content)?)
}

/// Encode a trip list for persistence
pub fn encode_trips(trips: &[GeneratedItinerary]) -> Result<String, StoreError> {
    debug!(count = trips.len(), "encode_trips: called");
    Ok(serde_json::to_string_pretty(trips)?)
}

/// Persisted trip history
#[derive(Debug)]
pub struct TripStore {
    path: PathBuf,
    trips: Vec<GeneratedItinerary>,
}

impl TripStore {
    /// Restore the store from `path`
    ///
    /// A missing or unreadable file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "TripStore::load: called");

        let trips = match fs::read_to_string(&path) {
            Ok(content) => match decode_trips(&content) {
                Ok(trips) => dedupe(trips),
                Err(e) => {
                    warn!(?path, error = %e, "Ignoring corrupt trip file");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "TripStore::load: no trip file yet");
                Vec::new()
            }
            Err(e) => {
                warn!(?path, error = %e, "Failed to read trip file");
                Vec::new()
            }
        };

        info!(count = trips.len(), ?path, "Loaded trips");
        Self { path, trips }
    }

    /// All trips, newest first
    pub fn trips(&self) -> &[GeneratedItinerary] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a trip by exact id
    pub fn get(&self, id: &str) -> Option<&GeneratedItinerary> {
        self.trips.iter().find(|t| t.id == id)
    }

    /// Look up a trip by exact id or unique id prefix
    pub fn find(&self, id_or_prefix: &str) -> Option<&GeneratedItinerary> {
        debug!(%id_or_prefix, "TripStore::find: called");
        if let Some(trip) = self.get(id_or_prefix) {
            return Some(trip);
        }
        if id_or_prefix.is_empty() {
            return None;
        }

        let mut matches = self.trips.iter().filter(|t| t.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(trip), None) => Some(trip),
            (Some(_), Some(_)) => {
                debug!(%id_or_prefix, "TripStore::find: ambiguous prefix");
                None
            }
            _ => None,
        }
    }

    /// Insert a trip at the front and persist
    ///
    /// Returns false if a trip with the same id is already stored. A failed
    /// write is logged; the trip stays in memory.
    pub fn append(&mut self, trip: GeneratedItinerary) -> bool {
        let id = trip.id.clone();
        self.try_append(trip).unwrap_or_else(|e| {
            warn!(%id, error = %e, "Failed to persist trips");
            true
        })
    }

    /// Like `append`, but reports a failed write
    pub fn try_append(&mut self, trip: GeneratedItinerary) -> Result<bool, StoreError> {
        debug!(id = %trip.id, "TripStore::try_append: called");
        if self.get(&trip.id).is_some() {
            warn!(id = %trip.id, "Refusing to store duplicate trip id");
            return Ok(false);
        }

        self.trips.insert(0, trip);
        self.save()?;
        Ok(true)
    }

    /// Remove every trip with this id and persist
    ///
    /// Returns whether anything was removed. A failed write is logged.
    pub fn remove(&mut self, id: &str) -> bool {
        self.try_remove(id).unwrap_or_else(|e| {
            warn!(%id, error = %e, "Failed to persist trips");
            true
        })
    }

    /// Like `remove`, but reports a failed write
    pub fn try_remove(&mut self, id: &str) -> Result<bool, StoreError> {
        debug!(%id, "TripStore::try_remove: called");
        let before = self.trips.len();
        self.trips.retain(|t| t.id != id);

        if self.trips.len() == before {
            debug!(%id, "TripStore::try_remove: no such trip");
            return Ok(false);
        }

        self.save()?;
        Ok(true)
    }

    /// Write the full sequence to disk
    pub fn save(&self) -> Result<(), StoreError> {
        debug!(path = ?self.path, count = self.trips.len(), "TripStore::save: called");
        let content = encode_trips(&self.trips)?;
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Sibling temp file, then rename over the real one
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

fn dedupe(trips: Vec<GeneratedItinerary>) -> Vec<GeneratedItinerary> {
    let mut seen = HashSet::new();
    let total = trips.len();
    let unique: Vec<_> = trips.into_iter().filter(|t| seen.insert(t.id.clone())).collect();
    if unique.len() != total {
        warn!(dropped = total - unique.len(), "Dropped duplicate trip ids from trip file");
    }
    unique
}

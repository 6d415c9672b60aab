use crate::domain::value_objects::{Coordinates, StopStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A single delivery point within a route.
///
/// Fields the client does not model are kept in `extra` so that a local patch
/// never drops data the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    #[serde(default)]
    pub route_id: Option<String>,
    pub sequence: u32,
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub status: StopStatus,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stop {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
            _ => None,
        }
    }
}

/// An ordered sequence of stops assigned to a vehicle/driver for a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    pub fn find_stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.id == stop_id)
    }

    /// Sets the status of every stop with `stop_id`. Returns whether one matched.
    pub fn apply_stop_status(&mut self, stop_id: &str, status: StopStatus) -> bool {
        let mut matched = false;
        for stop in self.stops.iter_mut().filter(|stop| stop.id == stop_id) {
            stop.status = status;
            matched = true;
        }
        matched
    }

    /// Reorders stops to follow `ordered_ids` and renumbers them from 1.
    pub fn resequence(&mut self, ordered_ids: &[String]) -> Result<(), String> {
        validate_permutation(&self.stops, ordered_ids)?;
        let mut remaining = std::mem::take(&mut self.stops);
        let mut reordered = Vec::with_capacity(remaining.len());
        for (index, id) in ordered_ids.iter().enumerate() {
            let position = remaining
                .iter()
                .position(|stop| &stop.id == id)
                .ok_or_else(|| format!("Stop {id} is not part of route {}", self.id))?;
            let mut stop = remaining.swap_remove(position);
            stop.sequence = index as u32 + 1;
            reordered.push(stop);
        }
        self.stops = reordered;
        Ok(())
    }

    /// Stop ids in current sequence order.
    pub fn stop_ids(&self) -> Vec<String> {
        let mut stops: Vec<&Stop> = self.stops.iter().collect();
        stops.sort_by_key(|stop| stop.sequence);
        stops.into_iter().map(|stop| stop.id.clone()).collect()
    }
}

fn validate_permutation(stops: &[Stop], ordered_ids: &[String]) -> Result<(), String> {
    if stops.len() != ordered_ids.len() {
        return Err(format!(
            "Expected {} stop ids, got {}",
            stops.len(),
            ordered_ids.len()
        ));
    }
    let known: HashSet<&str> = stops.iter().map(|stop| stop.id.as_str()).collect();
    let mut seen = HashSet::new();
    for id in ordered_ids {
        if !known.contains(id.as_str()) {
            return Err(format!("Unknown stop id {id}"));
        }
        if !seen.insert(id.as_str()) {
            return Err(format!("Duplicate stop id {id}"));
        }
    }
    Ok(())
}

/// Returns `ids` with the element at `from` moved to `to`.
pub fn move_index(ids: &[String], from: usize, to: usize) -> Result<Vec<String>, String> {
    if from >= ids.len() || to >= ids.len() {
        return Err(format!(
            "Move {from} -> {to} is out of bounds for {} stops",
            ids.len()
        ));
    }
    let mut moved = ids.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Ok(moved)
}

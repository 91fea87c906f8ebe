//! Request records: one row of a tabular testset.

use serde::{Deserialize, Serialize};

use crate::query::{QueryRelaxError, WAYPOINT_DELIMITER, relax_query};

/// Column order of the canonical tabular testset.
pub const RECORD_FIELDS: [&str; 7] = ["id", "desc", "expected", "src", "waypoints", "dst", "query"];

/// A single routing request as stored in a testset.
///
/// Coordinates and waypoints are kept as the backend-specific strings found
/// in the testset; this crate never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Identifier, unique within its testset.
    pub id: String,
    /// Free-text description.
    pub desc: String,
    /// Expected outcome as written by the testset author.
    pub expected: String,
    /// Source point.
    pub src: String,
    /// `;`-delimited intermediate waypoints; empty when there are none.
    pub waypoints: String,
    /// Destination point.
    pub dst: String,
    /// Backend options in URI query form.
    pub query: String,
}

impl RequestRecord {
    /// Whether the record routes through any intermediate waypoint.
    #[must_use]
    pub fn has_waypoints(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Intermediate waypoints in travel order.
    pub fn waypoints(&self) -> impl Iterator<Item = &str> {
        self.waypoints
            .split(WAYPOINT_DELIMITER)
            .filter(|waypoint| !waypoint.is_empty())
    }

    /// The same request with its intermediate waypoints removed and the
    /// query left as is.
    #[must_use]
    pub fn without_waypoints(&self) -> Self {
        Self {
            waypoints: String::new(),
            ..self.clone()
        }
    }

    /// Derive the relaxed form of this request.
    ///
    /// # Errors
    ///
    /// Returns [`QueryRelaxError`] when the query string cannot be decoded.
    /// Callers decide whether to fall back to [`Self::without_waypoints`].
    pub fn to_relaxed(&self) -> Result<Self, QueryRelaxError> {
        let query = relax_query(&self.query)?;
        Ok(Self {
            query,
            ..self.without_waypoints()
        })
    }
}

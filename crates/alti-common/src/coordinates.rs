//! Names of the coordinate variables of an along-track source.

use serde::{Deserialize, Serialize};

/// The time, longitude and latitude field names a source indexes its data by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateNames {
    pub time: String,
    pub longitude: String,
    pub latitude: String,
}

impl CoordinateNames {
    pub fn new(
        time: impl Into<String>,
        longitude: impl Into<String>,
        latitude: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            longitude: longitude.into(),
            latitude: latitude.into(),
        }
    }

    /// All three names, time first.
    pub fn as_array(&self) -> [&str; 3] {
        [&self.time, &self.longitude, &self.latitude]
    }

    /// Check if a variable name is one of the coordinates.
    pub fn contains(&self, name: &str) -> bool {
        self.as_array().contains(&name)
    }
}

impl Default for CoordinateNames {
    fn default() -> Self {
        Self::new("time", "longitude", "latitude")
    }
}

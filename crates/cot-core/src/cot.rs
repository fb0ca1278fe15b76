//! Cursor-on-Target marker configuration
//!
//! [`CotConfig`] is the immutable description of one marker: identity,
//! position, timing, and the attachment files bundled into its data package.
//! It keys the orchestrator's package cache, so it carries structural
//! equality and hashing (float fields compare by bit pattern).

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Duration;

/// Unknown circular/linear error, per CoT convention
const UNKNOWN_ERROR: f64 = 9_999_999.0;

/// Immutable description of one CoT marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CotConfig {
    /// Unique identifier for the marker
    pub uid: String,

    /// CoT type string (e.g. "a-u-G" for an unknown ground contact)
    pub cot_type: String,

    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// Height above ellipsoid in meters
    pub altitude_hae: f64,

    /// Circular error in meters
    pub ce: f64,

    /// Linear error in meters
    pub le: f64,

    /// How long after transmission the marker stays valid
    #[serde(with = "duration_secs")]
    pub stale_after: Duration,

    /// Files bundled into this marker's data package
    #[serde(default)]
    pub attachment_paths: Vec<PathBuf>,
}

impl CotConfig {
    /// Create a marker at the origin with unknown type and no attachments
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            cot_type: "a-u-G".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            altitude_hae: 0.0,
            ce: UNKNOWN_ERROR,
            le: UNKNOWN_ERROR,
            stale_after: Duration::from_secs(120),
            attachment_paths: Vec::new(),
        }
    }

    /// Set the CoT type
    pub fn cot_type(mut self, cot_type: impl Into<String>) -> Self {
        self.cot_type = cot_type.into();
        self
    }

    /// Set the marker position
    pub fn position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Set the height above ellipsoid
    pub fn altitude_hae(mut self, altitude_hae: f64) -> Self {
        self.altitude_hae = altitude_hae;
        self
    }

    /// Set the stale interval
    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Add an attachment file
    pub fn attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment_paths.push(path.into());
        self
    }
}

// Structural equality over float bit patterns so the config can key a
// HashMap. Two configs differing only in float representation (e.g. 0.0 vs
// -0.0) are distinct, which is fine for a cache key.
impl PartialEq for CotConfig {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.cot_type == other.cot_type
            && self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
            && self.altitude_hae.to_bits() == other.altitude_hae.to_bits()
            && self.ce.to_bits() == other.ce.to_bits()
            && self.le.to_bits() == other.le.to_bits()
            && self.stale_after == other.stale_after
            && self.attachment_paths == other.attachment_paths
    }
}

impl Eq for CotConfig {}

impl Hash for CotConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
        self.cot_type.hash(state);
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
        self.altitude_hae.to_bits().hash(state);
        self.ce.to_bits().hash(state);
        self.le.to_bits().hash(state);
        self.stale_after.hash(state);
        self.attachment_paths.hash(state);
    }
}

// Helper module for Duration serialization as seconds
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

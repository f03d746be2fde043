//! Device-location contracts.
//!
//! The real provider lives in the platform layer; this crate only fixes the
//! shapes the presentation layer programs against: a [`LocationFix`], the
//! error taxonomy, a permission gate, and a provider that can answer one-shot
//! fixes or push a continuous stream of them over an mpsc channel.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// A single position report from the device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in meters.
    pub accuracy: f32,
    pub altitude: Option<f64>,
    /// Ground speed in meters per second.
    pub speed: Option<f32>,
    /// Heading in degrees clockwise from north.
    pub bearing: Option<f32>,
    /// Name of the subsystem that produced the fix (gps, network, fused...).
    pub provider: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    /// Short "Lat: x, Lng: y" rendering for display.
    pub fn coords_string(&self) -> String {
        format!("Lat: {:.6}, Lng: {:.6}", self.latitude, self.longitude)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission not granted")]
    PermissionDenied,

    #[error("Location services unavailable")]
    Unavailable,

    #[error("No location fix available")]
    NoFix,

    #[error("Location provider error: {0}")]
    Provider(String),
}

/// Answers whether the user has granted location access.
pub trait PermissionGate: Send + Sync {
    fn location_granted(&self) -> bool;
}

/// One-shot and streaming access to device position.
///
/// `start_updates` hands back the receiving half of a channel carrying fixes
/// and transient faults (e.g. the platform reporting location availability
/// lost); the provider stops producing once `stop_updates` is called or the
/// receiver is dropped.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Last fix the device cached, if any.
    async fn last_known(&self) -> Result<LocationFix, LocationError>;

    /// Fresh high-accuracy fix.
    async fn current_fix(&self) -> Result<LocationFix, LocationError>;

    /// Begin periodic updates at roughly `interval`.
    fn start_updates(
        &self,
        interval: Duration,
    ) -> Result<mpsc::Receiver<Result<LocationFix, LocationError>>, LocationError>;

    /// Stop any in-flight update stream.
    fn stop_updates(&self);
}

//! Pluggable route providers: duration, distance and geometry between two
//! coordinates.
//!
//! - **`StraightLineRouteProvider`**: great-circle distance at a fixed average
//!   speed. Zero dependencies on the outside world.
//! - **`CachedRouteProvider`**: LRU cache in front of any provider.
//! - **`ResilientRouteProvider`**: the view the dispatch engine uses. It never
//!   fails; errors and timeouts from the inner provider degrade to a fixed
//!   duration and distance with a two-point geometry.
//!
//! A real road-network oracle plugs in by implementing [`RouteProvider`].

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use log::warn;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coord;

/// Average city speed for straight-line estimates.
pub const AVG_SPEED_KMH: f64 = 40.0;

/// Result of a route query between two coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub duration_secs: f64,
    pub distance_m: f64,
    /// Ordered points along the route, origin first.
    pub geometry: Vec<Coord>,
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no route from {from:?} to {to:?}")]
    NoRoute { from: Coord, to: Coord },

    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(Coord),

    #[error("route provider unavailable: {0}")]
    Unavailable(String),
}

/// Trait for routing backends. Implementations must be `Send + Sync` so the
/// provider can live inside an ECS resource.
pub trait RouteProvider: Send + Sync {
    fn route(&self, from: Coord, to: Coord) -> Result<RouteResult, RouteError>;
}

/// Route configuration carried in the simulation params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub avg_speed_kmh: f64,
    /// Entries kept by the route cache. 0 disables caching.
    pub cache_capacity: usize,
    pub fallback_duration_secs: f64,
    pub fallback_distance_m: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            avg_speed_kmh: AVG_SPEED_KMH,
            cache_capacity: 1_024,
            fallback_duration_secs: 600.0,
            fallback_distance_m: 5_000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Straight-line provider
// ---------------------------------------------------------------------------

/// Great-circle distance between the endpoints at a constant speed.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRouteProvider {
    pub speed_kmh: f64,
}

impl Default for StraightLineRouteProvider {
    fn default() -> Self {
        Self {
            speed_kmh: AVG_SPEED_KMH,
        }
    }
}

impl RouteProvider for StraightLineRouteProvider {
    fn route(&self, from: Coord, to: Coord) -> Result<RouteResult, RouteError> {
        let distance_m = from
            .haversine_m(&to)
            .ok_or(RouteError::InvalidCoordinate(from))?;
        let duration_secs = if distance_m > 0.0 {
            (distance_m / 1_000.0) / self.speed_kmh.max(1.0) * 3_600.0
        } else {
            0.0
        };
        Ok(RouteResult {
            duration_secs,
            distance_m,
            geometry: vec![from, to],
        })
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

type CacheKey = (u64, u64, u64, u64);

fn cache_key(from: Coord, to: Coord) -> CacheKey {
    (
        from.lat.to_bits(),
        from.lng.to_bits(),
        to.lat.to_bits(),
        to.lng.to_bits(),
    )
}

/// LRU-cached wrapper around any [`RouteProvider`]. The key is directional
/// and exact; only successful routes are cached.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<CacheKey, RouteResult>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: Coord, to: Coord) -> Result<RouteResult, RouteError> {
        let key = cache_key(from, to);
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return Ok(hit.clone());
            }
        }

        // The lock is not held across the inner call.
        let route = self.inner.route(from, to)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, route.clone());
        }
        Ok(route)
    }
}

// ---------------------------------------------------------------------------
// Never-failing view used by dispatch
// ---------------------------------------------------------------------------

/// Fixed estimate returned when the inner provider fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackEstimate {
    pub duration_secs: f64,
    pub distance_m: f64,
}

impl FallbackEstimate {
    pub fn route(&self, from: Coord, to: Coord) -> RouteResult {
        RouteResult {
            duration_secs: self.duration_secs,
            distance_m: self.distance_m,
            geometry: vec![from, to],
        }
    }
}

impl From<&RouteConfig> for FallbackEstimate {
    fn from(config: &RouteConfig) -> Self {
        Self {
            duration_secs: config.fallback_duration_secs,
            distance_m: config.fallback_distance_m,
        }
    }
}

pub struct ResilientRouteProvider {
    inner: Box<dyn RouteProvider>,
    fallback: FallbackEstimate,
}

impl ResilientRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, fallback: FallbackEstimate) -> Self {
        Self { inner, fallback }
    }

    /// Always yields a usable route.
    pub fn route(&self, from: Coord, to: Coord) -> RouteResult {
        match self.inner.route(from, to) {
            Ok(route) => route,
            Err(err) => {
                warn!("route lookup failed, using fallback estimate: {err}");
                self.fallback.route(from, to)
            }
        }
    }

    pub fn fallback(&self) -> FallbackEstimate {
        self.fallback
    }
}

/// Build the default provider stack from config: straight-line estimates,
/// optionally cached, wrapped in the fallback.
pub fn build_route_provider(config: &RouteConfig) -> ResilientRouteProvider {
    let base: Box<dyn RouteProvider> = Box::new(StraightLineRouteProvider {
        speed_kmh: config.avg_speed_kmh,
    });
    wrap_route_provider(base, config)
}

/// Wrap an arbitrary provider (e.g. a real road-network oracle) with the
/// cache and fallback described by `config`.
pub fn wrap_route_provider(
    inner: Box<dyn RouteProvider>,
    config: &RouteConfig,
) -> ResilientRouteProvider {
    let inner: Box<dyn RouteProvider> = match NonZeroUsize::new(config.cache_capacity) {
        Some(capacity) => Box::new(CachedRouteProvider::new(inner, capacity)),
        None => inner,
    };
    ResilientRouteProvider::new(inner, FallbackEstimate::from(config))
}

//! Memoized platform geometry
//!
//! Identical `(length, width, curviness)` always produce identical meshes, so
//! the first build is kept and later requests get a deep copy of it. Copies
//! are independent: moving or editing one platform's mesh never touches
//! another's.

use std::collections::HashMap;

use super::mesh::MeshData;
use super::ribbon::build_ribbon_mesh;
use super::surface::{SurfaceMesh, build_platform_surface_with};
use crate::sim::path::PathResolution;

/// Bit-exact cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    length: u32,
    width: u32,
    curviness: u32,
}

impl GeometryKey {
    pub fn new(length: f32, width: f32, curviness: f32) -> Self {
        // Fold -0.0 into 0.0 so they share an entry
        let bits = |v: f32| (v + 0.0).to_bits();
        Self {
            length: bits(length),
            width: bits(width),
            curviness: bits(curviness),
        }
    }
}

/// Surface and text strip for one key
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformGeometry {
    pub surface: SurfaceMesh,
    /// Ribbon strip without text; the texture is attached per platform
    pub ribbon: MeshData,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Platform geometry cache
#[derive(Debug, Clone)]
pub struct GeometryCache {
    entries: HashMap<GeometryKey, PlatformGeometry>,
    surface_resolution: PathResolution,
    ribbon_resolution: PathResolution,
    stats: CacheStats,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(PathResolution::SURFACE, PathResolution::RIBBON)
    }
}

impl GeometryCache {
    pub fn new(surface_resolution: PathResolution, ribbon_resolution: PathResolution) -> Self {
        Self {
            entries: HashMap::new(),
            surface_resolution,
            ribbon_resolution,
            stats: CacheStats::default(),
        }
    }

    /// Cache whose ribbon density follows a quality multiplier
    pub fn with_ribbon_quality(factor: f32) -> Self {
        Self::new(PathResolution::SURFACE, PathResolution::RIBBON.scaled(factor))
    }

    /// Geometry for a platform, built on first request
    pub fn platform_geometry(
        &mut self,
        length: f32,
        width: f32,
        curviness: f32,
    ) -> PlatformGeometry {
        let key = GeometryKey::new(length, width, curviness);
        if let Some(cached) = self.entries.get(&key) {
            self.stats.hits += 1;
            log::debug!(
                "Geometry cache hit (length {}, curviness {})",
                length,
                curviness
            );
            return cached.clone();
        }

        self.stats.misses += 1;
        let geometry = PlatformGeometry {
            surface: build_platform_surface_with(
                length,
                width,
                curviness,
                self.surface_resolution,
            ),
            ribbon: build_ribbon_mesh(length, curviness, self.ribbon_resolution),
        };
        self.entries.insert(key, geometry.clone());
        geometry
    }

    /// Surface only (same cache entry)
    pub fn platform_surface(&mut self, length: f32, width: f32, curviness: f32) -> SurfaceMesh {
        self.platform_geometry(length, width, curviness).surface
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

//! Render-ready point cloud for external viewers
//!
//! Flattens a [`FieldSolution`] into `f32` buffers: positions, unit vectors,
//! magnitudes, region labels and the per-region masked magnitudes a viewer
//! colours with separate colormaps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{FieldError, Result};
use crate::field::{FieldSolution, Region};
use crate::geometry::extent_of;

/// Magic prefix of the binary layout
pub const CLOUD_MAGIC: &[u8; 8] = b"EFIELD\0\0";

#[derive(Debug, Clone, Serialize)]
pub struct FieldCloud {
    pub positions: Vec<f32>,        // x, y, z
    pub vectors: Vec<f32>,          // unit field direction
    pub magnitudes: Vec<f32>,       // |E| (V/m)
    pub regions: Vec<u8>,           // 0 = gas, 1 = dielectric
    pub mag_gas: Vec<f32>,          // |E| in gas, NaN elsewhere
    pub mag_dielectric: Vec<f32>,   // |E| in dielectric, NaN elsewhere
    pub extent: f32,                // largest absolute coordinate
}

impl FieldCloud {
    pub fn from_solution(solution: &FieldSolution) -> Self {
        let n = solution.len();
        let mut positions = Vec::with_capacity(n * 3);
        let mut vectors = Vec::with_capacity(n * 3);

        for (p, u) in solution.points.iter().zip(&solution.unit_vectors) {
            positions.extend(p.coords.iter().map(|&c| c as f32));
            vectors.extend(u.iter().map(|&c| c as f32));
        }

        let narrow = |values: Vec<f64>| values.into_iter().map(|v| v as f32).collect::<Vec<_>>();

        Self {
            positions,
            vectors,
            magnitudes: solution.magnitudes.iter().map(|&m| m as f32).collect(),
            regions: solution.regions.iter().map(|r| r.as_u8()).collect(),
            mag_gas: narrow(solution.masked_magnitudes(Region::Gas)),
            mag_dielectric: narrow(solution.masked_magnitudes(Region::Dielectric)),
            extent: extent_of(&solution.points) as f32,
        }
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Little-endian: magic, point count (u32), extent (f32), positions,
    /// unit vectors, magnitudes, then one region byte per point
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        let n = self.len();
        let count = header_count(n)?;
        let mut data = Vec::with_capacity(16 + n * 29);

        data.extend_from_slice(CLOUD_MAGIC);
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&self.extent.to_le_bytes());

        for &v in &self.positions {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for &v in &self.vectors {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for &v in &self.magnitudes {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&self.regions);

        Ok(data)
    }

    /// Pretty JSON; masked (NaN) magnitudes serialise as `null`
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Exported field cloud: {} points to {:?}", self.len(), path);
        Ok(())
    }
}

fn header_count(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| {
        FieldError::Export(format!("{} points do not fit the u32 header count", n))
    })
}

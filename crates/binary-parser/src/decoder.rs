//! Big-endian grid decoding.

use std::io::Read;
use std::path::Path;

use bytes::{Buf, Bytes};
use tracing::{debug, warn};

use rfe_common::{Grid, GridGeometry, SENTINEL};

use crate::error::{DecodeError, DecodeResult};
use crate::orient::Array2;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// What to do with a grid that contains negative rainfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeValuePolicy {
    /// Any negative cell marks the whole file as corrupt; every cell becomes
    /// the sentinel.
    #[default]
    InvalidateGrid,
    /// Keep values as decoded.
    Keep,
}

/// Decoder for headerless big-endian `f32` grids of a fixed geometry.
#[derive(Debug, Clone)]
pub struct BinaryGridDecoder {
    geometry: GridGeometry,
    sentinel: f32,
    negative_policy: NegativeValuePolicy,
}

impl BinaryGridDecoder {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            sentinel: SENTINEL,
            negative_policy: NegativeValuePolicy::default(),
        }
    }

    /// Decoder for ARC2 `daily_clim.bin` files.
    pub fn arc2() -> Self {
        Self::new(GridGeometry::arc2())
    }

    pub fn with_negative_policy(mut self, policy: NegativeValuePolicy) -> Self {
        self.negative_policy = policy;
        self
    }

    pub fn with_sentinel(mut self, sentinel: f32) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn sentinel(&self) -> f32 {
        self.sentinel
    }

    /// Number of bytes a file of this geometry must contain.
    pub fn expected_len(&self) -> usize {
        self.geometry.len() * std::mem::size_of::<f32>()
    }

    /// Decode raw (uncompressed) bytes into a single-timestep grid.
    ///
    /// Rows of the result follow the geometry's latitude axis (ascending from
    /// `lat_min`), columns its longitude axis.
    pub fn decode_bytes(&self, raw: &[u8]) -> DecodeResult<Grid> {
        let expected = self.expected_len();
        if raw.len() < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: raw.len(),
            });
        }
        if raw.len() > expected {
            return Err(DecodeError::UnexpectedSize {
                expected,
                actual: raw.len(),
            });
        }

        let mut buf = raw;
        let mut values = Vec::with_capacity(self.geometry.len());
        while buf.has_remaining() {
            values.push(buf.get_f32());
        }

        let (nx, ny) = (self.geometry.nx, self.geometry.ny);
        let mut array =
            Array2::from_column_major(&values, nx, ny).ok_or(DecodeError::Truncated {
                expected,
                actual: raw.len(),
            })?;

        if self.negative_policy == NegativeValuePolicy::InvalidateGrid {
            let negatives = array.iter().filter(|v| **v < 0.0).count();
            if negatives > 0 {
                warn!(
                    negatives = negatives,
                    sentinel = self.sentinel,
                    "Negative rainfall in grid, marking every cell missing"
                );
                array.fill(self.sentinel);
            }
        }

        let oriented = array.rot90().flipud();
        debug!(
            rows = oriented.rows(),
            cols = oriented.cols(),
            "Decoded binary grid"
        );

        Ok(Grid::single(
            oriented.into_vec(),
            self.geometry.axes(),
            self.sentinel,
        )?)
    }

    /// Read and decode a file. Gzip-compressed files are inflated in memory.
    pub fn decode_file(&self, path: &Path) -> DecodeResult<Grid> {
        if !path.exists() {
            return Err(DecodeError::MissingFile(path.to_path_buf()));
        }

        let raw = std::fs::read(path)?;
        if is_gzip(&raw) {
            debug!(path = %path.display(), "Inflating gzip source");
            let inflated = decompress_gzip(&raw)?;
            return self.decode_bytes(&inflated);
        }
        self.decode_bytes(&raw)
    }
}

impl Default for BinaryGridDecoder {
    fn default() -> Self {
        Self::arc2()
    }
}

/// True when `data` starts with the gzip magic number.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == GZIP_MAGIC
}

/// Decompress a gzip stream.
pub fn decompress_gzip(data: &[u8]) -> DecodeResult<Bytes> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::Decompression(e.to_string()))?;
    Ok(Bytes::from(decompressed))
}

//! Decoder for flat binary rainfall grids.
//!
//! ARC2 daily files are a bare dump of `751 * 801` big-endian 32-bit floats
//! with no header. The values are stored longitude-fastest, which a
//! column-major reshape to `(nx, ny)` followed by a 90° rotation and a
//! vertical flip brings back to `[lat][lon]` row-major order matching the
//! product's latitude axis.
//!
//! A file holding any negative value is treated as corrupt and the whole grid
//! is replaced by the sentinel (see [`NegativeValuePolicy`]).

mod decoder;
pub mod error;
pub mod orient;

pub use decoder::{decompress_gzip, is_gzip, BinaryGridDecoder, NegativeValuePolicy};
pub use error::{DecodeError, DecodeResult};

//! Per-quadrant lookup-table correction.
//!
//! Each frame interleaves four pixel sub-streams ("quadrants", one per
//! modulator quad state); each stream carries its own correction table.
//! Tables span the full `u16` sample domain, so a lookup can never be out
//! of range once a table is built.

use crate::error::{AppResult, DaqError};

/// Number of interleaved pixel sub-streams per frame.
pub const QUADRANTS: usize = 4;

/// Entries per correction table: the full fixed-width sample domain.
pub const LUT_SIZE: usize = 1 << 16;

/// Four correction tables, one per quadrant stream.
///
/// Immutable for the lifetime of an acquisition session.
pub struct QuadrantLut {
    tables: [Box<[u16; LUT_SIZE]>; QUADRANTS],
}

impl QuadrantLut {
    /// Build from four tables, one per quadrant in stream order.
    ///
    /// # Errors
    /// Returns [`DaqError::Lut`] if any table does not cover the full
    /// sample domain.
    pub fn from_tables(tables: [Vec<u16>; QUADRANTS]) -> AppResult<Self> {
        let mut built = Vec::with_capacity(QUADRANTS);
        for (quad, table) in tables.into_iter().enumerate() {
            let len = table.len();
            let table: Box<[u16; LUT_SIZE]> =
                table.into_boxed_slice().try_into().map_err(|_| {
                    DaqError::Lut(format!(
                        "quadrant {quad} table has {len} entries, expected {LUT_SIZE}"
                    ))
                })?;
            built.push(table);
        }
        // Length checked above: exactly QUADRANTS tables went in.
        match <[Box<[u16; LUT_SIZE]>; QUADRANTS]>::try_from(built) {
            Ok(tables) => Ok(Self { tables }),
            Err(_) => Err(DaqError::Lut("expected four quadrant tables".to_string())),
        }
    }

    /// The identity correction: every sample maps to itself.
    pub fn identity() -> Self {
        let table: Vec<u16> = (0..=u16::MAX).collect();
        Self::from_tables([table.clone(), table.clone(), table.clone(), table])
            .unwrap_or_else(|_| unreachable!("identity table spans the sample domain"))
    }

    /// Corrected value for a raw sample on the given quadrant stream.
    #[inline]
    pub fn correct(&self, quad: usize, raw: u16) -> u16 {
        self.tables[quad][raw as usize]
    }
}

/// Correction mode for one camera's integration loop.
pub enum Correction {
    /// Per-quadrant lookup-table correction.
    Lut(QuadrantLut),
    /// Raw samples accumulate unmodified.
    Passthrough,
}

impl Correction {
    /// Apply this correction to one sample of the given quadrant stream.
    #[inline]
    pub fn apply(&self, quad: usize, raw: u16) -> u16 {
        match self {
            Correction::Lut(lut) => lut.correct(quad, raw),
            Correction::Passthrough => raw,
        }
    }
}

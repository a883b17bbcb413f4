//! The snow field: one shared vertex set for every particle layer

use std::sync::Arc;

use rand::Rng;

/// Number of points in the snow field.
pub const POINT_COUNT: usize = 10_000;

/// Half-width of the cube the points are sampled from.
pub const FIELD_EXTENT: f32 = 1000.0;

/// Immutable set of 3D points shared by all particle layers.
///
/// Cloning is cheap: clones share one allocation.
#[derive(Clone, Debug)]
pub struct SnowField {
    positions: Arc<[[f32; 3]]>,
}

impl SnowField {
    /// Sample `POINT_COUNT` points uniformly in `[-FIELD_EXTENT, FIELD_EXTENT]^3`.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let positions: Vec<[f32; 3]> = (0..POINT_COUNT)
            .map(|_| {
                [
                    rng.gen_range(-FIELD_EXTENT..=FIELD_EXTENT),
                    rng.gen_range(-FIELD_EXTENT..=FIELD_EXTENT),
                    rng.gen_range(-FIELD_EXTENT..=FIELD_EXTENT),
                ]
            })
            .collect();
        Self {
            positions: positions.into(),
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True if both handles point at the same allocation.
    pub fn shares_storage_with(&self, other: &SnowField) -> bool {
        Arc::ptr_eq(&self.positions, &other.positions)
    }
}

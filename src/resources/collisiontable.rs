//! Layer-pair collision filter.
//!
//! The table is a square boolean matrix indexed by [`LayerTag`] pairs. Every
//! pair starts enabled; games disable the pairs that must never block each
//! other (a bomb and its own explosion, for example). Writes always update
//! both `[a][b]` and `[b][a]`, so the matrix stays symmetric.
//!
//! Pairs that are disabled here are still tested by the collision resolver,
//! but as triggers: they report contacts without blocking movement.
use crate::components::collider::LayerTag;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionTable {
    layers: Vec<Vec<bool>>,
}

impl CollisionTable {
    /// Create a table for `layer_count` layers with every pair enabled.
    pub fn new(layer_count: usize) -> Result<Self, ConfigError> {
        if layer_count == 0 {
            return Err(ConfigError::NoLayers);
        }
        Ok(Self {
            layers: vec![vec![true; layer_count]; layer_count],
        })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn contains(&self, layer: LayerTag) -> bool {
        layer < self.layers.len()
    }

    /// Enable or disable collisions between two layers (both directions).
    pub fn set_layer_collision(
        &mut self,
        a: LayerTag,
        b: LayerTag,
        do_collide: bool,
    ) -> Result<(), ConfigError> {
        if !self.contains(a) || !self.contains(b) {
            return Err(ConfigError::InvalidLayer {
                a,
                b,
                layer_count: self.layers.len(),
            });
        }
        self.layers[a][b] = do_collide;
        self.layers[b][a] = do_collide;
        Ok(())
    }

    /// Whether colliders on layers `a` and `b` block each other.
    ///
    /// # Panics
    ///
    /// Panics if either layer is outside the declared range. Scenes are
    /// validated against the table before they go live, so this only fires
    /// on a broken game configuration.
    pub fn collides(&self, a: LayerTag, b: LayerTag) -> bool {
        match self.try_collides(a, b) {
            Ok(value) => value,
            Err(e) => panic!("fatal configuration error: {e}"),
        }
    }

    pub fn try_collides(&self, a: LayerTag, b: LayerTag) -> Result<bool, ConfigError> {
        self.layers
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .ok_or(ConfigError::InvalidLayer {
                a,
                b,
                layer_count: self.layers.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_all_pairs_collide() {
        let table = CollisionTable::new(4).unwrap();
        for a in 0..4 {
            for b in 0..4 {
                assert!(table.collides(a, b));
            }
        }
    }

    #[test]
    fn test_set_layer_collision_is_symmetric() {
        let mut table = CollisionTable::new(5).unwrap();
        let pairs = [(0, 1, false), (3, 2, false), (4, 4, false), (1, 0, true)];
        for (a, b, value) in pairs {
            table.set_layer_collision(a, b, value).unwrap();
            for x in 0..5 {
                for y in 0..5 {
                    assert_eq!(table.collides(x, y), table.collides(y, x));
                }
            }
        }
        assert!(table.collides(0, 1));
        assert!(!table.collides(2, 3));
        assert!(!table.collides(4, 4));
    }

    #[test]
    fn test_invalid_layer_is_rejected() {
        let mut table = CollisionTable::new(3).unwrap();
        let err = table.set_layer_collision(1, 3, false).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLayer { b: 3, .. }));
        assert!(table.try_collides(7, 0).is_err());
    }

    #[test]
    fn test_zero_layers_is_a_config_error() {
        assert!(matches!(CollisionTable::new(0), Err(ConfigError::NoLayers)));
    }

    #[test]
    #[should_panic(expected = "fatal configuration error")]
    fn test_out_of_range_query_panics() {
        let table = CollisionTable::new(2).unwrap();
        table.collides(0, 2);
    }
}

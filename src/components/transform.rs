use glam::Vec3;

/// World placement of an entity. Rotation is stored as euler angles in
/// degrees; Y is up and gameplay happens in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Set the yaw (rotation about Y) in degrees, wrapped to [0, 360).
    pub fn set_yaw(&mut self, degrees: f32) {
        self.rotation.y = degrees.rem_euclid(360.0);
    }
}

//! Draw data handed to the render collaborator.
//!
//! The core never draws anything; it only keeps the model name, tint and
//! current animation selected by gameplay so the renderer can pick them up
//! from the entity list each frame.
use glam::Vec3;

/// Animation currently requested by gameplay logic.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub name: String,
    pub speed: f32,
    pub looped: bool,
    /// Whether the model should animate at all.
    pub playing: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            name: String::from("Idle"),
            speed: 1.0,
            looped: true,
            playing: false,
        }
    }
}

impl AnimationState {
    pub fn play(&mut self, name: &str, speed: f32) {
        if self.name != name {
            self.name.clear();
            self.name.push_str(name);
        }
        self.speed = speed;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub model_name: String,
    pub color: Option<Vec3>,
    pub animation: AnimationState,
}

impl Appearance {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            color: None,
            animation: AnimationState::default(),
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = Some(color);
        self
    }
}

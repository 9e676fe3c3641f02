/// Requests raised by gameplay logic and consumed by the engine after the
/// frame pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    /// Start a background load of the scene with this index.
    Load(usize),
    /// Stop the run loop.
    Quit,
}

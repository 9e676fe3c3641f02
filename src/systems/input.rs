//! Input system.
//!
//! [`update_input_state`] rolls the key states into their previous-frame
//! slot and then lets the input collaborator report this frame's
//! transitions into [`InputState`].
use crate::platform::InputSource;
use crate::resources::input::InputState;

/// Advance the frame and poll the input collaborator.
pub fn update_input_state(input: &mut InputState, source: &mut dyn InputSource, frame: u64) {
    input.advance_frame();
    source.poll(frame, input);
}

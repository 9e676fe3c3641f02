//! Contact records produced by the move pass.
//!
//! Every move step that touches another collider yields one [`Contact`],
//! with the mover always in `a`. Both sides get their callback, the mover
//! first.
use crate::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    /// A blocking collision (`on_collision_enter`).
    Collision,
    /// A non-blocking overlap (`on_trigger_enter`).
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    pub kind: ContactKind,
}

impl Contact {
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }
}

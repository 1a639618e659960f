//! # Pause hook
//!
//! The body consults a pause hook between the phases of a step, allowing an operator to single
//! step through a gait and to cancel it. Cancellation only ever happens between phases.

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Called between step phases.
pub trait PauseHook {
    /// Decide whether to carry on. `point` names the phase which just completed.
    fn pause(&mut self, point: &str) -> PauseAction;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Hook which never pauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPause;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseAction {
    Continue,
    Cancel,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PauseHook for NoPause {
    fn pause(&mut self, _point: &str) -> PauseAction {
        PauseAction::Continue
    }
}

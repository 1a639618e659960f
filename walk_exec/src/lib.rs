//! # Walking library.
//!
//! Kinematics and gait engine for a four legged walking robot, converting walk, posture and
//! attitude commands into rate limited servo moves.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Body - owns the legs, gaits and postures and orchestrates walking
pub mod body;

/// Commands driving the body, as read from a script
pub mod cmd;

/// Gait - cyclic order in which groups of legs lift
pub mod gait;

/// Degree based 3D point and transform algebra
pub mod geometry;

/// Head - the tilting sensor mount
pub mod head;

/// Leg - single leg kinematics and step state machine
pub mod leg;

/// Motion batch - rate limited, coordinated multi-joint moves
pub mod motion;

/// Pause hook consulted between step phases
pub mod pause;

/// Posture - named sets of toe positions
pub mod posture;

/// Servo control - joint actuators on servo driver boards
pub mod servo_ctrl;

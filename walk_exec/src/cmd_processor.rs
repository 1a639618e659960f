//! # Command processor module
//!
//! The command processor executes script commands on the body.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

// Internal
use walk_lib::{
    body::{Body, BodyError},
    cmd::{Cmd, HeadTarget, ShowItem},
    geometry::Point,
    pause::{PauseAction, PauseHook},
    servo_ctrl::{ServoCtrl, ServoDriver},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pause hook asking the operator on the console whether to continue.
pub(crate) struct ConsolePause;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PauseHook for ConsolePause {
    fn pause(&mut self, point: &str) -> PauseAction {
        print!("{} done, return to continue or q to cancel: ", point);
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => PauseAction::Cancel,
            Ok(_) if line.trim() == "q" => PauseAction::Cancel,
            Ok(_) => PauseAction::Continue,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a command.
pub(crate) fn exec<D, P>(
    body: &mut Body<ServoCtrl<D>>,
    cmd: &Cmd,
    pause: &mut P,
    calib_path: &Path,
) -> Result<(), BodyError>
where
    D: ServoDriver,
    P: PauseHook,
{
    debug!("Executing {:?}", cmd);

    match cmd {
        Cmd::Walk {
            distance,
            direction,
        } => {
            body.walk(*distance, *direction, 0.0, pause)?;
        }
        Cmd::Turn {
            distance,
            angle,
            direction,
        } => {
            body.walk(*distance, *direction, *angle, pause)?;
        }
        Cmd::Height { height } => body.set_body_height(*height)?,
        Cmd::Posture { name } => body.set_named_posture(name)?,
        Cmd::Leg { leg, x, y, z } => body.set_leg_position(leg, Point::new(*x, *y, *z))?,
        Cmd::Joint { leg, joint, angle } => body.set_leg_joint(leg, *joint, *angle)?,
        Cmd::Attitude { axis, value } => body.set_attitude(*axis, value.unwrap_or(0.0))?,
        Cmd::Spread { value } => body.set_spread(*value)?,
        Cmd::Stretch { value } => body.set_stretch(*value)?,
        Cmd::Gait { name } => body.set_gait(name)?,
        Cmd::Speed { speed } => body.set_speed(*speed),
        Cmd::Wait { seconds } => thread::sleep(Duration::from_secs_f64(*seconds)),
        Cmd::Head {
            target: HeadTarget::Angle(angle),
        } => body.set_head(*angle)?,
        Cmd::Head {
            target: HeadTarget::Named(name),
        } => body.set_named_head(name)?,
        Cmd::Save => body.save_calibration(calib_path)?,
        Cmd::Show(ShowItem::Legs) => info!("{}", body.show_legs()),
        Cmd::Show(ShowItem::Attitude) => info!("{}", body.show_attitude()),
        Cmd::Show(ShowItem::Position) => info!("{}", body.show_position()),
    }

    Ok(())
}

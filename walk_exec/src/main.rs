//! # Walking Robot Executable
//!
//! Runs a script of walk, posture and attitude commands on the robot:
//!
//! ```text
//! walk_exec [--step] <script>
//! ```
//!
//! With `--step` the operator is asked to continue between every phase of every step, and can
//! cancel the current command by entering `q`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod cmd_processor;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, error, info, warn};
use std::env;

// Internal
use cmd_processor::ConsolePause;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::ScriptInterpreter,
    session::Session,
};
use walk_lib::{
    body::{Body, BodyError, BodyParams},
    cmd::Cmd,
    head::DEFAULT_HEAD_POSITION,
    pause::{NoPause, PauseHook},
    servo_ctrl::{ServoCtrl, ServoDriver},
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Collect all arguments
    let args: Vec<String> = env::args().skip(1).collect();
    let step_mode = args.iter().any(|a| a == "--step");
    let script_path = match args.iter().find(|a| !a.starts_with("--")) {
        Some(p) => p.clone(),
        None => return Err(eyre!("Usage: walk_exec [--step] <script>")),
    };

    // Initialise session
    let session = Session::new("walk_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Walking Robot Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let params: BodyParams =
        util::params::load("walk_exec.toml").wrap_err("Could not load walk_exec params")?;

    info!("Parameters loaded");

    // ---- LOAD SCRIPT ----

    let mut si: ScriptInterpreter<Cmd> =
        ScriptInterpreter::new(&script_path).wrap_err("Failed to load script")?;

    info!(
        "Loaded script \"{}\" containing {} commands\n",
        script_path,
        si.get_num_cmds()
    );

    // ---- SERVO INITIALISATION ----

    let sc = ServoCtrl::new(
        init_driver().wrap_err("Failed to initialise the servo driver")?,
        params.servo.clone(),
    );
    let calib_path = session.sw_path(&params.calibration_filename);
    let initial_posture = params.initial_posture.clone();

    let mut body = Body::new(params, sc).wrap_err("Failed to build the body")?;

    // Servos are enrolled with the body, so calibrate afterwards
    if calib_path.exists() {
        body.load_calibration(&calib_path)
            .wrap_err("Failed to load the servo calibration")?;
    }
    else {
        warn!("No calibration found at {:?}, running uncalibrated", calib_path);
    }

    body.set_named_posture(&initial_posture)
        .wrap_err("Failed to set the initial posture")?;
    body.set_named_head(DEFAULT_HEAD_POSITION)
        .wrap_err("Failed to set the initial head position")?;

    info!("Initialisation complete, running script");

    // ---- MAIN LOOP ----

    if step_mode {
        run_script(&mut body, &mut si, &mut ConsolePause, &calib_path);
    }
    else {
        run_script(&mut body, &mut si, &mut NoPause, &calib_path);
    }

    info!("{}", body.show_position());
    info!("End of script");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Execute every command in the script, reporting and skipping any that fail.
fn run_script<D, P>(
    body: &mut Body<ServoCtrl<D>>,
    si: &mut ScriptInterpreter<Cmd>,
    pause: &mut P,
    calib_path: &std::path::Path,
) where
    D: ServoDriver,
    P: PauseHook,
{
    while let Some(c) = si.next_cmd() {
        info!("Line {}: {:?}", c.line, c.cmd);

        match cmd_processor::exec(body, &c.cmd, pause, calib_path) {
            Ok(_) => (),
            Err(BodyError::CancelledByOperator) => warn!("Line {} cancelled", c.line),
            Err(e) => error!("Line {} failed: {}", c.line, e),
        }
    }
}

/// Open the PCA9685 servo board on the Pi's I2C bus.
#[cfg(target_arch = "arm")]
fn init_driver() -> Result<pwm_pca9685::Pca9685<rppal::i2c::I2c>> {
    let i2c = rppal::i2c::I2c::new().wrap_err("Failed to open the I2C bus")?;

    walk_lib::servo_ctrl::pca9685::init(i2c).wrap_err("Failed to initialise the PCA9685")
}

/// Off target there is no servo board, so run on a simulated one.
#[cfg(not(target_arch = "arm"))]
fn init_driver() -> Result<walk_lib::servo_ctrl::SimDriver> {
    warn!("Not running on the robot, using the simulated servo driver");

    Ok(walk_lib::servo_ctrl::SimDriver::default())
}

//! Main car executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the telecommand source (script or stdin) and the drivetrain
//!     - Main loop:
//!         - Telecommand acquisition
//!         - Control cycle (odometry, events, navigation, locomotion control)
//!         - Archiving
//!         - Cycle management
//!
//! The executable drives the simulated drivetrain. Hardware builds construct the
//! `RobotController` with their own `MotorDriver` (such as the L298N driver) and `Encoder`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::{
    path::PathBuf,
    thread,
    time::Instant,
};
use structopt::StructOpt;

// Internal
use car_lib::{
    controller::{ControllerParams, RobotController},
    eqpt::sim::{SimDrivetrain, SimParams},
    nav::NavState,
    params::CarExecParams,
    tc_source::{LineSource, ScriptSource, TcPoll, TcSource},
    wp_store::FileWaypointStore,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    params::{self, LoadError},
    script_interpreter::ScriptInterpreter,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pico car control executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "car_exec")]
struct Opts {
    /// Script of timed requests to replay. Requests are read from stdin if no script is given.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Log at trace level rather than info.
    #[structopt(short, long)]
    verbose: bool,

    /// Do not write CSV archives into the session directory.
    #[structopt(long)]
    no_archive: bool,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("car_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let log_level = if opts.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Pico Car Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let exec_params: CarExecParams =
        load_or_default("car_exec.toml").wrap_err("Could not load exec params")?;
    let cycle_period = exec_params
        .cycle_period()
        .wrap_err("Invalid exec params")?;
    let ctrl_params = ControllerParams {
        loc: load_or_default("loc.toml").wrap_err("Could not load loc params")?,
        loco_ctrl: load_or_default("loco_ctrl.toml")
            .wrap_err("Could not load loco_ctrl params")?,
        nav: load_or_default("nav.toml").wrap_err("Could not load nav params")?,
        manual_timeout_cycles: exec_params.manual_timeout_cycles,
    };

    info!("Parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let mut tc_source = match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            TcSource::Script(ScriptSource::new(si))
        }
        None => {
            info!("No script provided, requests will be read from stdin\n");
            TcSource::Lines(LineSource::stdin())
        }
    };

    // ---- INITIALISE CONTROLLER ----

    info!("Initialising modules...");

    let sim = SimDrivetrain::new(SimParams {
        step_s: exec_params.cycle_period_s,
        ..exec_params.sim
    });

    let wp_path = params::get_sw_root()
        .wrap_err("Could not find the software root")?
        .join(&exec_params.waypoint_file);
    info!("Waypoint file: {:?}", wp_path);

    let mut ctrl = RobotController::new(
        ctrl_params,
        sim.clone(),
        sim,
        FileWaypointStore::new(wp_path),
    );

    if !opts.no_archive {
        ctrl.init_archives(&session)
            .wrap_err("Failed to initialise the archives")?;
        info!("Archives initialised");
    }

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut end_of_input = false;
    let mut num_consec_cycle_overruns: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- TELECOMMAND PROCESSING ----

        if !end_of_input {
            match tc_source.poll() {
                TcPoll::None => (),
                TcPoll::Some(tc) => ctrl.handle_tc(tc),
                TcPoll::EndOfInput => {
                    info!("End of input, running until the car is idle");
                    end_of_input = true;
                }
            }
        }

        // ---- CONTROL CYCLE ----

        let report = ctrl.cycle();

        // ---- WRITE ARCHIVES ----

        if !opts.no_archive {
            if let Err(e) = ctrl.write() {
                warn!("Archive error: {}", e);
            }
        }

        if end_of_input && report.nav_state == NavState::Idle {
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    ctrl.stop();

    info!(
        "Final pose: ({:.3}, {:.3}) m, {:.3} rad after {} cycles",
        ctrl.pose().x(),
        ctrl.pose().y(),
        ctrl.pose().heading_rad,
        ctrl.num_cycles()
    );
    info!("End of execution");

    Ok(())
}

/// Load a parameter file, falling back to the built in defaults if the file does not exist.
fn load_or_default<P>(file: &str) -> Result<P, LoadError>
where
    P: serde::de::DeserializeOwned + Default,
{
    match params::load(file) {
        Err(LoadError::FileLoadError(path, e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No parameter file at {:?}, using defaults", path);
            Ok(P::default())
        }
        r => r,
    }
}

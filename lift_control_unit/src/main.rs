//! # Router Lift Control Unit
//!
//! Runs the axis controller against the simulated lift from `lift_hal`:
//! loads `lift.toml`, optionally performs RT setup, homes the axis and
//! executes the requested operation, then prints the final axis snapshot.

use clap::{Parser, Subcommand, ValueEnum};
use lift_common::config::{LiftConfig, LogLevel};
use lift_control_unit::command::{AxisCommand, CommandOutcome};
use lift_control_unit::controller::AxisController;
use lift_control_unit::cycle::{CycleRunner, rt_setup};
use lift_hal::{SimInput, SimStepper, SimSwitches, SimulatedLift, SwitchFault};
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type SimRunner = CycleRunner<SimStepper, SimSwitches>;

/// Router lift control unit (simulated hardware)
#[derive(Parser, Debug)]
#[command(name = "lift_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Homing, probing and positioning for a single-axis router lift")]
struct Args {
    /// Path to the lift configuration TOML.
    #[arg(short, long, default_value = "config/lift.toml")]
    config: PathBuf,

    /// Pace cycles in wall time and perform RT setup.
    #[arg(long)]
    realtime: bool,

    /// CPU core to pin the control thread to (with --realtime).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (with --realtime).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Upper bound on cycles per operation.
    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,

    /// Force a simulated input to never close.
    #[arg(long, value_enum, value_name = "INPUT")]
    stuck_open: Vec<InputArg>,

    /// Force a simulated input to always read closed.
    #[arg(long, value_enum, value_name = "INPUT")]
    stuck_closed: Vec<InputArg>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs and the final snapshot as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Operation,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Operation {
    /// Home against the minimum endstop.
    Home,
    /// Home, then probe the workpiece surface.
    Probe,
    /// Home, then move to a position.
    Move {
        /// Target [mm], work coordinates unless --absolute.
        #[arg(allow_hyphen_values = true)]
        mm: f64,
        /// Interpret the target in machine coordinates.
        #[arg(long)]
        absolute: bool,
    },
    /// Home, then move to the upper travel bound.
    Max,
    /// Home, then move to the lower travel bound.
    Min,
    /// Home, probe, retract to the lower bound and return to the surface.
    Workpiece,
    /// Home, probe and raise the bit to a cutting height above the surface.
    Demo {
        /// Height above the workpiece [mm].
        #[arg(default_value_t = 10.0)]
        height: f64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum InputArg {
    EndstopMin,
    EndstopMax,
    Probe,
}

impl From<InputArg> for SimInput {
    fn from(arg: InputArg) -> Self {
        match arg {
            InputArg::EndstopMin => SimInput::EndstopMin,
            InputArg::EndstopMax => SimInput::EndstopMax,
            InputArg::Probe => SimInput::Probe,
        }
    }
}

fn main() {
    let args = Args::parse();
    let config = LiftConfig::load_validated(&args.config);

    let level = match &config {
        _ if args.verbose => LogLevel::Debug,
        Ok(config) => config.shared.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_tracing(level, args.json);

    info!("Router lift control unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| -> Box<dyn Error> { e.into() })
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Router lift control unit shutdown complete");
}

fn run(args: &Args, config: LiftConfig) -> Result<(), Box<dyn Error>> {
    info!(
        "Config OK: service={}, cycle_time={}µs, travel {}..{} mm",
        config.shared.service_name,
        config.cycle.cycle_time_us,
        config.axis.min_position,
        config.axis.max_position,
    );

    if args.realtime {
        rt_setup(args.cpu_core, args.rt_priority)?;
    }

    let (stepper, switches, sim) = SimulatedLift::build(&config);
    for &input in &args.stuck_open {
        sim.inject(input.into(), SwitchFault::StuckOpen);
    }
    for &input in &args.stuck_closed {
        sim.inject(input.into(), SwitchFault::StuckClosed);
    }

    let controller = AxisController::new(&config.axis, stepper, switches)?;
    let mut runner = CycleRunner::new(controller, &config.cycle).paced(args.realtime);

    let stop = runner.stop_handle();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        stop.store(true, Ordering::SeqCst);
    })?;

    let result = operate(&mut runner, args.command, args.max_cycles);

    let stats = runner.stats();
    info!(
        "{} cycles, avg {}ns, max {}ns, {} overruns; carriage at {:.3} mm",
        stats.cycle_count,
        stats.avg_cycle_ns(),
        stats.max_cycle_ns,
        stats.overruns,
        sim.carriage_mm()
    );
    if runner.controller().motion().lost_steps() > 0 {
        warn!(
            "Simulated carriage lost {} steps against a hard stop",
            runner.controller().motion().lost_steps()
        );
    }
    report(runner.controller(), args.json)?;
    result
}

fn operate(runner: &mut SimRunner, operation: Operation, max_cycles: u64) -> Result<(), Box<dyn Error>> {
    home(runner, max_cycles)?;
    match operation {
        Operation::Home => Ok(()),
        Operation::Probe => probe(runner, max_cycles),
        Operation::Move { mm, absolute } => {
            if absolute {
                accept(
                    runner
                        .controller_mut()
                        .execute(AxisCommand::SetAbsoluteTarget(mm)),
                )?;
                travel(runner, AxisCommand::MoveToTarget, max_cycles)
            } else {
                travel(runner, AxisCommand::MoveToPosition(mm), max_cycles)
            }
        }
        Operation::Max => travel(runner, AxisCommand::MoveToMax, max_cycles),
        Operation::Min => travel(runner, AxisCommand::MoveToMin, max_cycles),
        Operation::Workpiece => {
            probe(runner, max_cycles)?;
            travel(runner, AxisCommand::MoveToMin, max_cycles)?;
            travel(runner, AxisCommand::MoveToWorkpiece, max_cycles)
        }
        Operation::Demo { height } => {
            probe(runner, max_cycles)?;
            travel(runner, AxisCommand::MoveToPosition(height), max_cycles)
        }
    }
}

fn home(runner: &mut SimRunner, max_cycles: u64) -> Result<(), Box<dyn Error>> {
    runner.controller_mut().execute(AxisCommand::Home);
    let cycles = runner.run_until(|c| !c.homing_state().is_active(), max_cycles)?;
    if let Some(reason) = runner.controller().homing_fault() {
        return Err(format!("homing failed after {cycles} cycles: {reason}").into());
    }
    info!("Homed in {cycles} cycles");
    Ok(())
}

fn probe(runner: &mut SimRunner, max_cycles: u64) -> Result<(), Box<dyn Error>> {
    accept(runner.controller_mut().execute(AxisCommand::Probe))?;
    let cycles = runner.run_until(|c| !c.probing_state().is_active(), max_cycles)?;
    if let Some(reason) = runner.controller().probing_fault() {
        return Err(format!("probing failed after {cycles} cycles: {reason}").into());
    }
    info!(
        "Probed in {cycles} cycles, work offset {:.3} mm",
        runner.controller().work_offset_mm()
    );
    Ok(())
}

fn travel(runner: &mut SimRunner, command: AxisCommand, max_cycles: u64) -> Result<(), Box<dyn Error>> {
    accept(runner.controller_mut().execute(command))?;
    // A hold from the previous move must be re-evaluated before checking it.
    runner.run_cycle();
    let cycles = 1 + runner.run_until(
        |c| c.in_position() || !c.last_permit().is_advance(),
        max_cycles,
    )?;
    let permit = runner.controller().last_permit();
    if !permit.is_advance() {
        warn!("Motion held by interlock after {cycles} cycles: {permit:?}");
    } else {
        info!(
            "In position after {cycles} cycles at {:.3} mm",
            runner.controller().current_position_mm()
        );
    }
    Ok(())
}

fn accept(outcome: CommandOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        CommandOutcome::Accepted => Ok(()),
        CommandOutcome::Dropped(reason) => Err(format!("command dropped: {reason}").into()),
    }
}

fn report(controller: &AxisController<SimStepper, SimSwitches>, json: bool) -> Result<(), Box<dyn Error>> {
    let snap = controller.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }
    println!("State:       {}", snap.state);
    println!("Homing:      {}", snap.homing);
    println!("Probing:     {}", snap.probing);
    println!("Position:    {:.3} mm (machine {:.3} mm)", snap.position_mm, snap.machine_position_mm);
    println!("Target:      {:.3} mm", snap.target_mm);
    println!("Work offset: {:.3} mm", snap.work_offset_mm);
    if snap.error {
        println!("Faults:      {:?}", snap.faults);
    }
    Ok(())
}

/// Setup tracing subscriber; `RUST_LOG` overrides the configured level.
fn setup_tracing(level: LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

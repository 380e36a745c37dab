//! YantraLink - Controller daemon for a teleoperated mapping robot
//!
//! ## Protocol Architecture
//!
//! - **UDP (port 51399)**: Robot announces itself; the first datagram's
//!   sender address is taken as the robot's IP
//! - **TCP (port 51399)**: Framed bidirectional link carrying map
//!   records, camera frames and drive instructions
//!
//! The daemon waits for a robot announcement, connects, activates a
//! teleoperation session and keeps the live map current until the link
//! drops, then goes back to waiting. `--demo` runs the same pipeline
//! against a built-in simulator instead of hardware.

mod config;
mod core;
mod dispatch;
mod error;
mod link;
mod map;
mod motion;
mod render;
mod session;
mod sim;

use crate::config::AppConfig;
use crate::dispatch::{dispatch, RobotEvent};
use crate::error::Result;
use crate::link::{Connection, Tag};
use crate::motion::{InputSample, Instruction, InstructionGenerator, PoseEstimator};
use crate::session::{ControlCommand, ControllerSession, SessionMode};
use crate::sim::{MapSynthesizer, ScriptedDrive};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Control tick period (~60 Hz).
const TICK: Duration = Duration::from_millis(16);

struct CliArgs {
    config_path: Option<String>,
    demo: bool,
}

/// Parse command line arguments.
///
/// Supports:
/// - `yantra-link <path>` (positional config path)
/// - `yantra-link --config <path>` (flag-based)
/// - `yantra-link -c <path>` (short flag)
/// - `yantra-link --demo` (simulator instead of hardware)
fn parse_args() -> CliArgs {
    let args: Vec<String> = env::args().collect();
    let mut parsed = CliArgs {
        config_path: None,
        demo: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                parsed.config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--demo" => parsed.demo = true,
            other if !other.starts_with('-') && parsed.config_path.is_none() => {
                parsed.config_path = Some(other.to_string());
            }
            other => log::warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }
    parsed
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("YantraLink v0.2.0 starting...");

    let args = parse_args();
    let config = match &args.config_path {
        Some(path) => {
            log::info!("Using config: {}", path);
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| error::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    if args.demo {
        run_demo(&config, &running)
    } else {
        run_live(&config, &running)
    }
}

/// Discover, connect, run a session, repeat until shutdown.
fn run_live(config: &AppConfig, running: &AtomicBool) -> Result<()> {
    let port = config.network.port;
    let discovered = link::discovery::spawn(port);

    while running.load(Ordering::Relaxed) {
        let ip = match discovered.recv_timeout(Duration::from_millis(200)) {
            Ok(ip) => ip,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        };

        log::info!("Robot announced at {}", ip);
        let mut connection = match Connection::connect(ip, port) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Connect to {} failed: {}", ip, e);
                continue;
            }
        };
        let events = connection.start_receive()?;
        log::debug!("Link state: {:?}", connection.state());

        let mut session = ControllerSession::new(config);
        session.activate(SessionMode::Controlled, config.control.precision);
        connection.send_text(
            Tag::INSTRUCTION,
            &ControlCommand::Controlled {
                precision: config.control.precision,
            }
            .to_string(),
        );

        let mut generator =
            InstructionGenerator::new(config.control, config.robot);
        // Headless operation has no live input; an idle sample in the
        // configured modality keeps the generator ticking so the robot
        // still receives heartbeats.
        let idle = match config.control.mode {
            config::InputMode::Joystick => InputSample::Joystick {
                angle: 0.0,
                magnitude: 0.0,
            },
            config::InputMode::Cursors => InputSample::Cursors {
                forward: 0.0,
                steer: 0.0,
            },
            config::InputMode::Keyboard => InputSample::Keys,
        };
        let mut last_tick = Instant::now();
        let mut connected = true;

        while connected && running.load(Ordering::Relaxed) {
            for event in events.try_iter() {
                if let Some(robot_event) = dispatch(event) {
                    if !session.handle_event(robot_event) {
                        connected = false;
                    }
                }
            }
            if !connected {
                break;
            }

            let now = Instant::now();
            let dt = now.duration_since(last_tick).as_secs_f32();
            last_tick = now;

            if let Some(instruction) = generator.tick(&idle, dt) {
                connection.send_text(Tag::INSTRUCTION, &instruction.to_string());
                session.predict(&instruction, dt);
            }

            let canvas = session.render();
            log::trace!(
                "Map frame ready ({}x{} px, robot at {:?})",
                canvas.resolution(),
                canvas.resolution(),
                session.robot_pixel()
            );

            thread::sleep(TICK);
        }

        connection.send_text(Tag::INSTRUCTION, &ControlCommand::End.to_string());
        connection.stop();
        log::info!("Session ended, waiting for next announcement");
    }

    Ok(())
}

/// Run the pipeline against the built-in simulator.
fn run_demo(config: &AppConfig, running: &AtomicBool) -> Result<()> {
    log::info!("Demo mode: simulated robot, no network");

    let mut session = ControllerSession::new(config);
    session.activate(SessionMode::Controlled, config.control.precision);

    let mut drive = ScriptedDrive::demo_loop(config.control.speed);
    let mut synth = MapSynthesizer::new(config.control.precision);
    let mut truth = PoseEstimator::new(config.robot);
    truth.restart();
    let mut rng = rand::thread_rng();

    let dt = TICK.as_secs_f32();
    while running.load(Ordering::Relaxed) {
        let instruction = match drive.progress(dt) {
            Some(i) => i,
            None => break,
        };
        if instruction != Instruction::Nothing {
            truth.apply(&instruction, dt);
        }

        let sensor = truth.sensor_pose();
        synth.observe(sensor.x, sensor.y, &mut rng);
        let text = synth.record_text(sensor.x, sensor.y, sensor.theta)?;
        session.handle_event(RobotEvent::MapUpdate(text));

        let canvas = session.render();
        log::debug!(
            "Simulated pose ({:.1}, {:.1}) grid {}x{} canvas {} px",
            sensor.x,
            sensor.y,
            synth.grid().rows(),
            synth.grid().cols(),
            canvas.resolution()
        );

        thread::sleep(TICK);
    }

    log::info!("Demo finished");
    Ok(())
}

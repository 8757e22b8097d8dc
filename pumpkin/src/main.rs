//! # Pumpkin Binary
//!
//! Drives the eyes of an animated pumpkin through a PCA9685 PWM board.
//!
//! # Usage
//!
//! ```bash
//! # List routines and drivers
//! pumpkin list
//!
//! # Play the configured show without hardware
//! pumpkin --config config/pumpkin.toml --simulate show
//!
//! # Run two routines on the real board, verbose
//! pumpkin -c config/pumpkin.toml -v run look_left look_right
//!
//! # Point two eyes straight ahead
//! pumpkin -c config/pumpkin.toml set 90 --eye top_1 --eye top_2
//!
//! # Bench test a freshly wired servo
//! pumpkin -c config/pumpkin.toml sweep --channel 9
//! ```

use clap::{Parser, Subcommand};
use pumpkin::group::DEFAULT_GROUP_DELAY;
use pumpkin::servo::DEFAULT_DELAY;
use pumpkin::{Pumpkin, PwmBus, Routine, SystemClock};
use pumpkin_common::consts::DEFAULT_CONFIG_PATH;
use pumpkin_common::prelude::{ConfigLoader, LogLevel, PumpkinConfig, PwmDriver};
use pumpkin_hal::DriverRegistry;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

type Rig = Pumpkin<Box<dyn PwmDriver>, SystemClock>;

/// Pumpkin - servo choreography for animated pumpkin eyes
#[derive(Parser, Debug)]
#[command(name = "pumpkin")]
#[command(version)]
#[command(about = "Servo choreography for animated pumpkin eyes")]
#[command(long_about = None)]
struct Args {
    /// Path to the rig configuration
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Force the simulation driver (no hardware access)
    #[arg(short = 's', long)]
    simulate: bool,

    /// Driver to use instead of `[pwm] driver`
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List routines and registered drivers
    List,

    /// Run routines in order
    Run {
        /// Routine names
        #[arg(required = true)]
        routines: Vec<String>,
    },

    /// Play the configured show
    Show,

    /// Set eyes (all when none named) or a group to an angle
    Set {
        /// Target angle in degrees
        angle: f64,

        /// Eye name (repeatable)
        #[arg(short, long = "eye", conflicts_with = "group")]
        eyes: Vec<String>,

        /// Configured group name
        #[arg(short, long)]
        group: Option<String>,

        /// Hold after the move, in seconds [default: 0.3 for eyes, 1 for a group]
        #[arg(long)]
        delay: Option<f64>,
    },

    /// Step one raw channel through its full travel
    Sweep {
        /// PWM channel (0-15)
        #[arg(long)]
        channel: u8,

        /// Hold per degree, in seconds
        #[arg(long, default_value_t = 0.02)]
        step_delay: f64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Pumpkin failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let loaded = PumpkinConfig::load(&args.config);

    setup_tracing(&args, loaded.as_ref().ok().map(|c| c.shared.log_level));

    info!("Pumpkin v{} starting...", env!("CARGO_PKG_VERSION"));

    let registry = DriverRegistry::builtin()?;
    if let Command::List = args.command {
        print_catalogue(&registry);
        return Ok(());
    }

    let config = loaded.map_err(|e| format!("{}: {e}", args.config.display()))?;
    config.validate()?;
    info!(
        "Loaded '{}' from {} ({} eyes)",
        config.shared.service_name,
        args.config.display(),
        config.eyes.len()
    );

    let driver = registry.select(args.simulate, args.driver.as_deref(), &config.pwm.driver)?;
    let bus = PwmBus::open(driver, SystemClock::new(), &config.pwm)?;
    let mut pumpkin = Pumpkin::from_config(&config, bus)?;

    let result = execute(&mut pumpkin, &args.command, &config);

    if let Err(e) = pumpkin.shutdown() {
        warn!("Driver shutdown failed: {e}");
    }
    result?;

    info!("Pumpkin shutdown complete");
    Ok(())
}

fn execute(
    pumpkin: &mut Rig,
    command: &Command,
    config: &PumpkinConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::List => {}
        Command::Run { routines } => {
            let routines = routines
                .iter()
                .map(|name| name.parse::<Routine>())
                .collect::<Result<Vec<_>, _>>()?;
            for routine in routines {
                pumpkin.perform(routine)?;
            }
        }
        Command::Show => pumpkin.play(&config.show)?,
        Command::Set {
            angle,
            eyes,
            group,
            delay,
        } => {
            let delay = set_delay(*delay, group.is_some())?;
            match group {
                Some(group) => pumpkin.set_group(group, *angle, delay)?,
                None => pumpkin.set_eyes(eyes, *angle, delay)?,
            }
        }
        Command::Sweep {
            channel,
            step_delay,
        } => pumpkin.sweep(*channel, seconds("step-delay", *step_delay)?)?,
    }
    Ok(())
}

/// Hold for `set`: the flag when given, else the eye or group default.
fn set_delay(delay: Option<f64>, group: bool) -> Result<Duration, String> {
    match (delay, group) {
        (Some(secs), _) => seconds("delay", secs),
        (None, true) => Ok(DEFAULT_GROUP_DELAY),
        (None, false) => Ok(DEFAULT_DELAY),
    }
}

fn seconds(flag: &str, value: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| format!("--{flag} must be a non-negative number of seconds"))
}

fn print_catalogue(registry: &DriverRegistry) {
    println!("Routines:");
    for routine in Routine::ALL {
        let bound = if routine.is_time_bounded() { " (timed)" } else { "" };
        println!("  {:<14} {}{}", routine.name(), routine.summary(), bound);
    }
    println!("Drivers:");
    for driver in registry.list_drivers() {
        println!("  {:<14} v{}", driver.name, driver.version);
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: Option<LogLevel>) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.map(Level::from).unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

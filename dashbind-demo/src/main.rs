use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use dashbind::prelude::*;

mod robot;
use robot::Robot;

/// Binds a simulated robot to an in-memory dashboard bus and drives it for a
/// fixed number of ticks
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// YAML dashboard config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of update ticks to run
    #[arg(short, long, default_value_t = 50)]
    ticks: u64,

    /// Print the latest value of every topic as JSON when done
    #[arg(long)]
    dump: bool,

    /// Write preference edits back to disk when done
    #[arg(long)]
    save: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DashboardConfig::load(path).unwrap_or_else(|err| {
            eprintln!("{}", err);
            std::process::exit(1);
        }),
        None => DashboardConfig::default(),
    };

    init_logger(&config.log_filter);
    debug!("{:?}", config);

    let store = load_preferences(&config).shared();
    let robot = Robot::new(&store);

    let bus = LocalBus::new();
    let binder = Binder::new(Rc::new(bus.clone()), config.root_path())
        .with_queue_depth(config.queue_depth);
    let mut registry = TabRegistry::new();
    robot.bind(&binder, &mut registry);
    info!("registered tabs {:?}", registry);

    if let Err(err) = registry.enable_all() {
        error!("failed to enable dashboard: {}", err);
        std::process::exit(1);
    }

    let mut driver = PeriodicDriver::new(config.tick_period());
    let dt = config.tick_period().as_secs_f64();
    let path = |name: &str| binder.path(name);

    for tick in 0..args.ticks {
        simulate_dashboard(&bus, &path, tick, args.ticks);
        if driver.run_for(&mut registry, 1) == 0 {
            break;
        }
        robot.drivetrain.borrow_mut().step(dt);
    }

    info!(
        "ran {} ticks at {:.1} Hz; {} overruns",
        driver.clock().tick_count(),
        driver.clock().average_rate(),
        driver.overruns()
    );

    if let Err(err) = registry.disable_all() {
        warn!("disable failed: {}", err);
    }
    registry.close_all();

    if args.save {
        if let Err(err) = store.borrow_mut().save() {
            error!("failed to save preferences: {}", err);
        }
    }

    if args.dump {
        match serde_json::to_string_pretty(&bus.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(err) => error!("failed to serialize snapshot: {}", err),
        }
    }
}

fn load_preferences(config: &DashboardConfig) -> PreferenceStore {
    let Some(path) = config
        .preferences_path
        .clone()
        .or_else(PreferenceStore::default_path)
    else {
        warn!("no preferences location available; preferences are not saved");
        return PreferenceStore::new();
    };

    PreferenceStore::load_if_exists(&path).unwrap_or_else(|err| {
        warn!("ignoring preferences at {}: {}", path.display(), err);
        let mut store = PreferenceStore::new();
        store.set_path(path);
        store
    })
}

/// Plays the operator: enables the robot a quarter of the way in, switches
/// drive mode halfway, and moves the arm.
fn simulate_dashboard(
    bus: &LocalBus,
    path: &dyn Fn(&str) -> TopicPath,
    tick: u64,
    total: u64,
) {
    let drive = path("Drive");
    let arm = path("Arm").join("Arm");
    let prefs = path("Preferences");

    if tick == total / 4 {
        bus.set_remote(drive.join("Enabled"), Value::Boolean(true));
        bus.set_remote(arm.join("Target"), Value::Double(45.0));
    }
    if tick == total / 2 {
        let mode = drive.join("Mode");
        bus.set_remote(mode.join("selected"), Value::from("Tank"));
        bus.set_remote(prefs.join("Arm PID").join("p"), Value::Double(0.35));
    }
    if tick == total * 3 / 4 {
        bus.set_remote(arm.join("Brake"), Value::Boolean(true));
    }
}

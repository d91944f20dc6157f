/* 3rd party libraries */
use clap::{Arg, Command as Cli};
use crossbeam_channel as cbc;
use log::info;
use std::fs::File;
use std::io::{self, BufReader};
use std::thread::Builder;

/* Custom libraries */
use dispatcher::{ChannelSink, Dispatcher};
use fleet::Fleet;
use shared::{Command, StateUpdate};
use simulator::Simulator;

/* Modules */
mod config;
mod dispatcher;
mod fleet;
mod replay;
mod shared;
mod simulator;

/* Main */
fn main() {
    let args = Cli::new("dispatcher")
        .about("SCAN dispatch scheduler for a bank of elevators")
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("no-gate")
                .long("no-gate")
                .help("Dispatch immediately instead of waiting for the initial snapshot"),
        )
        .arg(
            Arg::new("replay")
                .long("replay")
                .takes_value(true)
                .help("Replay state updates from a JSON lines file instead of simulating"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .takes_value(true)
                .help("Log filter, overrides RUST_LOG"),
        )
        .get_matches();

    // Initialize logging
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = args.value_of("log-level") {
        logger.parse_filters(level);
    }
    logger.init();

    // Load the configuration
    let config_path = args.value_of("config").unwrap_or("config.toml");
    let config = unwrap_or_exit!(config::load_config(config_path), "Failed to load configuration");
    let readiness_gate = config.dispatcher.readiness_gate && !args.is_present("no-gate");
    let n_floors = config.dispatcher.n_floors;
    let n_cars = config.dispatcher.n_cars;
    let services_floor = config.services_matrix();

    // Replay mode runs the dispatcher synchronously on this thread
    if let Some(path) = args.value_of("replay") {
        let file = unwrap_or_exit!(File::open(path), "Failed to open replay file");
        let fleet = Fleet::new(n_floors, services_floor);
        let stdout = io::stdout();
        let mut output = stdout.lock();
        let summary = unwrap_or_exit!(
            replay::replay(BufReader::new(file), &mut output, fleet, readiness_gate),
            "Replay failed"
        );
        if summary.rejected > 0 {
            std::process::exit(2);
        }
        return;
    }

    // Initialize channels
    let (command_tx, command_rx) = cbc::unbounded::<Command>();
    let (state_update_tx, state_update_rx) = cbc::unbounded::<StateUpdate>();
    let (dispatcher_terminate_tx, dispatcher_terminate_rx) = cbc::unbounded::<()>();

    // Start the dispatcher
    let mut dispatcher = Dispatcher::new(
        Fleet::new(n_floors, services_floor.clone()),
        readiness_gate,
        ChannelSink::new(n_cars, n_floors, command_tx),
    );
    let change_rx = dispatcher.subscribe();

    let dispatcher_thread = Builder::new().name("dispatcher".into());
    let dispatcher_handle = unwrap_or_exit!(
        dispatcher_thread.spawn(move || dispatcher.run(state_update_rx, dispatcher_terminate_rx)),
        "Failed to start dispatcher thread"
    );

    // Trace every state change at debug level
    let monitor_thread = Builder::new().name("monitor".into());
    unwrap_or_exit!(
        monitor_thread.spawn(move || {
            for change in change_rx.iter() {
                log::debug!("{} {} -> {:?}", change.source, change.property(), change.field);
            }
        }),
        "Failed to start monitor thread"
    );

    // Start the simulator
    let simulator = Simulator::new(
        &config.simulator,
        n_floors,
        services_floor,
        command_rx,
        state_update_tx,
    );
    let simulator_thread = Builder::new().name("simulator".into());
    let simulator_handle = unwrap_or_exit!(
        simulator_thread.spawn(move || simulator.run()),
        "Failed to start simulator thread"
    );

    let report = match simulator_handle.join() {
        Ok(report) => report,
        Err(_) => {
            log::error!("Simulator thread panicked");
            std::process::exit(1);
        }
    };

    let _ = dispatcher_terminate_tx.send(());
    if dispatcher_handle.join().is_err() {
        log::error!("Dispatcher thread panicked");
        std::process::exit(1);
    }

    info!(
        "Done: {} calls made, {} still pending after {} ticks",
        report.calls_made, report.pending_calls, report.ticks
    );
}

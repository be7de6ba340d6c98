use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use sysinfo::System;

use candy_bucket::devices::{CounterFileSampler, RodioSpeaker, SnapshotCamera, StripSimulator};
use candy_bucket::{AppResult, Config, Devices, PipelineSettings, PropEvent, Supervisor};

const LOG_TARGET_STARTUP: &str = "candy_bucket::startup";

/// Initialize tracing with file rotation
///
/// Logs are written to:
/// - Linux: ~/.config/CandyBucket/logs/
/// - macOS: ~/Library/Application Support/CandyBucket/logs/
///
/// Log output:
/// - Debug builds: Console + File
/// - Release builds: File only
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("CandyBucket").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "candy-bucket.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry().with(filter).with(file_layer).init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let host = System::host_name().unwrap_or_else(|| "unknown".to_string());

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting Candy Bucket v{} on ({})", version, std::env::consts::ARCH);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
    tracing::info!(target: LOG_TARGET_STARTUP, "Host: {}", host);
}

/// `--config <path>`, or the default location when absent
fn config_path_from_args() -> AppResult<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    let mut path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().context("--config needs a path")?;
                path = Some(PathBuf::from(value));
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }

    Ok(path)
}

fn load_config() -> AppResult<Config> {
    let config = match config_path_from_args()? {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Err(errors) = config.validate() {
        for error in &errors {
            tracing::error!("Config: {}", error);
        }
        anyhow::bail!("Configuration has {} invalid value(s)", errors.len());
    }

    Ok(config)
}

fn build_devices(config: &Config) -> Devices {
    let sensor = Arc::new(CounterFileSampler::new(&config.motion_counter_path));
    let lights = Arc::new(StripSimulator::new(config.light_count, config.light_frame_interval()));
    let speaker = Arc::new(RodioSpeaker::new());

    let devices = Devices::new(sensor, lights, speaker);
    match &config.camera_snapshot_path {
        Some(path) => {
            tracing::info!("Camera snapshots from {}", path);
            devices.with_camera(Arc::new(SnapshotCamera::new(path)))
        }
        None => devices,
    }
}

fn run() -> AppResult<()> {
    let config = load_config()?;
    let base_dir = Config::base_dir().context("Failed to locate application directory")?;

    let mut settings = PipelineSettings::from(&config);
    settings.profiles = config.resolved_profiles(&base_dir);

    let supervisor = Supervisor::new(build_devices(&config), settings);

    let stop = supervisor.stop_handle();
    ctrlc::set_handler(move || stop.request_stop()).context("Error setting Ctrl-C handler")?;

    // Mirror lifecycle notifications into the log
    let (events, _id) = supervisor.bus().subscribe();
    std::thread::Builder::new()
        .name("event-log".to_string())
        .spawn(move || {
            for event in events.iter() {
                match event {
                    PropEvent::Fatal { .. } | PropEvent::EventDropped { .. } => {
                        tracing::warn!("{}", event.description())
                    }
                    PropEvent::StateChanged { new_state, .. } if new_state.is_stopped() => {
                        tracing::info!("{}", event.description())
                    }
                    _ => tracing::debug!("{}", event.description()),
                }
            }
        })
        .context("Failed to spawn event log thread")?;

    supervisor.run().context("Candy bucket stopped with an error")?;
    Ok(())
}

fn main() -> ExitCode {
    initialize_tracing();
    log_runtime_environment();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

//! Argus demo: synthetic frames through the barcode-scanning stage.

use std::thread;

use argus::engine::pattern::PatternEngine;
use argus::testsrc::TestSource;
use argus::{ScanConfig, ScanOutput, Scanner};
use color_eyre::Result;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter("argus=debug")
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("Argus launching...");

    let config = load_config()?;
    info!("Scan config: {:?}", config);

    let (mut scanner, events) = Scanner::new(PatternEngine, config)?;
    scanner.start()?;

    // Print events until the scanner requests end-of-stream or goes away
    let printer = thread::spawn(move || {
        for output in events.iter() {
            match output {
                ScanOutput::Symbol(event) => info!("{event}"),
                ScanOutput::EndOfStream => {
                    info!("end-of-stream requested");
                    break;
                }
            }
        }
    });

    // Feed ten seconds of synthetic video, planting a symbol twice a second
    // and alternating payloads so the duplicate filter has something to do.
    let mut source = TestSource::new(640, 480, 30);
    for i in 0..300u32 {
        let frame = match i % 15 {
            0 if i % 30 == 0 => source.next_frame_with_symbol(b"HELLO"),
            0 => source.next_frame_with_symbol(b"WORLD"),
            _ => source.next_frame(),
        };
        if let Err(error) = scanner.on_frame(&frame) {
            warn!("frame {} rejected: {error}", frame.meta.sequence);
            break;
        }
        thread::sleep(source.frame_interval());
    }

    scanner.stop();
    let stats = scanner.stats();
    info!(
        "done: {} frames in, {} queued, {} dropped, {} decode attempts, {} symbols",
        stats.frames_in, stats.admitted, stats.dropped, stats.decode_attempts, stats.symbols
    );

    drop(scanner);
    let _ = printer.join();
    Ok(())
}

/// Defaults merged with an optional `argus.toml` and `ARGUS_*` environment
/// overrides.
fn load_config() -> Result<ScanConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("argus").required(false))
        .add_source(config::Environment::with_prefix("ARGUS"))
        .build()?;
    Ok(settings.try_deserialize()?)
}

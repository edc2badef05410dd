//! Reading an Emulated Serial Gauge
//!
//! Drives a V1 gauge emulator through the blocking adapter and the async
//! controller, the same path a real RS485 link takes.
//!
//! ## What You'll Learn
//!
//! - Wiring a serial link, frame codec and profile into a controller
//! - How transient link errors are retried and how faults surface
//! - Changing the output unit between reads
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run -p vacuum-gauge --example emulated_gauge
//! ```

use std::time::Duration;

use vacuum_gauge::{Blocking, ConfigUpdate, GaugeController};
use vacuum_gauge_core::{
    presets, FaultTable, GaugeType, PressureUnit, ReadingSettings, RetryPolicy, SerialTransport,
    SystemTime, TransportError,
};
use vacuum_gauge_protocols::{Address, V1Codec, V1Emulator};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Emulated V1 Gauge ===\n");

    let address = Address::new(1)?;
    let mut gauge = V1Emulator::new(address);
    gauge.set_pressure(2.5e-2)?;
    // Two dropped replies before the gauge answers
    gauge.inject(TransportError::Timeout);
    gauge.inject(TransportError::Timeout);

    let profile = presets::serial_direct(
        GaugeType::Pirani,
        PressureUnit::Millibar,
        5e-4,
        1000.0,
        FaultTable::new(),
    )?;
    let settings = ReadingSettings::new(profile, PressureUnit::Millibar, 1.0);
    let retry = RetryPolicy::new(3, Duration::from_millis(20), 2.0)
        .with_jitter(Duration::from_millis(5));

    let link = Blocking::new(SerialTransport::new(gauge, SystemTime));
    let controller =
        GaugeController::with_settings(link, settings, retry)?.with_codec(V1Codec::new(address));

    let reading = controller.read().await?;
    println!("Pressure: {}", reading.pressure());

    for unit in [PressureUnit::Torr, PressureUnit::Pascal, PressureUnit::Micron] {
        controller.configure(ConfigUpdate::unit(unit))?;
        match controller.read().await {
            Ok(reading) => println!("  in {:>6}: {:.4e}", unit.symbol(), reading.magnitude()),
            Err(fault) => println!("  in {:>6}: {}", unit.symbol(), fault),
        }
    }

    println!("\n--- Unsupported unit ---");
    match controller.configure(ConfigUpdate::unit(PressureUnit::Psi)) {
        Ok(()) => println!("unexpectedly accepted"),
        Err(fault) => println!("Rejected: {} ({})", fault, fault.kind),
    }

    let requests = controller
        .with_transport(|link| link.with_inner(|serial| serial.link_mut().requests()))
        .await?;
    println!("\nFrames sent to the gauge: {}", requests);
    Ok(())
}

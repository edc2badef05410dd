//! Controller driving an emulated V1 gauge through the blocking adapter

use std::time::Duration;

use vacuum_gauge::{Blocking, ConfigUpdate, GaugeController};
use vacuum_gauge_core::{
    presets, FaultKind, FaultTable, GaugeType, NoJitter, PressureUnit, ReadingSettings,
    RetryPolicy, SerialTransport, SystemTime, TransportError,
};
use vacuum_gauge_protocols::{Address, V1Codec, V1Emulator};

type EmulatedLink = Blocking<SerialTransport<V1Emulator, SystemTime>>;

fn emulated(mbar: f64, failures: &[TransportError]) -> GaugeController<EmulatedLink> {
    let address = Address::new(1).unwrap();
    let mut gauge = V1Emulator::new(address);
    gauge.set_pressure(mbar).unwrap();
    for &error in failures {
        assert!(gauge.inject(error));
    }

    let profile = presets::serial_direct(
        GaugeType::Pirani,
        PressureUnit::Millibar,
        5e-4,
        1_000.0,
        FaultTable::new(),
    )
    .unwrap();
    let settings = ReadingSettings::new(profile, PressureUnit::Millibar, 1.0);
    let retry = RetryPolicy::new(3, Duration::from_millis(1), 1.0);

    let link = Blocking::new(SerialTransport::new(gauge, SystemTime));
    GaugeController::with_settings(link, settings, retry)
        .unwrap()
        .with_codec(V1Codec::new(address))
        .with_jitter(NoJitter)
}

async fn requests(controller: &GaugeController<EmulatedLink>) -> u32 {
    controller
        .with_transport(|link| link.with_inner(|serial| serial.link_mut().requests()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_reads_emulated_pressure() {
    let controller = emulated(1.23e-3, &[]);

    let reading = controller.read().await.unwrap();

    assert!((reading.magnitude() - 1.23e-3).abs() < 1e-12);
    assert!(reading.timestamp() > 0);
    assert_eq!(requests(&controller).await, 1);
}

#[tokio::test]
async fn test_recovers_from_link_errors() {
    let controller = emulated(12.34, &[TransportError::Timeout, TransportError::LinkLost]);

    let reading = controller.read().await.unwrap();

    assert!((reading.magnitude() - 12.34).abs() < 1e-9);
    assert_eq!(requests(&controller).await, 3);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let failures = [TransportError::Timeout; 4];
    let controller = emulated(12.34, &failures);

    let fault = controller.read().await.unwrap_err();

    assert_eq!(fault.kind, FaultKind::Transient);
    assert_eq!(fault.attempts, 3);
    assert_eq!(requests(&controller).await, 3);
}

#[tokio::test]
async fn test_below_range_is_rejected() {
    let controller = emulated(1e-5, &[]);

    let fault = controller.read().await.unwrap_err();

    assert_eq!(fault.kind, FaultKind::OutOfRange);
    assert_eq!(requests(&controller).await, 1);
}

#[tokio::test]
async fn test_unit_change_between_reads() {
    let controller = emulated(1.33322, &[]);

    let mbar = controller.read().await.unwrap();
    controller.configure(ConfigUpdate::unit(PressureUnit::Torr)).unwrap();
    let torr = controller.read().await.unwrap();

    assert_eq!(mbar.unit(), PressureUnit::Millibar);
    assert_eq!(torr.unit(), PressureUnit::Torr);
    assert!((torr.magnitude() - 1.0).abs() < 1e-3);
}

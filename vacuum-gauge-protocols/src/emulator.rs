//! In-memory V1 gauge for tests and demos
//!
//! [`V1Emulator`] answers V1 frames the way a two-element (Pirani plus
//! Penning) gauge head does. It implements [`SerialLink`], so it plugs
//! into a `SerialTransport` in place of a real RS485 port.
//!
//! Like the hardware it stays silent on frames it cannot accept: a bad
//! checksum or a foreign address surfaces as [`TransportError::Timeout`].
//! Scripted failures can be queued with [`V1Emulator::inject`].

use heapless::Deque;
use vacuum_gauge_core::{FrameBuf, FrameError, SerialLink, TransportError};

use crate::frame::Address;
use crate::number::{decode_pressure, decode_register, encode_pressure, encode_register, Digits};
use crate::v1::{Command, Frame};

/// Model string reported by `T`
pub const DEFAULT_MODEL: &[u8; 6] = b"MTM09D";

/// Data that confirms an atmosphere adjustment (1000 mbar)
pub const ATMOSPHERE_CONFIRM: &[u8; 6] = b"100023";

/// Data that confirms a zero adjustment
pub const ZERO_CONFIRM: &[u8; 6] = b"000000";

/// Depth of the injected-failure queue
pub const MAX_INJECTED: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adjustment {
    None,
    Atmosphere,
    Zero,
}

/// Emulated V1 gauge
#[derive(Debug, Clone)]
pub struct V1Emulator {
    address: Address,
    model: Digits,
    pressure: Digits,
    setpoints: [Digits; 2],
    calibration: [u32; 2],
    penning_state: u32,
    penning_sync: u32,
    setpoint_selected: Option<usize>,
    calibration_selected: Option<usize>,
    adjustment: Adjustment,
    failures: Deque<TransportError, MAX_INJECTED>,
    requests: u32,
}

impl V1Emulator {
    /// Gauge at `address` reading zero pressure
    pub fn new(address: Address) -> Self {
        let zero = Digits::from_slice(ZERO_CONFIRM).unwrap_or_default();
        Self {
            address,
            model: Digits::from_slice(DEFAULT_MODEL).unwrap_or_default(),
            pressure: zero.clone(),
            setpoints: [zero.clone(), zero],
            calibration: [100, 100],
            penning_state: 0,
            penning_sync: 0,
            setpoint_selected: None,
            calibration_selected: None,
            adjustment: Adjustment::None,
            failures: Deque::new(),
            requests: 0,
        }
    }

    /// Address the emulator answers to
    pub fn address(&self) -> Address {
        self.address
    }

    /// Set the pressure returned by `M`, in mbar
    pub fn set_pressure(&mut self, mbar: f64) -> Result<(), FrameError> {
        self.pressure = encode_pressure(mbar)?;
        Ok(())
    }

    /// Pressure currently reported, in mbar
    pub fn pressure(&self) -> Result<f64, FrameError> {
        decode_pressure(&self.pressure)
    }

    /// Calibration factor `index` (1 or 2)
    pub fn calibration(&self, index: usize) -> Option<f64> {
        let slot = index.checked_sub(1)?;
        self.calibration.get(slot).map(|&c| c as f64 / 100.0)
    }

    /// Setpoint `index` (1 or 2) in mbar
    pub fn setpoint(&self, index: usize) -> Option<f64> {
        let slot = index.checked_sub(1)?;
        decode_pressure(self.setpoints.get(slot)?).ok()
    }

    /// Whether the Penning element is switched on
    pub fn penning_enabled(&self) -> bool {
        self.penning_state != 0
    }

    /// Make the next query fail with `error`; returns `false` when the queue is full
    pub fn inject(&mut self, error: TransportError) -> bool {
        self.failures.push_back(error).is_ok()
    }

    /// Frames received, including rejected ones
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Reply data for one decoded request; empty when the gauge refuses
    fn respond(&mut self, command: Command, data: &[u8]) -> Digits {
        let echo = || Digits::from_slice(data).unwrap_or_default();
        match command {
            Command::Type => self.model.clone(),
            Command::Measure => self.pressure.clone(),
            Command::SetPressure => match decode_pressure(data) {
                Ok(_) => {
                    self.pressure = echo();
                    echo()
                }
                Err(_) => Digits::new(),
            },
            Command::ReadSetpoint => selector(data)
                .map(|slot| self.setpoints[slot].clone())
                .unwrap_or_default(),
            Command::WriteSetpoint => {
                if data.len() == 1 {
                    self.setpoint_selected = selector(data);
                    return echo();
                }
                match (self.setpoint_selected.take(), decode_pressure(data)) {
                    (Some(slot), Ok(_)) => {
                        self.setpoints[slot] = echo();
                        echo()
                    }
                    _ => Digits::new(),
                }
            }
            Command::ReadCalibration => selector(data)
                .and_then(|slot| encode_register(self.calibration[slot]).ok())
                .unwrap_or_default(),
            Command::WriteCalibration => {
                if data.len() == 1 {
                    self.calibration_selected = selector(data);
                    return echo();
                }
                match (self.calibration_selected.take(), decode_register(data)) {
                    (Some(slot), Ok(value)) => {
                        self.calibration[slot] = value;
                        echo()
                    }
                    _ => Digits::new(),
                }
            }
            Command::ReadPenningState => encode_register(self.penning_state).unwrap_or_default(),
            Command::WritePenningState => match decode_register(data) {
                Ok(value) => {
                    self.penning_state = value;
                    echo()
                }
                Err(_) => Digits::new(),
            },
            Command::ReadPenningSync => encode_register(self.penning_sync).unwrap_or_default(),
            Command::WritePenningSync => match decode_register(data) {
                Ok(value) => {
                    self.penning_sync = value;
                    echo()
                }
                Err(_) => Digits::new(),
            },
            Command::Adjust => self.adjust(data),
        }
    }

    fn adjust(&mut self, data: &[u8]) -> Digits {
        match data {
            b"1" => {
                self.adjustment = Adjustment::Atmosphere;
                Digits::from_slice(data).unwrap_or_default()
            }
            b"0" => {
                self.adjustment = Adjustment::Zero;
                Digits::from_slice(data).unwrap_or_default()
            }
            _ => {
                let armed = core::mem::replace(&mut self.adjustment, Adjustment::None);
                let confirmed = match armed {
                    Adjustment::Atmosphere => data == ATMOSPHERE_CONFIRM,
                    Adjustment::Zero => data == ZERO_CONFIRM,
                    Adjustment::None => false,
                };
                if confirmed {
                    Digits::from_slice(data).unwrap_or_default()
                } else {
                    Digits::new()
                }
            }
        }
    }
}

/// Slot for a `"1"`/`"2"` selector
fn selector(data: &[u8]) -> Option<usize> {
    match data {
        b"1" => Some(0),
        b"2" => Some(1),
        _ => None,
    }
}

impl SerialLink for V1Emulator {
    fn query(&mut self, command: &[u8]) -> Result<FrameBuf, TransportError> {
        self.requests += 1;
        if let Some(error) = self.failures.pop_front() {
            return Err(error);
        }
        let request = Frame::decode(command).map_err(|_| TransportError::Timeout)?;
        if request.address != self.address {
            return Err(TransportError::Timeout);
        }
        let data = self.respond(request.command, &request.data);
        log_debug!("emulator {:?} -> {:?}", request.command, data);
        Frame::with_data(self.address, request.command, &data)
            .and_then(|reply| reply.encode())
            .map_err(|_| TransportError::Framing)
    }
}

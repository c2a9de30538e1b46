//! Alternate-setting tracking and the isochronous streaming pipeline.
//!
//! The host enables a streaming direction by selecting alternate setting 1 of
//! the matching AudioStreaming interface and disables it by selecting the
//! zero-bandwidth alternate setting 0. Those notifications are broadcast to
//! every registered device; each self-filters by its AC header's interface
//! list. The per-direction enable flags gate both data paths: a disabled
//! receive path must not consume the transport's data, and a disabled
//! transmit path rejects submissions with `NotReady`.

use tracing::{debug, warn};

use crate::pool::StreamBuffer;
use crate::registry::{AudioRegistry, DeviceId};
use crate::{SendError, StreamDirection};

/// Boundary to the USB protocol engine's endpoint primitives.
///
/// `write` submits an IN payload and reports completion later through
/// [`AudioRegistry::on_transfer_complete`]; `read` drains one pending OUT
/// delivery into the caller's buffer. Neither call blocks.
pub trait IsoTransport {
    fn write(&mut self, endpoint: u8, data: &[u8]);
    fn read(&mut self, endpoint: u8, buf: &mut [u8]) -> usize;
}

/// A rejected transmit submission. Ownership of the buffer stays with the
/// caller, who decides whether to retry on the next data-request hint or
/// drop the frame.
#[derive(Debug)]
pub struct SendRejected {
    pub error: SendError,
    pub buffer: StreamBuffer,
}

impl AudioRegistry {
    /// Host selected an alternate setting. Devices not owning the interface
    /// number ignore the notification; the owner resolves the interface's
    /// endpoint direction and sets the matching enable flag.
    pub fn on_alternate_setting(&mut self, interface_number: u8, alternate_setting: u8) {
        for (id, ctx) in self.devices_mut() {
            if !ctx.descriptors.owns_interface(interface_number) {
                continue;
            }
            let Some(endpoint) = ctx.descriptors.endpoint_for_interface(interface_number) else {
                continue;
            };
            let active = alternate_setting != 0;
            match StreamDirection::from_endpoint(endpoint) {
                StreamDirection::Transmit => ctx.tx_enabled = active,
                StreamDirection::Receive => ctx.rx_enabled = active,
            }
            debug!(
                device = id.0,
                interface_number,
                alternate_setting,
                endpoint = format_args!("{endpoint:#04x}"),
                "alternate setting selected",
            );
        }
    }

    /// Start-of-frame: hint every transmit-enabled device that it may submit
    /// a payload now.
    pub fn on_sof(&mut self) {
        for (_, ctx) in self.devices_mut() {
            if ctx.tx_enabled && ctx.descriptors.primary_endpoint() & 0x80 != 0 {
                ctx.ops.data_request();
            }
        }
    }

    /// Submits an isochronous IN payload on the device's primary endpoint.
    ///
    /// The buffer is parked as the endpoint's in-flight buffer until the
    /// transport reports completion, which releases it to the pool and
    /// invokes the application's `data_written`. One payload may be in
    /// flight per device; submitting before completion is rejected `Busy`.
    pub fn send(
        &mut self,
        device: DeviceId,
        transport: &mut dyn IsoTransport,
        buffer: StreamBuffer,
        length: usize,
    ) -> Result<(), SendRejected> {
        let ctx = self.device_mut(device);
        let endpoint = ctx.descriptors.primary_endpoint();

        if endpoint & 0x80 == 0 {
            return Err(SendRejected {
                error: SendError::WrongDirection,
                buffer,
            });
        }
        if !ctx.tx_enabled {
            debug!(device = device.0, "send dropped, host selected passive interface");
            return Err(SendRejected {
                error: SendError::NotReady,
                buffer,
            });
        }
        if ctx.in_flight.is_some() {
            return Err(SendRejected {
                error: SendError::Busy,
                buffer,
            });
        }
        if length > buffer.capacity() {
            return Err(SendRejected {
                error: SendError::InvalidLength {
                    len: length,
                    capacity: buffer.capacity(),
                },
                buffer,
            });
        }

        transport.write(endpoint, &buffer[..length]);
        ctx.in_flight = Some(buffer);
        Ok(())
    }

    /// Transport finished transmitting on `endpoint`: release the in-flight
    /// buffer back to the pool and report the transmitted length.
    pub fn on_transfer_complete(&mut self, endpoint: u8, length: usize) {
        let Some((id, ctx)) = self.device_mut_by_endpoint(endpoint) else {
            return;
        };
        let Some(buffer) = ctx.in_flight.take() else {
            return;
        };
        debug!(device = id.0, length, "transfer complete");
        drop(buffer);
        ctx.ops.data_written(length);
    }

    /// Transport has data pending on an OUT endpoint.
    ///
    /// While the host has the passive alternate setting selected the data is
    /// left in the transport untouched; consuming it while disabled would
    /// desynchronize the endpoint. A zero-length delivery releases its buffer
    /// without reaching the application; pool exhaustion drops the frame and
    /// counts it.
    pub fn on_receive_ready(&mut self, endpoint: u8, transport: &mut dyn IsoTransport) {
        let pool = self.pool().clone();
        let Some((id, ctx)) = self.device_mut_by_endpoint(endpoint) else {
            return;
        };
        if !ctx.rx_enabled {
            return;
        }

        let Some(mut buffer) = pool.alloc() else {
            ctx.dropped_frames += 1;
            warn!(device = id.0, "buffer pool exhausted, dropping frame");
            return;
        };

        let length = transport.read(endpoint, &mut buffer).min(buffer.capacity());
        if length == 0 {
            debug!(device = id.0, "zero-length delivery dropped");
            return;
        }
        ctx.ops.data_received(buffer, length);
    }
}

//! Process-wide registry of audio function instances.
//!
//! Each registered device owns its finalized descriptor chain, its
//! per-direction control tables, the two enable flags the alternate-setting
//! tracker drives, and the application's callback set. Lookups scan the
//! device list linearly; device counts are small and fixed at startup.

use tracing::debug;

use crate::control::{ChannelControls, FeatureUnitEvent};
use crate::descriptor::AudioDescriptors;
use crate::pool::{BufferPool, StreamBuffer};
use crate::StreamDirection;

/// Stable identity of a registered device, used by status notifications and
/// event callbacks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeviceId(pub(crate) usize);

/// Application callbacks bound to one device at registration.
///
/// All methods default to no-ops so applications implement only the events
/// they care about. Callbacks run synchronously inside the calling context;
/// none of them may block.
pub trait AudioOps {
    /// Start-of-frame hint: the host has the active alternate setting
    /// selected and the device may submit a payload now.
    fn data_request(&mut self) {}

    /// A previously submitted payload finished transmitting; its buffer has
    /// already been released back to the pool.
    fn data_written(&mut self, length: usize) {
        let _ = length;
    }

    /// A host payload arrived. Ownership of the buffer transfers to the
    /// callee; dropping it releases it back to the pool.
    fn data_received(&mut self, buffer: StreamBuffer, length: usize) {
        let _ = (buffer, length);
    }

    /// The host changed a feature unit control value.
    fn feature_updated(&mut self, event: FeatureUnitEvent) {
        let _ = event;
    }
}

/// Per-feature-unit control value storage, one entry per channel.
pub(crate) struct ControlTable {
    pub unit_id: u8,
    pub direction: StreamDirection,
    pub channels: Vec<ChannelControls>,
}

pub(crate) struct DeviceContext {
    pub descriptors: AudioDescriptors,
    pub controls: Vec<ControlTable>,
    pub rx_enabled: bool,
    pub tx_enabled: bool,
    pub ops: Box<dyn AudioOps>,
    /// Buffer handed to the transport and not yet completed. One in-flight
    /// transmit per device; the completion callback releases it.
    pub in_flight: Option<StreamBuffer>,
    /// Receive frames dropped on pool exhaustion. Not surfaced to the host;
    /// isochronous semantics tolerate loss.
    pub dropped_frames: u64,
}

/// The device registry plus the streaming buffer pool shared by every
/// registered device.
pub struct AudioRegistry {
    devices: Vec<DeviceContext>,
    pool: BufferPool,
}

impl AudioRegistry {
    pub fn new(pool: BufferPool) -> Self {
        Self {
            devices: Vec::new(),
            pool,
        }
    }

    /// Registers a device: captures its finalized topology, sizes the control
    /// tables from the feature units' channel counts, resets both direction
    /// enable flags and binds the application callbacks.
    ///
    /// Call exactly once per device, at initialization; registering the same
    /// topology twice duplicates the entry.
    pub fn register(&mut self, descriptors: AudioDescriptors, ops: Box<dyn AudioOps>) -> DeviceId {
        let controls = descriptors
            .feature_units()
            .iter()
            .map(|fu| ControlTable {
                unit_id: fu.unit_id(),
                direction: fu.direction(),
                channels: vec![ChannelControls::default(); fu.channel_count() as usize],
            })
            .collect();

        let id = DeviceId(self.devices.len());
        debug!(
            device = id.0,
            ac_interface = descriptors.ac_interface_number(),
            streaming = ?descriptors.streaming_interfaces(),
            "registered audio device",
        );
        self.devices.push(DeviceContext {
            descriptors,
            controls,
            rx_enabled: false,
            tx_enabled: false,
            ops,
            in_flight: None,
            dropped_frames: 0,
        });
        id
    }

    /// Leases a buffer from the subsystem pool. Never blocks.
    pub fn alloc_buffer(&self) -> Option<StreamBuffer> {
        self.pool.alloc()
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn descriptors(&self, id: DeviceId) -> &AudioDescriptors {
        &self.devices[id.0].descriptors
    }

    pub fn rx_enabled(&self, id: DeviceId) -> bool {
        self.devices[id.0].rx_enabled
    }

    pub fn tx_enabled(&self, id: DeviceId) -> bool {
        self.devices[id.0].tx_enabled
    }

    pub fn dropped_frames(&self, id: DeviceId) -> u64 {
        self.devices[id.0].dropped_frames
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> &mut DeviceContext {
        &mut self.devices[id.0]
    }

    pub(crate) fn devices_mut(
        &mut self,
    ) -> impl Iterator<Item = (DeviceId, &mut DeviceContext)> {
        self.devices
            .iter_mut()
            .enumerate()
            .map(|(idx, dev)| (DeviceId(idx), dev))
    }

    /// Routes a control request: the device whose AudioControl or streaming
    /// interface carries the number.
    pub(crate) fn device_mut_by_interface(
        &mut self,
        interface_number: u8,
    ) -> Option<(DeviceId, &mut DeviceContext)> {
        self.devices_mut().find(|(_, dev)| {
            dev.descriptors.ac_interface_number() == interface_number
                || dev.descriptors.owns_interface(interface_number)
        })
    }

    /// Routes a transport callback: the device owning the endpoint address.
    pub(crate) fn device_mut_by_endpoint(
        &mut self,
        endpoint: u8,
    ) -> Option<(DeviceId, &mut DeviceContext)> {
        self.devices_mut()
            .find(|(_, dev)| dev.descriptors.endpoints().contains(&endpoint))
    }
}

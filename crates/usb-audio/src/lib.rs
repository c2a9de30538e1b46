//! USB Audio Class 1.0 device function core.
//!
//! This crate models the control plane and data plane of a UAC1 audio
//! function: it builds the class-specific descriptor chain describing the
//! audio topology (terminals, feature units, streaming interfaces), resolves
//! and services class-specific control requests addressed to entities in that
//! topology, tracks which alternate streaming interface the host has
//! selected, and moves isochronous payloads between a bounded buffer pool and
//! the application's callback set.
//!
//! The USB protocol engine itself (enumeration, endpoint state machine,
//! transfer scheduling) is a collaborator behind the [`IsoTransport`] trait;
//! this crate only decides *what* moves and *when*.

pub mod control;
pub mod descriptor;
pub mod entity;
pub mod pool;
pub mod registry;
pub mod stream;

pub use control::{ChannelControls, ControlSelector, FeatureUnitEvent};
pub use descriptor::{AudioDescriptors, ChannelConfig, FeatureControls, StreamConfig, TopologyBuilder};
pub use entity::EntityKind;
pub use pool::{BufferPool, StreamBuffer};
pub use registry::{AudioOps, AudioRegistry, DeviceId};
pub use stream::{IsoTransport, SendRejected};

use thiserror::Error;

/// Standard USB Setup packet, as delivered by the protocol engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

/// Recipient encoded in `bmRequestType` bits 4..0.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestRecipient {
    Device,
    Interface,
    Endpoint,
    Other,
}

impl SetupPacket {
    pub fn recipient(&self) -> RequestRecipient {
        match self.request_type & 0x1F {
            0x00 => RequestRecipient::Device,
            0x01 => RequestRecipient::Interface,
            0x02 => RequestRecipient::Endpoint,
            _ => RequestRecipient::Other,
        }
    }

    pub fn is_device_to_host(&self) -> bool {
        self.request_type & 0x80 != 0
    }

    /// Interface number of an interface-recipient class request (`wIndex` low byte).
    pub fn interface_number(&self) -> u8 {
        (self.index & 0xFF) as u8
    }

    /// Entity ID of an interface-recipient class request (`wIndex` high byte).
    pub fn entity_id(&self) -> u8 {
        (self.index >> 8) as u8
    }

    /// Control selector (`wValue` high byte).
    pub fn control_selector(&self) -> u8 {
        (self.value >> 8) as u8
    }

    /// Channel number (`wValue` low byte); 0xFF addresses all channels.
    pub fn channel_number(&self) -> u8 {
        (self.value & 0xFF) as u8
    }
}

/// Streaming direction of an audio interface, from the device's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamDirection {
    /// Device-to-host, isochronous IN (e.g. a microphone).
    Transmit,
    /// Host-to-device, isochronous OUT (e.g. headphones).
    Receive,
}

impl StreamDirection {
    /// Direction of the stream served by an endpoint, from its address.
    pub fn from_endpoint(address: u8) -> Self {
        if address & 0x80 != 0 {
            StreamDirection::Transmit
        } else {
            StreamDirection::Receive
        }
    }
}

/// Failure servicing a class-specific control request. Every variant maps to
/// an EP0 stall at the protocol layer; none mutates device state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ClassRequestError {
    #[error("interface {0} is not owned by any registered audio device")]
    UnknownInterface(u8),
    #[error("no entity with ID {0} in the descriptor chain")]
    UnknownEntity(u8),
    #[error("entity {id} is a {kind:?} and has no request handler")]
    UnsupportedEntityKind { id: u8, kind: EntityKind },
    #[error("control selector {0:#04x} is not advertised by the feature unit")]
    UnsupportedControl(u8),
    #[error("channel {0} is out of range for the feature unit")]
    InvalidChannel(u8),
    #[error("request code {0:#04x} is not supported")]
    UnsupportedRequest(u8),
}

/// Failure submitting an isochronous IN payload. All variants are recoverable:
/// the caller decides whether to retry on the next data-request hint or drop
/// the frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SendError {
    #[error("device's primary endpoint is not an IN endpoint")]
    WrongDirection,
    #[error("host has selected the zero-bandwidth alternate setting")]
    NotReady,
    #[error("previous payload has not completed yet")]
    Busy,
    #[error("length {len} exceeds buffer capacity {capacity}")]
    InvalidLength { len: usize, capacity: usize },
}

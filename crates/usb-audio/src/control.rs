//! Class-specific control request dispatch and the feature unit control
//! engine.
//!
//! Every class request lands in [`AudioRegistry::handle_class_request`]:
//! recipient decode, device lookup by interface number, entity resolution,
//! then the per-entity handler. Only feature units are serviced; requests to
//! terminals and to mixer/selector/processing/extension units are recognized
//! and stalled. Within a feature unit, only Mute has read/write behavior —
//! the remaining selectors have storage and a no-op handler that succeeds
//! with zero effect, so the device never invents behavior it does not
//! implement.

use tracing::{debug, info};

use crate::registry::{AudioRegistry, DeviceContext, DeviceId};
use crate::{ClassRequestError, EntityKind, RequestRecipient, SetupPacket, StreamDirection};

/* Class-specific request codes, audio10.pdf Table A-9. */
pub const REQ_SET_CUR: u8 = 0x01;
pub const REQ_SET_MIN: u8 = 0x02;
pub const REQ_SET_MAX: u8 = 0x03;
pub const REQ_SET_RES: u8 = 0x04;
pub const REQ_SET_MEM: u8 = 0x05;
pub const REQ_GET_CUR: u8 = 0x81;
pub const REQ_GET_MIN: u8 = 0x82;
pub const REQ_GET_MAX: u8 = 0x83;
pub const REQ_GET_RES: u8 = 0x84;
pub const REQ_GET_MEM: u8 = 0x85;
pub const REQ_GET_STAT: u8 = 0xFF;

/// Channel number addressing every channel of a feature unit.
pub const CHANNEL_ALL: u8 = 0xFF;

/// Feature unit control selectors, audio10.pdf Table A-11.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ControlSelector {
    Mute = 0x01,
    Volume = 0x02,
    Bass = 0x03,
    Mid = 0x04,
    Treble = 0x05,
    GraphicEqualizer = 0x06,
    AutomaticGain = 0x07,
    Delay = 0x08,
    BassBoost = 0x09,
    Loudness = 0x0A,
}

impl ControlSelector {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ControlSelector::Mute),
            0x02 => Some(ControlSelector::Volume),
            0x03 => Some(ControlSelector::Bass),
            0x04 => Some(ControlSelector::Mid),
            0x05 => Some(ControlSelector::Treble),
            0x06 => Some(ControlSelector::GraphicEqualizer),
            0x07 => Some(ControlSelector::AutomaticGain),
            0x08 => Some(ControlSelector::Delay),
            0x09 => Some(ControlSelector::BassBoost),
            0x0A => Some(ControlSelector::Loudness),
            _ => None,
        }
    }
}

/// Current value of every control of one channel. Storage exists for the full
/// selector set; only `mute` is wired to request handling.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChannelControls {
    pub mute: bool,
    pub volume: u16,
    pub tone: [u8; 3],
    pub graphic_equalizer: u8,
    pub automatic_gain: bool,
    pub delay: u16,
    pub bass_boost: bool,
    pub loudness: bool,
}

/// Control-change notification delivered to the application, one per channel
/// touched, in ascending channel order, synchronously before the request
/// completes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeatureUnitEvent {
    pub device: DeviceId,
    pub direction: StreamDirection,
    pub selector: ControlSelector,
    pub channel: u8,
    pub value: bool,
}

impl AudioRegistry {
    /// Services a class-specific Setup packet.
    ///
    /// `payload` is the request's data stage for host-to-device requests.
    /// The returned bytes are the data stage of a device-to-host request,
    /// already truncated to `wLength`; every error maps to an EP0 stall and
    /// leaves device state untouched.
    pub fn handle_class_request(
        &mut self,
        setup: SetupPacket,
        payload: &[u8],
    ) -> Result<Vec<u8>, ClassRequestError> {
        debug!(
            request_type = format_args!("{:#04x}", setup.request_type),
            request = format_args!("{:#04x}", setup.request),
            value = format_args!("{:#06x}", setup.value),
            index = format_args!("{:#06x}", setup.index),
            length = setup.length,
            "class request",
        );

        match setup.recipient() {
            RequestRecipient::Interface => self.handle_interface_request(setup, payload),
            RequestRecipient::Endpoint => {
                // Recognized but unimplemented, as for sampling-frequency
                // endpoint controls.
                debug!("endpoint-recipient class requests are not serviced");
                Err(ClassRequestError::UnsupportedRequest(setup.request))
            }
            _ => Err(ClassRequestError::UnsupportedRequest(setup.request)),
        }
    }

    fn handle_interface_request(
        &mut self,
        setup: SetupPacket,
        payload: &[u8],
    ) -> Result<Vec<u8>, ClassRequestError> {
        let interface = setup.interface_number();
        let entity_id = setup.entity_id();

        let (device, ctx) = self
            .device_mut_by_interface(interface)
            .ok_or(ClassRequestError::UnknownInterface(interface))?;

        let kind = ctx
            .descriptors
            .resolve_entity(entity_id)
            .ok_or(ClassRequestError::UnknownEntity(entity_id))?;

        let mut response = match kind {
            EntityKind::FeatureUnit => {
                handle_feature_unit_request(device, ctx, setup, payload)?
            }
            kind => {
                // Terminals and the remaining unit kinds are legitimately out
                // of scope, not errors.
                info!(entity_id, ?kind, "entity kind has no request handler");
                return Err(ClassRequestError::UnsupportedEntityKind {
                    id: entity_id,
                    kind,
                });
            }
        };
        response.truncate(setup.length as usize);
        Ok(response)
    }
}

fn handle_feature_unit_request(
    device: DeviceId,
    ctx: &mut DeviceContext,
    setup: SetupPacket,
    payload: &[u8],
) -> Result<Vec<u8>, ClassRequestError> {
    let DeviceContext {
        descriptors,
        controls,
        ops,
        ..
    } = ctx;

    let unit = descriptors
        .feature_unit(setup.entity_id())
        .ok_or(ClassRequestError::UnknownEntity(setup.entity_id()))?;

    // The advertised-control check comes first: a selector whose bitmap bit
    // is clear fails identically for every request kind.
    let selector_raw = setup.control_selector();
    if !unit.supports_selector(selector_raw) {
        return Err(ClassRequestError::UnsupportedControl(selector_raw));
    }
    let selector = ControlSelector::from_wire(selector_raw)
        .ok_or(ClassRequestError::UnsupportedControl(selector_raw))?;

    let channel_count = unit.channel_count();
    let channel = setup.channel_number();
    let channels = match channel {
        CHANNEL_ALL => 0..channel_count,
        ch if ch < channel_count => ch..ch + 1,
        ch => return Err(ClassRequestError::InvalidChannel(ch)),
    };

    debug!(
        unit = unit.unit_id(),
        ?selector,
        channel,
        length = setup.length,
        "feature unit request",
    );

    let table = controls
        .iter_mut()
        .find(|table| table.unit_id == unit.unit_id())
        .ok_or(ClassRequestError::UnknownEntity(setup.entity_id()))?;

    match setup.request {
        REQ_SET_CUR => match selector {
            ControlSelector::Mute => {
                let value = *payload
                    .first()
                    .ok_or(ClassRequestError::UnsupportedRequest(setup.request))?
                    != 0;
                for ch in channels {
                    table.channels[ch as usize].mute = value;
                    ops.feature_updated(FeatureUnitEvent {
                        device,
                        direction: table.direction,
                        selector,
                        channel: ch,
                        value,
                    });
                }
                Ok(Vec::new())
            }
            // Storage exists for these, but request handling is deliberately
            // absent: accept and do nothing.
            _ => Ok(Vec::new()),
        },
        REQ_GET_CUR => match selector {
            ControlSelector::Mute => Ok(channels
                .map(|ch| table.channels[ch as usize].mute as u8)
                .collect()),
            _ => Ok(Vec::new()),
        },
        REQ_SET_MIN | REQ_SET_MAX | REQ_SET_RES | REQ_SET_MEM | REQ_GET_MIN | REQ_GET_MAX
        | REQ_GET_RES | REQ_GET_MEM | REQ_GET_STAT => {
            Err(ClassRequestError::UnsupportedRequest(setup.request))
        }
        other => Err(ClassRequestError::UnsupportedRequest(other)),
    }
}

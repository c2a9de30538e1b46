//! Entity resolution over a finalized descriptor chain.
//!
//! Every class-specific request names an entity by ID in the high byte of
//! `wIndex`. There is no index to consult: resolution is a linear walk over
//! the class-specific AC region, stepping by each record's self-declared
//! length and never reading past the header's `wTotalLength`. Chains hold a
//! handful of entities, so the walk is cheap enough to repeat per request.

use crate::descriptor::{
    AudioDescriptors, DescriptorWalker, Record, AC_SUBTYPE_EXTENSION_UNIT,
    AC_SUBTYPE_FEATURE_UNIT, AC_SUBTYPE_HEADER, AC_SUBTYPE_INPUT_TERMINAL, AC_SUBTYPE_MIXER_UNIT,
    AC_SUBTYPE_OUTPUT_TERMINAL, AC_SUBTYPE_PROCESSING_UNIT, AC_SUBTYPE_SELECTOR_UNIT,
    DESC_TYPE_CS_INTERFACE, FEATURE_UNIT_BITMAP_OFFSET, FEATURE_UNIT_FIXED_SIZE,
    TERMINAL_USB_STREAMING,
};
use crate::StreamDirection;

/// Kind of an addressable node in the audio topology, derived from the
/// on-wire descriptor subtype at resolution time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    InputTerminal,
    OutputTerminal,
    FeatureUnit,
    /// Recognized but unsupported: requests addressed to these stall.
    Mixer,
    Selector,
    Processing,
    Extension,
}

impl EntityKind {
    fn from_subtype(subtype: u8) -> Option<Self> {
        match subtype {
            AC_SUBTYPE_INPUT_TERMINAL => Some(EntityKind::InputTerminal),
            AC_SUBTYPE_OUTPUT_TERMINAL => Some(EntityKind::OutputTerminal),
            AC_SUBTYPE_FEATURE_UNIT => Some(EntityKind::FeatureUnit),
            AC_SUBTYPE_MIXER_UNIT => Some(EntityKind::Mixer),
            AC_SUBTYPE_SELECTOR_UNIT => Some(EntityKind::Selector),
            AC_SUBTYPE_PROCESSING_UNIT => Some(EntityKind::Processing),
            AC_SUBTYPE_EXTENSION_UNIT => Some(EntityKind::Extension),
            _ => None,
        }
    }
}

/// Minimum record length that guarantees the entity ID byte is present.
const MIN_ENTITY_RECORD_SIZE: usize = 4;

impl AudioDescriptors {
    /// Looks up the entity with the given ID. `None` means the request names
    /// an entity this device does not have: a protocol error, not a crash.
    pub fn resolve_entity(&self, entity_id: u8) -> Option<EntityKind> {
        self.entity_record(entity_id)
            .and_then(|record| EntityKind::from_subtype(record.bytes[2]))
    }

    /// A typed view of the feature unit with the given unit ID.
    pub fn feature_unit(&self, unit_id: u8) -> Option<FeatureUnitView<'_>> {
        let record = self.entity_record(unit_id)?;
        if record.bytes[2] != AC_SUBTYPE_FEATURE_UNIT {
            return None;
        }
        Some(FeatureUnitView {
            chain: self.class_chain(),
            record,
        })
    }

    /// All feature units in chain order, one per streaming direction.
    pub fn feature_units(&self) -> Vec<FeatureUnitView<'_>> {
        let chain = self.class_chain();
        DescriptorWalker::new(chain)
            .filter(|r| {
                r.descriptor_type() == DESC_TYPE_CS_INTERFACE
                    && r.bytes.len() >= FEATURE_UNIT_FIXED_SIZE
                    && r.bytes[2] == AC_SUBTYPE_FEATURE_UNIT
            })
            .map(|record| FeatureUnitView { chain, record })
            .collect()
    }

    fn entity_record(&self, entity_id: u8) -> Option<Record<'_>> {
        DescriptorWalker::new(self.class_chain()).find(|record| {
            record.descriptor_type() == DESC_TYPE_CS_INTERFACE
                && record.bytes.len() >= MIN_ENTITY_RECORD_SIZE
                && record.bytes[2] != AC_SUBTYPE_HEADER
                && record.bytes[3] == entity_id
        })
    }
}

/// Read-only view of a feature unit record inside the class-specific chain.
pub struct FeatureUnitView<'a> {
    chain: &'a [u8],
    record: Record<'a>,
}

impl<'a> FeatureUnitView<'a> {
    pub fn unit_id(&self) -> u8 {
        self.record.bytes[3]
    }

    pub fn source_id(&self) -> u8 {
        self.record.bytes[4]
    }

    /// Channel count derived solely from the record's on-wire length.
    pub fn channel_count(&self) -> u8 {
        ((self.record.bytes.len() - FEATURE_UNIT_FIXED_SIZE) / 2) as u8
    }

    /// Control bitmap of one channel; after finalize every channel carries a
    /// copy of channel 0's bitmap.
    pub fn controls_bitmap(&self, channel: u8) -> u16 {
        self.record
            .u16_at(FEATURE_UNIT_BITMAP_OFFSET + 2 * channel as usize)
    }

    /// Whether the control with the given selector is advertised. Bitmap bit
    /// 0 corresponds to selector 1 (Mute).
    pub fn supports_selector(&self, selector: u8) -> bool {
        (1..=16).contains(&selector) && self.controls_bitmap(0) & (1 << (selector - 1)) != 0
    }

    /// Streaming direction of the path this unit sits on, derived from the
    /// output terminal that follows it in the chain: a USB-streaming terminal
    /// faces the host, so the path transmits.
    pub fn direction(&self) -> StreamDirection {
        let next_offset = self.record.offset + self.record.bytes.len();
        let terminal_type = self
            .chain
            .get(next_offset..)
            .and_then(|rest| DescriptorWalker::new(rest).next())
            .filter(|r| r.bytes.len() >= 6)
            .map(|r| r.u16_at(4));
        match terminal_type {
            Some(TERMINAL_USB_STREAMING) => StreamDirection::Transmit,
            _ => StreamDirection::Receive,
        }
    }
}

//! Descriptor layout model for the audio function.
//!
//! The topology of a UAC1 function is described to the host by a chain of
//! length-prefixed, variable-shape records: a standard AudioControl interface
//! descriptor, the class-specific AC header, one input-terminal/feature-unit/
//! output-terminal triple per streaming direction, and for each direction a
//! pair of alternate-setting AudioStreaming interfaces (alt 0 zero-bandwidth,
//! alt 1 active) with their class-specific general/format/endpoint records.
//!
//! Interface numbers, the AC header's interface list and the per-channel
//! control bitmaps depend on where the function lands in the composite
//! configuration the host sees, so they cannot be known at construction time.
//! [`TopologyBuilder::finalize`] consumes the builder, applies all of those
//! fix-ups exactly once, and returns an immutable [`AudioDescriptors`].

use bitflags::bitflags;

use crate::StreamDirection;

pub const DESC_TYPE_INTERFACE: u8 = 0x04;
pub const DESC_TYPE_ENDPOINT: u8 = 0x05;
pub const DESC_TYPE_CS_INTERFACE: u8 = 0x24;
pub const DESC_TYPE_CS_ENDPOINT: u8 = 0x25;

pub const AUDIO_CLASS: u8 = 0x01;
pub const SUBCLASS_AUDIOCONTROL: u8 = 0x01;
pub const SUBCLASS_AUDIOSTREAMING: u8 = 0x02;

/* Class-specific AC interface descriptor subtypes, audio10.pdf Table A-5. */
pub const AC_SUBTYPE_HEADER: u8 = 0x01;
pub const AC_SUBTYPE_INPUT_TERMINAL: u8 = 0x02;
pub const AC_SUBTYPE_OUTPUT_TERMINAL: u8 = 0x03;
pub const AC_SUBTYPE_MIXER_UNIT: u8 = 0x04;
pub const AC_SUBTYPE_SELECTOR_UNIT: u8 = 0x05;
pub const AC_SUBTYPE_FEATURE_UNIT: u8 = 0x06;
pub const AC_SUBTYPE_PROCESSING_UNIT: u8 = 0x07;
pub const AC_SUBTYPE_EXTENSION_UNIT: u8 = 0x08;

/* Class-specific AS interface descriptor subtypes, audio10.pdf Table A-6. */
pub const AS_SUBTYPE_GENERAL: u8 = 0x01;
pub const AS_SUBTYPE_FORMAT_TYPE: u8 = 0x02;

/* Terminal types, termt10.pdf. */
pub const TERMINAL_USB_STREAMING: u16 = 0x0101;
pub const TERMINAL_IN_MICROPHONE: u16 = 0x0201;
pub const TERMINAL_OUT_SPEAKER: u16 = 0x0301;
pub const TERMINAL_OUT_HEADPHONES: u16 = 0x0302;
pub const TERMINAL_IO_HEADSET: u16 = 0x0402;

const EP_ATTR_ISOCHRONOUS: u8 = 0x01;

const STD_INTERFACE_DESC_SIZE: usize = 9;
const AC_HEADER_FIXED_SIZE: usize = 8;
const INPUT_TERMINAL_DESC_SIZE: usize = 12;
const OUTPUT_TERMINAL_DESC_SIZE: usize = 9;
const AS_GENERAL_DESC_SIZE: usize = 7;
const FORMAT_TYPE_I_DESC_SIZE: usize = 11;
const STD_AS_ENDPOINT_DESC_SIZE: usize = 9;
const CS_AS_ENDPOINT_DESC_SIZE: usize = 7;

/// Fixed leading bytes of a feature unit record (bLength..bControlSize plus
/// the trailing iFeature); everything in between is the per-channel bitmap
/// array, two bytes per channel.
pub(crate) const FEATURE_UNIT_FIXED_SIZE: usize = 7;
pub(crate) const FEATURE_UNIT_BITMAP_OFFSET: usize = 6;

bitflags! {
    /// Spatial channel locations, audio10.pdf wChannelConfig layout.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ChannelConfig: u16 {
        const LEFT_FRONT = 1 << 0;
        const RIGHT_FRONT = 1 << 1;
        const CENTER_FRONT = 1 << 2;
        const LFE = 1 << 3;
        const LEFT_SURROUND = 1 << 4;
        const RIGHT_SURROUND = 1 << 5;
        const LEFT_OF_CENTER = 1 << 6;
        const RIGHT_OF_CENTER = 1 << 7;
        const SURROUND = 1 << 8;
        const SIDE_LEFT = 1 << 9;
        const SIDE_RIGHT = 1 << 10;
        const TOP = 1 << 11;
    }
}

impl ChannelConfig {
    pub fn channel_count(self) -> u8 {
        self.bits().count_ones() as u8
    }
}

bitflags! {
    /// Feature unit controls as advertised on the wire: bit *k* set means
    /// control selector *k + 1* is supported (bit 0 = Mute).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct FeatureControls: u16 {
        const MUTE = 1 << 0;
        const VOLUME = 1 << 1;
        const BASS = 1 << 2;
        const MID = 1 << 3;
        const TREBLE = 1 << 4;
        const GRAPHIC_EQUALIZER = 1 << 5;
        const AUTOMATIC_GAIN = 1 << 6;
        const DELAY = 1 << 7;
        const BASS_BOOST = 1 << 8;
        const LOUDNESS = 1 << 9;
    }
}

/// Static configuration of one streaming direction.
#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    pub direction: StreamDirection,
    pub channels: ChannelConfig,
    pub controls: FeatureControls,
    /// Isochronous endpoint address; bit 7 must agree with `direction`.
    pub endpoint: u8,
    /// Terminal type of the physical side of the chain (the USB side is
    /// always `TERMINAL_USB_STREAMING`).
    pub terminal_type: u16,
    pub resolution_bits: u8,
    pub sample_rate_hz: u32,
}

impl StreamConfig {
    /// Device-to-host stream fronted by a microphone terminal, 16-bit/48kHz.
    pub fn microphone(endpoint: u8, channels: ChannelConfig, controls: FeatureControls) -> Self {
        Self {
            direction: StreamDirection::Transmit,
            channels,
            controls,
            endpoint,
            terminal_type: TERMINAL_IN_MICROPHONE,
            resolution_bits: 16,
            sample_rate_hz: 48_000,
        }
    }

    /// Host-to-device stream terminating in headphones, 16-bit/48kHz.
    pub fn headphones(endpoint: u8, channels: ChannelConfig, controls: FeatureControls) -> Self {
        Self {
            direction: StreamDirection::Receive,
            channels,
            controls,
            endpoint,
            terminal_type: TERMINAL_OUT_HEADPHONES,
            resolution_bits: 16,
            sample_rate_hz: 48_000,
        }
    }

    /// One side of a bidirectional headset sharing a single control topology.
    pub fn headset(
        direction: StreamDirection,
        endpoint: u8,
        channels: ChannelConfig,
        controls: FeatureControls,
    ) -> Self {
        Self {
            direction,
            channels,
            controls,
            endpoint,
            terminal_type: TERMINAL_IO_HEADSET,
            resolution_bits: 16,
            sample_rate_hz: 48_000,
        }
    }
}

/// Two-phase builder for a device's descriptor chain.
///
/// `finalize` consumes the builder, so the interface-number and bitmap
/// fix-ups cannot be applied twice to the same chain.
pub struct TopologyBuilder {
    base_entity_id: u8,
    streams: Vec<StreamConfig>,
}

impl TopologyBuilder {
    /// `base_entity_id` is the first entity ID this device's topology uses;
    /// IDs must not collide across devices sharing a bus.
    pub fn new(base_entity_id: u8) -> Self {
        Self {
            base_entity_id,
            streams: Vec::new(),
        }
    }

    /// Adds a streaming direction. One stream makes a unidirectional device,
    /// two make a headset-style device. For bidirectional devices the ISO IN
    /// stream must come first; it is the device's primary endpoint.
    pub fn stream(mut self, config: StreamConfig) -> Self {
        debug_assert!(self.streams.len() < 2, "at most two streaming interfaces");
        // An empty channel set would desynchronize the feature unit's
        // bLength from the bytes actually emitted.
        debug_assert!(
            !config.channels.is_empty(),
            "stream needs at least one channel",
        );
        debug_assert_eq!(
            StreamDirection::from_endpoint(config.endpoint),
            config.direction,
            "endpoint address direction bit disagrees with stream direction",
        );
        self.streams.push(config);
        self
    }

    /// Emits the chain and applies the placement-dependent fix-ups:
    /// the AC interface takes `base_interface`, the streaming interfaces take
    /// the numbers that follow, the AC header's interface list is rewritten
    /// to match, and channel 0's control bitmap is replicated into the
    /// remaining channels of every feature unit.
    pub fn finalize(self, base_interface: u8) -> AudioDescriptors {
        debug_assert!(!self.streams.is_empty(), "topology needs at least one stream");

        let mut chain = Vec::new();
        self.emit(&mut chain);

        let mut descriptors = AudioDescriptors {
            chain,
            ac_header_offset: STD_INTERFACE_DESC_SIZE,
        };
        descriptors.assign_interface_numbers(base_interface);
        descriptors.replicate_control_bitmaps();
        descriptors
    }

    fn emit(&self, out: &mut Vec<u8>) {
        let n_streams = self.streams.len();

        // Standard AC interface; number assigned at finalize.
        push_std_interface(out, 0, 0, 0, SUBCLASS_AUDIOCONTROL);

        let class_total = self.class_chain_length();
        push_ac_header(out, n_streams as u8, class_total);

        for (idx, stream) in self.streams.iter().enumerate() {
            let base = self.base_entity_id + (idx as u8) * 3;
            self.emit_entities(out, stream, base);
        }

        for (idx, stream) in self.streams.iter().enumerate() {
            let base = self.base_entity_id + (idx as u8) * 3;
            self.emit_streaming_interfaces(out, stream, base);
        }
    }

    /// wTotalLength of the class-specific AC portion: the header plus every
    /// terminal and unit record.
    fn class_chain_length(&self) -> u16 {
        let mut total = AC_HEADER_FIXED_SIZE + self.streams.len();
        for stream in &self.streams {
            total += INPUT_TERMINAL_DESC_SIZE + OUTPUT_TERMINAL_DESC_SIZE;
            total += FEATURE_UNIT_FIXED_SIZE + 2 * stream.channels.channel_count() as usize;
        }
        total as u16
    }

    fn emit_entities(&self, out: &mut Vec<u8>, stream: &StreamConfig, base_id: u8) {
        let (input_type, output_type) = match stream.direction {
            // The USB-streaming terminal sits on whichever side faces the host.
            StreamDirection::Transmit => (stream.terminal_type, TERMINAL_USB_STREAMING),
            StreamDirection::Receive => (TERMINAL_USB_STREAMING, stream.terminal_type),
        };
        push_input_terminal(out, base_id, input_type, stream.channels);
        push_feature_unit(out, base_id + 1, base_id, stream.controls, stream.channels.channel_count());
        push_output_terminal(out, base_id + 2, base_id + 1, output_type);
    }

    fn emit_streaming_interfaces(&self, out: &mut Vec<u8>, stream: &StreamConfig, base_id: u8) {
        // The AS general descriptor links to the terminal on the USB side of
        // the chain: the output terminal when transmitting, the input
        // terminal when receiving.
        let terminal_link = match stream.direction {
            StreamDirection::Transmit => base_id + 2,
            StreamDirection::Receive => base_id,
        };

        // Alt 0: zero bandwidth. Alt 1: active, one isochronous endpoint.
        push_std_interface(out, 0, 0, 0, SUBCLASS_AUDIOSTREAMING);
        push_std_interface(out, 0, 1, 1, SUBCLASS_AUDIOSTREAMING);
        push_as_general(out, terminal_link);
        push_format_type_i(out, stream.channels, stream.resolution_bits, stream.sample_rate_hz);
        push_iso_endpoint(out, stream.endpoint);
        push_cs_iso_endpoint(out);
    }
}

/// Finalized, immutable descriptor chain for one registered device.
///
/// The chain is a single owned byte buffer; every view into it is
/// bounds-checked against each record's self-declared length, and entity
/// resolution never reads past the AC header's `wTotalLength`.
pub struct AudioDescriptors {
    chain: Vec<u8>,
    ac_header_offset: usize,
}

impl AudioDescriptors {
    /// The full descriptor chain as it is spliced into the configuration
    /// descriptor the host reads.
    pub fn bytes(&self) -> &[u8] {
        &self.chain
    }

    /// Interface number of the AudioControl interface.
    pub fn ac_interface_number(&self) -> u8 {
        self.chain[2]
    }

    /// `wTotalLength` of the class-specific AC portion.
    pub fn total_class_length(&self) -> u16 {
        let off = self.ac_header_offset;
        u16::from_le_bytes([self.chain[off + 5], self.chain[off + 6]])
    }

    /// The AC header's baInterfaceNr list: the streaming interface numbers
    /// belonging to this function.
    pub fn streaming_interfaces(&self) -> &[u8] {
        let off = self.ac_header_offset;
        let count = self.chain[off + 7] as usize;
        &self.chain[off + 8..off + 8 + count]
    }

    /// Membership test used to self-filter broadcast interface notifications.
    pub fn owns_interface(&self, interface_number: u8) -> bool {
        self.streaming_interfaces().contains(&interface_number)
    }

    /// The class-specific AC region: AC header through the last unit record.
    /// This is the only region entity resolution may walk.
    pub(crate) fn class_chain(&self) -> &[u8] {
        let start = self.ac_header_offset;
        let end = (start + self.total_class_length() as usize).min(self.chain.len());
        &self.chain[start..end]
    }

    /// Endpoint address of the streaming interface with the given number,
    /// if this device owns it.
    pub fn endpoint_for_interface(&self, interface_number: u8) -> Option<u8> {
        let mut current = None;
        for record in DescriptorWalker::new(&self.chain) {
            match record.descriptor_type() {
                DESC_TYPE_INTERFACE => current = Some(record.bytes[2]),
                DESC_TYPE_ENDPOINT if current == Some(interface_number) => {
                    return Some(record.bytes[2]);
                }
                _ => {}
            }
        }
        None
    }

    /// The device's primary endpoint: the first (for bidirectional devices,
    /// the ISO IN) endpoint in the chain.
    pub fn primary_endpoint(&self) -> u8 {
        DescriptorWalker::new(&self.chain)
            .find(|r| r.descriptor_type() == DESC_TYPE_ENDPOINT)
            .map(|r| r.bytes[2])
            .unwrap_or(0)
    }

    /// All isochronous endpoint addresses, in chain order.
    pub fn endpoints(&self) -> Vec<u8> {
        DescriptorWalker::new(&self.chain)
            .filter(|r| r.descriptor_type() == DESC_TYPE_ENDPOINT)
            .map(|r| r.bytes[2])
            .collect()
    }

    fn assign_interface_numbers(&mut self, base: u8) {
        // First interface record is the AC interface; the AS interfaces
        // follow in stream order, each as an alt-0/alt-1 pair sharing one
        // number.
        let mut positions = Vec::new();
        for record in DescriptorWalker::new(&self.chain) {
            if record.descriptor_type() == DESC_TYPE_INTERFACE {
                positions.push((record.offset, record.bytes[3]));
            }
        }

        let mut streaming_numbers = Vec::new();
        let mut next = base;
        for (offset, alternate) in positions {
            if offset == 0 {
                self.chain[offset + 2] = base;
                continue;
            }
            if alternate == 0 {
                next += 1;
                streaming_numbers.push(next);
            }
            self.chain[offset + 2] = next;
        }

        let list_start = self.ac_header_offset + 8;
        for (idx, number) in streaming_numbers.iter().enumerate() {
            self.chain[list_start + idx] = *number;
        }
    }

    fn replicate_control_bitmaps(&mut self) {
        let start = self.ac_header_offset;
        let mut fixups = Vec::new();
        for record in DescriptorWalker::new(self.class_chain()) {
            if record.descriptor_type() == DESC_TYPE_CS_INTERFACE
                && record.bytes[2] == AC_SUBTYPE_FEATURE_UNIT
            {
                let channels = (record.bytes.len() - FEATURE_UNIT_FIXED_SIZE) / 2;
                fixups.push((start + record.offset, channels));
            }
        }
        for (offset, channels) in fixups {
            let bitmap_base = offset + FEATURE_UNIT_BITMAP_OFFSET;
            let first = [self.chain[bitmap_base], self.chain[bitmap_base + 1]];
            for ch in 1..channels {
                let at = bitmap_base + 2 * ch;
                self.chain[at] = first[0];
                self.chain[at + 1] = first[1];
            }
        }
    }
}

/// One record in a descriptor chain.
#[derive(Clone, Copy)]
pub(crate) struct Record<'a> {
    /// Offset of the record within the walked slice.
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl<'a> Record<'a> {
    pub fn descriptor_type(&self) -> u8 {
        self.bytes[1]
    }

    pub fn u16_at(&self, index: usize) -> u16 {
        u16::from_le_bytes([self.bytes[index], self.bytes[index + 1]])
    }
}

/// Bounds-checked cursor over a length-prefixed descriptor chain. A record
/// declaring a length shorter than its own header or overrunning the slice
/// terminates the walk.
pub(crate) struct DescriptorWalker<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> DescriptorWalker<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl<'a> Iterator for DescriptorWalker<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Record<'a>> {
        let rest = self.bytes.get(self.offset..)?;
        if rest.len() < 2 {
            return None;
        }
        let length = rest[0] as usize;
        if length < 2 || length > rest.len() {
            return None;
        }
        let record = Record {
            offset: self.offset,
            bytes: &rest[..length],
        };
        self.offset += length;
        Some(record)
    }
}

fn push_std_interface(out: &mut Vec<u8>, number: u8, alternate: u8, num_endpoints: u8, subclass: u8) {
    out.extend_from_slice(&[
        STD_INTERFACE_DESC_SIZE as u8,
        DESC_TYPE_INTERFACE,
        number,
        alternate,
        num_endpoints,
        AUDIO_CLASS,
        subclass,
        0x00, // bInterfaceProtocol
        0x00, // iInterface
    ]);
}

fn push_ac_header(out: &mut Vec<u8>, stream_count: u8, total_length: u16) {
    let [total_lo, total_hi] = total_length.to_le_bytes();
    out.extend_from_slice(&[
        AC_HEADER_FIXED_SIZE as u8 + stream_count,
        DESC_TYPE_CS_INTERFACE,
        AC_SUBTYPE_HEADER,
        0x00,
        0x01, // bcdADC 1.00
        total_lo,
        total_hi,
        stream_count,
    ]);
    // baInterfaceNr; assigned at finalize.
    out.resize(out.len() + stream_count as usize, 0);
}

fn push_input_terminal(out: &mut Vec<u8>, id: u8, terminal_type: u16, channels: ChannelConfig) {
    let [type_lo, type_hi] = terminal_type.to_le_bytes();
    let [cfg_lo, cfg_hi] = channels.bits().to_le_bytes();
    out.extend_from_slice(&[
        INPUT_TERMINAL_DESC_SIZE as u8,
        DESC_TYPE_CS_INTERFACE,
        AC_SUBTYPE_INPUT_TERMINAL,
        id,
        type_lo,
        type_hi,
        0x00, // bAssocTerminal
        channels.channel_count().max(1),
        cfg_lo,
        cfg_hi,
        0x00, // iChannelNames
        0x00, // iTerminal
    ]);
}

fn push_feature_unit(out: &mut Vec<u8>, id: u8, source: u8, controls: FeatureControls, channel_count: u8) {
    let length = FEATURE_UNIT_FIXED_SIZE as u8 + 2 * channel_count;
    out.extend_from_slice(&[
        length,
        DESC_TYPE_CS_INTERFACE,
        AC_SUBTYPE_FEATURE_UNIT,
        id,
        source,
    ]);
    out.push(2); // bControlSize
    // Only channel 0's bitmap is meaningful before finalize; the rest are
    // placeholders it overwrites.
    out.extend_from_slice(&controls.bits().to_le_bytes());
    out.resize(out.len() + 2 * channel_count.saturating_sub(1) as usize, 0);
    out.push(0); // iFeature
}

fn push_output_terminal(out: &mut Vec<u8>, id: u8, source: u8, terminal_type: u16) {
    let [type_lo, type_hi] = terminal_type.to_le_bytes();
    out.extend_from_slice(&[
        OUTPUT_TERMINAL_DESC_SIZE as u8,
        DESC_TYPE_CS_INTERFACE,
        AC_SUBTYPE_OUTPUT_TERMINAL,
        id,
        type_lo,
        type_hi,
        0x00, // bAssocTerminal
        source,
        0x00, // iTerminal
    ]);
}

fn push_as_general(out: &mut Vec<u8>, terminal_link: u8) {
    out.extend_from_slice(&[
        AS_GENERAL_DESC_SIZE as u8,
        DESC_TYPE_CS_INTERFACE,
        AS_SUBTYPE_GENERAL,
        terminal_link,
        0x00, // bDelay
        0x01,
        0x00, // wFormatTag: PCM
    ]);
}

fn push_format_type_i(out: &mut Vec<u8>, channels: ChannelConfig, resolution_bits: u8, sample_rate_hz: u32) {
    let rate = sample_rate_hz.to_le_bytes();
    out.extend_from_slice(&[
        FORMAT_TYPE_I_DESC_SIZE as u8,
        DESC_TYPE_CS_INTERFACE,
        AS_SUBTYPE_FORMAT_TYPE,
        0x01, // bFormatType: Type I
        channels.channel_count().max(1),
        2, // bSubframeSize
        resolution_bits,
        1, // bSamFreqType: one discrete rate
        rate[0],
        rate[1],
        rate[2],
    ]);
}

fn push_iso_endpoint(out: &mut Vec<u8>, address: u8) {
    out.extend_from_slice(&[
        STD_AS_ENDPOINT_DESC_SIZE as u8,
        DESC_TYPE_ENDPOINT,
        address,
        EP_ATTR_ISOCHRONOUS,
        0xC0,
        0x00, // wMaxPacketSize 192
        0x01, // bInterval: every frame
        0x00, // bRefresh
        0x00, // bSynchAddress
    ]);
}

fn push_cs_iso_endpoint(out: &mut Vec<u8>) {
    out.extend_from_slice(&[
        CS_AS_ENDPOINT_DESC_SIZE as u8,
        DESC_TYPE_CS_ENDPOINT,
        0x01, // EP_GENERAL
        0x00, // bmAttributes
        0x00, // bLockDelayUnits
        0x00,
        0x00, // wLockDelay
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_headphones() -> AudioDescriptors {
        TopologyBuilder::new(1)
            .stream(StreamConfig::headphones(
                0x01,
                ChannelConfig::LEFT_FRONT | ChannelConfig::RIGHT_FRONT,
                FeatureControls::MUTE,
            ))
            .finalize(0)
    }

    #[test]
    #[should_panic(expected = "at least one channel")]
    fn stream_rejects_empty_channel_sets() {
        let _ = TopologyBuilder::new(1).stream(StreamConfig::headphones(
            0x01,
            ChannelConfig::empty(),
            FeatureControls::MUTE,
        ));
    }

    #[test]
    fn walker_stops_on_zero_length_record() {
        let bytes = [2u8, 0x24, 0, 0x24, 9, 0x05];
        let records: Vec<_> = DescriptorWalker::new(&bytes).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bytes, &[2, 0x24]);
    }

    #[test]
    fn walker_stops_on_truncated_record() {
        let bytes = [7u8, 0x24, 0x01, 0x00];
        assert_eq!(DescriptorWalker::new(&bytes).count(), 0);
    }

    #[test]
    fn header_total_length_covers_entities() {
        let desc = stereo_headphones();
        // Header (8 + 1) + input terminal (12) + feature unit (7 + 2*2)
        // + output terminal (9).
        assert_eq!(desc.total_class_length(), 9 + 12 + 11 + 9);
        assert_eq!(desc.class_chain().len(), desc.total_class_length() as usize);
    }

    #[test]
    fn feature_unit_length_encodes_channel_count() {
        let desc = stereo_headphones();
        let record = DescriptorWalker::new(desc.class_chain())
            .find(|r| {
                r.descriptor_type() == DESC_TYPE_CS_INTERFACE
                    && r.bytes[2] == AC_SUBTYPE_FEATURE_UNIT
            })
            .unwrap();
        assert_eq!(record.bytes.len(), FEATURE_UNIT_FIXED_SIZE + 2 * 2);
    }

    #[test]
    fn terminal_link_points_at_usb_side() {
        // Receive stream: the input terminal faces the host.
        let desc = stereo_headphones();
        let general = DescriptorWalker::new(desc.bytes())
            .filter(|r| r.descriptor_type() == DESC_TYPE_CS_INTERFACE)
            .find(|r| r.offset > desc.total_class_length() as usize && r.bytes[2] == AS_SUBTYPE_GENERAL)
            .unwrap();
        assert_eq!(general.bytes[3], 1);

        let mic = TopologyBuilder::new(4)
            .stream(StreamConfig::microphone(
                0x81,
                ChannelConfig::LEFT_FRONT,
                FeatureControls::MUTE,
            ))
            .finalize(0);
        let general = DescriptorWalker::new(mic.bytes())
            .filter(|r| r.descriptor_type() == DESC_TYPE_CS_INTERFACE)
            .find(|r| r.offset > mic.total_class_length() as usize && r.bytes[2] == AS_SUBTYPE_GENERAL)
            .unwrap();
        // Transmit stream: the output terminal (base + 2) faces the host.
        assert_eq!(general.bytes[3], 6);
    }
}

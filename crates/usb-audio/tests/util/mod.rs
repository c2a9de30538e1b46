#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use usb_audio::{
    AudioDescriptors, AudioOps, AudioRegistry, BufferPool, ChannelConfig, DeviceId,
    FeatureControls, FeatureUnitEvent, IsoTransport, SetupPacket, StreamBuffer, StreamConfig,
    StreamDirection, TopologyBuilder,
};

pub const HP_OUT_EP: u8 = 0x01;
pub const MIC_IN_EP: u8 = 0x81;
pub const HS_IN_EP: u8 = 0x82;
pub const HS_OUT_EP: u8 = 0x02;

/// Stereo headphones, mute only: entities IT=base, FU=base+1, OT=base+2.
pub fn stereo_headphones(base_entity: u8) -> AudioDescriptors {
    TopologyBuilder::new(base_entity)
        .stream(StreamConfig::headphones(
            HP_OUT_EP,
            ChannelConfig::LEFT_FRONT | ChannelConfig::RIGHT_FRONT,
            FeatureControls::MUTE,
        ))
        .finalize(0)
}

/// Mono microphone, mute only.
pub fn mono_microphone(base_entity: u8) -> AudioDescriptors {
    TopologyBuilder::new(base_entity)
        .stream(StreamConfig::microphone(
            MIC_IN_EP,
            ChannelConfig::LEFT_FRONT,
            FeatureControls::MUTE,
        ))
        .finalize(0)
}

/// Bidirectional headset: ISO IN stream first, two independent chains.
pub fn headset(base_entity: u8) -> AudioDescriptors {
    let channels = ChannelConfig::LEFT_FRONT | ChannelConfig::RIGHT_FRONT;
    TopologyBuilder::new(base_entity)
        .stream(StreamConfig::headset(
            StreamDirection::Transmit,
            HS_IN_EP,
            channels,
            FeatureControls::MUTE,
        ))
        .stream(StreamConfig::headset(
            StreamDirection::Receive,
            HS_OUT_EP,
            channels,
            FeatureControls::MUTE,
        ))
        .finalize(0)
}

#[derive(Default)]
pub struct Recorder {
    pub events: Vec<FeatureUnitEvent>,
    pub data_requests: usize,
    pub written: Vec<usize>,
    /// (length, payload) per delivery; buffers are dropped after copying
    /// unless `hold_buffers` is set.
    pub received: Vec<(usize, Vec<u8>)>,
    pub hold_buffers: bool,
    pub held: Vec<StreamBuffer>,
}

pub struct RecordingOps(pub Rc<RefCell<Recorder>>);

impl AudioOps for RecordingOps {
    fn data_request(&mut self) {
        self.0.borrow_mut().data_requests += 1;
    }

    fn data_written(&mut self, length: usize) {
        self.0.borrow_mut().written.push(length);
    }

    fn data_received(&mut self, buffer: StreamBuffer, length: usize) {
        let mut rec = self.0.borrow_mut();
        rec.received.push((length, buffer[..length].to_vec()));
        if rec.hold_buffers {
            rec.held.push(buffer);
        }
    }

    fn feature_updated(&mut self, event: FeatureUnitEvent) {
        self.0.borrow_mut().events.push(event);
    }
}

pub fn recording_ops() -> (Box<RecordingOps>, Rc<RefCell<Recorder>>) {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    (Box::new(RecordingOps(Rc::clone(&recorder))), recorder)
}

/// Transport double: records IN submissions, serves scripted OUT deliveries.
#[derive(Default)]
pub struct ScriptedTransport {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub pending_read: Option<Vec<u8>>,
    pub reads: usize,
}

impl IsoTransport for ScriptedTransport {
    fn write(&mut self, endpoint: u8, data: &[u8]) {
        self.writes.push((endpoint, data.to_vec()));
    }

    fn read(&mut self, _endpoint: u8, buf: &mut [u8]) -> usize {
        self.reads += 1;
        let Some(data) = self.pending_read.take() else {
            return 0;
        };
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        n
    }
}

pub fn registry() -> AudioRegistry {
    init_tracing();
    AudioRegistry::new(BufferPool::new(4, 64))
}

/// Route crate logs through the test harness.
pub fn init_tracing() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn register(
    registry: &mut AudioRegistry,
    descriptors: AudioDescriptors,
) -> (DeviceId, Rc<RefCell<Recorder>>) {
    let (ops, recorder) = recording_ops();
    let id = registry.register(descriptors, ops);
    (id, recorder)
}

pub fn setup(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> SetupPacket {
    SetupPacket {
        request_type,
        request,
        value,
        index,
        length,
    }
}

/// Interface-recipient class request addressed to `entity` via `interface`.
pub fn class_request(
    device_to_host: bool,
    request: u8,
    selector: u8,
    channel: u8,
    entity: u8,
    interface: u8,
    length: u16,
) -> SetupPacket {
    let request_type = if device_to_host { 0xA1 } else { 0x21 };
    setup(
        request_type,
        request,
        u16::from(selector) << 8 | u16::from(channel),
        u16::from(entity) << 8 | u16::from(interface),
        length,
    )
}

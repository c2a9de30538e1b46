//! Alternate-setting notifications driving the per-direction enable flags.

mod util;

#[test]
fn selecting_alt_one_enables_the_interface_direction() {
    let mut registry = util::registry();
    let (hp, _) = util::register(&mut registry, util::stereo_headphones(1));

    assert!(!registry.rx_enabled(hp));
    registry.on_alternate_setting(1, 1);
    assert!(registry.rx_enabled(hp));
    assert!(!registry.tx_enabled(hp));

    registry.on_alternate_setting(1, 0);
    assert!(!registry.rx_enabled(hp));
}

#[test]
fn headset_directions_toggle_independently() {
    let mut registry = util::registry();
    let (hs, _) = util::register(&mut registry, util::headset(1));

    // Interface 1 carries the ISO IN endpoint, interface 2 the ISO OUT.
    registry.on_alternate_setting(1, 1);
    assert!(registry.tx_enabled(hs));
    assert!(!registry.rx_enabled(hs));

    registry.on_alternate_setting(2, 1);
    assert!(registry.tx_enabled(hs));
    assert!(registry.rx_enabled(hs));

    registry.on_alternate_setting(1, 0);
    assert!(!registry.tx_enabled(hs));
    assert!(registry.rx_enabled(hs));
}

#[test]
fn devices_ignore_interfaces_they_do_not_own() {
    let mut registry = util::registry();
    let (hp, _) = util::register(&mut registry, util::stereo_headphones(1));

    registry.on_alternate_setting(9, 1);
    assert!(!registry.rx_enabled(hp));
    assert!(!registry.tx_enabled(hp));

    // The AudioControl interface has no alternate settings to react to.
    registry.on_alternate_setting(0, 1);
    assert!(!registry.rx_enabled(hp));
    assert!(!registry.tx_enabled(hp));
}

#[test]
fn broadcast_reaches_only_the_owning_device() {
    let mut registry = util::registry();
    let (hp, _) = util::register(&mut registry, util::stereo_headphones(1));

    // Second function stacked after the first: AC=2, streaming=3.
    let mic_desc = {
        use usb_audio::{ChannelConfig, FeatureControls, StreamConfig, TopologyBuilder};
        TopologyBuilder::new(1)
            .stream(StreamConfig::microphone(
                util::MIC_IN_EP,
                ChannelConfig::LEFT_FRONT,
                FeatureControls::MUTE,
            ))
            .finalize(2)
    };
    let (mic, _) = util::register(&mut registry, mic_desc);

    registry.on_alternate_setting(3, 1);
    assert!(registry.tx_enabled(mic));
    assert!(!registry.rx_enabled(hp));

    registry.on_alternate_setting(1, 1);
    assert!(registry.rx_enabled(hp));
    assert!(registry.tx_enabled(mic));
}

#[test]
fn nonzero_alternate_settings_all_activate() {
    // Hosts only ever select 0 or 1 here, but any non-zero value means the
    // operational setting.
    let mut registry = util::registry();
    let (hp, _) = util::register(&mut registry, util::stereo_headphones(1));

    registry.on_alternate_setting(1, 1);
    assert!(registry.rx_enabled(hp));
    registry.on_alternate_setting(1, 1);
    assert!(registry.rx_enabled(hp));
}

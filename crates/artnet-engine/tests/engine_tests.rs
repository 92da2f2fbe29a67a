use artnet_engine::codec::{self, HEADER_LEN};
use artnet_engine::{
    ArtNetEngine, ArtNetError, ArtNetSettings, EngineState, StoreWrite, UniverseAddress,
};
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn receiver() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind receiver");
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("Failed to set read timeout");
    socket
}

fn settings_for(receiver: &UdpSocket) -> ArtNetSettings {
    let port = receiver.local_addr().unwrap().port();
    ArtNetSettings::new("127.0.0.1", 0)
        .with_destination("127.0.0.1")
        .with_destination_port(port)
}

fn running_engine(settings: &ArtNetSettings) -> ArtNetEngine {
    let engine = ArtNetEngine::new();
    engine.configure(settings).expect("configure failed");
    engine.start().expect("start failed");
    engine
}

fn recv_packet(receiver: &UdpSocket) -> Vec<u8> {
    let mut buf = [0u8; 1024];
    let (len, _) = receiver.recv_from(&mut buf).expect("No datagram received");
    buf[..len].to_vec()
}

fn address(net: u8, subnet: u8, universe: u8) -> UniverseAddress {
    UniverseAddress::new(net, subnet, universe).unwrap()
}

#[test]
fn test_end_to_end_packet_bytes() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx).with_address(0, 0, 1));
    assert!(engine.is_running());

    engine
        .set_dmx_data(Some(address(0, 0, 1)), &[255, 0, 128])
        .unwrap();
    let report = engine.send_dmx().unwrap();
    assert_eq!(report.sent, vec![address(0, 0, 1)]);

    let packet = recv_packet(&rx);
    let expected: Vec<u8> = [
        &b"Art-Net\0"[..],
        &[0x00, 0x50],
        &[0x00, 0x0E],
        &[0x01],
        &[0x00],
        &[0x01],
        &[0x00],
        &[0x00, 0x04],
        &[0xFF, 0x00, 0x80, 0x00],
    ]
    .concat();
    assert_eq!(packet, expected);

    engine.stop();
    assert!(!engine.is_running());
}

#[test]
fn test_sequence_wraps_to_one_after_255() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx));
    engine.set_dmx_data(None, &[1, 2]).unwrap();

    for i in 0..300usize {
        engine.send_dmx().unwrap();
        let packet = recv_packet(&rx);
        let expected = (i % 255) as u8 + 1;
        assert_eq!(packet[12], expected, "send #{}", i);
    }
}

#[test]
fn test_sequencing_disabled_sends_zero() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx).with_sequencing(false));
    engine.set_dmx_data(None, &[1]).unwrap();

    for _ in 0..3 {
        engine.send_dmx().unwrap();
        assert_eq!(recv_packet(&rx)[12], 0);
    }
}

#[test]
fn test_oversized_data_sends_first_512_channels() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx));
    let data: Vec<u8> = (0..600).map(|i| (i * 7 % 256) as u8).collect();

    let outcome = engine.set_dmx_data(None, &data).unwrap();
    assert_eq!(outcome, StoreWrite::Truncated { dropped: 88 });
    engine.send_dmx().unwrap();

    let packet = recv_packet(&rx);
    assert_eq!(&packet[16..18], &[0x02, 0x00]);
    assert_eq!(packet.len(), HEADER_LEN + 512);
    assert_eq!(&packet[HEADER_LEN..], &data[..512]);
}

#[test]
fn test_universes_sent_in_insertion_order() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx));
    let order = [address(0, 1, 0), address(3, 0, 2), address(0, 0, 0)];
    for (i, a) in order.iter().enumerate() {
        engine.set_dmx_data(Some(*a), &[i as u8; 8]).unwrap();
    }

    let report = engine.send_dmx().unwrap();
    assert_eq!(report.sent, order.to_vec());

    for (i, a) in order.iter().enumerate() {
        let decoded = codec::decode(&recv_packet(&rx)).unwrap();
        assert_eq!(decoded.address, *a);
        assert_eq!(decoded.data, vec![i as u8; 8]);
        assert_eq!(decoded.sequence, 1);
    }
}

#[test]
fn test_empty_store_sends_nothing() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx));
    let report = engine.send_dmx().unwrap();
    assert!(report.is_empty());
}

#[test]
fn test_stop_then_send_is_not_running() {
    let rx = receiver();
    let engine = running_engine(&settings_for(&rx));
    engine.set_dmx_data(None, &[1]).unwrap();
    engine.send_dmx().unwrap();
    recv_packet(&rx);

    engine.stop();
    engine.stop();
    assert_eq!(engine.state(), EngineState::Configured);
    assert!(matches!(engine.send_dmx(), Err(ArtNetError::NotRunning)));

    // Buffers and sequence counters survive a restart
    engine.start().unwrap();
    engine.send_dmx().unwrap();
    assert_eq!(recv_packet(&rx)[12], 2);
}

#[test]
fn test_concurrent_updates_and_sends() {
    let rx = receiver();
    let engine = Arc::new(running_engine(&settings_for(&rx)));
    engine.set_dmx_data(None, &[0u8; 512]).unwrap();

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for value in 0..=255u8 {
                engine.set_dmx_data(None, &[value; 512]).unwrap();
            }
        })
    };

    let mut last_sequence = 0u8;
    for _ in 0..50 {
        engine.send_dmx().unwrap();
        let decoded = codec::decode(&recv_packet(&rx)).unwrap();
        let first = decoded.data[0];
        assert!(decoded.data.iter().all(|&c| c == first));
        assert_eq!(decoded.sequence, last_sequence + 1);
        last_sequence = decoded.sequence;
    }

    writer.join().unwrap();
}

#[test]
fn test_stop_waits_for_send_pass_and_frees_port() {
    let rx = receiver();
    let port = {
        let free = UdpSocket::bind("127.0.0.1:0").unwrap();
        free.local_addr().unwrap().port()
    };
    let settings = ArtNetSettings::new("127.0.0.1", port as u32)
        .with_destination("127.0.0.1")
        .with_destination_port(rx.local_addr().unwrap().port());

    let engine = Arc::new(ArtNetEngine::new());
    engine.configure(&settings).unwrap();
    for port_address in 0..5000u16 {
        let universe = UniverseAddress::from_port_address(port_address).unwrap();
        engine.set_dmx_data(Some(universe), &[1, 2, 3, 4]).unwrap();
    }

    for cycle in 0..10 {
        engine.start().unwrap_or_else(|e| panic!("restart #{} failed: {}", cycle, e));

        let sender = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let _ = engine.send_dmx();
            })
        };

        thread::sleep(Duration::from_millis(2));
        engine.stop();
        assert!(!engine.is_running());

        // The port is free as soon as stop returns
        let rebound = UdpSocket::bind(("127.0.0.1", port));
        assert!(rebound.is_ok(), "port still bound after stop in cycle {}", cycle);
        drop(rebound);

        sender.join().unwrap();
    }

    engine.start().unwrap();
    engine.stop();
}

/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// tests/client.rs
// MqttClient against local sockets: ones that are not MQTT brokers,
// and a minimal in-process broker that speaks just enough MQTT 3.1.1
// for a QoS 1 publish and a clean disconnect.

use std::time::Duration;

use roomtemp_mqtt::{ClientOptions, MqttClient, MqttClientError, QoS};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
const PINGRESP: [u8; 2] = [0xD0, 0x00];

const PUBLISH: u8 = 3;
const PINGREQ: u8 = 12;
const DISCONNECT: u8 = 14;

/// One control packet as read off the wire.
struct RawPacket {
    header: u8,
    body: Vec<u8>,
}

impl RawPacket {
    fn packet_type(&self) -> u8 {
        self.header >> 4
    }

    fn qos(&self) -> u8 {
        (self.header >> 1) & 0b11
    }
}

async fn read_packet(stream: &mut TcpStream) -> std::io::Result<RawPacket> {
    let header = stream.read_u8().await?;

    // Remaining length is a base-128 varint.
    let mut remaining = 0usize;
    let mut shift = 0;
    loop {
        let byte = stream.read_u8().await?;
        remaining |= usize::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    let mut body = vec![0u8; remaining];
    stream.read_exact(&mut body).await?;
    Ok(RawPacket { header, body })
}

/// Accepts one client, acknowledges its CONNECT and every QoS 1
/// PUBLISH, and returns the packets it saw up to DISCONNECT.
async fn fake_broker(listener: TcpListener) -> Vec<RawPacket> {
    let (mut stream, _) = listener.accept().await.unwrap();

    let connect = read_packet(&mut stream).await.unwrap();
    assert_eq!(connect.packet_type(), 1, "first packet should be CONNECT");
    stream.write_all(&CONNACK_ACCEPTED).await.unwrap();

    let mut seen = Vec::new();
    loop {
        let packet = read_packet(&mut stream).await.unwrap();
        match packet.packet_type() {
            PUBLISH if packet.qos() == 1 => {
                // Variable header: topic (u16 length + bytes), then packet id.
                let topic_len = usize::from(u16::from_be_bytes([packet.body[0], packet.body[1]]));
                let pkid = &packet.body[2 + topic_len..4 + topic_len];
                stream
                    .write_all(&[0x40, 0x02, pkid[0], pkid[1]])
                    .await
                    .unwrap();
            }
            PINGREQ => stream.write_all(&PINGRESP).await.unwrap(),
            _ => {}
        }

        let done = packet.packet_type() == DISCONNECT;
        seen.push(packet);
        if done {
            return seen;
        }
    }
}

#[tokio::test]
async fn test_connect_refused_is_connection_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let options = ClientOptions::default().with_connect_timeout(Duration::from_secs(5));
    let result = MqttClient::connect("127.0.0.1", port, "test-client", Some(options)).await;

    match result {
        Err(MqttClientError::ConnectionError(_)) => {} // Expected
        Err(e) => panic!("Should be ConnectionError, got {e}"),
        Ok(_) => panic!("Nothing is listening, connect should fail"),
    }
}

#[tokio::test]
async fn test_connect_times_out_without_connack() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // Accept the TCP connection and swallow the CONNECT without
    // ever answering it.
    let silent_broker = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 256];
        while let Ok(n) = stream.read(&mut buf).await {
            if n == 0 {
                break;
            }
        }
    });

    let connect_timeout = Duration::from_millis(300);
    let options = ClientOptions::default().with_connect_timeout(connect_timeout);
    let result = MqttClient::connect("127.0.0.1", port, "test-client", Some(options)).await;

    match result {
        Err(MqttClientError::ConnectTimeout(waited)) => assert_eq!(waited, connect_timeout),
        Err(e) => panic!("Should be ConnectTimeout, got {e}"),
        Ok(_) => panic!("Silent broker never sends CONNACK"),
    }
    silent_broker.abort();
}

#[tokio::test]
async fn test_publish_and_disconnect_against_fake_broker() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let broker = tokio::spawn(fake_broker(listener));

    let options = ClientOptions::default().with_connect_timeout(Duration::from_secs(5));
    let mut client = MqttClient::connect("127.0.0.1", port, "test-client", Some(options))
        .await
        .unwrap();
    assert_eq!(client.broker(), format!("127.0.0.1:{port}"));

    let payload = br#"{"temperature": 8, "date": "07-03-2026 09:05:02"}"#.to_vec();
    let payload_len = payload.len();
    client
        .publish("device/WHHTS1/data", payload, QoS::AtLeastOnce)
        .await
        .unwrap();

    // The PUBACK is counted by the event loop task.
    timeout(Duration::from_secs(5), async {
        while client.publish_stats().total_acknowledged == 0 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("broker PUBACK should be counted");

    // Well under the client's own fallback, so the event loop must
    // have stopped by itself after writing DISCONNECT.
    timeout(Duration::from_secs(2), client.disconnect())
        .await
        .expect("disconnect should not wait for the abort fallback")
        .unwrap();

    let stats = client.publish_stats();
    assert_eq!(stats.total_published, 1);
    assert_eq!(stats.total_failed, 0);
    assert_eq!(stats.total_acknowledged, 1);
    assert_eq!(stats.total_bytes_published, payload_len);
    assert_eq!(stats.unacknowledged(), 0);

    let seen = timeout(Duration::from_secs(5), broker)
        .await
        .expect("broker should see DISCONNECT")
        .unwrap();
    let packet_types: Vec<u8> = seen
        .iter()
        .map(RawPacket::packet_type)
        .filter(|t| *t != PINGREQ)
        .collect();
    assert_eq!(packet_types, vec![PUBLISH, DISCONNECT]);

    let publish = seen
        .iter()
        .find(|packet| packet.packet_type() == PUBLISH)
        .unwrap();
    assert_eq!(publish.qos(), 1);
    assert!(
        publish
            .body
            .windows(payload_len)
            .any(|window| window == br#"{"temperature": 8, "date": "07-03-2026 09:05:02"}"#)
    );
}

use std::net::{TcpListener, TcpStream};
use std::thread;

use msgess::{ErrorKind, MessageExchange};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const REQUEST_CLASS: u32 = 456;
const REPLY_CLASS: u32 = 457;

#[derive(Debug, Serialize, Deserialize)]
struct Request {
    message_number: u32,
    close_connection: bool,
}

fn listener() -> (TcpListener, std::net::SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("listener should have an address");
    (listener, addr)
}

#[test]
fn request_reply_session_until_client_asks_to_close() {
    let (listener, addr) = listener();

    let server = thread::spawn(move || {
        let (stream, peer_addr) = listener.accept().expect("accept should succeed");
        let mut exchange = MessageExchange::new(stream);
        let mut handled = 0;

        loop {
            let (object, class) = exchange
                .receive_json_object()
                .expect("request should decode");
            assert_eq!(class, REQUEST_CLASS);
            let request: Request =
                serde_json::from_value(Value::Object(object)).expect("request should match");

            exchange
                .send_json_object(
                    &json!({
                        "message_from": [peer_addr.ip().to_string(), peer_addr.port()],
                        "echo": request.message_number,
                    }),
                    REPLY_CLASS,
                )
                .expect("reply should send");
            handled += 1;

            if request.close_connection {
                break;
            }
        }
        handled
    });

    let stream = TcpStream::connect(addr).expect("connect should succeed");
    let mut client = MessageExchange::new(stream);
    client
        .set_compression(false, None)
        .expect("disabling compression should succeed");

    for message_number in 1..=5 {
        let request = Request {
            message_number,
            close_connection: message_number == 5,
        };
        client
            .send_json_object(&request, REQUEST_CLASS)
            .expect("request should send");

        let (reply, class) = client.receive_json_object().expect("reply should decode");
        assert_eq!(class, REPLY_CLASS);
        assert_eq!(reply.get("echo"), Some(&json!(message_number)));
    }

    client.close().expect("close should succeed");
    assert_eq!(server.join().expect("server thread should not panic"), 5);
}

#[test]
fn large_compressed_and_plain_messages_cross_the_wire() {
    let (listener, addr) = listener();
    let big: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let expected = big.clone();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept should succeed");
        let mut exchange = MessageExchange::new(stream);
        exchange
            .incoming_binary()
            .collect::<msgess::Result<Vec<_>>>()
            .expect("every message should decode")
    });

    let mut client = MessageExchange::new(TcpStream::connect(addr).expect("connect should succeed"));
    client.send_binary(&big, 1).expect("compressed send");
    client.set_compression(false, None).expect("toggle");
    client.send_binary(&big, 2).expect("plain send");
    client.close().expect("close should succeed");

    let received = server.join().expect("server thread should not panic");
    assert_eq!(received.len(), 2);
    for (index, (body, class)) in received.into_iter().enumerate() {
        assert_eq!(class, index as u32 + 1);
        assert_eq!(body, expected);
    }
}

#[test]
fn peer_closing_mid_frame_is_a_transport_error() {
    let (listener, addr) = listener();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept should succeed");
        let mut exchange = MessageExchange::new(stream);
        exchange.receive_string().expect_err("truncated frame")
    });

    let mut client = TcpStream::connect(addr).expect("connect should succeed");
    std::io::Write::write_all(&mut client, b"MsgESSbegin\x00\x00\x00\x02\x00\x00")
        .expect("partial header should send");
    drop(client);

    let err = server.join().expect("server thread should not panic");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!err.is_peer_closed());
}

#[test]
fn garbage_is_a_protocol_error() {
    let (listener, addr) = listener();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept should succeed");
        let mut exchange = MessageExchange::new(stream);
        exchange.receive_binary().expect_err("bad marker")
    });

    let mut client = TcpStream::connect(addr).expect("connect should succeed");
    std::io::Write::write_all(&mut client, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .expect("request should send");

    let err = server.join().expect("server thread should not panic");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    drop(client);
}

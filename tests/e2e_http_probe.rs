//! End-to-end throughput probe over HTTP on the loopback interface.

use bench_transport::{
    HttpReceiver, ReceiverTransport, SenderTransport, ThroughputProbe, TransportError,
};
use ccb_bench::{bench, ProbeOpts};
use std::time::Duration;
use tokio::net::TcpStream;

fn opts(buffer_size: usize, buffer_count: u64) -> ProbeOpts {
    ProbeOpts {
        buffer_size,
        buffer_count,
    }
}

/// Pick a port nothing listens on right now.
fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_listener(port: u16) {
    for _ in 0..100 {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("receiver on port {port} never started listening");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sender_and_receiver_over_http() {
    let port = free_port();
    let receiver = tokio::spawn(async move {
        bench::run_receiver(
            ReceiverTransport::Http {
                host: "127.0.0.1".to_string(),
                port,
            },
            &opts(64 * 1024, 20),
        )
        .await
    });
    wait_for_listener(port).await;

    let sent = bench::run_sender(
        SenderTransport::Http {
            host: "127.0.0.1".to_string(),
            port,
        },
        &opts(64 * 1024, 20),
    )
    .await
    .unwrap();
    let received = receiver.await.unwrap().unwrap();

    for report in [&sent, &received] {
        assert_eq!(report.buffer_size, 64 * 1024);
        assert_eq!(report.buffer_count, 20);
        assert!(report.stopped_at_ms >= report.started_at_ms);
        assert!(report.summary().contains("rate: "));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_receiver_rejects_oversized_buffers() {
    let mut receiver = HttpReceiver::bind("127.0.0.1", 0).await.unwrap();
    let port = receiver.local_addr().port();

    let sender = tokio::spawn(async move {
        bench::run_sender(
            SenderTransport::Http {
                host: "127.0.0.1".to_string(),
                port,
            },
            &opts(2048, 50),
        )
        .await
    });

    let result = ThroughputProbe::new(1024, 1)
        .run_receiver(&mut receiver)
        .await;
    assert!(matches!(
        result,
        Err(TransportError::Oversized {
            size: 2048,
            max_size: 1024
        })
    ));

    // Once the receiver is closed the endpoint refuses further buffers.
    let sent = tokio::time::timeout(Duration::from_secs(30), sender)
        .await
        .unwrap()
        .unwrap();
    assert!(sent.is_err());
}

#[tokio::test]
async fn test_sender_without_receiver_fails() {
    let result = bench::run_sender(
        SenderTransport::Http {
            host: "127.0.0.1".to_string(),
            port: free_port(),
        },
        &opts(16, 1),
    )
    .await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("http sender failed"));
}

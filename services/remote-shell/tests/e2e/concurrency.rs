//! E2E test: handlers run independently of each other

use std::time::{Duration, Instant};

use crate::harness::TestServer;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_clients_get_their_own_output() {
    let server = std::sync::Arc::new(TestServer::start().await);

    let mut handles = Vec::new();
    for i in 0..16 {
        let server = std::sync::Arc::clone(&server);
        handles.push(tokio::spawn(async move {
            let response = server
                .send_command(&format!("sleep 0.$(( {} % 3 )); echo client-{}", i, i))
                .await;
            (i, response)
        }));
    }

    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response.status_line, "HTTP/1.1 200 OK");
        assert_eq!(response.body_text(), format!("client-{}\n", i));
    }

    match std::sync::Arc::try_unwrap(server) {
        Ok(server) => server.stop().await,
        Err(_) => panic!("server still shared"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_command_does_not_block_others() {
    let server = std::sync::Arc::new(TestServer::start().await);

    let slow = {
        let server = std::sync::Arc::clone(&server);
        tokio::spawn(async move { server.send_command("sleep 3; echo slow").await })
    };

    // Give the slow request time to be accepted and start running
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    let fast = tokio::time::timeout(Duration::from_secs(2), server.send_command("echo fast"))
        .await
        .expect("fast request was blocked behind the slow one");
    assert_eq!(fast.body, b"fast\n");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!slow.is_finished());

    let slow = slow.await.unwrap();
    assert_eq!(slow.body, b"slow\n");

    match std::sync::Arc::try_unwrap(server) {
        Ok(server) => server.stop().await,
        Err(_) => panic!("server still shared"),
    }
}

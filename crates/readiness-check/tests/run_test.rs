//! Integration tests for the readiness check runner

use readiness::Termination;
use readiness_check::{Config, EXIT_NOT_READY, EXIT_READY, exit_code, run};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn tcp_config(port: u16) -> Config {
    let yaml = format!(
        r#"
probe:
  type: tcp_socket
endpoint:
  fqdn: 127.0.0.1
  port: {port}
policy:
  max_attempts: 3
  interval: 10ms
"#
    );
    Config::from_yaml(&yaml).unwrap()
}

#[tokio::test]
async fn test_run_ready_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = tcp_config(listener.local_addr().unwrap().port());

    let outcome = run(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.termination, Termination::Ready);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(exit_code(&outcome), EXIT_READY);
}

#[tokio::test]
async fn test_run_closed_port_fails_fast() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = tcp_config(port);

    let outcome = run(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.attempts, 1);
    assert!(matches!(outcome.termination, Termination::Failed(_)));
    assert_eq!(exit_code(&outcome), EXIT_NOT_READY);
}

#[tokio::test]
async fn test_run_without_probe() {
    let config = Config::from_yaml(
        r#"
endpoint:
  fqdn: 127.0.0.1
  port: 8080
"#,
    )
    .unwrap();

    let outcome = run(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.attempts, 0);
    assert_eq!(
        outcome.termination,
        Termination::Failed(readiness::ProbeError::InvalidSpec)
    );
    assert_eq!(exit_code(&outcome), EXIT_NOT_READY);
}

#[tokio::test]
async fn test_run_cancelled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = tcp_config(listener.local_addr().unwrap().port());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run(&config, cancel).await.unwrap();
    assert_eq!(outcome.termination, Termination::Cancelled);
    assert_eq!(outcome.attempts, 0);
}

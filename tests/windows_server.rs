#![cfg(windows)]
use kenobi_secbuffer::{
    windows::{Credentials, NtlmServer},
    Handshake, StepError,
};
use tracing_subscriber::EnvFilter;

fn setup_log() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn inbound_credentials_are_acquired() {
    setup_log();
    let creds = Credentials::inbound().unwrap();
    let handle = creds.handle();
    assert!(handle.dwLower != 0 || handle.dwUpper != 0);
}

#[test]
fn garbage_token_is_rejected_by_the_package() {
    setup_log();
    let creds = Credentials::inbound().unwrap();
    let mut handshake = Handshake::new(NtlmServer::new(creds));
    let err = handshake.step(Some(b"garbage")).unwrap_err();
    assert!(matches!(err, StepError::Rejected(code) if code < 0), "{err}");
    assert_eq!(handshake.rounds(), 1);
    assert!(!handshake.provider().has_context());
}

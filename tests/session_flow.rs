//! Generation session driving the real HTTP client.

mod common;

use audiogen::{
    AudioClient, BlobStore, FormState, GenerationSession, MemoryBlobStore, Outcome, Phase,
};
use common::{MockServerFixture, GENERATE_PATH};

#[tokio::test]
async fn generate_then_download() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(b"episode-audio")
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();

    let session = GenerationSession::new(
        AudioClient::from_config(&fixture.config()).unwrap(),
        MemoryBlobStore::with_download_dir(dir.path()),
    );
    let Outcome::Ready(audio) = session
        .generate(&FormState::new("Store opening announcement"))
        .await
        .unwrap()
    else {
        panic!("expected ready outcome");
    };
    assert_eq!(
        session.blobs().resolve(&audio.handle).unwrap(),
        &b"episode-audio"[..]
    );

    let path = session.download(1_700_000_000_000).unwrap().unwrap();
    assert_eq!(
        path,
        dir.path().join("audio-internal-highLevel-1700000000000.mp3")
    );
    assert_eq!(std::fs::read(&path).unwrap(), b"episode-audio");

    session.teardown();
    assert_eq!(session.blobs().live_handles(), 0);
    assert!(session.blobs().resolve(&audio.handle).is_none());
}

#[tokio::test]
async fn blank_text_sends_nothing() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", GENERATE_PATH)
        .expect(0)
        .create_async()
        .await;

    let session = GenerationSession::new(
        AudioClient::from_config(&fixture.config()).unwrap(),
        MemoryBlobStore::new(),
    );
    let outcome = session.generate(&FormState::new(" \n\t ")).await.unwrap();
    assert!(matches!(outcome, Outcome::Skipped));
    assert!(!session.is_loading());
    mock.assert_async().await;
}

#[tokio::test]
async fn server_failure_leaves_no_handle() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error("POST", GENERATE_PATH, 500, "render farm exploded")
        .await;

    let session = GenerationSession::new(
        AudioClient::from_config(&fixture.config()).unwrap(),
        MemoryBlobStore::new(),
    );
    let err = session.generate(&FormState::new("hello")).await.unwrap_err();
    assert!(err.is_server());

    let snap = session.snapshot();
    assert!(!snap.loading);
    assert!(snap.handle.is_none());
    assert!(matches!(snap.phase, Phase::Failed(ref msg) if msg.contains("render farm exploded")));
    assert_eq!(session.blobs().live_handles(), 0);
    assert!(session.download(1).unwrap().is_none());
}

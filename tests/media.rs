//! Media Adapter Tests
//!
//! Covers the media adapter on its own and the bundled camera devices.

mod common;

use common::{file_of_size, FakeCamera, FIVE_MIB};
use std::path::Path;
use tweetbox::app::media::{CaptureStart, MediaAdapter};
use tweetbox::domain::media::{content_type_from_path, DraftImage, RawFile};
use tweetbox::error::{
    device_error_message, ErrorKind, CAMERA_DENIED_MESSAGE, CAMERA_FAILED_MESSAGE,
    CAMERA_NOT_FOUND_MESSAGE, SIZE_LIMIT_MESSAGE,
};
use tweetbox::infra::camera::{MediaDevices, NoCamera, StillFrameDevices, StreamConstraints, VideoStream};

// ===========================================================================
// Media Adapter
// ===========================================================================

#[tokio::test]
async fn from_file_enforces_limit() {
    let adapter = MediaAdapter::new(FakeCamera::new());

    assert!(adapter.from_file(file_of_size(FIVE_MIB as usize)).is_ok());
    let err = adapter
        .from_file(file_of_size(FIVE_MIB as usize + 1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SizeLimit);
    assert_eq!(err.message(), SIZE_LIMIT_MESSAGE);
}

#[tokio::test]
async fn configured_limit_is_used() {
    let adapter = MediaAdapter::new(FakeCamera::new()).with_max_image_bytes(8);

    assert!(adapter.from_file(file_of_size(8)).is_ok());
    let err = adapter.from_file(file_of_size(9)).unwrap_err();
    assert_eq!(err.message(), "image must be 8 bytes or smaller");
}

#[tokio::test]
async fn size_message_names_configured_limit() {
    let adapter = MediaAdapter::new(FakeCamera::new()).with_max_image_bytes(2 * 1024 * 1024);

    let err = adapter
        .from_file(file_of_size(2 * 1024 * 1024 + 1))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SizeLimit);
    assert_eq!(err.message(), "image must be 2 MiB or smaller");
}

#[tokio::test]
async fn revalidate_uses_same_limit() {
    let image = DraftImage::validated(file_of_size(100), 100).unwrap();

    assert!(image.revalidate(100).await.is_ok());
    assert_eq!(
        image.revalidate(99).await.unwrap_err().kind(),
        ErrorKind::SizeLimit
    );
}

#[tokio::test]
async fn encode_for_transport_builds_data_uri() {
    let adapter = MediaAdapter::new(FakeCamera::new());
    let (image, _) = adapter
        .from_file(RawFile::from_bytes("hi.gif", "image/gif", b"hello".to_vec()))
        .unwrap();

    let encoded = adapter.encode_for_transport(&image).await.unwrap();

    assert_eq!(encoded, "data:image/gif;base64,aGVsbG8=");
}

#[tokio::test]
async fn encode_without_content_type_falls_back() {
    let adapter = MediaAdapter::new(FakeCamera::new());
    let (image, _) = adapter
        .from_file(RawFile::from_bytes("blob", "", vec![0u8, 1, 2]))
        .unwrap();

    let encoded = adapter.encode_for_transport(&image).await.unwrap();

    assert_eq!(encoded, "data:application/octet-stream;base64,AAEC");
}

#[tokio::test]
async fn encode_missing_file_is_encoding_error() {
    let adapter = MediaAdapter::new(FakeCamera::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.png");
    std::fs::write(&path, b"png").unwrap();
    let (image, _) = adapter
        .from_file(RawFile::from_path(&path).await.unwrap())
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    let err = adapter.encode_for_transport(&image).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[tokio::test]
async fn adapter_stop_reports_open_session() {
    let camera = FakeCamera::new();
    let adapter = MediaAdapter::new(camera.clone());

    assert_eq!(adapter.start_capture().await.unwrap(), CaptureStart::Started);
    assert!(adapter.stop_capture());
    assert!(!adapter.stop_capture());
    assert_eq!(camera.stops(), 1);
}

#[test]
fn content_type_follows_extension() {
    assert_eq!(content_type_from_path(Path::new("a/b.png")), "image/png");
    assert_eq!(content_type_from_path(Path::new("b.JPG")), "image/jpeg");
    assert_eq!(
        content_type_from_path(Path::new("notes.txt")),
        "application/octet-stream"
    );
}

#[test]
fn device_error_table_defaults_to_generic() {
    assert_eq!(device_error_message("PermissionDeniedError"), CAMERA_DENIED_MESSAGE);
    assert_eq!(device_error_message("DevicesNotFoundError"), CAMERA_NOT_FOUND_MESSAGE);
    assert_eq!(device_error_message(""), CAMERA_FAILED_MESSAGE);
    assert_eq!(device_error_message("notallowederror"), CAMERA_FAILED_MESSAGE);
}

// ===========================================================================
// Bundled Devices
// ===========================================================================

#[tokio::test]
async fn no_camera_reports_not_found() {
    let adapter = MediaAdapter::new(NoCamera);

    let err = adapter.start_capture().await.unwrap_err();

    assert_eq!(err.message(), CAMERA_NOT_FOUND_MESSAGE);
    assert!(!adapter.is_capturing());
}

#[tokio::test]
async fn still_frame_serves_image_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    image::RgbaImage::from_pixel(20, 10, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let devices = StillFrameDevices::new(&path);
    let mut stream = devices
        .request_video_stream(StreamConstraints::video_only())
        .await
        .unwrap();

    assert_eq!(stream.dimensions(), (20, 10));
    assert_eq!(stream.current_frame().unwrap().get_pixel(0, 0).0, [1, 2, 3, 255]);
    stream.stop_tracks();
    assert!(stream.current_frame().is_err());
}

#[tokio::test]
async fn still_frame_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = MediaAdapter::new(StillFrameDevices::new(dir.path().join("none.png")));

    let err = adapter.start_capture().await.unwrap_err();

    assert_eq!(err.message(), CAMERA_NOT_FOUND_MESSAGE);
}

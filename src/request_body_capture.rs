//! Request payload capture
//!
//! Drains the incoming payload so the record can carry the request body,
//! then restores an identical payload on the request. Downstream extractors
//! must see exactly what the transport delivered, bytes and read errors
//! alike.

use actix_web::{
    dev::{Payload, ServiceRequest},
    error::PayloadError,
    web::{Bytes, BytesMut},
    HttpMessage,
};
use futures::stream::{self, Stream};
use futures::StreamExt;
use std::pin::Pin;

/// Drain the request payload and return its lossily decoded text.
///
/// The consumed payload is replaced with a stream yielding the same bytes.
/// A mid-stream read error ends the capture; the restored stream replays
/// the buffered prefix and then that error, so extractors fail the same
/// way they would have without the capture.
pub async fn capture_request_body(req: &mut ServiceRequest) -> String {
    let mut payload = req.take_payload();
    let mut buffer = BytesMut::new();
    let mut failure: Option<PayloadError> = None;

    while let Some(chunk) = payload.next().await {
        match chunk {
            Ok(chunk) => buffer.extend_from_slice(&chunk),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    let bytes = buffer.freeze();
    let text = String::from_utf8_lossy(&bytes).into_owned();

    let mut chunks = vec![Ok(bytes)];
    if let Some(err) = failure {
        chunks.push(Err(err));
    }

    let restored = Payload::Stream {
        payload: Box::pin(stream::iter(chunks))
            as Pin<Box<dyn Stream<Item = Result<Bytes, PayloadError>>>>,
    };
    req.set_payload(restored);

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    async fn drain(req: &mut ServiceRequest) -> Bytes {
        let mut payload = req.take_payload();
        let mut buffer = BytesMut::new();
        while let Some(chunk) = payload.next().await {
            buffer.extend_from_slice(&chunk.unwrap());
        }
        buffer.freeze()
    }

    #[actix_rt::test]
    async fn test_capture_returns_body_text() {
        let mut req = TestRequest::post()
            .set_payload(Bytes::from_static(b"{\"name\":\"zaphod\"}"))
            .to_srv_request();

        let text = capture_request_body(&mut req).await;
        assert_eq!(text, "{\"name\":\"zaphod\"}");
    }

    #[actix_rt::test]
    async fn test_payload_is_restored_unchanged() {
        let mut req = TestRequest::post()
            .set_payload(Bytes::from_static(b"raw body bytes"))
            .to_srv_request();

        capture_request_body(&mut req).await;

        let restored = drain(&mut req).await;
        assert_eq!(&restored[..], b"raw body bytes");
    }

    #[actix_rt::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let mut req = TestRequest::post()
            .set_payload(Bytes::from_static(b"ok \xff end"))
            .to_srv_request();

        let text = capture_request_body(&mut req).await;
        assert_eq!(text, "ok \u{fffd} end");

        // The restored payload keeps the raw bytes, not the decoded text.
        let restored = drain(&mut req).await;
        assert_eq!(&restored[..], b"ok \xff end");
    }

    #[actix_rt::test]
    async fn test_empty_payload_is_empty_text() {
        let mut req = TestRequest::get().to_srv_request();
        let text = capture_request_body(&mut req).await;
        assert_eq!(text, "");
    }

    #[actix_rt::test]
    async fn test_read_error_is_replayed_after_buffered_prefix() {
        let mut req = TestRequest::post().to_srv_request();
        let broken = Payload::Stream {
            payload: Box::pin(stream::iter(vec![
                Ok(Bytes::from_static(b"partial")),
                Err(PayloadError::Incomplete(None)),
            ])) as Pin<Box<dyn Stream<Item = Result<Bytes, PayloadError>>>>,
        };
        req.set_payload(broken);

        let text = capture_request_body(&mut req).await;
        assert_eq!(text, "partial");

        // The prefix comes back first, then the error the transport raised.
        let mut restored = req.take_payload();
        let first = restored.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"partial");
        assert!(matches!(
            restored.next().await,
            Some(Err(PayloadError::Incomplete(None)))
        ));
    }
}

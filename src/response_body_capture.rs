//! Response body capture
//!
//! Buffers finished response bodies so the logging gate and the record
//! builder can inspect them, then rebuilds the response around the same
//! bytes. Streaming bodies pass through untouched and are never buffered.

use actix_web::{
    body::{self, BodySize, BoxBody, MessageBody},
    dev::ServiceResponse,
    web::Bytes,
};

/// Buffer a non-streaming response body and rebuild the response from the
/// captured bytes. Streaming responses come back unchanged with no capture.
///
/// The rebuilt response carries exactly the bytes that were read, so the
/// client sees what the handler produced.
pub async fn capture_response_body<B>(
    res: ServiceResponse<B>,
) -> (ServiceResponse<BoxBody>, Option<Bytes>)
where
    B: MessageBody + 'static,
{
    if res.response().body().size() == BodySize::Stream {
        return (res.map_into_boxed_body(), None);
    }

    let (req, res) = res.into_parts();
    let (head, body) = res.into_parts();

    let bytes = match body.try_into_bytes() {
        Ok(bytes) => bytes,
        Err(body) => match body::to_bytes(body).await {
            Ok(bytes) => bytes,
            Err(_) => {
                // Body read failed; return the head with an empty body
                // rather than failing the request over logging.
                let rebuilt = head.set_body(()).map_into_boxed_body();
                return (ServiceResponse::new(req, rebuilt), None);
            }
        },
    };

    let rebuilt = head.set_body(bytes.clone());
    (
        ServiceResponse::new(req, rebuilt).map_into_boxed_body(),
        Some(bytes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{self, TestRequest};
    use actix_web::HttpResponse;
    use futures::stream;

    #[actix_rt::test]
    async fn test_buffered_body_is_captured_and_preserved() {
        let req = TestRequest::get().to_http_request();
        let res = ServiceResponse::new(req, HttpResponse::Ok().body("hello"));

        let (res, captured) = capture_response_body(res).await;

        assert_eq!(captured.as_deref(), Some(b"hello".as_ref()));
        assert_eq!(res.status(), actix_web::http::StatusCode::OK);

        let delivered = test::read_body(res).await;
        assert_eq!(&delivered[..], b"hello");
    }

    #[actix_rt::test]
    async fn test_empty_body_captures_empty_bytes() {
        let req = TestRequest::get().to_http_request();
        let res = ServiceResponse::new(req, HttpResponse::NoContent().finish());

        let (_res, captured) = capture_response_body(res).await;
        assert_eq!(captured.as_deref(), Some(b"".as_ref()));
    }

    #[actix_rt::test]
    async fn test_streaming_body_is_not_captured() {
        let chunks = stream::iter(vec![
            Ok::<_, actix_web::Error>(Bytes::from_static(b"chunk1")),
            Ok(Bytes::from_static(b"chunk2")),
        ]);
        let req = TestRequest::get().to_http_request();
        let res = ServiceResponse::new(req, HttpResponse::Ok().streaming(chunks));

        let (res, captured) = capture_response_body(res).await;

        assert_eq!(captured, None);
        let delivered = test::read_body(res).await;
        assert_eq!(&delivered[..], b"chunk1chunk2");
    }
}

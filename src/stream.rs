//! Multipart MJPEG framing for the HTTP video feed.
//!
//! Browsers render `multipart/x-mixed-replace` by replacing the image with
//! each arriving part, so the part layout is an external contract and must
//! stay byte-exact:
//!
//! ```text
//! --frame\r\nContent-Type: image/jpeg\r\n\r\n<jpeg bytes>\r\n
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Content-Type header value for the streaming response.
pub const STREAM_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

const PART_HEADER: &[u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";

/// Wrap one encoded JPEG image as a multipart part.
pub fn encode_part(jpeg: &[u8]) -> Bytes {
    let mut part = BytesMut::with_capacity(PART_HEADER.len() + jpeg.len() + 2);
    part.put_slice(PART_HEADER);
    part.put_slice(jpeg);
    part.put_slice(b"\r\n");
    part.freeze()
}

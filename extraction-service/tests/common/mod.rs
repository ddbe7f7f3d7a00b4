//! Common test utilities for extraction-service integration tests.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,extraction_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A payment notification with a plain-text body and a PNG receipt.
pub fn payment_message(username: &str, image_name: &str) -> String {
    format!(
        "From: Payments <payments@example.com>\r\n\
Subject: Payment from {username}\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Username: {username}\r\n\
UTR: 412345678901\r\n\
--XYZ\r\n\
Content-Type: image/png\r\n\
Content-Disposition: attachment; filename=\"{image_name}\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n\
--XYZ--\r\n"
    )
}

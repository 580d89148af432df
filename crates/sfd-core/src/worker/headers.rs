//! Track status and Content-Length of the response currently being received.

/// Head of the latest response seen by the header callback. A new status
/// line resets it, so redirect hops and `100 Continue` never leak into the
/// final response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub(crate) status: Option<u32>,
    pub(crate) content_length: Option<u64>,
}

impl ResponseHead {
    /// Feed one raw header line as delivered by libcurl (CRLF included).
    pub(crate) fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if let Some(code) = parse_status_line(line) {
            *self = ResponseHead {
                status: Some(code),
                content_length: None,
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }
}

/// `HTTP/1.1 404 Not Found` → 404. Also handles `HTTP/2 200` without a reason.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse::<u32>().ok()
}

//! Hand-built `multipart/form-data` bodies for file uploads.
//!
//! Layout per part: `--<boundary>\r\n`, a `Content-Disposition` header (plus
//! `Content-Type` for the file part), a blank line, the payload and `\r\n`.
//! The body closes with `--<boundary>--\r\n`.

pub const BOUNDARY_PREFIX: &str = "----BotBoundary";

/// `----BotBoundary` followed by 16 random bytes as lowercase hex.
pub fn generate_boundary() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    format!("{BOUNDARY_PREFIX}{}", hex::encode(bytes))
}

/// Percent-escape the characters that would break a quoted header parameter.
pub fn escape_param(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}

pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

impl Multipart {
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.open_part();
        self.push(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            escape_param(name)
        ));
        self.push(value);
        self.push("\r\n");
        self
    }

    pub fn file(&mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> &mut Self {
        self.open_part();
        self.push(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape_param(name),
            escape_param(filename)
        ));
        let content_type = content_type.replace(['\r', '\n'], "");
        self.push(&format!("Content-Type: {content_type}\r\n\r\n"));
        self.body.extend_from_slice(bytes);
        self.push("\r\n");
        self
    }

    /// Close the body. Returns it with the matching `Content-Type` header value.
    pub fn finish(mut self) -> (Vec<u8>, String) {
        let closing = format!("--{}--\r\n", self.boundary);
        self.push(&closing);
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        (self.body, content_type)
    }

    fn open_part(&mut self) {
        let delimiter = format!("--{}\r\n", self.boundary);
        self.push(&delimiter);
    }

    fn push(&mut self, s: &str) {
        self.body.extend_from_slice(s.as_bytes());
    }
}

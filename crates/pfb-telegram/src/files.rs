//! File upload inputs for the `send*` file methods.

/// Either something the platform can fetch itself (URL or file id) or raw bytes
/// to upload as multipart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputFile {
    Reference(String),
    Bytes(Vec<u8>),
}

impl From<&str> for InputFile {
    fn from(reference: &str) -> Self {
        InputFile::Reference(reference.to_string())
    }
}

impl From<Vec<u8>> for InputFile {
    fn from(bytes: Vec<u8>) -> Self {
        InputFile::Bytes(bytes)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Photo,
    Video,
    Document,
    Audio,
    Voice,
}

impl FileKind {
    pub fn method(self) -> &'static str {
        match self {
            FileKind::Photo => "sendPhoto",
            FileKind::Video => "sendVideo",
            FileKind::Document => "sendDocument",
            FileKind::Audio => "sendAudio",
            FileKind::Voice => "sendVoice",
        }
    }

    /// Form field (and JSON key) carrying the file.
    pub fn field(self) -> &'static str {
        match self {
            FileKind::Photo => "photo",
            FileKind::Video => "video",
            FileKind::Document => "document",
            FileKind::Audio => "audio",
            FileKind::Voice => "voice",
        }
    }

    pub fn default_filename(self) -> &'static str {
        match self {
            FileKind::Photo => "photo.jpg",
            FileKind::Video => "video.mp4",
            FileKind::Document => "file.bin",
            FileKind::Audio => "audio.mp3",
            FileKind::Voice => "voice.ogg",
        }
    }

    pub fn default_content_type(self) -> &'static str {
        match self {
            FileKind::Photo => "image/jpeg",
            FileKind::Video => "video/mp4",
            FileKind::Document => "application/octet-stream",
            FileKind::Audio => "audio/mpeg",
            FileKind::Voice => "audio/ogg",
        }
    }
}

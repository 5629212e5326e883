//! Navigation tokens: the `callback_data` carried by inline buttons.
//!
//! Grammar (colon separated, first field is the action tag):
//!
//! ```text
//! view:<media_type>:<media_id>
//! nav:<media_type>:<lang>:<index>:<media_id>
//! details:<media_id>
//! back:main:<media_id>
//! noop
//! ```

use std::{fmt, str::FromStr};

use crate::{errors::Error, Result};

/// Bot API limit for `callback_data`, in bytes.
pub const MAX_TOKEN_LEN: usize = 64;

const SEP: char = ':';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackTarget {
    Main,
}

impl BackTarget {
    fn as_str(self) -> &'static str {
        match self {
            BackTarget::Main => "main",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavToken {
    /// Language list for a media type.
    View { media_type: String, media_id: String },
    /// One image of a `(media_type, lang)` selection. The index is whatever the
    /// button asked for; clamping happens at render time.
    Page {
        media_type: String,
        lang: String,
        index: i64,
        media_id: String,
    },
    Details { media_id: String },
    Back { target: BackTarget, media_id: String },
    Noop,
}

impl NavToken {
    pub fn view(media_type: &str, media_id: &str) -> Self {
        NavToken::View {
            media_type: media_type.to_string(),
            media_id: media_id.to_string(),
        }
    }

    pub fn page(media_type: &str, lang: &str, index: i64, media_id: &str) -> Self {
        NavToken::Page {
            media_type: media_type.to_string(),
            lang: lang.to_string(),
            index,
            media_id: media_id.to_string(),
        }
    }

    pub fn details(media_id: &str) -> Self {
        NavToken::Details {
            media_id: media_id.to_string(),
        }
    }

    pub fn back_to_main(media_id: &str) -> Self {
        NavToken::Back {
            target: BackTarget::Main,
            media_id: media_id.to_string(),
        }
    }

    /// Media id the token refers to; `None` for `noop`.
    pub fn media_id(&self) -> Option<&str> {
        match self {
            NavToken::View { media_id, .. }
            | NavToken::Page { media_id, .. }
            | NavToken::Details { media_id }
            | NavToken::Back { media_id, .. } => Some(media_id),
            NavToken::Noop => None,
        }
    }

    /// Whether the encoded token fits in a button's `callback_data`.
    pub fn fits_button(&self) -> bool {
        self.to_string().len() <= MAX_TOKEN_LEN
    }
}

impl fmt::Display for NavToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavToken::View {
                media_type,
                media_id,
            } => write!(f, "view:{media_type}:{media_id}"),
            NavToken::Page {
                media_type,
                lang,
                index,
                media_id,
            } => write!(f, "nav:{media_type}:{lang}:{index}:{media_id}"),
            NavToken::Details { media_id } => write!(f, "details:{media_id}"),
            NavToken::Back { target, media_id } => write!(f, "back:{}:{media_id}", target.as_str()),
            NavToken::Noop => f.write_str("noop"),
        }
    }
}

impl From<NavToken> for String {
    fn from(t: NavToken) -> Self {
        t.to_string()
    }
}

impl FromStr for NavToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(SEP).collect();
        let tag = parts[0];

        let expected = match tag {
            "noop" => 1,
            "details" => 2,
            "view" | "back" => 3,
            "nav" => 5,
            "" => return Err(Error::malformed(s, "empty token")),
            other => return Err(Error::malformed(s, format!("unknown action {other:?}"))),
        };
        if parts.len() != expected {
            return Err(Error::malformed(
                s,
                format!("{tag} expects {expected} fields, got {}", parts.len()),
            ));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::malformed(s, "empty field"));
        }

        let token = match parts.as_slice() {
            ["noop"] => NavToken::Noop,
            ["details", media_id] => NavToken::details(media_id),
            ["view", media_type, media_id] => NavToken::view(media_type, media_id),
            ["back", "main", media_id] => NavToken::back_to_main(media_id),
            ["back", target, _] => {
                return Err(Error::malformed(s, format!("unknown back target {target:?}")))
            }
            ["nav", media_type, lang, index, media_id] => {
                let index = index
                    .parse::<i64>()
                    .map_err(|_| Error::malformed(s, format!("index {index:?} is not an integer")))?;
                NavToken::page(media_type, lang, index, media_id)
            }
            _ => return Err(Error::malformed(s, "unexpected shape")),
        };
        Ok(token)
    }
}

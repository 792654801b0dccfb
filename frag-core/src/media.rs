//! Supported media types and the legal conversion graph between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FragmentError, FragmentResult};

/// The closed set of media types a fragment may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "text/markdown")]
    TextMarkdown,
    #[serde(rename = "text/html")]
    TextHtml,
    #[serde(rename = "application/json")]
    ApplicationJson,
    #[serde(rename = "image/png")]
    ImagePng,
    #[serde(rename = "image/jpeg")]
    ImageJpeg,
    #[serde(rename = "image/webp")]
    ImageWebp,
    #[serde(rename = "image/gif")]
    ImageGif,
    #[serde(rename = "image/avif")]
    ImageAvif,
}

use MediaType::*;

const IMAGES: &[MediaType] = &[ImagePng, ImageJpeg, ImageWebp, ImageGif, ImageAvif];

/// Source type -> legal targets, in preference order.
static CONVERSIONS: &[(MediaType, &[MediaType])] = &[
    (TextPlain, &[TextPlain]),
    (TextMarkdown, &[TextMarkdown, TextHtml, TextPlain]),
    (TextHtml, &[TextHtml, TextPlain]),
    (ApplicationJson, &[ApplicationJson, TextPlain]),
    (ImagePng, IMAGES),
    (ImageJpeg, IMAGES),
    (ImageWebp, IMAGES),
    (ImageGif, IMAGES),
    (ImageAvif, IMAGES),
];

static EXTENSIONS: &[(&str, MediaType)] = &[
    ("txt", TextPlain),
    ("md", TextMarkdown),
    ("html", TextHtml),
    ("json", ApplicationJson),
    ("png", ImagePng),
    ("jpg", ImageJpeg),
    ("jpeg", ImageJpeg),
    ("webp", ImageWebp),
    ("gif", ImageGif),
    ("avif", ImageAvif),
];

impl MediaType {
    pub const ALL: [MediaType; 9] = [
        TextPlain,
        TextMarkdown,
        TextHtml,
        ApplicationJson,
        ImagePng,
        ImageJpeg,
        ImageWebp,
        ImageGif,
        ImageAvif,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextPlain => "text/plain",
            TextMarkdown => "text/markdown",
            TextHtml => "text/html",
            ApplicationJson => "application/json",
            ImagePng => "image/png",
            ImageJpeg => "image/jpeg",
            ImageWebp => "image/webp",
            ImageGif => "image/gif",
            ImageAvif => "image/avif",
        }
    }

    /// Parse a media type, ignoring parameters such as `charset`.
    ///
    /// Malformed or unsupported input yields `None`.
    pub fn parse(value: &str) -> Option<MediaType> {
        let parsed: mime::Mime = value.trim().parse().ok()?;
        let essence = parsed.essence_str().to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == essence)
    }

    /// Exact bare type such as `text/html`. Anything carrying parameters is `None`.
    pub fn from_base_type(value: &str) -> Option<MediaType> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }

    /// Media type named by a file extension (`md`, `JPG`, ...)
    pub fn from_extension(ext: &str) -> Option<MediaType> {
        let ext = ext.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, m)| *m)
    }

    /// Legal conversion targets, including itself
    pub fn targets(&self) -> &'static [MediaType] {
        CONVERSIONS
            .iter()
            .find(|(source, _)| source == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    pub fn can_convert_to(&self, target: MediaType) -> bool {
        self.targets().contains(&target)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, TextPlain | TextMarkdown | TextHtml | ApplicationJson)
    }

    pub fn is_image(&self) -> bool {
        IMAGES.contains(self)
    }
}

/// True iff `value` parses as a media type whose base type is supported
pub fn is_supported_type(value: &str) -> bool {
    MediaType::parse(value).is_some()
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = FragmentError;

    fn from_str(s: &str) -> FragmentResult<Self> {
        MediaType::parse(s).ok_or_else(|| FragmentError::unsupported_type(s))
    }
}

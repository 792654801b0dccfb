//! Conversion engine.
//!
//! Pure functions over bytes. Callers check the conversion graph first
//! ([`MediaType::can_convert_to`]); [`convert`] still refuses pairs it has no
//! implementation for.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::avif::AvifEncoder;
use image::codecs::gif::{GifDecoder, GifEncoder};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

use crate::{FragmentError, FragmentResult, MediaType};

const JPEG_QUALITY: u8 = 90;
const AVIF_QUALITY: u8 = 80;
const AVIF_SPEED: u8 = 8;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

/// Render `data` (of type `from`) as `to`.
pub fn convert(data: &[u8], from: MediaType, to: MediaType) -> FragmentResult<Bytes> {
    use MediaType::*;

    match (from, to) {
        (TextMarkdown, TextHtml) => Ok(Bytes::from(markdown_to_html(&text(data)))),
        (TextHtml, TextPlain) => Ok(Bytes::from(strip_tags(&text(data)))),
        (TextMarkdown, TextPlain) => Ok(Bytes::from(strip_tags(&markdown_to_html(&text(data))))),
        (source, target) if source.is_text() && (target == source || target == TextPlain) => {
            Ok(Bytes::copy_from_slice(data))
        }
        (source, target) if source.is_image() && target.is_image() => {
            transcode_image(data, source, target)
        }
        _ => Err(FragmentError::unsupported_conversion(from.as_str(), to.as_str())),
    }
}

/// CommonMark with the common GitHub extensions
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(source, options));
    out
}

/// Drop every `<...>` run. Entities are left as they are.
pub fn strip_tags(source: &str) -> String {
    TAG.replace_all(source, "").into_owned()
}

fn text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn image_format(media: MediaType) -> Option<ImageFormat> {
    match media {
        MediaType::ImagePng => Some(ImageFormat::Png),
        MediaType::ImageJpeg => Some(ImageFormat::Jpeg),
        MediaType::ImageWebp => Some(ImageFormat::WebP),
        MediaType::ImageGif => Some(ImageFormat::Gif),
        MediaType::ImageAvif => Some(ImageFormat::Avif),
        _ => None,
    }
}

fn decode_image(data: &[u8], from: MediaType, to: MediaType) -> FragmentResult<DynamicImage> {
    let format = image_format(from)
        .ok_or_else(|| FragmentError::unsupported_conversion(from.as_str(), to.as_str()))?;

    // Only the first frame of an animation is kept.
    if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(data))
            .map_err(|e| FragmentError::conversion_failed(from, to, e))?;
        let frame = decoder
            .into_frames()
            .next()
            .ok_or_else(|| FragmentError::conversion_failed(from, to, "gif has no frames"))?
            .map_err(|e| FragmentError::conversion_failed(from, to, e))?;
        return Ok(DynamicImage::ImageRgba8(frame.into_buffer()));
    }

    #[cfg(not(feature = "avif-native"))]
    if format == ImageFormat::Avif {
        return Err(FragmentError::conversion_failed(
            from,
            to,
            "AVIF decoding requires the avif-native feature",
        ));
    }

    image::load_from_memory_with_format(data, format)
        .map_err(|e| FragmentError::conversion_failed(from, to, e))
}

fn transcode_image(data: &[u8], from: MediaType, to: MediaType) -> FragmentResult<Bytes> {
    let img = decode_image(data, from, to)?;
    let mut out = Vec::new();

    let written = match to {
        MediaType::ImagePng => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut out,
            CompressionType::Best,
            FilterType::Adaptive,
        )),
        MediaType::ImageJpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)),
        MediaType::ImageWebp => DynamicImage::ImageRgba8(img.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut out)),
        MediaType::ImageAvif => DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(
            AvifEncoder::new_with_speed_quality(&mut out, AVIF_SPEED, AVIF_QUALITY),
        ),
        MediaType::ImageGif => {
            // the trailer is written when the encoder drops
            let mut encoder = GifEncoder::new(&mut out);
            encoder.encode_frame(Frame::new(img.to_rgba8()))
        }
        _ => return Err(FragmentError::unsupported_conversion(from.as_str(), to.as_str())),
    };

    written.map_err(|e| FragmentError::conversion_failed(from, to, e))?;
    Ok(Bytes::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use image::{GenericImageView, Rgba, RgbaImage};
    use MediaType::*;

    fn sample(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
        })
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img.clone())
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn markdown_heading_becomes_html() {
        let out = convert(b"# This is a fragment", TextMarkdown, TextHtml).unwrap();
        assert_eq!(&out[..], b"<h1>This is a fragment</h1>\n");
    }

    #[test]
    fn markdown_tables_and_emphasis() {
        let html = markdown_to_html("a *b* ~~c~~\n\n| x | y |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<em>b</em>"));
        assert!(html.contains("<del>c</del>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn html_to_text_strips_tags() {
        let out = convert(b"<p>Hello <b>world</b></p>", TextHtml, TextPlain).unwrap();
        assert_eq!(&out[..], b"Hello world");
    }

    #[test]
    fn markdown_to_text_renders_then_strips() {
        let out = convert(b"# Title\n\nsome *text*", TextMarkdown, TextPlain).unwrap();
        let text = std::str::from_utf8(&out).unwrap();
        assert!(text.contains("Title"));
        assert!(text.contains("some text"));
        assert!(!text.contains('<'));
        assert!(!text.contains('#'));
    }

    #[test]
    fn json_to_text_is_a_copy() {
        let body = br#"{"a":1}"#;
        assert_eq!(&convert(body, ApplicationJson, TextPlain).unwrap()[..], body);
        assert_eq!(&convert(body, ApplicationJson, ApplicationJson).unwrap()[..], body);
    }

    #[test]
    fn text_to_image_is_unsupported() {
        let err = convert(b"hi", TextPlain, ImagePng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedConversion);

        let err = convert(b"{}", ApplicationJson, TextHtml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedConversion);
    }

    #[test]
    fn png_to_jpeg() {
        let out = convert(&png_bytes(&sample(8, 6)), ImagePng, ImageJpeg).unwrap();
        assert_eq!(&out[..3], &[0xFF, 0xD8, 0xFF]);
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
    }

    #[test]
    fn png_to_webp_is_lossless() {
        let img = sample(8, 8);
        let out = convert(&png_bytes(&img), ImagePng, ImageWebp).unwrap();
        assert_eq!(&out[..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::WebP)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn png_to_gif() {
        let out = convert(&png_bytes(&sample(4, 4)), ImagePng, ImageGif).unwrap();
        assert_eq!(&out[..4], b"GIF8");
        assert_eq!(out.last(), Some(&0x3B));
    }

    #[test]
    fn png_to_avif() {
        let out = convert(&png_bytes(&sample(8, 8)), ImagePng, ImageAvif).unwrap();
        assert_eq!(&out[4..8], b"ftyp");
    }

    #[cfg(feature = "avif-native")]
    #[test]
    fn avif_round_trips_to_png() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([200, 40, 40, 255]));
        let avif = convert(&png_bytes(&img), ImagePng, ImageAvif).unwrap();

        let out = convert(&avif, ImageAvif, ImagePng).unwrap();
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 16));
        let px = decoded.get_pixel(8, 8);
        for (got, want) in px.0.iter().zip([200u8, 40, 40, 255]) {
            assert!(got.abs_diff(want) <= 24, "{:?}", px);
        }
    }

    #[cfg(not(feature = "avif-native"))]
    #[test]
    fn avif_source_without_decoder_fails_conversion() {
        let avif = convert(&png_bytes(&sample(8, 8)), ImagePng, ImageAvif).unwrap();
        let err = convert(&avif, ImageAvif, ImagePng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert!(err.to_string().contains("avif-native"));
    }

    #[test]
    fn png_reencode_keeps_pixels() {
        let img = sample(5, 3);
        let out = convert(&png_bytes(&img), ImagePng, ImagePng).unwrap();
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn animated_gif_keeps_first_frame() {
        let first = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
        let second = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 255]));
        let mut gif = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut gif);
            encoder
                .encode_frames(vec![Frame::new(first), Frame::new(second)])
                .unwrap();
        }

        let out = convert(&gif, ImageGif, ImagePng).unwrap();
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 3));
        assert_eq!(decoded.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn corrupt_image_fails_conversion() {
        let err = convert(b"definitely not a png", ImagePng, ImageJpeg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
    }
}

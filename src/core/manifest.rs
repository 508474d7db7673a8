//! Web app manifest built from the current logo.
//!
//! Install icons follow the logo document: an uploaded logo becomes a round PNG on
//! the background colour, otherwise a disc with the logo letter is drawn as SVG.

use crate::{
    config::store::{PwaSection, StoreConfig},
    core::{
        image::decode_data_url,
        site::{LogoData, LogoMode},
    },
    errors::{Error, Result},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops::FilterType};
use serde::Serialize;
use std::io::Cursor;

/// Sizes of the two install icons; the larger one is maskable.
pub const ICON_SIZES: [(u32, &str); 2] = [(192, "any"), (512, "maskable")];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub scope: String,
    pub display: String,
    pub orientation: String,
    pub background_color: String,
    pub theme_color: String,
    pub lang: String,
    pub categories: Vec<String>,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub purpose: String,
}

/// Builds the manifest for the given logo.
#[must_use]
pub fn build_manifest(config: &StoreConfig, logo: &LogoData) -> WebManifest {
    let icons = ICON_SIZES
        .iter()
        .map(|&(size, purpose)| {
            let (src, mime_type) = render_icon(logo, size, &config.pwa);
            ManifestIcon {
                src,
                sizes: format!("{size}x{size}"),
                mime_type: mime_type.to_string(),
                purpose: purpose.to_string(),
            }
        })
        .collect();

    WebManifest {
        name: config.store.name.clone(),
        short_name: config.store.short_name.clone(),
        description: config.store.description.clone(),
        start_url: "/".to_string(),
        scope: "/".to_string(),
        display: "standalone".to_string(),
        orientation: "portrait-primary".to_string(),
        background_color: config.pwa.background_color.clone(),
        theme_color: config.pwa.theme_color.clone(),
        lang: config.store.lang.clone(),
        categories: vec![
            "food".to_string(),
            "restaurants".to_string(),
            "shopping".to_string(),
        ],
        icons,
    }
}

/// Returns `(data URL, mime type)` for one icon size.
///
/// An image logo that cannot be decoded falls back to the letter icon.
#[must_use]
pub fn render_icon(logo: &LogoData, size: u32, pwa: &PwaSection) -> (String, &'static str) {
    if logo.mode == LogoMode::Image && !logo.image_base64.is_empty() {
        match round_image_icon(&logo.image_base64, size, &pwa.background_color) {
            Ok(src) => return (src, "image/png"),
            Err(e) => tracing::warn!("Logo image unusable for {size}px icon: {e}"),
        }
    }
    (letter_icon_svg(&logo.letter, size, pwa), "image/svg+xml")
}

/// SVG data URL with the logo letter centred on a dark-red disc.
#[must_use]
pub fn letter_icon_svg(letter: &str, size: u32, pwa: &PwaSection) -> String {
    let letter = if letter.trim().is_empty() { "Z" } else { letter.trim() };
    let size_f = f64::from(size);
    let center = size_f / 2.0;
    let radius = size_f * 0.42;
    let font_size = size_f * 0.38;
    let baseline = center + size_f * 0.02;

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><rect width="{size}" height="{size}" fill="{bg}"/><circle cx="{center}" cy="{center}" r="{radius}" fill="{accent}"/><text x="{center}" y="{baseline}" fill="#FFFFFF" font-family="Syne, sans-serif" font-weight="900" font-size="{font_size}" text-anchor="middle" dominant-baseline="middle">{text}</text></svg>"##,
        bg = xml_escape(&pwa.background_color),
        accent = xml_escape(&pwa.icon_accent),
        text = xml_escape(letter),
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Parses `#RRGGBB`, falling back to near-black.
fn parse_hex_color(value: &str) -> [u8; 3] {
    let hex = value.trim().trim_start_matches('#');
    let channel = |i: usize| hex.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok());
    match (hex.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => [r, g, b],
        _ => [0x05, 0x05, 0x05],
    }
}

/// PNG data URL of the logo stretched to `size` and clipped to a circle.
pub fn round_image_icon(data_url: &str, size: u32, background: &str) -> Result<String> {
    let bytes = decode_data_url(data_url)?;
    let logo = image::load_from_memory(&bytes)
        .map_err(|e| Error::Image {
            message: format!("Unreadable logo: {e}"),
        })?
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgba8();

    let [br, bg, bb] = parse_hex_color(background);
    let radius = f64::from(size) / 2.0;
    let icon = RgbaImage::from_fn(size, size, |x, y| {
        let dx = f64::from(x) + 0.5 - radius;
        let dy = f64::from(y) + 0.5 - radius;
        if dx.hypot(dy) > radius {
            return Rgba([br, bg, bb, 255]);
        }
        let Rgba([r, g, b, a]) = *logo.get_pixel(x, y);
        let blend = |fg: u8, back: u8| {
            let alpha = u16::from(a);
            let mixed = (u16::from(fg) * alpha + u16::from(back) * (255 - alpha)) / 255;
            u8::try_from(mixed).unwrap_or(u8::MAX)
        };
        Rgba([blend(r, br), blend(g, bg), blend(b, bb), 255])
    });

    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(icon)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| Error::Image {
            message: format!("Failed to encode icon: {e}"),
        })?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buffer)))
}

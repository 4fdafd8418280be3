//! Canned marketplace pages, images and multipart bodies.

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const MULTIPART_BOUNDARY: &str = "collector-test-boundary";

/// Search URL the default marketplace config builds for `query`.
pub fn search_url(query: &str) -> String {
    collector_core::MarketplaceConfig::default().search_url(query)
}

/// A search results page with one product row per `(path, title, image)`.
pub fn results_page(rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(r#"<html><body><div class="table-body">"#);
    for (path, title, image) in rows {
        html.push_str(&format!(
            r#"<div class="row"><a href="{path}">{title}</a><img data-src="{image}" alt=""></div>"#
        ));
    }
    html.push_str("</div></body></html>");
    html
}

/// PNG with a vertical split: left half dark, right half light.
pub fn split_png(dark_left: bool) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_fn(32, 32, |x, _| {
        if (x < 16) == dark_left {
            Rgb([20, 20, 20])
        } else {
            Rgb([235, 235, 235])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// One part of a multipart/form-data body.
pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

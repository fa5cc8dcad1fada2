// QR code generation for public menu links.
//
// Codes are rendered as SVG and embedded as base64 data URLs so they can
// be stored directly on the cafe row and dropped into an <img> tag with
// no asset hosting.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;

use menuqr_core::error::{MenuQrError, Result};

/// Public menu URL for a cafe slug.
pub fn menu_url(base_url: &str, slug: &str) -> String {
    format!("{}/menu/{}", base_url.trim_end_matches('/'), slug)
}

/// Render `url` as an SVG QR code and wrap it in a data URL.
pub fn qr_svg_data_url(url: &str) -> Result<String> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| MenuQrError::Other(format!("QR encoding failed: {e}")))?;
    let svg = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build();
    Ok(format!("data:image/svg+xml;base64,{}", BASE64.encode(svg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_url_joins_cleanly() {
        assert_eq!(
            menu_url("http://localhost:3000", "chai-point-482"),
            "http://localhost:3000/menu/chai-point-482"
        );
        // Trailing slash on the base must not double up.
        assert_eq!(
            menu_url("https://menuqr.app/", "chai-point-482"),
            "https://menuqr.app/menu/chai-point-482"
        );
    }

    #[test]
    fn qr_data_url_is_svg_base64() {
        let url = qr_svg_data_url("http://localhost:3000/menu/chai-point-482").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));

        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        let svg = String::from_utf8(decoded).unwrap();
        assert!(svg.contains("<svg"));
    }
}

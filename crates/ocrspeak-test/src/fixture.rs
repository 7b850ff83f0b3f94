//! Files shipped with the crate for tests that need real assets.

use std::path::PathBuf;

/// Path of a bundled DejaVu Sans font, usable wherever a drawing font is
/// configured.
///
/// The font is distributed under the Bitstream Vera license, see
/// `assets/DejaVuSans.LICENSE`.
pub fn font_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/DejaVuSans.ttf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_font_exists() {
        assert!(font_path().is_file());
    }
}

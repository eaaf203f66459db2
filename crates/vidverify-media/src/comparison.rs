//! Comparison sheet: the reference photo next to every evidence still.
//!
//! Tiles are laid out row-major, at most four per row, the reference photo
//! first. Each tile has a label in the strip above it when a font is
//! available.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info, warn};
use vidverify_models::EvidenceFrame;

use crate::error::{MediaError, MediaResult};

/// File name of the sheet inside the output directory.
pub const COMPARISON_FILE_NAME: &str = "comparison_evidence.jpg";

/// Edge length of every square tile.
pub const TILE_SIZE: u32 = 300;
/// Horizontal gap between tiles and around the sheet.
pub const TILE_GAP: u32 = 20;
/// Vertical space reserved above each row for labels.
pub const LABEL_SPACE: u32 = 40;
pub const MAX_COLUMNS: u32 = 4;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Fonts tried, in order, when none is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Rendering options for the sheet.
pub struct SheetOptions {
    /// Label font; labels are skipped without one
    pub font: Option<FontVec>,
    pub font_size: f32,
    pub jpeg_quality: u8,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 16.0,
            jpeg_quality: 90,
        }
    }
}

/// Load the label font.
///
/// An explicitly configured font must load. Otherwise the first usable
/// system font is returned, or `None`.
pub fn load_label_font(configured: Option<&Path>) -> MediaResult<Option<FontVec>> {
    if let Some(path) = configured {
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| MediaError::InvalidFont {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        return Ok(Some(font));
    }

    for candidate in FONT_CANDIDATES {
        let Ok(bytes) = std::fs::read(candidate) else {
            continue;
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => {
                debug!("Using label font {}", candidate);
                return Ok(Some(font));
            }
            Err(e) => debug!("Ignoring font {}: {}", candidate, e),
        }
    }

    Ok(None)
}

/// Grid geometry for `frame_count` evidence tiles plus the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub cols: u32,
    pub rows: u32,
    pub width: u32,
    pub height: u32,
}

impl SheetLayout {
    pub fn for_frames(frame_count: usize) -> Self {
        let cells = frame_count as u32 + 1;
        let cols = cells.min(MAX_COLUMNS);
        let rows = cells.div_ceil(cols);
        Self {
            cols,
            rows,
            width: cols * TILE_SIZE + (cols + 1) * TILE_GAP,
            height: rows * (TILE_SIZE + LABEL_SPACE) + LABEL_SPACE,
        }
    }

    /// Top-left corner of tile `cell`; cell 0 is the reference photo.
    pub fn tile_origin(&self, cell: u32) -> (u32, u32) {
        let col = cell % self.cols;
        let row = cell / self.cols;
        (
            TILE_GAP + col * (TILE_SIZE + TILE_GAP),
            LABEL_SPACE + row * (TILE_SIZE + LABEL_SPACE),
        )
    }
}

/// Compose and save the comparison sheet.
///
/// Returns `None` when there are no frames. A reference photo that cannot
/// be read is an error; an evidence still that cannot be read leaves its
/// tile blank.
pub fn create_comparison_sheet(
    reference_path: impl AsRef<Path>,
    frames: &[EvidenceFrame],
    output_dir: impl AsRef<Path>,
    options: &SheetOptions,
) -> MediaResult<Option<PathBuf>> {
    if frames.is_empty() {
        return Ok(None);
    }

    let layout = SheetLayout::for_frames(frames.len());
    let mut canvas = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);

    let reference = load_tile(reference_path.as_ref())?;
    let (x, y) = layout.tile_origin(0);
    imageops::overlay(&mut canvas, &reference, x as i64, y as i64);
    draw_label(&mut canvas, options, x, y.saturating_sub(30), "Reference photo");

    for (i, frame) in frames.iter().enumerate() {
        let (x, y) = layout.tile_origin(i as u32 + 1);
        match load_tile(&frame.path) {
            Ok(tile) => imageops::overlay(&mut canvas, &tile, x as i64, y as i64),
            Err(e) => {
                warn!("Failed to load evidence still {}: {}", frame.path.display(), e);
                continue;
            }
        }
        draw_label(&mut canvas, options, x, y.saturating_sub(25), &frame.label());
    }

    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(COMPARISON_FILE_NAME);

    let mut writer = BufWriter::new(File::create(&output_path)?);
    JpegEncoder::new_with_quality(&mut writer, options.jpeg_quality).encode_image(&canvas)?;
    writer.flush()?;

    info!(
        "Comparison sheet written to {} ({}x{}, {} stills)",
        output_path.display(),
        layout.width,
        layout.height,
        frames.len()
    );
    Ok(Some(output_path))
}

fn load_tile(path: &Path) -> MediaResult<RgbImage> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    let img = image::open(path)?.to_rgb8();
    Ok(imageops::resize(&img, TILE_SIZE, TILE_SIZE, FilterType::Lanczos3))
}

fn draw_label(canvas: &mut RgbImage, options: &SheetOptions, x: u32, y: u32, text: &str) {
    if let Some(font) = options.font.as_ref() {
        draw_text_mut(
            canvas,
            TEXT_COLOR,
            x as i32,
            y as i32,
            PxScale::from(options.font_size),
            font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_solid(path: &Path, color: [u8; 3], w: u32, h: u32) {
        RgbImage::from_pixel(w, h, Rgb(color)).save(path).unwrap();
    }

    fn frame(index: usize, path: PathBuf) -> EvidenceFrame {
        EvidenceFrame {
            index,
            timestamp: format!("00:0{}.00", index),
            frame: index as u64 * 25,
            clamped: false,
            path,
        }
    }

    #[test]
    fn test_layout_small() {
        let layout = SheetLayout::for_frames(2);
        assert_eq!(layout.cols, 3);
        assert_eq!(layout.rows, 1);
        assert_eq!(layout.width, 3 * 300 + 4 * 20);
        assert_eq!(layout.height, 340 + 40);
    }

    #[test]
    fn test_layout_wraps_after_four_columns() {
        let layout = SheetLayout::for_frames(5);
        assert_eq!(layout.cols, 4);
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.height, 2 * 340 + 40);

        assert_eq!(layout.tile_origin(0), (20, 40));
        assert_eq!(layout.tile_origin(3), (20 + 3 * 320, 40));
        assert_eq!(layout.tile_origin(4), (20, 380));

        // Last column stays inside the canvas.
        let (x, _) = layout.tile_origin(3);
        assert!(x + TILE_SIZE + TILE_GAP <= layout.width);
    }

    #[test]
    fn test_no_frames_no_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            create_comparison_sheet("ref.jpg", &[], dir.path(), &SheetOptions::default()).unwrap();
        assert!(result.is_none());
        assert!(!dir.path().join(COMPARISON_FILE_NAME).exists());
    }

    #[test]
    fn test_sheet_composes_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.png");
        write_solid(&reference, [220, 20, 20], 640, 480);

        let still = dir.path().join("evidence_1.png");
        write_solid(&still, [20, 20, 220], 160, 120);

        let frames = vec![frame(1, still), frame(2, dir.path().join("missing.jpg"))];
        let path = create_comparison_sheet(&reference, &frames, dir.path(), &SheetOptions::default())
            .unwrap()
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.ends_with(&[0xFF, 0xD9]), "sheet ends with the JPEG EOI marker");

        let sheet = image::open(&path).unwrap().to_rgb8();
        let layout = SheetLayout::for_frames(2);
        assert_eq!(sheet.dimensions(), (layout.width, layout.height));

        let center = |cell: u32| {
            let (x, y) = layout.tile_origin(cell);
            *sheet.get_pixel(x + TILE_SIZE / 2, y + TILE_SIZE / 2)
        };

        let Rgb([r, _, b]) = center(0);
        assert!(r > 180 && b < 80, "reference tile should be red");
        let Rgb([r, _, b]) = center(1);
        assert!(b > 180 && r < 80, "evidence tile should be blue");
        let Rgb([r, g, b]) = center(2);
        assert!(r > 230 && g > 230 && b > 230, "unreadable still leaves a blank tile");
    }

    #[test]
    fn test_missing_reference_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let still = dir.path().join("evidence_1.png");
        write_solid(&still, [0, 0, 0], 10, 10);

        let result = create_comparison_sheet(
            dir.path().join("nope.jpg"),
            &[frame(1, still)],
            dir.path(),
            &SheetOptions::default(),
        );
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[test]
    fn test_configured_font_must_be_valid() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        assert!(matches!(
            load_label_font(Some(&bogus)),
            Err(MediaError::InvalidFont { .. })
        ));
    }
}

//! Gallery tile model and scroll-window arithmetic.
//!
//! The gallery renders a fixed-column grid inside a scrollable. Instead of
//! per-tile visibility callbacks, the scroll offset drives two index windows:
//! `lazy` decides which thumbnails to request (viewport plus a proximity
//! margin) and `visible` decides which tiles render interactive rather than
//! dimmed.

use std::ops::Range;

pub const COLUMNS: usize = 4;
pub const TILE_SIZE: f32 = 160.0;
pub const TILE_SPACING: f32 = 10.0;
/// Extra height below a result image for filename and similarity bar.
pub const CARD_INFO_HEIGHT: f32 = 64.0;
/// Off-screen tiles within this margin of the viewport start loading.
pub const LAZY_MARGIN: f32 = 100.0;
/// Settle time before a new scroll position triggers a visibility pass.
pub const SCROLL_DEBOUNCE_MS: u64 = 50;
/// Assumed viewport height until the first scroll event reports a real one.
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;

/// One entry of the rendered library grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryTile {
    pub filename: String,
    pub is_original: bool,
}

/// Tile index windows derived from a scroll position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileWindow {
    /// Tiles inside the strict viewport; everything outside renders dimmed
    /// with interaction disabled.
    pub visible: Range<usize>,
    /// Tiles inside the viewport extended by [`LAZY_MARGIN`].
    pub lazy: Range<usize>,
}

impl Default for TileWindow {
    fn default() -> Self {
        Self {
            visible: 0..0,
            lazy: 0..0,
        }
    }
}

fn tile_row_height() -> f32 {
    TILE_SIZE + TILE_SPACING
}

fn card_row_height() -> f32 {
    TILE_SIZE + CARD_INFO_HEIGHT + TILE_SPACING
}

/// Windows for the gallery grid.
pub fn tile_window(count: usize, offset: f32, viewport_height: f32) -> TileWindow {
    window(count, tile_row_height(), offset, viewport_height)
}

/// Windows for the taller search-result cards.
pub fn card_window(count: usize, offset: f32, viewport_height: f32) -> TileWindow {
    window(count, card_row_height(), offset, viewport_height)
}

fn window(count: usize, row_height: f32, offset: f32, viewport_height: f32) -> TileWindow {
    TileWindow {
        visible: rows_between(count, row_height, offset, offset + viewport_height),
        lazy: rows_between(
            count,
            row_height,
            offset - LAZY_MARGIN,
            offset + viewport_height + LAZY_MARGIN,
        ),
    }
}

fn rows_between(count: usize, row_height: f32, top: f32, bottom: f32) -> Range<usize> {
    if count == 0 || bottom <= 0.0 {
        return 0..0;
    }
    let first_row = (top.max(0.0) / row_height).floor() as usize;
    let last_row = (bottom / row_height).ceil() as usize;
    let start = (first_row * COLUMNS).min(count);
    let end = (last_row * COLUMNS).min(count);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_at_top() {
        // 600px viewport over 170px rows: rows 0..4 visible, margin adds one.
        let w = tile_window(100, 0.0, 600.0);
        assert_eq!(w.visible, 0..16);
        assert_eq!(w.lazy, 0..20);
    }

    #[test]
    fn test_window_clamped_to_count() {
        let w = tile_window(5, 0.0, 600.0);
        assert_eq!(w.visible, 0..5);
        assert_eq!(w.lazy, 0..5);
    }

    #[test]
    fn test_window_scrolled() {
        // Offset past the first two rows drops them from the strict window
        // but the margin keeps the row just above in the lazy window.
        let w = tile_window(100, 340.0, 600.0);
        assert_eq!(w.visible, 8..24);
        assert_eq!(w.lazy, 4..28);
    }

    #[test]
    fn test_margin_loads_ahead_of_viewport() {
        let near = tile_window(100, 0.0, 170.0);
        assert_eq!(near.visible, 0..4);
        // 100px margin reaches into the second row below the fold.
        assert_eq!(near.lazy, 0..8);
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(tile_window(0, 0.0, 600.0), TileWindow::default());
    }

    #[test]
    fn test_card_rows_are_taller() {
        let cards = card_window(100, 0.0, 600.0);
        let tiles = tile_window(100, 0.0, 600.0);
        assert!(cards.visible.end < tiles.visible.end);
    }
}

//! Grid geometry types.

use alacritty_terminal::grid::Dimensions;

/// Character-grid size of a terminal surface.
///
/// Never authoritative state: always recomputed from the current panel
/// pixel size and cell metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: u16,
    pub rows: u16,
}

impl TermSize {
    /// Build a size, clamping each axis to at least one cell.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Derive the grid size for a panel of the given pixel dimensions.
    ///
    /// Floors each quotient; a panel smaller than one cell still gets a
    /// 1×1 grid. Returns `None` while cell metrics are unreported or
    /// degenerate — recomputing from stale metrics would produce garbage
    /// geometry, so callers skip the resize instead.
    pub fn from_pixels(panel_width: f32, panel_height: f32, cell: CellMetrics) -> Option<Self> {
        if !(cell.width > 0.0) || !(cell.height > 0.0) {
            return None;
        }

        let cols = (panel_width / cell.width).floor();
        let rows = (panel_height / cell.height).floor();

        let clamp = |axis: f32| -> u16 {
            if axis.is_finite() && axis >= 1.0 {
                axis.min(f32::from(u16::MAX)) as u16
            } else {
                1
            }
        };

        Some(Self {
            cols: clamp(cols),
            rows: clamp(rows),
        })
    }
}

impl Default for TermSize {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.screen_lines()
    }

    fn screen_lines(&self) -> usize {
        self.rows as usize
    }

    fn columns(&self) -> usize {
        self.cols as usize
    }
}

/// Pixel size of one rendered terminal cell.
///
/// Estimated from font settings at surface creation; replaced by the
/// renderer's reported metrics once its first layout pass completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const CELL: CellMetrics = CellMetrics {
        width: 8.0,
        height: 16.0,
    };

    #[test_case(800.0, 384.0, 100, 24; "exact multiples")]
    #[test_case(807.9, 399.9, 100, 24; "remainders floor")]
    #[test_case(4.0, 8.0, 1, 1; "smaller than one cell clamps to 1x1")]
    #[test_case(0.0, 0.0, 1, 1; "zero panel clamps to 1x1")]
    fn derives_geometry(width: f32, height: f32, cols: u16, rows: u16) {
        assert_eq!(
            TermSize::from_pixels(width, height, CELL),
            Some(TermSize { cols, rows })
        );
    }

    #[test]
    fn unreported_cell_metrics_skip_recomputation() {
        let degenerate = CellMetrics {
            width: 0.0,
            height: 16.0,
        };
        assert_eq!(TermSize::from_pixels(800.0, 600.0, degenerate), None);

        let negative = CellMetrics {
            width: 8.0,
            height: -1.0,
        };
        assert_eq!(TermSize::from_pixels(800.0, 600.0, negative), None);
    }

    #[test]
    fn default_is_eighty_by_twenty_four() {
        let size = TermSize::default();
        assert_eq!((size.columns(), size.screen_lines()), (80, 24));
        assert_eq!(size.total_lines(), 24);
    }

    #[test]
    fn new_clamps_to_one_cell() {
        assert_eq!(TermSize::new(0, 0), TermSize { cols: 1, rows: 1 });
    }
}

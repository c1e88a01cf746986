//! Table geometry: column widths and cell placement.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! Implements:
//! - The HTML table model's slot grid: `colspan`, `rowspan` and
//!   `rowspan=0` (span to the last row)
//! - Column widths from `<col>`/`<colgroup>`, falling back to the first row's
//!   single-span cells
//! - Proportional rescaling of explicit widths, even distribution of the rest
//! - Placeholder slots for ragged rows
//!
//! Row heights are not computed: they depend on text shaping, which happens
//! in the document emitter.

use serde::Serialize;

use docflow_common::{DiagnosticKind, Diagnostics};

/// Component name used in diagnostics.
const COMPONENT: &str = "table";

/// A declared column or cell width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ColumnWidth {
    /// Absolute px.
    Px(f32),
    /// Percentage of the table's available width.
    Percent(f32),
}

impl ColumnWidth {
    /// Resolve against the table's available width.
    #[must_use]
    pub fn resolve(self, available_width: f32) -> f32 {
        let px = match self {
            Self::Px(px) => px,
            Self::Percent(pct) => available_width * pct / 100.0,
        };
        if px.is_finite() { px.max(0.0) } else { 0.0 }
    }
}

/// One source cell as the resolver sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellSpec {
    /// Columns spanned, at least 1.
    pub colspan: usize,
    /// Rows spanned. `0` spans to the last row of the table.
    pub rowspan: usize,
    /// Declared width, consulted only for single-span cells of the first row.
    pub width: Option<ColumnWidth>,
}

impl CellSpec {
    /// A 1×1 cell with no declared width.
    #[must_use]
    pub const fn single() -> Self {
        Self {
            colspan: 1,
            rowspan: 1,
            width: None,
        }
    }

    /// A cell spanning `colspan` columns and `rowspan` rows.
    #[must_use]
    pub const fn spanning(colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan,
            rowspan,
            width: None,
        }
    }

    /// Builder-style width.
    #[must_use]
    pub const fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }
}

/// The structural input to [`resolve_table`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableShape {
    /// Cells per row, in final row order (header rows first).
    pub rows: Vec<Vec<CellSpec>>,
    /// Column declarations from `<colgroup>`/`<col>`, one entry per column
    /// after expanding `span`.
    pub columns: Vec<Option<ColumnWidth>>,
}

/// Where the column widths came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WidthSource {
    /// Every column carried a declared width.
    Explicit,
    /// Some columns declared a width; the rest shared the remainder.
    Mixed,
    /// No declared widths; the available width was split evenly.
    Distributed,
}

/// Resolved position and width of one source cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellPlacement {
    /// Origin row.
    pub row: usize,
    /// Origin column.
    pub column: usize,
    /// Columns spanned after clipping to the table.
    pub colspan: usize,
    /// Rows spanned after clipping to the table.
    pub rowspan: usize,
    /// Sum of the spanned column widths.
    pub width: f32,
}

/// An empty slot that no cell covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRef {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub column: usize,
}

/// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
///
/// The resolved horizontal geometry of one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableGeometry {
    /// Resolved width of each column, in px.
    pub column_widths: Vec<f32>,
    /// One placement per source cell, row-major in source order.
    pub cells: Vec<CellPlacement>,
    /// Slots filled with empty placeholder cells.
    pub placeholders: Vec<SlotRef>,
    /// How the widths were obtained.
    pub width_source: Option<WidthSource>,
}

impl TableGeometry {
    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Sum of all column widths.
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    /// X offset of each column's left edge relative to the table.
    #[must_use]
    pub fn column_offsets(&self) -> Vec<f32> {
        self.column_widths
            .iter()
            .scan(0.0, |x, &w| {
                let left = *x;
                *x += w;
                Some(left)
            })
            .collect()
    }
}

/// [§ 17.5.2 Table width algorithms](https://www.w3.org/TR/CSS2/tables.html#width-layout)
///
/// Resolve column widths and cell placement for a table laid out in
/// `available_width` px. Ragged rows and degenerate columns are repaired
/// with a [`DiagnosticKind::LayoutInconsistency`] diagnostic; the result is
/// always usable.
pub fn resolve_table(
    shape: &TableShape,
    available_width: f32,
    min_column_width: f32,
    diagnostics: &mut Diagnostics,
) -> TableGeometry {
    let available = if available_width.is_finite() {
        available_width.max(0.0)
    } else {
        0.0
    };
    let min_width = min_column_width.max(0.0);

    // STEP 1: Place every cell on the slot grid.
    // [§ 4.9.12 Processing model](https://html.spec.whatwg.org/multipage/tables.html#forming-a-table)
    // "the cell covers all the slots with coordinates (x, y) where
    // xcurrent ≤ x < xcurrent+colspan and ycurrent ≤ y < ycurrent+rowspan."
    let row_count = shape.rows.len();
    let mut grid = SlotGrid::new(row_count);
    let mut origins = Vec::new();
    for (row, cells) in shape.rows.iter().enumerate() {
        let mut column = 0;
        for cell in cells {
            column = grid.next_free(row, column);
            let colspan = cell.colspan.max(1);
            // "If the rowspan attribute's value is zero, the cell is to span
            // all the remaining rows in the row group."
            let rowspan = if cell.rowspan == 0 {
                row_count - row
            } else {
                cell.rowspan.min(row_count - row)
            };
            grid.occupy(row, column, colspan, rowspan);
            origins.push((row, column, colspan, rowspan));
            column += colspan;
        }
    }

    // STEP 2: Column count.
    let column_count = grid.width().max(shape.columns.len());
    if column_count == 0 {
        return TableGeometry::default();
    }

    // STEP 3: Pad ragged rows.
    let placeholders = grid.free_slots(column_count);
    if !placeholders.is_empty() {
        diagnostics.report(
            DiagnosticKind::LayoutInconsistency,
            COMPONENT,
            format!(
                "rows have inconsistent column counts; {} empty cell(s) added to fill {column_count} columns",
                placeholders.len()
            ),
        );
    }

    // STEP 4: Declared widths, from columns or else the first row.
    let mut declared: Vec<Option<f32>> = vec![None; column_count];
    if shape.columns.iter().any(Option::is_some) {
        for (slot, width) in declared.iter_mut().zip(&shape.columns) {
            *slot = width.map(|w| w.resolve(available));
        }
    } else if let Some(first_row) = shape.rows.first() {
        for (cell, &(_, column, colspan, _)) in first_row.iter().zip(&origins) {
            if colspan == 1 {
                declared[column] = cell.width.map(|w| w.resolve(available));
            }
        }
    }

    // STEP 5: Distribute the available width.
    let (mut widths, source) = distribute(&declared, available, min_width);

    // STEP 6: Raise degenerate columns.
    for (index, width) in widths.iter_mut().enumerate() {
        if *width < min_width {
            diagnostics.report(
                DiagnosticKind::LayoutInconsistency,
                COMPONENT,
                format!("column {index} resolved to {width:.1}px; raised to {min_width:.1}px"),
            );
            *width = min_width;
        }
    }

    // STEP 7: Cell widths are the sum of the columns they span.
    let cells = origins
        .into_iter()
        .map(|(row, column, colspan, rowspan)| {
            let colspan = colspan.min(column_count.saturating_sub(column)).max(1);
            CellPlacement {
                row,
                column,
                colspan,
                rowspan,
                width: span_width(&widths, column, colspan),
            }
        })
        .collect();

    log::debug!(
        target: "docflow::table",
        "{row_count} rows x {column_count} columns in {available}px ({source:?}): {widths:?}"
    );

    TableGeometry {
        column_widths: widths,
        cells,
        placeholders,
        width_source: Some(source),
    }
}

/// Widths before the minimum is enforced.
#[allow(clippy::cast_precision_loss)]
fn distribute(declared: &[Option<f32>], available: f32, min_width: f32) -> (Vec<f32>, WidthSource) {
    let count = declared.len();
    let explicit_sum: f32 = declared.iter().flatten().sum();
    let free = declared.iter().filter(|w| w.is_none()).count();

    if free == count || (free == 0 && explicit_sum <= f32::EPSILON) {
        let even = available / count as f32;
        return (vec![even; count], WidthSource::Distributed);
    }

    if free == 0 {
        // Explicit widths keep their proportions but fill the table.
        let scale = available / explicit_sum;
        let widths = declared.iter().flatten().map(|w| w * scale).collect();
        return (widths, WidthSource::Explicit);
    }

    // Explicit columns first; the rest share what is left.
    let reserved = min_width * free as f32;
    let (scale, rest) = if explicit_sum + reserved <= available {
        (1.0, (available - explicit_sum) / free as f32)
    } else if explicit_sum > 0.0 {
        ((available - reserved).max(0.0) / explicit_sum, min_width)
    } else {
        (1.0, min_width)
    };
    let widths = declared
        .iter()
        .map(|w| w.map_or(rest, |w| w * scale))
        .collect();
    (widths, WidthSource::Mixed)
}

fn span_width(widths: &[f32], start: usize, span: usize) -> f32 {
    widths.iter().skip(start).take(span).sum()
}

/// Which slots are covered by a cell.
struct SlotGrid {
    rows: Vec<Vec<bool>>,
}

impl SlotGrid {
    fn new(row_count: usize) -> Self {
        Self {
            rows: vec![Vec::new(); row_count],
        }
    }

    fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.rows[row].get(column).copied().unwrap_or(false)
    }

    /// First free column at or after `column`.
    fn next_free(&self, row: usize, mut column: usize) -> usize {
        while self.is_occupied(row, column) {
            column += 1;
        }
        column
    }

    fn occupy(&mut self, row: usize, column: usize, colspan: usize, rowspan: usize) {
        for slots in self.rows.iter_mut().skip(row).take(rowspan) {
            if slots.len() < column + colspan {
                slots.resize(column + colspan, false);
            }
            for slot in &mut slots[column..column + colspan] {
                *slot = true;
            }
        }
    }

    fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn free_slots(&self, column_count: usize) -> Vec<SlotRef> {
        (0..self.rows.len())
            .flat_map(|row| {
                (0..column_count)
                    .filter(move |&column| !self.is_occupied(row, column))
                    .map(move |column| SlotRef { row, column })
            })
            .collect()
    }
}

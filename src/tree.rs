//! The spatial prefix tree contract.
//!
//! A tree decomposes its world bounds into nested cells. Configuration is
//! fixed at construction; trees are immutable afterwards and can be shared
//! read-only across threads. Cells are created per call.

use crate::cell::Cell;
use crate::error::{PrefixTreeError, Result};
use geo::Point;
use geoprefix_types::context::SpatialContext;
use geoprefix_types::shape::Shape;

pub trait SpatialPrefixTree {
    type Cell: Cell;

    fn context(&self) -> &SpatialContext;

    /// Deepest level cells of this tree may have.
    fn max_levels(&self) -> usize;

    /// Coarsest level whose cells are no larger than `dist` (in degrees for
    /// geographic contexts), clamped to `[1, max_levels]`. Zero means the
    /// finest level.
    fn level_for_distance(&self, dist: f64) -> usize;

    /// The root: empty token, level 0, covering the world bounds.
    fn world_cell(&self) -> Self::Cell;

    /// The cell at `level` containing `point`. Level 0 is the world cell.
    fn cell_at(&self, point: &Point<f64>, level: usize) -> Result<Self::Cell>;

    /// Rebuilds a cell from its token bytes, leaf marker included if present.
    ///
    /// No decoding happens here; a malformed token surfaces as
    /// [`PrefixTreeError::InvalidToken`] once its shape, center or children
    /// are requested. Callers holding a larger buffer pass
    /// `&buf[offset..offset + len]`.
    fn cell_from_bytes(&self, bytes: &[u8]) -> Self::Cell;

    /// Diagonal of a cell at `level`, measured at the world center.
    ///
    /// Cartesian hypotenuse of the cell's width and height, which
    /// over-estimates the true distance for geographic contexts.
    fn distance_for_level(&self, level: usize) -> Result<f64> {
        if !(1..=self.max_levels()).contains(&level) {
            return Err(PrefixTreeError::InvalidLevel {
                level,
                max: self.max_levels(),
            });
        }
        let rect = self.cell_at(&self.context().center(), level)?.shape()?;
        Ok(rect.width().hypot(rect.height()))
    }

    /// Decomposes `shape` into the cells covering it down to `detail_level`.
    ///
    /// Cells reaching `detail_level`, or lying wholly within the shape, are
    /// leaves. With `include_parents` every non-root ancestor visited comes
    /// before its descendants. With `simplify`, a parent whose children all
    /// ended as leaves replaces them as a single leaf.
    fn cells_for_shape(
        &self,
        shape: &Shape,
        detail_level: usize,
        include_parents: bool,
        simplify: bool,
    ) -> Result<Vec<Self::Cell>> {
        if detail_level > self.max_levels() {
            return Err(PrefixTreeError::InvalidLevel {
                level: detail_level,
                max: self.max_levels(),
            });
        }

        if let Shape::Point(point) = shape {
            return self.cells_for_point(point, detail_level, include_parents);
        }

        let mut cells = Vec::new();
        collect_cells(
            self.world_cell(),
            shape,
            detail_level,
            include_parents,
            simplify,
            &mut cells,
        )?;
        log::trace!(
            "Decomposed shape into {} cells at detail level {}",
            cells.len(),
            detail_level
        );
        Ok(cells)
    }

    /// The cell at `detail_level` containing `point`, preceded by its
    /// ancestors from level 1 when `include_parents` is set.
    fn cells_for_point(
        &self,
        point: &Point<f64>,
        detail_level: usize,
        include_parents: bool,
    ) -> Result<Vec<Self::Cell>> {
        let cell = self.cell_at(point, detail_level)?;
        if !include_parents {
            return Ok(vec![cell]);
        }

        let token = cell.token_bytes_no_leaf();
        let mut cells: Vec<Self::Cell> = (1..detail_level)
            .map(|level| self.cell_from_bytes(&token[..level]))
            .collect();
        cells.push(cell);
        Ok(cells)
    }
}

/// Returns whether `cell` ended up as a single leaf entry in `out`.
fn collect_cells<C: Cell>(
    mut cell: C,
    shape: &Shape,
    detail_level: usize,
    include_parents: bool,
    simplify: bool,
    out: &mut Vec<C>,
) -> Result<bool> {
    if cell.level() == detail_level {
        cell.set_leaf();
    }
    if cell.is_leaf() {
        out.push(cell);
        return Ok(true);
    }

    let level = cell.level();
    if include_parents && level != 0 {
        out.push(cell.clone());
    }

    let mut leaves = 0;
    for sub_cell in cell.sub_cells_within(shape)? {
        if collect_cells(
            sub_cell,
            shape,
            detail_level,
            include_parents,
            simplify,
            out,
        )? {
            leaves += 1;
        }
    }

    // Every child was a leaf: collapse them into this cell.
    if simplify && level != 0 && leaves == cell.sub_cells_size() {
        out.truncate(out.len() - leaves);
        if include_parents {
            if let Some(parent) = out.last_mut() {
                parent.set_leaf();
            }
        } else {
            cell.set_leaf();
            out.push(cell);
        }
        return Ok(true);
    }

    Ok(false)
}

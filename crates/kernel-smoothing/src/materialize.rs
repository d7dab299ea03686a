//! Turn a dense density grid back into positioned smoothed cells.

use smoothing_common::{GridPlan, SmoothedCell, SmoothingError, SmoothingResult};
use std::iter::FusedIterator;

/// Lazily produce smoothed cells from a row-major density grid.
///
/// Cell `i` sits at row `i / count_x`, column `i % count_x`. Cells whose value
/// fails `filter` are dropped, not replaced. Fails with `InvalidData` when the
/// grid length does not match the plan.
pub fn materialize<'a>(
    grid: &'a [f64],
    plan: &GridPlan,
    filter: Option<&'a dyn Fn(f64) -> bool>,
) -> SmoothingResult<SmoothedCells<'a>> {
    if grid.len() != plan.len() {
        return Err(SmoothingError::invalid_data(format!(
            "density grid has {} values but the plan has {}x{} = {} cells",
            grid.len(),
            plan.count_x,
            plan.count_y,
            plan.len()
        )));
    }

    Ok(SmoothedCells {
        grid,
        plan: *plan,
        filter,
        index: 0,
    })
}

/// Single-pass iterator over the smoothed cells of one draw.
pub struct SmoothedCells<'a> {
    grid: &'a [f64],
    plan: GridPlan,
    filter: Option<&'a dyn Fn(f64) -> bool>,
    index: usize,
}

impl Iterator for SmoothedCells<'_> {
    type Item = SmoothedCell;

    fn next(&mut self) -> Option<SmoothedCell> {
        while self.index < self.grid.len() {
            let i = self.index;
            self.index += 1;

            let value = self.grid[i];
            if let Some(filter) = self.filter {
                if !filter(value) {
                    continue;
                }
            }

            let row = i / self.plan.count_x;
            let col = i % self.plan.count_x;
            return Some(SmoothedCell {
                x: self.plan.origin_x + col as f64 * self.plan.cell_size,
                y: self.plan.origin_y + row as f64 * self.plan.cell_size,
                value,
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len() - self.index;
        match self.filter {
            Some(_) => (0, Some(remaining)),
            None => (remaining, Some(remaining)),
        }
    }
}

impl FusedIterator for SmoothedCells<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_row_major() {
        let plan = GridPlan::new(100.0, 200.0, 5.0, 2, 2);
        let grid = [1.0, 2.0, 3.0, 4.0];
        let cells: Vec<_> = materialize(&grid, &plan, None).unwrap().collect();

        let positions: Vec<_> = cells.iter().map(|c| (c.x, c.y, c.value)).collect();
        assert_eq!(
            positions,
            vec![
                (100.0, 200.0, 1.0),
                (105.0, 200.0, 2.0),
                (100.0, 205.0, 3.0),
                (105.0, 205.0, 4.0),
            ]
        );
    }

    #[test]
    fn test_filter_drops_cells() {
        let plan = GridPlan::new(0.0, 0.0, 1.0, 3, 1);
        let grid = [0.0, 0.5, 2.0];
        let keep = |v: f64| v > 0.1;
        let cells: Vec<_> = materialize(&grid, &plan, Some(&keep)).unwrap().collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].x, 1.0);
        assert_eq!(cells[1].x, 2.0);
    }

    #[test]
    fn test_length_mismatch_is_invalid_data() {
        let plan = GridPlan::new(0.0, 0.0, 1.0, 2, 2);
        let err = materialize(&[1.0, 2.0, 3.0], &plan, None).err().unwrap();
        assert!(matches!(err, SmoothingError::InvalidData(_)));
    }

    #[test]
    fn test_size_hint_exact_without_filter() {
        let plan = GridPlan::new(0.0, 0.0, 1.0, 2, 3);
        let grid = [0.0; 6];
        let mut cells = materialize(&grid, &plan, None).unwrap();
        assert_eq!(cells.size_hint(), (6, Some(6)));
        cells.next();
        assert_eq!(cells.size_hint(), (5, Some(5)));
    }
}

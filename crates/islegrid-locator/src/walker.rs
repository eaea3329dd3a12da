// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Outward square spiral over island anchors.
//!
//! Starting from any anchor, repeated steps trace rectangular rings of
//! growing size: right along the bottom edge, up the right edge, left along
//! the top, down the left, then out to the next ring.

use crate::types::Cell;

/// Next anchor after `cell` on a spiral with spacing `step`
pub fn next_cell(cell: Cell, step: i32) -> Cell {
    let Cell { x, z } = cell;
    if x < z {
        if -x < z {
            return cell.offset(step, 0);
        }
        return cell.offset(0, step);
    }
    if x > z {
        if -x >= z {
            return cell.offset(-step, 0);
        }
        return cell.offset(0, -step);
    }
    if x <= 0 {
        return cell.offset(0, step);
    }
    cell.offset(0, -step)
}

/// Stateful spiral cursor
///
/// Iterating yields the current cell first, then each successor.
#[derive(Debug, Clone)]
pub struct GridWalker {
    current: Cell,
    step: i32,
}

impl GridWalker {
    /// Walker starting at `start` with anchors `2 * island_distance` apart
    pub fn new(start: Cell, island_distance: i32) -> Self {
        Self::with_step(start, island_distance.saturating_mul(2))
    }

    pub fn with_step(start: Cell, step: i32) -> Self {
        Self {
            current: start,
            step,
        }
    }

    /// Next cell that would be handed out
    pub fn current(&self) -> Cell {
        self.current
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    /// Hand out the current cell and move to its successor
    pub fn advance(&mut self) -> Cell {
        let cell = self.current;
        self.current = next_cell(cell, self.step);
        cell
    }
}

impl Iterator for GridWalker {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        Some(self.advance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    fn cells(coords: &[(i32, i32)]) -> Vec<Cell> {
        coords.iter().map(|&(x, z)| Cell::new(x, z)).collect()
    }

    #[test]
    fn test_first_ring_from_origin() {
        let walked: Vec<Cell> = GridWalker::with_step(Cell::new(0, 0), 2).take(9).collect();
        assert_eq!(
            walked,
            cells(&[
                (0, 0),
                (0, 2),
                (2, 2),
                (2, 0),
                (2, -2),
                (0, -2),
                (-2, -2),
                (-2, 0),
                (-2, 2),
            ])
        );
    }

    #[test]
    fn test_second_ring_continues_outward() {
        let walked: Vec<Cell> = GridWalker::with_step(Cell::new(-2, 2), 2).take(6).collect();
        assert_eq!(
            walked,
            cells(&[(-2, 2), (-2, 4), (0, 4), (2, 4), (4, 4), (4, 2)])
        );
    }

    #[test]
    fn test_rings_cover_every_anchor_once() {
        // Rings 0..=3 hold (2 * 3 + 1)^2 anchors
        let step = 800;
        let walked: Vec<Cell> = GridWalker::new(Cell::new(0, 0), 400).take(49).collect();
        let unique: AHashSet<Cell> = walked.iter().copied().collect();
        assert_eq!(unique.len(), 49);
        for cell in &walked {
            assert_eq!(cell.x % step, 0);
            assert_eq!(cell.z % step, 0);
            assert!(cell.x.abs() <= 3 * step && cell.z.abs() <= 3 * step, "{} escaped", cell);
        }
    }

    #[test]
    fn test_advance_returns_current() {
        let mut walker = GridWalker::new(Cell::new(0, 0), 1);
        assert_eq!(walker.advance(), Cell::new(0, 0));
        assert_eq!(walker.current(), Cell::new(0, 2));
        assert_eq!(walker.step(), 2);
    }
}

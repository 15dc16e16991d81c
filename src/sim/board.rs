//! Peg collection with overlap prevention

use std::collections::BTreeMap;

use super::state::{Peg, PegColor};
use crate::consts::PEG_DEFAULT_RADIUS;
use crate::physics::{BodyId, Position};

/// A named level. Pegs are kept in id order so iteration is deterministic.
#[derive(Debug)]
pub struct GameBoard {
    pub name: String,
    pegs: BTreeMap<BodyId, Peg>,
    /// Half-width of the square searched by `find_peg_at`
    pick_radius: f64,
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl GameBoard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pegs: BTreeMap::new(),
            pick_radius: PEG_DEFAULT_RADIUS,
        }
    }

    pub fn pick_radius(&self) -> f64 {
        self.pick_radius
    }

    pub fn set_pick_radius(&mut self, radius: f64) {
        self.pick_radius = radius;
    }

    /// The stock level: a 3 x 4 grid spaced 200 apart, blue and orange in a
    /// checkerboard pattern
    pub fn default_grid() -> Self {
        let mut board = Self::new("default level");
        for row in 1..=4u32 {
            for col in 1..=3u32 {
                let color = if (row + col) % 2 == 0 {
                    PegColor::Blue
                } else {
                    PegColor::Orange
                };
                let location = Position::new(f64::from(col * 200), f64::from(row * 200));
                board.add_peg(Peg::circle(color, location));
            }
        }
        board
    }

    /// Insert `peg` unless it overlaps (or touches) a peg already on the board
    pub fn add_peg(&mut self, peg: Peg) -> bool {
        if self.pegs.values().any(|p| p.is_overlapping(&peg)) {
            return false;
        }
        self.pegs.insert(peg.id(), peg);
        true
    }

    pub fn remove_peg(&mut self, id: BodyId) -> bool {
        self.pegs.remove(&id).is_some()
    }

    /// Whether any other peg overlaps `peg` where it currently is
    pub fn peg_does_overlap(&self, peg: &Peg) -> bool {
        self.pegs
            .values()
            .any(|p| p.id() != peg.id() && p.is_overlapping(peg))
    }

    pub fn number_of_pegs_of_color(&self, color: PegColor) -> usize {
        self.pegs.values().filter(|p| p.color == color).count()
    }

    pub fn clear_all_pegs(&mut self) {
        self.pegs.clear();
    }

    pub fn len(&self) -> usize {
        self.pegs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pegs.is_empty()
    }

    pub fn peg(&self, id: BodyId) -> Option<&Peg> {
        self.pegs.get(&id)
    }

    pub fn peg_mut(&mut self, id: BodyId) -> Option<&mut Peg> {
        self.pegs.get_mut(&id)
    }

    pub fn pegs(&self) -> impl Iterator<Item = &Peg> {
        self.pegs.values()
    }

    pub fn pegs_mut(&mut self) -> impl Iterator<Item = &mut Peg> {
        self.pegs.values_mut()
    }

    pub fn ids(&self) -> Vec<BodyId> {
        self.pegs.keys().copied().collect()
    }

    /// First peg (in id order) whose centre is within the pick radius of
    /// `point` on both axes
    pub fn find_peg_at(&self, point: Position) -> Option<BodyId> {
        let radius = self.pick_radius;
        self.pegs
            .values()
            .find(|p| {
                let location = p.location();
                (location.x - point.x).abs() < radius && (location.y - point.y).abs() < radius
            })
            .map(Peg::id)
    }

    /// Move the peg found at `from` to `to`.
    ///
    /// Fails if no peg is at `from`, if `to` lies outside `upper..=lower`, or
    /// if the peg would overlap another. On failure the peg keeps its
    /// original location.
    pub fn update_peg_location(&mut self, from: Position, to: Position, upper: f64, lower: f64) -> bool {
        let Some(id) = self.find_peg_at(from) else {
            return false;
        };
        let Some(mut peg) = self.pegs.remove(&id) else {
            return false;
        };

        let original = peg.location();
        peg.set_location(to);
        let out_of_bounds = to.y < upper || to.y > lower;
        let moved = !out_of_bounds && !self.peg_does_overlap(&peg);
        if !moved {
            peg.set_location(original);
        }

        self.pegs.insert(id, peg);
        moved
    }
}

//! Serializable board layout exchanged with level storage

use serde::{Deserialize, Serialize};

use super::board::GameBoard;
use super::state::{Peg, PegColor, Powerup};
use crate::consts::PEG_DEFAULT_RADIUS;
use crate::error::Result;
use crate::physics::{Position, Shape};

fn default_radius() -> f64 {
    PEG_DEFAULT_RADIUS
}

/// One stored peg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegLayout {
    pub color: PegColor,
    #[serde(default)]
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub powerup: Powerup,
}

impl From<&Peg> for PegLayout {
    fn from(peg: &Peg) -> Self {
        let location = peg.location();
        Self {
            color: peg.color,
            shape: peg.shape(),
            x: location.x,
            y: location.y,
            radius: peg.radius(),
            angle: peg.angle_of_rotation(),
            powerup: peg.powerup,
        }
    }
}

impl PegLayout {
    pub fn to_peg(&self) -> Peg {
        Peg::new(self.color, Position::new(self.x, self.y), self.shape)
            .with_radius(self.radius)
            .with_rotation(self.angle)
            .with_powerup(self.powerup)
    }
}

/// A named board as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub name: String,
    #[serde(default)]
    pub pegs: Vec<PegLayout>,
}

impl BoardLayout {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl GameBoard {
    pub fn to_layout(&self) -> BoardLayout {
        BoardLayout {
            name: self.name.clone(),
            pegs: self.pegs().map(PegLayout::from).collect(),
        }
    }

    /// Build a board from a layout. Entries overlapping an earlier entry are
    /// dropped.
    pub fn from_layout(layout: &BoardLayout) -> Self {
        let mut board = GameBoard::new(layout.name.clone());
        for entry in &layout.pegs {
            if !board.add_peg(entry.to_peg()) {
                log::warn!(
                    "Skipping overlapping peg at ({}, {}) in board '{}'",
                    entry.x,
                    entry.y,
                    layout.name
                );
            }
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_layout_roundtrip() {
        let mut board = GameBoard::new("level 1");
        board.add_peg(
            Peg::new(PegColor::Green, Position::new(100.0, 200.0), Shape::EquilateralTriangle)
                .with_radius(30.0)
                .with_rotation(0.5)
                .with_powerup(Powerup::SpookyBall),
        );
        board.add_peg(Peg::circle(PegColor::Orange, Position::new(300.0, 200.0)));

        let json = board.to_layout().to_json().expect("serializes");
        let restored = GameBoard::from_layout(&BoardLayout::from_json(&json).expect("parses"));

        assert_eq!(restored.name, "level 1");
        assert_eq!(restored.to_layout(), board.to_layout());
    }

    #[test]
    fn test_minimal_entry_uses_defaults() {
        let layout = BoardLayout::from_json(
            r#"{ "name": "tiny", "pegs": [ { "color": "Orange", "x": 10.0, "y": 20.0 } ] }"#,
        )
        .expect("parses");
        let entry = &layout.pegs[0];
        assert_eq!(entry.shape, Shape::Circle);
        assert_eq!(entry.radius, PEG_DEFAULT_RADIUS);
        assert_eq!(entry.powerup, Powerup::None);
    }

    #[test]
    fn test_overlapping_entries_are_skipped() {
        let entry = |x| PegLayout {
            color: PegColor::Blue,
            shape: Shape::Circle,
            x,
            y: 100.0,
            radius: 20.0,
            angle: 0.0,
            powerup: Powerup::None,
        };
        let layout = BoardLayout {
            name: "crowded".into(),
            pegs: vec![entry(100.0), entry(110.0), entry(200.0)],
        };
        assert_eq!(GameBoard::from_layout(&layout).len(), 2);
    }

    #[test]
    fn test_engine_from_layout_registers_every_peg() {
        use crate::physics::Bounds;
        use crate::sim::PeggleGameEngine;

        let entry = |color, x| PegLayout {
            color,
            shape: Shape::Circle,
            x,
            y: 500.0,
            radius: 20.0,
            angle: 0.0,
            powerup: Powerup::None,
        };
        // The orange peg touches the blue one and is refused
        let layout = BoardLayout {
            name: "touching".into(),
            pegs: vec![
                entry(PegColor::Blue, 360.0),
                entry(PegColor::Orange, 400.0),
                entry(PegColor::Orange, 600.0),
            ],
        };
        let board = GameBoard::from_layout(&layout);
        assert_eq!(board.len(), 2);
        assert_eq!(board.number_of_pegs_of_color(PegColor::Orange), 1);

        let engine = PeggleGameEngine::new(Bounds::new(0.0, 800.0, 0.0, 1000.0), board);
        assert_eq!(engine.board().len(), 2);
        assert_eq!(engine.physics().immovable_count(), 2);
        for id in engine.board().ids() {
            assert!(engine.physics().contains(id));
        }
    }
}

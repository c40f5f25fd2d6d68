//! Collision detection
//!
//! Two tests with deliberately different edge semantics: general overlap is
//! strict (shared edges do not collide), while an invader reaching the ship
//! line counts as soon as its lower edge touches the ship's upper edge.

use super::entity::Rect;
use super::state::{Invader, Projectile, Ship};

/// Strict AABB overlap
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// True when `invader` overlaps the ship or has descended to the ship's line
pub fn invader_reaches_ship(invader: &Invader, ship: &Ship) -> bool {
    let inv = invader.bounds();
    let ship = ship.bounds();
    intersects(&inv, &ship) || inv.bottom() >= ship.top()
}

/// Index of the first invader, in collection order, that reaches the ship
pub fn first_ship_contact(invaders: &[Invader], ship: &Ship) -> Option<usize> {
    invaders
        .iter()
        .position(|invader| invader_reaches_ship(invader, ship))
}

/// Result of resolving projectiles against invaders for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hits {
    /// Per projectile: hit something this frame
    pub spent: Vec<bool>,
    /// Per invader: destroyed this frame
    pub destroyed: Vec<bool>,
    /// Scoring hits, one per spent projectile
    pub kills: u32,
}

impl Hits {
    pub fn is_empty(&self) -> bool {
        self.kills == 0
    }
}

/// Match each projectile with the first invader it overlaps
///
/// A projectile is spent on the first overlapping invader in collection
/// order and every spent projectile scores, so two projectiles reaching the
/// same invader in one frame score twice while the invader is flagged once.
/// Nothing is removed here; callers drop the flagged entities after the scan.
pub fn resolve_hits(projectiles: &[Projectile], invaders: &[Invader]) -> Hits {
    let mut hits = Hits {
        spent: vec![false; projectiles.len()],
        destroyed: vec![false; invaders.len()],
        kills: 0,
    };

    for (pi, projectile) in projectiles.iter().enumerate() {
        let shot = projectile.bounds();
        if let Some(ii) = invaders
            .iter()
            .position(|invader| intersects(&shot, &invader.bounds()))
        {
            hits.spent[pi] = true;
            hits.destroyed[ii] = true;
            hits.kills += 1;
        }
    }

    hits
}

/// Remove the elements whose indices are flagged, keeping order
pub(crate) fn remove_flagged<T>(items: &mut Vec<T>, flagged: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !flagged.get(index).copied().unwrap_or(false);
        index += 1;
        keep
    });
}

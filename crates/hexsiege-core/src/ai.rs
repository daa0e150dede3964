//! AI faction strategy.
//!
//! An AI turn runs in phases: every AI tile grows, then after a settle delay
//! the infection targets are planned in one pass and applied one pair at a
//! time on a fixed stagger. Planning is deterministic apart from the
//! tie-break draw, which comes from the session's seeded RNG.

use crate::hex::HexCoord;
use crate::map::{Board, TileImage};
use crate::settings::Rules;
use crate::types::Owner;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Progress of the AI turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AiPhase {
    #[default]
    Idle,
    Growing,
    Infecting,
    Settling,
    Done,
}

/// One planned infection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Infection {
    pub source: HexCoord,
    pub target: HexCoord,
}

/// Infection pairs in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfectionPlan {
    pub pairs: Vec<Infection>,
}

impl InfectionPlan {
    /// Total stagger time needed to apply every pair.
    pub fn duration_ms(&self, rules: &Rules) -> u64 {
        self.pairs.len() as u64 * rules.infection_stagger_ms
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// State of the AI turn in flight, owned by the session.
#[derive(Clone, Debug, Default)]
pub struct AiTurn {
    pub phase: AiPhase,
    pub plan: InfectionPlan,
    /// Pre-images of every tile the AI changed, in application order.
    pub effects: Vec<TileImage>,
}

/// Raise every AI tile below the growth cap by one. Returns pre-images of
/// the tiles that changed.
pub fn grow(board: &mut Board, rules: &Rules) -> Vec<TileImage> {
    let growing: Vec<TileImage> = board
        .all_tiles()
        .iter()
        .filter(|t| t.owner().is_ai() && t.power() < rules.ai_growth_cap)
        .map(|t| t.image())
        .collect();

    for image in &growing {
        board.set_power(&image.coord, image.power + 1);
    }
    debug!(tiles = growing.len(), "AI growth");
    growing
}

/// Choose at most one target per qualifying AI tile.
///
/// Sources are AI tiles at or above the infection threshold, evaluated in
/// ascending index order. Each source considers neighbours that are not AI,
/// strictly weaker, unshielded and not yet claimed by an earlier source;
/// among those at the lowest power, neutral tiles are preferred, and the
/// final pick is uniform over what remains.
pub fn plan_infection<R: Rng>(board: &Board, rules: &Rules, rng: &mut R) -> InfectionPlan {
    let mut sources: Vec<_> = board
        .all_tiles()
        .iter()
        .filter(|t| t.owner().is_ai() && t.power() >= rules.ai_infection_threshold)
        .collect();
    sources.sort_by_key(|t| t.index());

    let mut claimed: HashSet<HexCoord> = HashSet::new();
    let mut plan = InfectionPlan::default();

    for source in sources {
        let eligible: Vec<_> = board
            .neighbors(&source.coord())
            .into_iter()
            .filter(|n| {
                !n.owner().is_ai()
                    && n.power() < source.power()
                    && !n.is_shielded()
                    && !claimed.contains(&n.coord())
            })
            .collect();

        let Some(min_power) = eligible.iter().map(|n| n.power()).min() else {
            continue;
        };
        let mut candidates: Vec<_> = eligible
            .into_iter()
            .filter(|n| n.power() == min_power)
            .collect();
        if candidates.iter().any(|n| n.owner().is_neutral()) {
            candidates.retain(|n| n.owner().is_neutral());
        }

        let target = candidates[rng.gen_range(0..candidates.len())].coord();
        claimed.insert(target);
        plan.pairs.push(Infection {
            source: source.coord(),
            target,
        });
    }

    debug!(pairs = plan.pairs.len(), "AI infection planned");
    plan
}

/// Apply one planned infection. A target that no longer exists is skipped.
pub fn apply_infection(board: &mut Board, rules: &Rules, infection: &Infection) -> Option<TileImage> {
    let Some(tile) = board.tile_at(&infection.target) else {
        warn!(target = %infection.target, "infection target missing, skipped");
        return None;
    };
    let prev = tile.image();
    board.set_owner(&infection.target, Owner::Ai);
    board.set_power(&infection.target, rules.infection_power);
    debug!(source = %infection.source, target = %infection.target, "infected");
    Some(prev)
}

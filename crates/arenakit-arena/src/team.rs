//! Least-used team assignment.

use std::collections::BTreeSet;

use arenakit_types::ArenaTeam;

/// Hands out teams so that usage stays as even as possible.
///
/// Each configured team is a slot with a use count. [`next_team`] takes the
/// slot with the lowest count (first in configuration order on a tie) and
/// bumps it. [`recycle`] gives a use back when a player leaves. A team
/// listed twice gets two slots, so it is handed out twice as often.
///
/// [`next_team`]: Self::next_team
/// [`recycle`]: Self::recycle
#[derive(Debug, Clone)]
pub struct TeamDistributor {
    teams: Vec<ArenaTeam>,
    uses: Vec<u32>,
    /// `(uses, slot)` for every slot; the first entry is the next pick.
    order: BTreeSet<(u32, usize)>,
}

impl TeamDistributor {
    pub fn new(teams: impl IntoIterator<Item = ArenaTeam>) -> Self {
        let teams: Vec<ArenaTeam> = teams.into_iter().collect();
        let uses = vec![0; teams.len()];
        let order = (0..teams.len()).map(|slot| (0, slot)).collect();
        Self { teams, uses, order }
    }

    /// Returns the least-used team and counts one more use of it.
    ///
    /// `None` when no teams are configured.
    pub fn next_team(&mut self) -> Option<ArenaTeam> {
        let (uses, slot) = self.order.pop_first()?;
        self.uses[slot] = uses + 1;
        self.order.insert((uses + 1, slot));
        Some(self.teams[slot])
    }

    /// Gives back one use of `team`.
    ///
    /// Takes the use from the busiest slot holding `team`. Unknown teams and
    /// teams with no uses are ignored. Returns `true` if a use was returned.
    pub fn recycle(&mut self, team: ArenaTeam) -> bool {
        let busiest = self
            .teams
            .iter()
            .enumerate()
            .filter(|&(slot, t)| *t == team && self.uses[slot] > 0)
            .max_by_key(|&(slot, _)| self.uses[slot])
            .map(|(slot, _)| slot);

        let Some(slot) = busiest else {
            return false;
        };
        let uses = self.uses[slot];
        self.order.remove(&(uses, slot));
        self.uses[slot] = uses - 1;
        self.order.insert((uses - 1, slot));
        true
    }

    /// Sets every use count back to zero.
    pub fn reset(&mut self) {
        self.uses.iter_mut().for_each(|uses| *uses = 0);
        self.order = (0..self.teams.len()).map(|slot| (0, slot)).collect();
    }

    /// Uses of `team` summed over its slots.
    pub fn uses(&self, team: ArenaTeam) -> u32 {
        self.teams
            .iter()
            .zip(&self.uses)
            .filter(|(t, _)| **t == team)
            .map(|(_, uses)| uses)
            .sum()
    }

    /// Difference between the busiest and the idlest slot.
    pub fn spread(&self) -> u32 {
        match (self.order.first(), self.order.last()) {
            (Some((low, _)), Some((high, _))) => high - low,
            _ => 0,
        }
    }

    pub fn teams(&self) -> &[ArenaTeam] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

//! Hostile units travelling along the route.

use std::sync::Arc;

use glam::Vec2;
use route_defence_core::{
    DamageOutcome, Health, MoveOutcome, UnitId, UnitProfile, UnitSnapshot, UnitTerminated,
    WaveIndex,
};

use crate::route::Route;

/// Single unit owned by the world's active set.
///
/// A unit is spawned staged off the path, steps onto waypoint zero with its
/// first advance and terminates either when its health reaches zero or when it
/// reaches the final waypoint. Terminated units reject every further mutation.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    id: UnitId,
    route: Arc<Route>,
    waypoint: Option<usize>,
    health: Health,
    max_health: Health,
    ticks_per_advance: u32,
    accrued: u32,
    hold: u32,
    reward: u32,
    score: u32,
    breach_damage: u32,
    terminated: bool,
}

impl Unit {
    /// Creates a staged unit that waits `hold` movement ticks before accruing.
    pub(crate) fn spawn(
        id: UnitId,
        route: Arc<Route>,
        profile: &UnitProfile,
        wave: WaveIndex,
        hold: u32,
    ) -> Self {
        let health = profile.health_for(wave);
        Self {
            id,
            route,
            waypoint: None,
            health,
            max_health: health,
            ticks_per_advance: profile.ticks_per_advance.max(1),
            accrued: 0,
            hold,
            reward: profile.reward,
            score: profile.score,
            breach_damage: profile.breach_damage,
            terminated: false,
        }
    }

    pub(crate) fn id(&self) -> UnitId {
        self.id
    }

    pub(crate) fn health(&self) -> Health {
        self.health
    }

    pub(crate) fn reward(&self) -> u32 {
        self.reward
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn breach_damage(&self) -> u32 {
        self.breach_damage
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.terminated
    }

    /// Accrues one movement tick, or burns one tick of the entry hold.
    pub(crate) fn tick_movement(&mut self) {
        if self.terminated {
            return;
        }
        if self.hold > 0 {
            self.hold -= 1;
            return;
        }
        self.accrued = self.accrued.saturating_add(1);
    }

    pub(crate) fn ready_for_step(&self) -> bool {
        !self.terminated && self.accrued >= self.ticks_per_advance
    }

    /// Steps to the next waypoint, consuming one step worth of ticks.
    pub(crate) fn advance(&mut self) -> Result<MoveOutcome, UnitTerminated> {
        if self.terminated {
            return Err(UnitTerminated { unit: self.id });
        }

        self.accrued = self.accrued.saturating_sub(self.ticks_per_advance);
        let next = self.waypoint.map_or(0, |index| index + 1);
        let last = self.route.last_index();
        if next >= last {
            self.waypoint = Some(last);
            self.terminated = true;
            return Ok(MoveOutcome::Breached);
        }

        self.waypoint = Some(next);
        Ok(MoveOutcome::Advanced(next))
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> Result<DamageOutcome, UnitTerminated> {
        if self.terminated {
            return Err(UnitTerminated { unit: self.id });
        }

        self.health = self.health.saturating_sub(amount);
        if self.health.is_zero() {
            self.terminated = true;
            return Ok(DamageOutcome::Killed);
        }
        Ok(DamageOutcome::Alive(self.health))
    }

    /// World position of the occupied waypoint, `None` while staged.
    pub(crate) fn position(&self) -> Option<Vec2> {
        self.waypoint.and_then(|index| self.route.point(index))
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            waypoint: self.waypoint,
            position: self.position(),
            health: self.health,
            max_health: self.max_health,
            ready_for_step: self.ready_for_step(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(waypoints: usize) -> Arc<Route> {
        let points = (0..waypoints)
            .map(|index| Vec2::new(index as f32 * 10.0, 0.0))
            .collect();
        Arc::new(Route::new(points).expect("route"))
    }

    fn unit(route: Arc<Route>, profile: UnitProfile, hold: u32) -> Unit {
        Unit::spawn(UnitId::new(0), route, &profile, WaveIndex::new(1), hold)
    }

    #[test]
    fn staged_unit_enters_at_first_waypoint() {
        let mut unit = unit(route(3), UnitProfile::default(), 0);
        assert_eq!(unit.position(), None);

        unit.tick_movement();
        assert!(unit.ready_for_step());
        assert_eq!(unit.advance(), Ok(MoveOutcome::Advanced(0)));
        assert_eq!(unit.position(), Some(Vec2::ZERO));
        assert!(!unit.ready_for_step());
    }

    #[test]
    fn reaching_final_waypoint_is_a_breach() {
        let mut unit = unit(route(2), UnitProfile::default(), 0);

        assert_eq!(unit.advance(), Ok(MoveOutcome::Advanced(0)));
        assert_eq!(unit.advance(), Ok(MoveOutcome::Breached));
        assert!(!unit.is_active());
        assert_eq!(
            unit.advance(),
            Err(UnitTerminated {
                unit: UnitId::new(0)
            })
        );
    }

    #[test]
    fn slow_units_need_several_ticks_per_step() {
        let profile = UnitProfile {
            ticks_per_advance: 3,
            ..UnitProfile::default()
        };
        let mut unit = unit(route(4), profile, 0);

        unit.tick_movement();
        unit.tick_movement();
        assert!(!unit.ready_for_step());
        unit.tick_movement();
        assert!(unit.ready_for_step());
    }

    #[test]
    fn entry_hold_delays_accrual() {
        let mut unit = unit(route(4), UnitProfile::default(), 2);

        unit.tick_movement();
        unit.tick_movement();
        assert!(!unit.ready_for_step());
        unit.tick_movement();
        assert!(unit.ready_for_step());
    }

    #[test]
    fn killed_unit_rejects_further_damage() {
        let profile = UnitProfile {
            base_health: 10,
            ..UnitProfile::default()
        };
        let mut unit = unit(route(3), profile, 0);

        assert_eq!(unit.take_damage(4), Ok(DamageOutcome::Alive(Health::new(6))));
        assert_eq!(unit.take_damage(30), Ok(DamageOutcome::Killed));
        assert_eq!(unit.health(), Health::new(0));
        assert!(unit.take_damage(1).is_err());
        assert_eq!(unit.health(), Health::new(0));
    }
}

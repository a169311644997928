//! Player money, health and score.

use route_defence_core::{EconomySnapshot, PlacementError};

/// Mutable economy counters owned by the world.
///
/// Money can never go negative: spending is checked. Health decreases only
/// through breach damage and score only grows. Once frozen, every mutation is
/// ignored.
#[derive(Clone, Debug)]
pub(crate) struct Economy {
    money: u32,
    health: i32,
    score: u64,
    frozen: bool,
}

impl Economy {
    pub(crate) fn new(start: EconomySnapshot) -> Self {
        Self {
            money: start.money,
            health: start.health,
            score: start.score,
            frozen: false,
        }
    }

    pub(crate) fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            money: self.money,
            health: self.health,
            score: self.score,
        }
    }

    /// Checks whether `cost` can be paid without mutating anything.
    pub(crate) fn can_afford(&self, cost: u32) -> Result<(), PlacementError> {
        if self.frozen {
            return Err(PlacementError::GameOver);
        }
        if cost > self.money {
            return Err(PlacementError::InsufficientFunds {
                cost,
                available: self.money,
            });
        }
        Ok(())
    }

    pub(crate) fn deduct_money(&mut self, cost: u32) -> Result<(), PlacementError> {
        self.can_afford(cost)?;
        self.money -= cost;
        Ok(())
    }

    pub(crate) fn add_money(&mut self, amount: u32) {
        if !self.frozen {
            self.money = self.money.saturating_add(amount);
        }
    }

    pub(crate) fn increase_score(&mut self, amount: u32) {
        if !self.frozen {
            self.score = self.score.saturating_add(u64::from(amount));
        }
    }

    pub(crate) fn take_damage(&mut self, amount: u32) {
        if !self.frozen {
            let amount = i32::try_from(amount).unwrap_or(i32::MAX);
            self.health = self.health.saturating_sub(amount);
        }
    }

    pub(crate) fn is_game_over(&self) -> bool {
        self.health <= 0
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Replaces every counter and thaws the economy.
    pub(crate) fn restore(&mut self, snapshot: EconomySnapshot) {
        *self = Self::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_is_checked() {
        let mut economy = Economy::new(EconomySnapshot {
            money: 100,
            ..EconomySnapshot::default()
        });

        assert_eq!(
            economy.deduct_money(170),
            Err(PlacementError::InsufficientFunds {
                cost: 170,
                available: 100
            })
        );
        assert_eq!(economy.snapshot().money, 100);

        assert_eq!(economy.deduct_money(100), Ok(()));
        assert_eq!(economy.snapshot().money, 0);
    }

    #[test]
    fn health_at_zero_is_game_over() {
        let mut economy = Economy::new(EconomySnapshot {
            health: 40,
            ..EconomySnapshot::default()
        });

        economy.take_damage(20);
        assert!(!economy.is_game_over());
        economy.take_damage(20);
        assert!(economy.is_game_over());
        assert_eq!(economy.snapshot().health, 0);
    }

    #[test]
    fn frozen_economy_ignores_mutations() {
        let mut economy = Economy::new(EconomySnapshot::default());
        economy.freeze();

        economy.add_money(50);
        economy.increase_score(100);
        economy.take_damage(10);

        assert_eq!(economy.snapshot(), EconomySnapshot::default());
        assert_eq!(economy.deduct_money(1), Err(PlacementError::GameOver));
        assert!(economy.is_frozen());
    }

    #[test]
    fn restore_thaws_and_replaces_counters() {
        let mut economy = Economy::new(EconomySnapshot::default());
        economy.freeze();
        let saved = EconomySnapshot {
            money: 20,
            health: 60,
            score: 900,
        };

        economy.restore(saved);

        assert_eq!(economy.snapshot(), saved);
        assert!(!economy.is_frozen());
    }
}

//! Payout and recovery when an encounter ends.

use super::catalog::MonsterTemplate;
use super::state::{PlayerState, Reward};

/// Extra max health per level on top of the base.
pub const HEALTH_PER_LEVEL: u32 = 10;

/// Grant xp and coins for beating `monster`, then level up as many times
/// as the xp allows.
pub fn settle_victory(player: &mut PlayerState, monster: &MonsterTemplate) -> Reward {
    player.xp = player.xp.saturating_add(monster.xp_reward);
    player.coins.add(&monster.coin_reward);

    let mut levels_gained = 0;
    while player.xp >= player.xp_to_next() && player.xp_to_next() > 0 {
        player.xp -= player.xp_to_next();
        player.level += 1;
        player.max_health = player
            .max_health_base
            .saturating_add(player.level.saturating_mul(HEALTH_PER_LEVEL));
        player.health = player.max_health;
        player.agility = player.agility.saturating_add(1);
        levels_gained += 1;
    }

    player.reset_transient();
    Reward { xp: monster.xp_reward, coins: monster.coin_reward, levels_gained }
}

/// Losing costs nothing but the fight: health comes back in full.
pub fn settle_defeat(player: &mut PlayerState) {
    player.health = player.max_health;
    player.reset_transient();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::arena::catalog::monster_by_id;
    use crate::games::arena::state::Coins;

    #[test]
    fn victory_pays_xp_and_coins() {
        let mut p = PlayerState::new();
        let goblin = monster_by_id("goblin").unwrap();
        let reward = settle_victory(&mut p, goblin);
        assert_eq!(reward.xp, 20);
        assert_eq!(reward.levels_gained, 0);
        assert_eq!(p.xp, 20);
        assert_eq!(p.coins, Coins::new(1000, 1005, 1010));
    }

    #[test]
    fn level_up_at_threshold() {
        let mut p = PlayerState::new();
        p.xp = 80;
        p.health = 40;
        let goblin = monster_by_id("goblin").unwrap();
        let reward = settle_victory(&mut p, goblin);
        assert_eq!(reward.levels_gained, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0);
        assert_eq!(p.max_health, 120);
        assert_eq!(p.health, 120);
        assert_eq!(p.agility, 6);
    }

    #[test]
    fn big_payout_levels_repeatedly() {
        let mut p = PlayerState::new();
        let dragon = monster_by_id("dragon").unwrap();
        let reward = settle_victory(&mut p, dragon);
        // 500 xp: 100 (1->2) + 200 (2->3), 200 left under the 300 needed.
        assert_eq!(reward.levels_gained, 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 200);
        assert_eq!(p.max_health, 130);
        assert_eq!(p.agility, 7);
    }

    #[test]
    fn defeat_restores_full_health_only() {
        let mut p = PlayerState::new();
        p.health = 0;
        p.xp = 42;
        p.buff_power = 10;
        let coins = p.coins;
        settle_defeat(&mut p);
        assert_eq!(p.health, p.max_health);
        assert_eq!(p.xp, 42);
        assert_eq!(p.coins, coins);
        assert_eq!(p.buff_power, 0);
    }
}

//! Store: pricing modes, buying and selling.

use super::catalog::{tool_by_id, Tool};
use super::error::ArenaError;
use super::inventory;
use super::state::{Coins, PlayerState};

// ── Pricing ───────────────────────────────────────────────────

/// Signed per-currency adjustment; negative values lower prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PriceDelta {
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
}

/// The effective pricing rule for every item in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pricing {
    Normal,
    Sale { discount_percent: u32 },
    Exact(Coins),
    Increase(PriceDelta),
}

/// Store-wide switches. Several may be on at once: an exact price wins
/// over an increase, and an increase wins over a sale.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StoreConfig {
    pub sale_percent: Option<u32>,
    pub exact_price: Option<Coins>,
    pub price_increase: Option<PriceDelta>,
}

impl StoreConfig {
    pub fn pricing(&self) -> Pricing {
        if let Some(exact) = self.exact_price {
            Pricing::Exact(exact)
        } else if let Some(delta) = self.price_increase {
            Pricing::Increase(delta)
        } else if let Some(discount_percent) = self.sale_percent {
            Pricing::Sale { discount_percent }
        } else {
            Pricing::Normal
        }
    }
}

fn discounted(amount: u32, percent: u32) -> u32 {
    let keep = 100 - percent.min(100);
    ((amount as u64 * keep as u64) / 100) as u32
}

fn shifted(amount: u32, delta: i32) -> u32 {
    (amount as i64 + delta as i64).clamp(0, u32::MAX as i64) as u32
}

/// Price of one `tool` under the current store rules.
pub fn price_of(tool: &Tool, config: &StoreConfig) -> Coins {
    let c = tool.cost;
    match config.pricing() {
        Pricing::Normal => c,
        Pricing::Exact(exact) => exact,
        Pricing::Sale { discount_percent: p } => {
            Coins::new(discounted(c.gold, p), discounted(c.silver, p), discounted(c.bronze, p))
        }
        Pricing::Increase(d) => {
            Coins::new(shifted(c.gold, d.gold), shifted(c.silver, d.silver), shifted(c.bronze, d.bronze))
        }
    }
}

/// What the store pays for one copy: half the list cost, floored per
/// currency. Store rules do not apply to sales.
pub fn sell_price(tool: &Tool) -> Coins {
    tool.cost.half()
}

/// Whether the player may buy `tool` at all right now. Gear is bought one
/// piece at a time and never twice; potions stack.
pub fn can_buy(player: &PlayerState, tool: &Tool, config: &StoreConfig) -> bool {
    (tool.consumable || !player.tools.contains(tool.id))
        && player.coins.can_afford(&price_of(tool, config))
}

// ── Transactions ──────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub tool: &'static Tool,
    pub qty: u32,
    pub paid: Coins,
}

/// Buy `qty` copies of `tool_id`. Non-consumables ignore `qty` and are
/// bought once. Nothing changes on error.
pub fn buy(
    player: &mut PlayerState,
    tool_id: &str,
    qty: u32,
    config: &StoreConfig,
) -> Result<Purchase, ArenaError> {
    let tool = tool_by_id(tool_id)?;
    let qty = if tool.consumable { qty.max(1) } else { 1 };
    if !tool.consumable && player.tools.contains(tool.id) {
        return Err(ArenaError::AlreadyOwned(tool.id.to_string()));
    }

    let total = price_of(tool, config).times(qty);
    if !player.coins.try_spend(&total) {
        return Err(ArenaError::CannotAfford(tool.name.to_string()));
    }
    player.tools.add(tool.id, qty);
    Ok(Purchase { tool, qty, paid: total })
}

/// Sell one copy of `tool_id` for [`sell_price`].
pub fn sell(player: &mut PlayerState, tool_id: &str) -> Result<Coins, ArenaError> {
    let tool = tool_by_id(tool_id)?;
    inventory::consume(player, tool.id)?;
    let earned = sell_price(tool);
    player.coins.add(&earned);
    Ok(earned)
}

/// Sell everything the store recognizes. Unknown ids stay in the bag.
pub fn sell_all(player: &mut PlayerState) -> Coins {
    let owned: Vec<(String, u32)> = player.tools.iter().map(|(id, n)| (id.to_string(), n)).collect();
    let mut total = Coins::ZERO;
    for (id, count) in owned {
        for _ in 0..count {
            match sell(player, &id) {
                Ok(earned) => total.add(&earned),
                Err(_) => break,
            }
        }
    }
    total
}

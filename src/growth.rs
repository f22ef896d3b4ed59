//! Per-tick stat mutation driven by the compatibility tier.
//!
//! One tick runs heal → HP growth → elemental growth → damage → clamp, in that
//! order; each step reads what the previous one wrote. [`preview_tick`] and
//! [`apply_tick`] share the same arithmetic so a forecast always matches the
//! tick that follows it.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::creature::{Creature, Element, ElementCounters, GROW_ELEMENT_CAP, GROW_HP_CAP};
use crate::rank::{RankInfo, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthProfile {
    pub hp_grow: u32,
    pub element_grow: u32,
    /// Elemental growth lands every Nth qualifying tick; 0 disables it.
    pub element_interval: u32,
    pub heal_cap: u32,
    pub hp_damage: u32,
}

impl GrowthProfile {
    pub const INERT: GrowthProfile = GrowthProfile {
        hp_grow: 0,
        element_grow: 0,
        element_interval: 0,
        heal_cap: 0,
        hp_damage: 0,
    };
}

fn default_bad_hp_grow() -> u32 {
    GrowthTable::BAD_HP_GROW
}

/// Tier → profile lookup. The bad-tier HP growth is configurable because two
/// rule sets exist: one grants nothing while dealing damage, the other grants
/// [`GrowthTable::BAD_HP_GROW_ALTERNATE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthTable {
    #[serde(default = "default_bad_hp_grow")]
    pub bad_hp_grow: u32,
}

impl GrowthTable {
    pub const BAD_HP_GROW: u32 = 0;
    pub const BAD_HP_GROW_ALTERNATE: u32 = 10;

    pub fn profile(&self, tier: Tier) -> GrowthProfile {
        match tier {
            Tier::SuperBest => GrowthProfile {
                hp_grow: 50,
                element_grow: 20,
                element_interval: 1,
                heal_cap: 500,
                hp_damage: 0,
            },
            Tier::Best => GrowthProfile {
                hp_grow: 30,
                element_grow: 10,
                element_interval: 1,
                heal_cap: 300,
                hp_damage: 0,
            },
            Tier::Good => GrowthProfile {
                hp_grow: 20,
                element_grow: 10,
                element_interval: 2,
                heal_cap: 200,
                hp_damage: 0,
            },
            Tier::Normal => GrowthProfile {
                hp_grow: 10,
                element_grow: 10,
                element_interval: 3,
                heal_cap: 100,
                hp_damage: 0,
            },
            Tier::Bad => GrowthProfile {
                hp_grow: self.bad_hp_grow,
                element_grow: 10,
                element_interval: 5,
                heal_cap: 0,
                hp_damage: 10,
            },
            Tier::Neutral => GrowthProfile::INERT,
        }
    }
}

impl Default for GrowthTable {
    fn default() -> Self {
        Self {
            bad_hp_grow: Self::BAD_HP_GROW,
        }
    }
}

/// What the next tick would do, without doing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickPreview {
    pub tier: Tier,
    pub heal: u32,
    pub hp_damage: u32,
    pub hp_growth: u32,
    pub element: Option<Element>,
    pub element_growth: u32,
}

/// Deltas realized by one applied tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    pub heal: u32,
    pub hp_growth: u32,
    pub element: Option<Element>,
    pub element_growth: u32,
    pub hp_damage: u32,
}

/// Post-tick values for everything a tick may touch.
struct TickPlan {
    outcome: TickOutcome,
    grow_hp: u32,
    current_hp: u32,
    /// `(element, counter after tick, grown value after tick)`.
    element: Option<(Element, u32, u32)>,
}

fn plan_tick(
    creature: &Creature,
    rank: &RankInfo,
    counters: &ElementCounters,
    table: &GrowthTable,
) -> Option<TickPlan> {
    if rank.tier == Tier::Neutral {
        return None;
    }
    let profile = table.profile(rank.tier);
    let mut outcome = TickOutcome::default();

    let max_before = creature.max_hp();
    let mut current = creature.current_hp;
    if profile.heal_cap > 0 {
        outcome.heal = profile.heal_cap.min(max_before.saturating_sub(current));
        current += outcome.heal;
    }

    let mut grow_hp = creature.grow_hp;
    if profile.hp_grow > 0 && grow_hp < GROW_HP_CAP {
        outcome.hp_growth = profile.hp_grow.min(GROW_HP_CAP - grow_hp);
        grow_hp += outcome.hp_growth;
        current = current.saturating_add(outcome.hp_growth);
    }
    grow_hp = grow_hp.min(GROW_HP_CAP);

    let mut element = None;
    if let Some(key) = rank.element() {
        outcome.element = Some(key);
        if profile.element_interval > 0 {
            let mut counter = counters.get(key).saturating_add(1);
            let mut grown = creature.grow_stats.get(key);
            if counter >= profile.element_interval {
                counter = 0;
                outcome.element_growth = profile
                    .element_grow
                    .min(GROW_ELEMENT_CAP.saturating_sub(grown));
                grown = (grown + outcome.element_growth).min(GROW_ELEMENT_CAP);
            }
            element = Some((key, counter, grown));
        }
    }

    let max_after = creature.base_hp.saturating_add(grow_hp);
    if rank.tier == Tier::Bad && profile.hp_damage > 0 {
        outcome.hp_damage = profile.hp_damage.min(current);
        current = (current - outcome.hp_damage).min(max_after);
    }

    Some(TickPlan {
        outcome,
        grow_hp,
        current_hp: current.min(max_after),
        element,
    })
}

pub fn preview_tick(
    creature: &Creature,
    rank: &RankInfo,
    counters: &ElementCounters,
    table: &GrowthTable,
) -> TickPreview {
    let outcome = plan_tick(creature, rank, counters, table)
        .map(|plan| plan.outcome)
        .unwrap_or_default();
    TickPreview {
        tier: rank.tier,
        heal: outcome.heal,
        hp_damage: outcome.hp_damage,
        hp_growth: outcome.hp_growth,
        element: outcome.element,
        element_growth: outcome.element_growth,
    }
}

/// Applies one tick in place. Neutral ticks change nothing.
pub fn apply_tick(
    creature: &mut Creature,
    rank: &RankInfo,
    counters: &mut ElementCounters,
    table: &GrowthTable,
) -> TickOutcome {
    let Some(plan) = plan_tick(creature, rank, counters, table) else {
        return TickOutcome::default();
    };

    creature.grow_hp = plan.grow_hp;
    creature.current_hp = plan.current_hp;
    if let Some((key, counter, grown)) = plan.element {
        *counters.get_mut(key) = counter;
        *creature.grow_stats.get_mut(key) = grown;
    }

    trace!(
        tier = %rank.tier,
        heal = plan.outcome.heal,
        hp_growth = plan.outcome.hp_growth,
        element_growth = plan.outcome.element_growth,
        hp_damage = plan.outcome.hp_damage,
        current_hp = creature.current_hp,
        "tick applied"
    );
    plan.outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Attribute;

    fn rank(tier: Tier, attribute: Option<Attribute>) -> RankInfo {
        RankInfo {
            tier,
            area_id: attribute.map(|_| "T2"),
            environment_attribute: attribute,
            area_display_name: None,
            area_display_name_alt: None,
            is_sea: false,
            expected_light: Some(50),
            light_satisfied: tier != Tier::Bad,
        }
    }

    #[test]
    fn neutral_tick_is_a_no_op() {
        let mut creature = Creature::windragon();
        creature.current_hp = 10;
        let before = creature.clone();
        let mut counters = ElementCounters::default();
        let outcome = apply_tick(
            &mut creature,
            &RankInfo::neutral(50),
            &mut counters,
            &GrowthTable::default(),
        );
        assert_eq!(outcome, TickOutcome::default());
        assert_eq!(creature, before);
        assert_eq!(counters, ElementCounters::default());
    }

    #[test]
    fn heal_runs_before_growth() {
        let mut creature = Creature::windragon();
        creature.current_hp = 100;
        let mut counters = ElementCounters::default();
        let outcome = apply_tick(
            &mut creature,
            &rank(Tier::Normal, Some(Attribute::Tornado)),
            &mut counters,
            &GrowthTable::default(),
        );
        assert_eq!(outcome.heal, 100);
        assert_eq!(outcome.hp_growth, 10);
        assert_eq!(creature.grow_hp, 10);
        assert_eq!(creature.current_hp, 210);
    }

    #[test]
    fn heal_fills_to_max_before_growth_raises_it() {
        let mut creature = Creature::windragon();
        creature.current_hp = 390;
        let mut counters = ElementCounters::default();
        apply_tick(
            &mut creature,
            &rank(Tier::SuperBest, Some(Attribute::Tornado)),
            &mut counters,
            &GrowthTable::default(),
        );
        assert_eq!(creature.grow_hp, 50);
        assert_eq!(creature.current_hp, 450);
        assert_eq!(creature.current_hp, creature.max_hp());
    }

    #[test]
    fn hp_growth_truncates_at_cap() {
        let mut creature = Creature::windragon();
        creature.grow_hp = GROW_HP_CAP - 15;
        creature.current_hp = creature.max_hp();
        let mut counters = ElementCounters::default();
        let table = GrowthTable::default();
        let superbest = rank(Tier::SuperBest, Some(Attribute::Tornado));

        let outcome = apply_tick(&mut creature, &superbest, &mut counters, &table);
        assert_eq!(outcome.hp_growth, 15);
        assert_eq!(creature.grow_hp, GROW_HP_CAP);

        let outcome = apply_tick(&mut creature, &superbest, &mut counters, &table);
        assert_eq!(outcome.hp_growth, 0);
        assert_eq!(creature.grow_hp, GROW_HP_CAP);
    }

    #[test]
    fn elemental_growth_waits_for_interval() {
        let mut creature = Creature::windragon();
        let mut counters = ElementCounters::default();
        let table = GrowthTable::default();
        let normal = rank(Tier::Normal, Some(Attribute::Volcano));

        apply_tick(&mut creature, &normal, &mut counters, &table);
        apply_tick(&mut creature, &normal, &mut counters, &table);
        assert_eq!(creature.grow_stats.fire, 0);
        assert_eq!(counters.fire, 2);

        let outcome = apply_tick(&mut creature, &normal, &mut counters, &table);
        assert_eq!(outcome.element, Some(Element::Fire));
        assert_eq!(outcome.element_growth, 10);
        assert_eq!(creature.grow_stats.fire, 10);
        assert_eq!(counters.fire, 0);
        assert_eq!(counters.wind, 0);
    }

    #[test]
    fn elemental_growth_stops_at_cap() {
        let mut creature = Creature::windragon();
        creature.grow_stats.wind = GROW_ELEMENT_CAP - 5;
        let mut counters = ElementCounters::default();
        let outcome = apply_tick(
            &mut creature,
            &rank(Tier::SuperBest, Some(Attribute::Tornado)),
            &mut counters,
            &GrowthTable::default(),
        );
        assert_eq!(outcome.element_growth, 5);
        assert_eq!(creature.grow_stats.wind, GROW_ELEMENT_CAP);
    }

    #[test]
    fn bad_tier_damages_and_floors_at_zero() {
        let mut creature = Creature::windragon();
        creature.current_hp = 25;
        let mut counters = ElementCounters::default();
        let table = GrowthTable::default();
        let bad = rank(Tier::Bad, Some(Attribute::Earthquake));
        for _ in 0..5 {
            apply_tick(&mut creature, &bad, &mut counters, &table);
        }
        assert_eq!(creature.current_hp, 0);
        assert_eq!(creature.grow_hp, 0);
        assert_eq!(creature.grow_stats.earth, 10);
    }

    #[test]
    fn alternate_bad_table_grows_while_damaging() {
        let mut creature = Creature::windragon();
        let mut counters = ElementCounters::default();
        let table = GrowthTable {
            bad_hp_grow: GrowthTable::BAD_HP_GROW_ALTERNATE,
        };
        let outcome = apply_tick(
            &mut creature,
            &rank(Tier::Bad, Some(Attribute::Earthquake)),
            &mut counters,
            &table,
        );
        assert_eq!(outcome.hp_growth, 10);
        assert_eq!(outcome.hp_damage, 10);
        assert_eq!(creature.grow_hp, 10);
        assert_eq!(creature.current_hp, 400);
    }

    #[test]
    fn preview_matches_apply_and_leaves_state_alone() {
        let table = GrowthTable::default();
        for tier in Tier::ALL {
            let mut creature = Creature::windragon();
            creature.current_hp = 37;
            creature.grow_hp = GROW_HP_CAP - 7;
            let mut counters = ElementCounters::new(0, 1, 4, 2);
            let info = rank(tier, Some(Attribute::Tornado));

            let snapshot = (creature.clone(), counters);
            let preview = preview_tick(&creature, &info, &counters, &table);
            assert_eq!((creature.clone(), counters), snapshot);

            let outcome = apply_tick(&mut creature, &info, &mut counters, &table);
            assert_eq!(preview.heal, outcome.heal, "{tier}");
            assert_eq!(preview.hp_growth, outcome.hp_growth, "{tier}");
            assert_eq!(preview.hp_damage, outcome.hp_damage, "{tier}");
            assert_eq!(preview.element_growth, outcome.element_growth, "{tier}");
        }
    }
}

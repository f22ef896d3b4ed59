use chrono::NaiveTime;
use talispod::{
    area::{AreaCatalog, Attribute},
    creature::{Creature, Element, ElementCounters, GROW_HP_CAP},
    growth::{apply_tick, preview_tick, GrowthTable},
    rank::{CompatibilityEngine, RankInfo, Tier},
    resolver::{AreaResolver, EnvironmentReading},
};

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

fn rank(catalog: &AreaCatalog, creature: &Creature, reading: EnvironmentReading, hour: u32) -> RankInfo {
    CompatibilityEngine::new(catalog).compute_rank(creature, &reading, &at(hour), creature.attribute)
}

#[test]
fn neutral_reading_resolves_neutral_for_any_light() {
    let catalog = AreaCatalog::standard();
    let resolver = AreaResolver::new(&catalog);
    for light in [-50, 0, 50, 100, 1000] {
        assert!(resolver.resolve(0, 50, light).is_neutral());
    }
}

#[test]
fn sea_depths_normalize_into_three_bands() {
    let catalog = AreaCatalog::standard();
    let resolver = AreaResolver::new(&catalog);
    let cases = [
        (0, "SS_SHALLOW"),
        (25, "SS_SHALLOW"),
        (26, "SS_MID"),
        (75, "SS_MID"),
        (76, "SS_DEEP"),
        (100, "SS_DEEP"),
    ];
    for (depth, expected) in cases {
        assert_eq!(resolver.resolve(20, 100, depth).id(), Some(expected));
        assert_eq!(resolver.resolve(20, 100, depth), resolver.resolve(20, 100, depth));
    }
    assert_eq!(resolver.resolve(-1, 100, 50).id(), Some("SN_MID"));
}

#[test]
fn hottest_driest_cell_is_a_fire_area() {
    let catalog = AreaCatalog::standard();
    let area = AreaResolver::new(&catalog)
        .resolve(999, 0, 50)
        .area()
        .expect("not neutral");
    assert_eq!(area.id, "V1");
    assert_eq!(area.attribute, Attribute::Volcano);
    assert_eq!(area.attribute.element(), Element::Fire);
}

#[test]
fn opposite_attribute_is_bad_when_not_best() {
    let catalog = AreaCatalog::standard();
    let mut creature = Creature::windragon();
    creature.ideal_environment = None;
    let info = rank(&catalog, &creature, EnvironmentReading::new(20, 60, 50), 8);
    assert_eq!(info.area_id, Some("E4"));
    assert!(info.light_satisfied);
    assert_eq!(info.tier, Tier::Bad);
}

#[test]
fn ideal_land_reading_is_super_best() {
    let catalog = AreaCatalog::standard();
    let creature = Creature::windragon();
    let info = rank(&catalog, &creature, EnvironmentReading::new(-45, 5, 100), 12);
    assert_eq!(info.tier, Tier::SuperBest);
    assert!(!info.is_sea);
}

#[test]
fn unmet_light_overrides_super_best() {
    let catalog = AreaCatalog::standard();
    let creature = Creature::windragon();
    let info = rank(&catalog, &creature, EnvironmentReading::new(-45, 5, 100), 22);
    assert_eq!(info.expected_light, Some(0));
    assert!(!info.light_satisfied);
    assert_eq!(info.tier, Tier::Bad);
}

#[test]
fn hp_growth_stops_at_cap_and_current_follows_realized_growth() {
    let catalog = AreaCatalog::standard();
    let table = GrowthTable::default();
    let mut creature = Creature::windragon();
    let mut counters = ElementCounters::default();
    let info = rank(&catalog, &creature, EnvironmentReading::new(-45, 5, 50), 7);
    assert_eq!(info.tier, Tier::SuperBest);

    for _ in 0..200 {
        let before = creature.current_hp;
        let outcome = apply_tick(&mut creature, &info, &mut counters, &table);
        assert!(creature.grow_hp <= GROW_HP_CAP);
        assert_eq!(creature.current_hp, before + outcome.heal + outcome.hp_growth);
    }
    assert_eq!(creature.grow_hp, GROW_HP_CAP);
    let last = apply_tick(&mut creature, &info, &mut counters, &table);
    assert_eq!(last.hp_growth, 0);
}

#[test]
fn normal_tier_grows_elements_every_third_tick() {
    let catalog = AreaCatalog::standard();
    let table = GrowthTable::default();
    let mut creature = Creature::windragon();
    let mut counters = ElementCounters::default();
    let info = rank(&catalog, &creature, EnvironmentReading::new(20, 100, 10), 13);
    assert_eq!(info.tier, Tier::Normal);
    assert_eq!(info.element(), Some(Element::Water));

    let first = apply_tick(&mut creature, &info, &mut counters, &table);
    let second = apply_tick(&mut creature, &info, &mut counters, &table);
    assert_eq!((first.element_growth, second.element_growth), (0, 0));
    assert_eq!(counters.water, 2);

    let third = apply_tick(&mut creature, &info, &mut counters, &table);
    assert_eq!(third.element_growth, 10);
    assert_eq!(counters.water, 0);
    assert_eq!(creature.grow_stats.water, 10);
}

#[test]
fn bad_ticks_floor_hp_at_zero() {
    let catalog = AreaCatalog::standard();
    let table = GrowthTable::default();
    let mut creature = Creature::windragon();
    creature.current_hp = 25;
    let mut counters = ElementCounters::default();
    let info = rank(&catalog, &creature, EnvironmentReading::new(20, 60, 50), 8);
    assert_eq!(info.tier, Tier::Bad);

    let damage: Vec<u32> = (0..5)
        .map(|_| apply_tick(&mut creature, &info, &mut counters, &table).hp_damage)
        .collect();
    assert_eq!(damage, vec![10, 10, 5, 0, 0]);
    assert_eq!(creature.current_hp, 0);
    assert!(creature.is_exhausted());
}

#[test]
fn preview_predicts_the_applied_tick() {
    let catalog = AreaCatalog::standard();
    let table = GrowthTable { bad_hp_grow: GrowthTable::BAD_HP_GROW_ALTERNATE };
    let readings = [
        (EnvironmentReading::new(-45, 5, 50), 7),
        (EnvironmentReading::new(20, 60, 50), 8),
        (EnvironmentReading::new(20, 100, 10), 13),
        (EnvironmentReading::new(40, 50, 100), 11),
        (EnvironmentReading::NEUTRAL, 11),
    ];
    for (reading, hour) in readings {
        let mut creature = Creature::windragon();
        creature.current_hp = 120;
        creature.grow_hp = GROW_HP_CAP - 5;
        let mut counters = ElementCounters::new(0, 4, 4, 2);
        let info = rank(&catalog, &creature, reading, hour);
        let preview = preview_tick(&creature, &info, &counters, &table);
        let outcome = apply_tick(&mut creature, &info, &mut counters, &table);
        assert_eq!(preview.tier, info.tier);
        assert_eq!(preview.heal, outcome.heal);
        assert_eq!(preview.hp_growth, outcome.hp_growth);
        assert_eq!(preview.hp_damage, outcome.hp_damage);
        assert_eq!(preview.element, outcome.element);
        assert_eq!(preview.element_growth, outcome.element_growth);
    }
}

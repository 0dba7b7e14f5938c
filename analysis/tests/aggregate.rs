use analysis::aggregate::aggregate;
use analysis::schema::{PlayerSlot, TickRecord};
use pretty_assertions::assert_eq;

fn alive_slot(hp: u32) -> PlayerSlot {
    PlayerSlot {
        x: Some(0.0),
        y: Some(0.0),
        z: Some(0.0),
        is_alive: true,
        hp: Some(hp),
        armor: Some(0),
        has_helmet: Some(false),
        equipment_value: Some(0),
        total_utility: Some(0),
        is_in_bomb_zone: Some(false),
        has_defuse: None,
        has_bomb: None,
    }
}

fn dead_slot() -> PlayerSlot {
    PlayerSlot {
        is_alive: false,
        ..PlayerSlot::default()
    }
}

#[test]
fn row_count_invariance() {
    let records = vec![TickRecord::default(); 7];

    let rows = aggregate(&records);

    assert_eq!(7, rows.len());
}

#[test]
fn hp_sum_treats_missing_as_zero() {
    let mut record = TickRecord::default();
    record.ct = [
        alive_slot(100),
        alive_slot(0),
        alive_slot(50),
        dead_slot(),
        alive_slot(20),
    ];

    let rows = aggregate(std::slice::from_ref(&record));

    assert_eq!(170, rows[0].ct.hp);
}

#[test]
fn alive_count() {
    let mut record = TickRecord::default();
    record.t = [
        alive_slot(100),
        alive_slot(34),
        alive_slot(1),
        dead_slot(),
        dead_slot(),
    ];

    let rows = aggregate(std::slice::from_ref(&record));

    assert_eq!(3, rows[0].t.alive);
    assert_eq!(0, rows[0].ct.alive);
}

#[test]
fn positional_mean_excludes_missing() {
    let mut record = TickRecord::default();
    record.ct[0].x = Some(10.0);
    record.ct[3].x = Some(30.0);

    let rows = aggregate(std::slice::from_ref(&record));

    // missing coordinates are excluded, not substituted with zero
    assert_eq!(Some(20.0), rows[0].ct.mean_pos.x);
    assert_eq!(Some(10.0), rows[0].ct.std_dev_pos.x);
}

#[test]
fn std_dev_is_population_variant() {
    let mut record = TickRecord::default();
    record.t[0].y = Some(2.0);
    record.t[1].y = Some(4.0);
    record.t[2].y = Some(4.0);
    record.t[3].y = Some(4.0);
    record.t[4].y = Some(6.0);

    let rows = aggregate(std::slice::from_ref(&record));

    // variance 8/5, not the sample variant 8/4
    assert_eq!(Some((8.0f64 / 5.0).sqrt()), rows[0].t.std_dev_pos.y);
}

#[test]
fn all_missing_axis_yields_missing_statistics() {
    let record = TickRecord::default();

    let rows = aggregate(std::slice::from_ref(&record));

    assert_eq!(None, rows[0].t.mean_pos.y);
    assert_eq!(None, rows[0].t.std_dev_pos.y);
    assert_eq!(None, rows[0].ct.mean_pos.y);
    assert_eq!(None, rows[0].ct.std_dev_pos.y);
}

#[test]
fn defuser_and_bomb_counting() {
    let mut record = TickRecord::default();
    record.ct[1].has_defuse = Some(true);
    record.ct[2].has_defuse = Some(false);
    record.t[0].has_bomb = Some(false);

    let rows = aggregate(std::slice::from_ref(&record));

    assert_eq!(1, rows[0].ct_defusers);
    assert_eq!(0, rows[0].t_has_bomb);
}

#[test]
fn input_is_not_mutated() {
    let mut record = TickRecord::default();
    record
        .meta
        .insert("tick".to_string(), serde_json::Value::from(512));
    record.t = [
        alive_slot(100),
        alive_slot(85),
        dead_slot(),
        alive_slot(12),
        dead_slot(),
    ];
    record.ct[0].has_defuse = Some(true);

    let records = vec![record];
    let before = records.clone();

    let _ = aggregate(&records);

    assert_eq!(before, records);
}

#[test]
fn column_completeness() {
    let mut record = TickRecord::default();
    record
        .meta
        .insert("roundNum".to_string(), serde_json::Value::from(3));
    record
        .meta
        .insert("tick".to_string(), serde_json::Value::from(1024));

    let rows = aggregate(std::slice::from_ref(&record));
    let columns = rows[0].to_columns();

    let mut expected: Vec<String> = vec!["roundNum", "tick", "ctDefusers", "tHasBomb"]
        .into_iter()
        .map(String::from)
        .collect();
    for team in ["t", "ct"] {
        for name in [
            "Alive",
            "Hp",
            "Armor",
            "Helmet",
            "EquipmentValue",
            "Utility",
            "PlayersInBombZone",
        ] {
            expected.push(format!("{}{}", team, name));
        }
        for axis in ["x", "y", "z"] {
            expected.push(format!("{}MeanPos_{}", team, axis));
            expected.push(format!("{}StdDevPos_{}", team, axis));
        }
    }
    expected.sort();

    let mut actual: Vec<String> = columns.keys().cloned().collect();
    actual.sort();

    assert_eq!(expected, actual);
    // meta columns pass through unchanged
    assert_eq!(Some(&serde_json::Value::from(1024)), columns.get("tick"));
    // undefined positional statistics stay the missing marker
    assert_eq!(Some(&serde_json::Value::Null), columns.get("tMeanPos_x"));
}

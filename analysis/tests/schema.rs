use analysis::schema::{column_name, SchemaError, SlotField, Team, TickRecord, SLOTS};
use pretty_assertions::assert_eq;

/// A row carrying every per-slot column, all set to the missing marker except
/// the alive flags.
fn empty_row() -> serde_json::Map<String, serde_json::Value> {
    let mut row = serde_json::Map::new();
    for team in Team::BOTH {
        for slot in 0..SLOTS {
            for field in SlotField::for_team(team) {
                let value = match field {
                    SlotField::IsAlive => serde_json::Value::from(0),
                    _ => serde_json::Value::Null,
                };
                row.insert(column_name(team, slot, *field), value);
            }
        }
    }
    row
}

#[test]
fn decodes_full_row() {
    let mut row = empty_row();
    row.insert("ct_p2_x".to_string(), serde_json::Value::from(-210.5));
    row.insert("ct_p2_isAlive".to_string(), serde_json::Value::from(1));
    row.insert("ct_p2_hp".to_string(), serde_json::Value::from(73));
    row.insert("ct_p2_hasDefuse".to_string(), serde_json::Value::from(true));
    row.insert("t_p4_hasBomb".to_string(), serde_json::Value::from(1));

    let record = TickRecord::from_columns(&row).unwrap();

    assert_eq!(Some(-210.5), record.ct[2].x);
    assert!(record.ct[2].is_alive);
    assert_eq!(Some(73), record.ct[2].hp);
    assert_eq!(Some(true), record.ct[2].has_defuse);
    assert_eq!(Some(true), record.t[4].has_bomb);
    assert_eq!(None, record.t[0].hp);
    assert!(!record.t[0].is_alive);
}

#[test]
fn missing_column_fails_fast() {
    let mut row = empty_row();
    row.remove("ct_p4_hasDefuse");

    let result = TickRecord::from_columns(&row);

    assert_eq!(
        Err(SchemaError::MissingColumn("ct_p4_hasDefuse".to_string())),
        result
    );
}

#[test]
fn wrong_value_type_is_a_schema_error() {
    let mut row = empty_row();
    row.insert(
        "t_p1_hp".to_string(),
        serde_json::Value::from("ninety-nine"),
    );

    let result = TickRecord::from_columns(&row);

    assert_eq!(
        Err(SchemaError::InvalidValue {
            column: "t_p1_hp".to_string(),
            expected: "number",
        }),
        result
    );
}

#[test]
fn non_slot_columns_pass_into_meta() {
    let mut row = empty_row();
    row.insert("roundNum".to_string(), serde_json::Value::from(12));
    row.insert("clockTime".to_string(), serde_json::Value::from("01:32"));
    // looks slot-like but is not part of the schema
    row.insert("t_pistol_round".to_string(), serde_json::Value::from(true));

    let record = TickRecord::from_columns(&row).unwrap();

    assert_eq!(3, record.meta.len());
    assert_eq!(Some(&serde_json::Value::from(12)), record.meta.get("roundNum"));
    assert_eq!(
        Some(&serde_json::Value::from(true)),
        record.meta.get("t_pistol_round")
    );
}

#[test]
fn alive_flag_accepts_booleans_and_numbers() {
    let mut row = empty_row();
    row.insert("t_p0_isAlive".to_string(), serde_json::Value::from(true));
    row.insert("t_p1_isAlive".to_string(), serde_json::Value::from(1.0));
    row.insert("t_p2_isAlive".to_string(), serde_json::Value::Null);

    let record = TickRecord::from_columns(&row).unwrap();

    assert!(record.t[0].is_alive);
    assert!(record.t[1].is_alive);
    assert!(!record.t[2].is_alive);
}

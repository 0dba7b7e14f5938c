/// One of the two sides of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Team {
    T,
    Ct,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::T, Team::Ct];

    /// Column prefix used by the flat per-tick table.
    pub fn prefix(&self) -> &'static str {
        match self {
            Team::T => "t",
            Team::Ct => "ct",
        }
    }
}

/// Fixed number of player slots per team.
pub const SLOTS: usize = 5;

/// Per-slot fields of the flat table, one per `{team}_p{slot}_{suffix}`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    X,
    Y,
    Z,
    IsAlive,
    Hp,
    Armor,
    HasHelmet,
    EquipmentValue,
    TotalUtility,
    IsInBombZone,
    HasDefuse,
    HasBomb,
}

static FIELD_BY_SUFFIX: phf::Map<&'static str, SlotField> = phf::phf_map! {
    "x" => SlotField::X,
    "y" => SlotField::Y,
    "z" => SlotField::Z,
    "isAlive" => SlotField::IsAlive,
    "hp" => SlotField::Hp,
    "armor" => SlotField::Armor,
    "hasHelmet" => SlotField::HasHelmet,
    "equipmentValue" => SlotField::EquipmentValue,
    "totalUtility" => SlotField::TotalUtility,
    "isInBombZone" => SlotField::IsInBombZone,
    "hasDefuse" => SlotField::HasDefuse,
    "hasBomb" => SlotField::HasBomb,
};

const T_FIELDS: [SlotField; 11] = [
    SlotField::X,
    SlotField::Y,
    SlotField::Z,
    SlotField::IsAlive,
    SlotField::Hp,
    SlotField::Armor,
    SlotField::HasHelmet,
    SlotField::EquipmentValue,
    SlotField::TotalUtility,
    SlotField::IsInBombZone,
    SlotField::HasBomb,
];

const CT_FIELDS: [SlotField; 11] = [
    SlotField::X,
    SlotField::Y,
    SlotField::Z,
    SlotField::IsAlive,
    SlotField::Hp,
    SlotField::Armor,
    SlotField::HasHelmet,
    SlotField::EquipmentValue,
    SlotField::TotalUtility,
    SlotField::IsInBombZone,
    SlotField::HasDefuse,
];

impl SlotField {
    /// The fields every slot of the given team must carry.
    pub fn for_team(team: Team) -> &'static [SlotField; 11] {
        match team {
            Team::T => &T_FIELDS,
            Team::Ct => &CT_FIELDS,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            SlotField::X => "x",
            SlotField::Y => "y",
            SlotField::Z => "z",
            SlotField::IsAlive => "isAlive",
            SlotField::Hp => "hp",
            SlotField::Armor => "armor",
            SlotField::HasHelmet => "hasHelmet",
            SlotField::EquipmentValue => "equipmentValue",
            SlotField::TotalUtility => "totalUtility",
            SlotField::IsInBombZone => "isInBombZone",
            SlotField::HasDefuse => "hasDefuse",
            SlotField::HasBomb => "hasBomb",
        }
    }
}

/// Column name of a (team, slot, field) tuple in the flat table.
pub fn column_name(team: Team, slot: usize, field: SlotField) -> String {
    format!("{}_p{}_{}", team.prefix(), slot, field.suffix())
}

fn parse_column(name: &str) -> Option<(Team, usize, SlotField)> {
    let (prefix, rest) = name.split_once("_p")?;
    let team = match prefix {
        "t" => Team::T,
        "ct" => Team::Ct,
        _ => return None,
    };

    let (slot, suffix) = rest.split_once('_')?;
    let slot: usize = slot.parse().ok()?;
    if slot >= SLOTS {
        return None;
    }

    let field = FIELD_BY_SUFFIX.get(suffix).copied()?;
    // hasDefuse is CT-only, hasBomb is T-only
    match (team, field) {
        (Team::T, SlotField::HasDefuse) | (Team::Ct, SlotField::HasBomb) => None,
        _ => Some((team, slot, field)),
    }
}

/// One per-team player slot of a tick record.
///
/// Fields that are undefined for a dead or absent player hold `None`; summed
/// fields treat that as zero, positional statistics exclude it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PlayerSlot {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub is_alive: bool,
    pub hp: Option<u32>,
    pub armor: Option<u32>,
    pub has_helmet: Option<bool>,
    pub equipment_value: Option<u32>,
    pub total_utility: Option<u32>,
    pub is_in_bomb_zone: Option<bool>,
    /// CT slots only.
    pub has_defuse: Option<bool>,
    /// T slots only.
    pub has_bomb: Option<bool>,
}

/// One row of the flat per-tick table.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct TickRecord {
    /// Columns outside the per-slot schema (round/tick identifiers,
    /// timestamps, ...), carried through the aggregation untouched.
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub t: [PlayerSlot; SLOTS],
    pub ct: [PlayerSlot; SLOTS],
}

#[derive(Debug, PartialEq)]
pub enum SchemaError {
    MissingColumn(String),
    InvalidValue {
        column: String,
        expected: &'static str,
    },
}

impl core::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "missing expected column '{}'", column),
            Self::InvalidValue { column, expected } => {
                write!(f, "column '{}' does not hold a {}", column, expected)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

impl TickRecord {
    /// Decodes one column-keyed row of the flat table.
    ///
    /// The full static column enumeration is checked up front; the first
    /// absent per-slot column aborts the decode with no partial result. JSON
    /// `null` is the missing-value marker. Columns not matching the per-slot
    /// naming pattern land in [`TickRecord::meta`].
    pub fn from_columns(
        row: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, SchemaError> {
        for team in Team::BOTH {
            for slot in 0..SLOTS {
                for field in SlotField::for_team(team) {
                    let column = column_name(team, slot, *field);
                    if !row.contains_key(&column) {
                        return Err(SchemaError::MissingColumn(column));
                    }
                }
            }
        }

        let mut record = TickRecord::default();
        for (column, value) in row.iter() {
            let (team, slot, field) = match parse_column(column) {
                Some(parsed) => parsed,
                None => {
                    record.meta.insert(column.clone(), value.clone());
                    continue;
                }
            };

            let target = match team {
                Team::T => &mut record.t[slot],
                Team::Ct => &mut record.ct[slot],
            };
            match field {
                SlotField::X => target.x = opt_f64(column, value)?,
                SlotField::Y => target.y = opt_f64(column, value)?,
                SlotField::Z => target.z = opt_f64(column, value)?,
                SlotField::IsAlive => {
                    target.is_alive = opt_bool(column, value)?.unwrap_or(false)
                }
                SlotField::Hp => target.hp = opt_u32(column, value)?,
                SlotField::Armor => target.armor = opt_u32(column, value)?,
                SlotField::HasHelmet => target.has_helmet = opt_bool(column, value)?,
                SlotField::EquipmentValue => target.equipment_value = opt_u32(column, value)?,
                SlotField::TotalUtility => target.total_utility = opt_u32(column, value)?,
                SlotField::IsInBombZone => target.is_in_bomb_zone = opt_bool(column, value)?,
                SlotField::HasDefuse => target.has_defuse = opt_bool(column, value)?,
                SlotField::HasBomb => target.has_bomb = opt_bool(column, value)?,
            }
        }

        Ok(record)
    }
}

fn opt_f64(column: &str, value: &serde_json::Value) -> Result<Option<f64>, SchemaError> {
    match value {
        serde_json::Value::Null => Ok(None),
        other => other
            .as_f64()
            .map(Some)
            .ok_or_else(|| SchemaError::InvalidValue {
                column: column.to_string(),
                expected: "number",
            }),
    }
}

fn opt_u32(column: &str, value: &serde_json::Value) -> Result<Option<u32>, SchemaError> {
    match value {
        serde_json::Value::Null => Ok(None),
        other => other
            .as_f64()
            .map(|v| Some(v as u32))
            .ok_or_else(|| SchemaError::InvalidValue {
                column: column.to_string(),
                expected: "number",
            }),
    }
}

fn opt_bool(column: &str, value: &serde_json::Value) -> Result<Option<bool>, SchemaError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(b) => Ok(Some(*b)),
        other => other
            .as_f64()
            .map(|v| Some(v != 0.0))
            .ok_or_else(|| SchemaError::InvalidValue {
                column: column.to_string(),
                expected: "boolean or 0/1 flag",
            }),
    }
}

use crate::schema::{PlayerSlot, Team, TickRecord, SLOTS};

/// Per-axis positional statistic. `None` when no slot of the team had a
/// defined coordinate on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct AxisStats {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Summary of one team's five slots at a single tick.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct TeamSnapshot {
    pub alive: u32,
    pub hp: u32,
    pub armor: u32,
    pub helmet: u32,
    pub equipment_value: u32,
    pub utility: u32,
    pub players_in_bomb_zone: u32,
    pub mean_pos: AxisStats,
    pub std_dev_pos: AxisStats,
}

/// One aggregated output row, replacing the per-slot columns of a
/// [`TickRecord`].
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct TeamRow {
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub t: TeamSnapshot,
    pub ct: TeamSnapshot,
    pub ct_defusers: u32,
    pub t_has_bomb: u32,
}

/// Collapses the per-slot columns of every tick record into per-team
/// summaries.
///
/// One output row per input row, in order. The input is never mutated.
pub fn aggregate(records: &[TickRecord]) -> Vec<TeamRow> {
    tracing::debug!("Aggregating {} tick records", records.len());

    records.iter().map(aggregate_record).collect()
}

/// Aggregates a single tick record.
pub fn aggregate_record(record: &TickRecord) -> TeamRow {
    TeamRow {
        meta: record.meta.clone(),
        t: team_snapshot(&record.t),
        ct: team_snapshot(&record.ct),
        ct_defusers: record
            .ct
            .iter()
            .filter(|slot| slot.has_defuse.unwrap_or(false))
            .count() as u32,
        t_has_bomb: record
            .t
            .iter()
            .filter(|slot| slot.has_bomb.unwrap_or(false))
            .count() as u32,
    }
}

fn team_snapshot(slots: &[PlayerSlot; SLOTS]) -> TeamSnapshot {
    let mut snapshot = TeamSnapshot::default();

    for slot in slots {
        snapshot.alive += slot.is_alive as u32;
        snapshot.hp += slot.hp.unwrap_or(0);
        snapshot.armor += slot.armor.unwrap_or(0);
        snapshot.helmet += slot.has_helmet.unwrap_or(false) as u32;
        snapshot.equipment_value += slot.equipment_value.unwrap_or(0);
        snapshot.utility += slot.total_utility.unwrap_or(0);
        snapshot.players_in_bomb_zone += slot.is_in_bomb_zone.unwrap_or(false) as u32;
    }

    snapshot.mean_pos = AxisStats {
        x: mean(slots.iter().map(|slot| slot.x)),
        y: mean(slots.iter().map(|slot| slot.y)),
        z: mean(slots.iter().map(|slot| slot.z)),
    };
    snapshot.std_dev_pos = AxisStats {
        x: std_dev(slots.iter().map(|slot| slot.x)),
        y: std_dev(slots.iter().map(|slot| slot.y)),
        z: std_dev(slots.iter().map(|slot| slot.z)),
    };

    snapshot
}

/// Mean over the defined values; `None` if every value is missing.
fn mean<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation over the defined values.
fn std_dev<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = Option<f64>> + Clone,
{
    let mean = mean(values.clone())?;
    let (sum_sq, count) = values.flatten().fold((0.0, 0u32), |(sum, count), v| {
        (sum + (v - mean) * (v - mean), count + 1)
    });

    Some((sum_sq / count as f64).sqrt())
}

impl TeamRow {
    /// Re-emits the row under the aggregate column names of the flat table,
    /// with `null` standing in for undefined positional statistics.
    pub fn to_columns(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut row = self.meta.clone();

        for (team, snapshot) in [(Team::T, &self.t), (Team::Ct, &self.ct)] {
            let prefix = team.prefix();

            row.insert(format!("{}Alive", prefix), snapshot.alive.into());
            row.insert(format!("{}Hp", prefix), snapshot.hp.into());
            row.insert(format!("{}Armor", prefix), snapshot.armor.into());
            row.insert(format!("{}Helmet", prefix), snapshot.helmet.into());
            row.insert(
                format!("{}EquipmentValue", prefix),
                snapshot.equipment_value.into(),
            );
            row.insert(format!("{}Utility", prefix), snapshot.utility.into());
            row.insert(
                format!("{}PlayersInBombZone", prefix),
                snapshot.players_in_bomb_zone.into(),
            );

            for (axis, mean, std_dev) in [
                ("x", snapshot.mean_pos.x, snapshot.std_dev_pos.x),
                ("y", snapshot.mean_pos.y, snapshot.std_dev_pos.y),
                ("z", snapshot.mean_pos.z, snapshot.std_dev_pos.z),
            ] {
                row.insert(format!("{}MeanPos_{}", prefix, axis), json_number(mean));
                row.insert(
                    format!("{}StdDevPos_{}", prefix, axis),
                    json_number(std_dev),
                );
            }
        }

        row.insert("ctDefusers".to_string(), self.ct_defusers.into());
        row.insert("tHasBomb".to_string(), self.t_has_bomb.into());

        row
    }
}

fn json_number(value: Option<f64>) -> serde_json::Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

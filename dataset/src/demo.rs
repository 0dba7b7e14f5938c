//! Loads pre-parsed `.json.xz` demo archives into a structured document.

use std::io::Read;

use analysis::schema::{PlayerSlot, Team, TickRecord, SLOTS};

/// Top-level document of a pre-parsed ESTA demo archive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDemo {
    pub map_name: String,
    pub demo_id: String,
    #[serde(default)]
    pub competition_name: Option<String>,
    #[serde(default)]
    pub hltv_url: Option<String>,
    #[serde(default)]
    pub match_date: Option<String>,
    #[serde(default)]
    pub match_name: Option<String>,
    #[serde(default)]
    pub game_rounds: Vec<GameRound>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRound {
    pub round_num: u32,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

/// One recorded snapshot of game state within a round.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub tick: u64,
    #[serde(default)]
    pub seconds: f64,
    #[serde(default)]
    pub clock_time: Option<String>,
    #[serde(default)]
    pub bomb_planted: bool,
    pub t: TeamFrame,
    pub ct: TeamFrame,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamFrame {
    #[serde(default)]
    pub players: Option<Vec<FramePlayer>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePlayer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "steamID")]
    pub steam_id: Option<u64>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub is_alive: bool,
    #[serde(default)]
    pub hp: u32,
    #[serde(default)]
    pub armor: u32,
    #[serde(default)]
    pub has_helmet: bool,
    #[serde(default)]
    pub equipment_value: u32,
    #[serde(default)]
    pub total_utility: u32,
    #[serde(default)]
    pub is_in_bomb_zone: bool,
    #[serde(default)]
    pub has_defuse: Option<bool>,
    #[serde(default)]
    pub has_bomb: Option<bool>,
}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Decode(serde_json::Error),
}

impl From<std::io::Error> for LoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "reading archive: {}", e),
            Self::Decode(e) => write!(f, "decoding archive: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

/// Reads a `.json.xz` archive into a [`ParsedDemo`].
///
/// Malformed or truncated archives fail with a [`LoadError`], there is no
/// partial result.
pub fn read_parsed_demo<P>(path: P) -> Result<ParsedDemo, LoadError>
where
    P: AsRef<std::path::Path>,
{
    let file = std::fs::File::open(path)?;
    let mut decoder = xz2::read::XzDecoder::new(std::io::BufReader::new(file));

    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;

    let demo = serde_json::from_slice(&raw)?;
    Ok(demo)
}

/// Flattens every round's frames into the aggregator's tick records.
///
/// A dead player's per-slot fields become missing, matching the flat
/// dataset's convention, and slots without a listed player stay empty.
pub fn tick_records(demo: &ParsedDemo) -> Vec<TickRecord> {
    let mut records = Vec::new();

    for round in demo.game_rounds.iter() {
        for frame in round.frames.iter() {
            let mut record = TickRecord::default();
            record
                .meta
                .insert("roundNum".to_string(), round.round_num.into());
            record.meta.insert("tick".to_string(), frame.tick.into());
            record
                .meta
                .insert("seconds".to_string(), frame.seconds.into());
            if let Some(clock) = &frame.clock_time {
                record
                    .meta
                    .insert("clockTime".to_string(), clock.clone().into());
            }
            record
                .meta
                .insert("bombPlanted".to_string(), frame.bomb_planted.into());

            fill_slots(&mut record.t, &frame.t, Team::T);
            fill_slots(&mut record.ct, &frame.ct, Team::Ct);

            records.push(record);
        }
    }

    tracing::debug!(
        "Flattened {} rounds into {} tick records",
        demo.game_rounds.len(),
        records.len()
    );

    records
}

fn fill_slots(slots: &mut [PlayerSlot; SLOTS], side: &TeamFrame, team: Team) {
    let players = match &side.players {
        Some(players) => players.as_slice(),
        None => return,
    };

    for (slot, player) in slots.iter_mut().zip(players.iter()) {
        slot.is_alive = player.is_alive;
        if !player.is_alive {
            // eliminated players carry no defined values
            continue;
        }

        slot.x = Some(player.x);
        slot.y = Some(player.y);
        slot.z = Some(player.z);
        slot.hp = Some(player.hp);
        slot.armor = Some(player.armor);
        slot.has_helmet = Some(player.has_helmet);
        slot.equipment_value = Some(player.equipment_value);
        slot.total_utility = Some(player.total_utility);
        slot.is_in_bomb_zone = Some(player.is_in_bomb_zone);
        match team {
            Team::T => slot.has_bomb = Some(player.has_bomb.unwrap_or(false)),
            Team::Ct => slot.has_defuse = Some(player.has_defuse.unwrap_or(false)),
        }
    }
}

/// Prints the top-level match metadata to the console.
pub fn print_demo_info(demo: &ParsedDemo) {
    println!("Match information:");
    println!("mapName: {}", demo.map_name);
    println!("demoId: {}", demo.demo_id);
    for (field, value) in [
        ("competitionName", &demo.competition_name),
        ("hltvUrl", &demo.hltv_url),
        ("matchDate", &demo.match_date),
        ("matchName", &demo.match_name),
    ] {
        println!("{}: {}", field, value.as_deref().unwrap_or("-"));
    }
}

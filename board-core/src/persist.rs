//! Game persistence for save/load functionality.
//!
//! Player state is saved as pretty-printed JSON. The board itself is data the
//! caller already has, so only players and a little metadata are stored.

use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
const SAVE_VERSION: u32 = 1;

/// A saved game with every player needed to resume play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created.
    pub saved_at: String,

    pub players: Vec<Player>,

    pub metadata: SaveMetadata,
}

/// Metadata about the save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadata {
    /// Name of the game or board the players are on.
    pub game_name: String,

    pub players: Vec<PlayerSummary>,

    /// When the save was created (duplicated from parent for peek access).
    #[serde(default)]
    pub saved_at: String,
}

/// Quick-look summary of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub space: String,
    pub time: u32,
    pub money: i64,
    pub cards: u32,
    pub turn: u32,
}

impl PlayerSummary {
    pub fn of(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            space: player.space_name().to_string(),
            time: player.resources.time,
            money: player.resources.money,
            cards: player.cards.total(),
            turn: player.turn,
        }
    }
}

impl SavedGame {
    pub fn new(game_name: impl Into<String>, players: Vec<Player>) -> Self {
        let saved_at = chrono_now();
        let metadata = SaveMetadata {
            game_name: game_name.into(),
            players: players.iter().map(PlayerSummary::of).collect(),
            saved_at: saved_at.clone(),
        };

        Self {
            version: SAVE_VERSION,
            saved_at,
            players,
            metadata,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), players = self.players.len(), "game saved");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }

    /// Read a save file's metadata without deserializing the players.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }
}

/// Information about a save file.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: PathBuf,
    pub metadata: SaveMetadata,
}

/// List all readable save files in a directory, newest name first.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let mut saves = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "json") {
            match SavedGame::peek_metadata(&path).await {
                Ok(metadata) => saves.push(SaveInfo { path, metadata }),
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "skipping unreadable save");
                }
            }
        }
    }

    saves.sort_by(|a, b| b.path.cmp(&a.path));
    Ok(saves)
}

/// Create an auto-save file name.
pub fn auto_save_path(base_dir: impl AsRef<Path>, game_name: &str) -> PathBuf {
    base_dir
        .as_ref()
        .join(format!("{}_autosave.json", sanitize(game_name)))
}

/// Create a manual save file name with timestamp.
pub fn manual_save_path(base_dir: impl AsRef<Path>, game_name: &str) -> PathBuf {
    base_dir
        .as_ref()
        .join(format!("{}_{}.json", sanitize(game_name), chrono_now()))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Seconds since the Unix epoch.
fn chrono_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::LogicProgress;
    use crate::space::{CardType, NodeId, VisitType};
    use tempfile::TempDir;

    fn players() -> Vec<Player> {
        let mut ada = Player::new("Ada", NodeId::new("OWNER-SCOPE", VisitType::First));
        ada.resources.add_time(12);
        ada.resources.add_money(-4_500);
        ada.cards.add(CardType::W, 3);
        ada.turn = 5;
        ada.used_bypass = true;
        ada.choices
            .insert("TYPE-SELECT".to_string(), "FAST-TRACK".to_string());
        ada.previous_position = Some(NodeId::new("CHECKPOINT", VisitType::Subsequent));
        ada.origin_space = Some("OWNER-FUND-INITIATION".to_string());
        ada.logic_progress.insert(
            "SCOPE-CHECK".to_string(),
            LogicProgress {
                question_index: 2,
                pending_question: Some("Are permits filed? YES - PERMITS NO - edge 4".to_string()),
            },
        );
        ada.turn_state.die_value = Some(3);

        let grace = Player::new("Grace", NodeId::new("START", VisitType::First));
        vec![ada, grace]
    }

    #[test]
    fn test_player_summary() {
        let summary = PlayerSummary::of(&players()[0]);
        assert_eq!(summary.space, "OWNER-SCOPE");
        assert_eq!(summary.time, 12);
        assert_eq!(summary.money, -4_500);
        assert_eq!(summary.cards, 3);
        assert_eq!(summary.turn, 5);
    }

    #[test]
    fn test_auto_save_path_sanitized() {
        let path = auto_save_path("/saves", "Permit Race: 2");
        assert_eq!(path, PathBuf::from("/saves/Permit_Race__2_autosave.json"));
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.json");

        let saved = SavedGame::new("Permit Race", players());
        saved.save_json(&path).await.unwrap();

        let loaded = SavedGame::load_json(&path).await.unwrap();
        assert_eq!(loaded.players, saved.players);
        assert_eq!(loaded.metadata, saved.metadata);
        assert_eq!(
            loaded.player("Ada").unwrap().choice_for("type-select"),
            Some("FAST-TRACK")
        );

        let ada = loaded.player("Ada").unwrap();
        assert_eq!(ada.origin_space.as_deref(), Some("OWNER-FUND-INITIATION"));
        assert_eq!(
            ada.logic_progress["SCOPE-CHECK"].pending_question.as_deref(),
            Some("Are permits filed? YES - PERMITS NO - edge 4")
        );
    }

    #[tokio::test]
    async fn test_peek_metadata() {
        let dir = TempDir::new().unwrap();
        let path = auto_save_path(dir.path(), "Permit Race");
        SavedGame::new("Permit Race", players())
            .save_json(&path)
            .await
            .unwrap();

        let metadata = SavedGame::peek_metadata(&path).await.unwrap();
        assert_eq!(metadata.game_name, "Permit Race");
        assert_eq!(metadata.players.len(), 2);
        assert_eq!(metadata.players[1].space, "START");

        let saves = list_saves(dir.path()).await.unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].path, path);
    }

    #[tokio::test]
    async fn test_version_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.json");

        let mut saved = SavedGame::new("Permit Race", players());
        saved.version = SAVE_VERSION + 1;
        saved.save_json(&path).await.unwrap();

        assert!(matches!(
            SavedGame::load_json(&path).await,
            Err(PersistError::VersionMismatch { .. })
        ));
        assert!(matches!(
            SavedGame::peek_metadata(&path).await,
            Err(PersistError::VersionMismatch { .. })
        ));
    }
}

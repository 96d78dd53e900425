//! The single shared aggregate of everything known about the match.
//!
//! Ingest is the only writer; the planner reads a snapshot per tick. The
//! whole aggregate sits behind one `Arc<tokio::sync::Mutex<_>>` in the
//! runner, so a snapshot can never observe a half-applied update. Nothing
//! in here does I/O or holds a lock across an await.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::geometry::Loc;
use crate::wire::{ItemKind, ServerEvent};

/// Transient ammo/food sightings older than this are purged. The server
/// never announces pickups, so this is the only thing bounding the lists.
pub const ITEM_FRESHNESS: Duration = Duration::from_secs(5);

/// Everything the server has told us about ourselves. Replaced wholesale on
/// every `playerupdate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub name: String,
    pub loc: Loc,
    pub health: i32,
    pub ammo: i32,
    pub has_key: bool,
}

/// A timestamped observation of something at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    pub loc: Loc,
    pub seen: Instant,
}

#[derive(Debug, Clone)]
pub struct WorldState {
    pub player: PlayerState,
    /// Write-once: a single static exit per match.
    pub exit: Option<Loc>,
    /// Write-once: the one key that opens our exit.
    pub my_key: Option<Loc>,
    /// Monotone: a tile marked wall is never cleared. Map geometry is
    /// static; only our knowledge of it grows.
    pub walls: HashSet<Loc>,
    /// Last-write-wins: only the most recent enemy position is retained.
    pub enemy: Option<Sighting>,
    /// Discovery order is preserved; the planner pursues index 0.
    pub ammo_items: Vec<Sighting>,
    pub food_items: Vec<Sighting>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            player: PlayerState::default(),
            exit: None,
            my_key: None,
            walls: HashSet::new(),
            enemy: None,
            ammo_items: Vec::new(),
            food_items: Vec::new(),
        }
    }

    /// Which key color belongs to a given display name. Names outside the
    /// roster have no key and will never match a sighted `<color>key`.
    fn key_color_for(name: &str) -> Option<&'static str> {
        match name {
            "warrior" => Some("red"),
            "valkyrie" => Some("blue"),
            "elf" => Some("green"),
            "wizard" => Some("yellow"),
            _ => None,
        }
    }

    /// Apply exactly one semantic update.
    pub fn apply(&mut self, event: ServerEvent, now: Instant) {
        match event {
            ServerEvent::PlayerJoined { name, loc } => {
                self.player = PlayerState {
                    name,
                    loc,
                    ..PlayerState::default()
                };
            }
            ServerEvent::PlayerUpdated {
                loc,
                health,
                ammo,
                has_key,
            } => {
                self.player.loc = loc;
                self.player.health = health;
                self.player.ammo = ammo;
                self.player.has_key = has_key;
            }
            ServerEvent::ExitDiscovered { loc } => {
                if self.exit.is_none() {
                    self.exit = Some(loc);
                }
            }
            ServerEvent::ItemSighted { kind, loc } => match kind {
                ItemKind::Ammo => Self::note_item(&mut self.ammo_items, loc, now),
                ItemKind::Food => Self::note_item(&mut self.food_items, loc, now),
                ItemKind::Key { color } => {
                    let ours = Self::key_color_for(&self.player.name) == Some(color.as_str());
                    if ours && self.my_key.is_none() {
                        self.my_key = Some(loc);
                    }
                }
            },
            ServerEvent::PlayerSighted { loc } => {
                self.enemy = Some(Sighting { loc, seen: now });
            }
            ServerEvent::WallsRevealed { tiles } => {
                self.walls.extend(tiles);
            }
            ServerEvent::FloorsRevealed => {}
        }
    }

    /// Refresh the timestamp of a re-sighted item, keeping its discovery
    /// position; otherwise append.
    fn note_item(items: &mut Vec<Sighting>, loc: Loc, now: Instant) {
        match items.iter_mut().find(|item| item.loc == loc) {
            Some(item) => item.seen = now,
            None => items.push(Sighting { loc, seen: now }),
        }
    }

    /// Drop every transient item not seen within the freshness window.
    /// Enemy sightings age out on the read side instead, and key/exit never
    /// expire.
    pub fn expire_stale(&mut self, now: Instant) {
        self.ammo_items
            .retain(|item| now.duration_since(item.seen) < ITEM_FRESHNESS);
        self.food_items
            .retain(|item| now.duration_since(item.seen) < ITEM_FRESHNESS);
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

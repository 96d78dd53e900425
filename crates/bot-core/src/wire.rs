//! The arena's datagram protocol: ASCII frames of the form `type:a,b,c`.
//!
//! This module is the only place that splits strings or parses numbers off
//! the wire. Inbound frames decode into the closed [`ServerEvent`] set; the
//! rest of the crate never sees raw text. Outbound intents encode from
//! [`Command`]. The server pads frames with trailing NUL bytes, which the
//! decoder strips.
//!
//! Numeric fields inside a recognized message soft-fail to zero: a garbled
//! coordinate should not cost us the rest of the frame, and the server will
//! resend equivalent state soon anyway. A missing field or an unknown
//! message type is a [`DecodeError`] and drops the whole frame.

use crate::geometry::{Direction, Loc};

/// What kind of pickup a `nearbyitem` frame describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Ammo,
    Food,
    /// A colored exit key, e.g. `redkey`. Whether it is *our* key depends on
    /// the bot's display name and is decided by the world model, not here.
    Key { color: String },
}

/// One decoded server notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    PlayerJoined { name: String, loc: Loc },
    PlayerUpdated { loc: Loc, health: i32, ammo: i32, has_key: bool },
    ExitDiscovered { loc: Loc },
    ItemSighted { kind: ItemKind, loc: Loc },
    PlayerSighted { loc: Loc },
    WallsRevealed { tiles: Vec<Loc> },
    /// Accepted for protocol completeness; carries no state we act on.
    FloorsRevealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No `:` separator, so not even a message type to dispatch on.
    MissingSeparator,
    UnknownMessageType(String),
    UnknownItemKind(String),
    MissingField { msg: &'static str, index: usize },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MissingSeparator => write!(f, "frame has no type separator"),
            DecodeError::UnknownMessageType(raw) => write!(f, "unknown message type: {raw}"),
            DecodeError::UnknownItemKind(kind) => write!(f, "unknown item kind: {kind}"),
            DecodeError::MissingField { msg, index } => {
                write!(f, "{msg} frame missing field {index}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Integer field at `index`, defaulting to 0 when present but unparseable.
fn int_field(params: &[&str], index: usize, msg: &'static str) -> Result<i32, DecodeError> {
    let raw = params
        .get(index)
        .ok_or(DecodeError::MissingField { msg, index })?;
    Ok(raw.trim().parse().unwrap_or(0))
}

/// Decimal field with a fractional part, truncated toward zero.
fn coord_field(params: &[&str], index: usize, msg: &'static str) -> Result<i32, DecodeError> {
    let raw = params
        .get(index)
        .ok_or(DecodeError::MissingField { msg, index })?;
    Ok(raw.trim().parse::<f32>().unwrap_or(0.0) as i32)
}

fn str_field<'a>(
    params: &[&'a str],
    index: usize,
    msg: &'static str,
) -> Result<&'a str, DecodeError> {
    params
        .get(index)
        .copied()
        .ok_or(DecodeError::MissingField { msg, index })
}

/// Decode one inbound frame.
pub fn decode(raw: &str) -> Result<ServerEvent, DecodeError> {
    let (msg_type, rest) = raw.split_once(':').ok_or(DecodeError::MissingSeparator)?;
    let rest = rest.trim_end_matches('\0');
    let params: Vec<&str> = rest.split(',').collect();

    match msg_type {
        "playerjoined" => Ok(ServerEvent::PlayerJoined {
            name: str_field(&params, 0, "playerjoined")?.to_string(),
            loc: Loc::new(
                int_field(&params, 2, "playerjoined")?,
                int_field(&params, 3, "playerjoined")?,
            ),
        }),
        "playerupdate" => Ok(ServerEvent::PlayerUpdated {
            loc: Loc::new(
                coord_field(&params, 0, "playerupdate")?,
                coord_field(&params, 1, "playerupdate")?,
            ),
            health: int_field(&params, 2, "playerupdate")?,
            ammo: int_field(&params, 3, "playerupdate")?,
            // Case-sensitive flag; anything that is not "True" means false.
            has_key: str_field(&params, 4, "playerupdate")?.starts_with("True"),
        }),
        "exit" => Ok(ServerEvent::ExitDiscovered {
            loc: Loc::new(int_field(&params, 0, "exit")?, int_field(&params, 1, "exit")?),
        }),
        "nearbyitem" => {
            let kind = match str_field(&params, 0, "nearbyitem")? {
                "ammo" => ItemKind::Ammo,
                "food" => ItemKind::Food,
                other => match other.strip_suffix("key") {
                    Some(color) if !color.is_empty() => ItemKind::Key {
                        color: color.to_string(),
                    },
                    _ => return Err(DecodeError::UnknownItemKind(other.to_string())),
                },
            };
            Ok(ServerEvent::ItemSighted {
                kind,
                loc: Loc::new(
                    int_field(&params, 1, "nearbyitem")?,
                    int_field(&params, 2, "nearbyitem")?,
                ),
            })
        }
        "nearbyplayer" => Ok(ServerEvent::PlayerSighted {
            loc: Loc::new(
                coord_field(&params, 2, "nearbyplayer")?,
                coord_field(&params, 3, "nearbyplayer")?,
            ),
        }),
        "nearbywalls" => {
            let mut tiles = Vec::with_capacity(params.len() / 2);
            let mut i = 0;
            // Repeating x,y pairs; an odd trailing coordinate is ignored.
            while i + 1 < params.len() {
                tiles.push(Loc::new(
                    int_field(&params, i, "nearbywalls")?,
                    int_field(&params, i + 1, "nearbywalls")?,
                ));
                i += 2;
            }
            Ok(ServerEvent::WallsRevealed { tiles })
        }
        "nearbyfloors" => Ok(ServerEvent::FloorsRevealed),
        _ => Err(DecodeError::UnknownMessageType(
            raw.trim_end_matches('\0').to_string(),
        )),
    }
}

/// One outbound intent, a single ASCII frame with no response expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestJoin { name: String },
    MoveTo(Loc),
    /// Part of the protocol; the movement strategy only ever emits absolute
    /// `MoveTo` frames so wander progress is recomputed from the latest
    /// known location instead of accumulating.
    MoveDirection(Direction),
    FaceDirection(Direction),
    Fire,
}

impl Command {
    pub fn to_frame(&self) -> String {
        match self {
            Command::RequestJoin { name } => format!("requestjoin:{name}"),
            Command::MoveTo(loc) => format!("moveto:{},{}", loc.x, loc.y),
            Command::MoveDirection(dir) => format!("movedirection:{dir}"),
            Command::FaceDirection(dir) => format!("facedirection:{dir}"),
            Command::Fire => "fire:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_playerjoined_ignoring_the_second_field() {
        let event = decode("playerjoined:alice,wizard,12,34").expect("decode");
        assert_eq!(
            event,
            ServerEvent::PlayerJoined {
                name: "alice".to_string(),
                loc: Loc::new(12, 34),
            }
        );
    }

    #[test]
    fn decodes_playerupdate_truncating_fractional_coordinates() {
        let event = decode("playerupdate:10.7,-3.2,5,9,True").expect("decode");
        assert_eq!(
            event,
            ServerEvent::PlayerUpdated {
                loc: Loc::new(10, -3),
                health: 5,
                ammo: 9,
                has_key: true,
            }
        );
    }

    #[test]
    fn has_key_flag_is_case_sensitive() {
        let event = decode("playerupdate:0,0,5,9,true").expect("decode");
        assert_eq!(
            event,
            ServerEvent::PlayerUpdated {
                loc: Loc::new(0, 0),
                health: 5,
                ammo: 9,
                has_key: false,
            }
        );
    }

    #[test]
    fn strips_trailing_nul_padding() {
        let event = decode("exit:40,50\0\0\0\0").expect("decode");
        assert_eq!(
            event,
            ServerEvent::ExitDiscovered {
                loc: Loc::new(40, 50)
            }
        );
    }

    #[test]
    fn malformed_numeric_field_defaults_instead_of_failing() {
        let event = decode("playerupdate:oops,2.0,x,4,False").expect("decode");
        assert_eq!(
            event,
            ServerEvent::PlayerUpdated {
                loc: Loc::new(0, 2),
                health: 0,
                ammo: 4,
                has_key: false,
            }
        );
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        assert_eq!(
            decode("playerupdate:1,2,3"),
            Err(DecodeError::MissingField {
                msg: "playerupdate",
                index: 3
            })
        );
    }

    #[test]
    fn decodes_item_kinds_and_key_colors() {
        assert_eq!(
            decode("nearbyitem:ammo,5,6").expect("decode"),
            ServerEvent::ItemSighted {
                kind: ItemKind::Ammo,
                loc: Loc::new(5, 6)
            }
        );
        assert_eq!(
            decode("nearbyitem:redkey,7,8").expect("decode"),
            ServerEvent::ItemSighted {
                kind: ItemKind::Key {
                    color: "red".to_string()
                },
                loc: Loc::new(7, 8)
            }
        );
        assert_eq!(
            decode("nearbyitem:gem,1,2"),
            Err(DecodeError::UnknownItemKind("gem".to_string()))
        );
    }

    #[test]
    fn decodes_nearbyplayer_position_from_the_trailing_pair() {
        let event = decode("nearbyplayer:bob,red,15.9,20.1").expect("decode");
        assert_eq!(
            event,
            ServerEvent::PlayerSighted {
                loc: Loc::new(15, 20)
            }
        );
    }

    #[test]
    fn decodes_wall_pairs_and_ignores_odd_trailing_coordinate() {
        let event = decode("nearbywalls:1,2,3,4,5").expect("decode");
        assert_eq!(
            event,
            ServerEvent::WallsRevealed {
                tiles: vec![Loc::new(1, 2), Loc::new(3, 4)],
            }
        );
    }

    #[test]
    fn unknown_message_type_preserves_the_raw_frame() {
        assert_eq!(
            decode("gamestarting:3\0\0"),
            Err(DecodeError::UnknownMessageType("gamestarting:3".to_string()))
        );
    }

    #[test]
    fn encodes_every_command_frame() {
        assert_eq!(
            Command::RequestJoin {
                name: "mazebot".to_string()
            }
            .to_frame(),
            "requestjoin:mazebot"
        );
        assert_eq!(Command::MoveTo(Loc::new(3, -7)).to_frame(), "moveto:3,-7");
        assert_eq!(
            Command::MoveDirection(Direction::NorthEast).to_frame(),
            "movedirection:ne"
        );
        assert_eq!(
            Command::FaceDirection(Direction::South).to_frame(),
            "facedirection:s"
        );
        assert_eq!(Command::Fire.to_frame(), "fire:");
    }
}

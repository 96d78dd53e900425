//! The priority-driven tactical decision loop.
//!
//! Re-evaluated from scratch every tick against the current observation:
//! pick a target category by strict priority, chase the best candidate if a
//! straight line to it is clear, otherwise wander diagonally and bounce off
//! whatever stopped us. Combat runs alongside movement on its own shot
//! cadence.

use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::agent::observation::Observation;
use crate::geometry::{Direction, Loc};
use crate::vision::line_of_sight;
use crate::wire::Command;

/// Steady-state objective once ammo and health are taken care of. Both
/// modes are in live use; the loop itself is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPolicy {
    /// Chase the last sighted enemy indefinitely.
    HuntEnemy,
    /// Pursue our key until held, then head for the exit.
    KeyThenExit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(String);

impl std::fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown policy: {} (expected hunt-enemy or key-then-exit)", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for TargetPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hunt-enemy" => Ok(TargetPolicy::HuntEnemy),
            "key-then-exit" => Ok(TargetPolicy::KeyThenExit),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// What the planner is after this tick, in strict priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCategory {
    Ammo,
    Food,
    Enemy,
    Key,
    Exit,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub policy: TargetPolicy,
    /// Health below this means hunt food first.
    pub low_health: i32,
    /// Fire at most once every this many ticks.
    pub shot_delay_ticks: u32,
    /// Wander translation per tick along each signed axis.
    pub wander_stride: i32,
    /// Position deltas smaller than this count as "didn't move".
    pub jitter_tolerance: i32,
    /// An enemy sighting older than this is ignored; the player may have
    /// died or left range without the server telling us.
    pub enemy_freshness: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            policy: TargetPolicy::HuntEnemy,
            low_health: 2,
            shot_delay_ticks: 2,
            wander_stride: 10,
            jitter_tolerance: 1,
            enemy_freshness: Duration::from_secs(1),
        }
    }
}

/// Per-tick decision engine. Holds only what must survive between ticks:
/// the wander direction, the previous tick's position, and the shot
/// countdown.
#[derive(Debug)]
pub struct TacticalPlanner {
    cfg: PlannerConfig,
    wander_dir: Direction,
    last_loc: Option<Loc>,
    shot_countdown: u32,
}

impl TacticalPlanner {
    pub fn new(cfg: PlannerConfig) -> Self {
        let shot_countdown = cfg.shot_delay_ticks;
        Self {
            cfg,
            wander_dir: Direction::NorthEast,
            last_loc: None,
            shot_countdown,
        }
    }

    /// One planning tick: reads the observation, emits intents. At most one
    /// movement intent per tick, plus facing/fire when combat allows.
    pub fn tick(&mut self, obs: &Observation, now: Instant) -> Vec<Command> {
        // How far did the previous tick's move actually get us? Flip the
        // wander direction off whichever axis is stuck.
        if let Some(last) = self.last_loc {
            self.wander_dir = bounce_direction(
                self.wander_dir,
                last,
                obs.player.loc,
                self.cfg.jitter_tolerance,
            );
        }
        self.last_loc = Some(obs.player.loc);

        let mut intents = Vec::new();

        let category = self.select_category(obs);
        match self.candidate(obs, category, now) {
            Some(target) if line_of_sight(&obs.walls, obs.player.loc, target) => {
                tracing::debug!("planner.target {category:?} at {target}");
                intents.push(Command::MoveTo(target));
            }
            _ => {
                tracing::debug!("planner.wander {} toward {category:?}", self.wander_dir);
                intents.push(Command::MoveTo(wander_target(
                    obs.player.loc,
                    self.wander_dir,
                    self.cfg.wander_stride,
                )));
            }
        }

        if self.shot_countdown == 0 {
            if let Some(enemy) = self.fresh_enemy(obs, now) {
                if line_of_sight(&obs.walls, obs.player.loc, enemy) {
                    intents.push(Command::FaceDirection(Direction::toward(
                        obs.player.loc,
                        enemy,
                    )));
                    intents.push(Command::Fire);
                }
            }
            // The cadence restarts whether or not a shot came out.
            self.shot_countdown = self.cfg.shot_delay_ticks;
        } else {
            self.shot_countdown -= 1;
        }

        intents
    }

    fn select_category(&self, obs: &Observation) -> TargetCategory {
        if obs.player.ammo == 0 {
            TargetCategory::Ammo
        } else if obs.player.health < self.cfg.low_health {
            TargetCategory::Food
        } else {
            match self.cfg.policy {
                TargetPolicy::HuntEnemy => TargetCategory::Enemy,
                TargetPolicy::KeyThenExit => {
                    if obs.player.has_key {
                        TargetCategory::Exit
                    } else {
                        TargetCategory::Key
                    }
                }
            }
        }
    }

    fn candidate(&self, obs: &Observation, category: TargetCategory, now: Instant) -> Option<Loc> {
        match category {
            // TODO: pick the nearest visible sighting instead of the oldest;
            // needs distance ordering on the live item lists.
            TargetCategory::Ammo => obs.ammo_items.first().map(|item| item.loc),
            TargetCategory::Food => obs.food_items.first().map(|item| item.loc),
            TargetCategory::Enemy => self.fresh_enemy(obs, now),
            TargetCategory::Key => obs.my_key,
            TargetCategory::Exit => obs.exit,
        }
    }

    fn fresh_enemy(&self, obs: &Observation, now: Instant) -> Option<Loc> {
        obs.enemy
            .filter(|sighting| now.duration_since(sighting.seen) < self.cfg.enemy_freshness)
            .map(|sighting| sighting.loc)
    }
}

/// Where a wander step from `from` lands: a fixed stride along the signed
/// axes of the current direction. Always recomputed from the latest known
/// location, never accumulated.
pub fn wander_target(from: Loc, dir: Direction, stride: i32) -> Loc {
    let (sx, sy) = dir.signs();
    Loc::new(from.x + sx * stride, from.y + sy * stride)
}

/// Bounce rule: if exactly one axis failed to move (within the jitter
/// tolerance) since the previous tick, mirror that axis's sign component.
/// Both axes moving, or the degenerate neither-moved case, leave the
/// direction alone.
pub fn bounce_direction(dir: Direction, last: Loc, current: Loc, tolerance: i32) -> Direction {
    let x_unchanged = (last.x - current.x).abs() < tolerance;
    let y_unchanged = (last.y - current.y).abs() < tolerance;
    if x_unchanged && y_unchanged {
        dir
    } else if x_unchanged {
        dir.flip_x()
    } else if y_unchanged {
        dir.flip_y()
    } else {
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{PlayerState, Sighting};
    use std::collections::HashSet;

    fn obs(player: PlayerState) -> Observation {
        Observation {
            player,
            exit: None,
            my_key: None,
            walls: HashSet::new(),
            enemy: None,
            ammo_items: Vec::new(),
            food_items: Vec::new(),
        }
    }

    fn player_at(x: i32, y: i32, health: i32, ammo: i32) -> PlayerState {
        PlayerState {
            name: "warrior".to_string(),
            loc: Loc::new(x, y),
            health,
            ammo,
            has_key: false,
        }
    }

    fn planner(policy: TargetPolicy) -> TacticalPlanner {
        TacticalPlanner::new(PlannerConfig {
            policy,
            ..PlannerConfig::default()
        })
    }

    #[test]
    fn zero_ammo_selects_ammo_over_everything() {
        let p = planner(TargetPolicy::HuntEnemy);
        let mut o = obs(player_at(0, 0, 1, 0));
        o.enemy = Some(Sighting {
            loc: Loc::new(5, 5),
            seen: Instant::now(),
        });
        assert_eq!(p.select_category(&o), TargetCategory::Ammo);
    }

    #[test]
    fn low_health_selects_food_when_ammo_is_stocked() {
        let p = planner(TargetPolicy::HuntEnemy);
        let mut o = obs(player_at(0, 0, 1, 3));
        o.enemy = Some(Sighting {
            loc: Loc::new(5, 5),
            seen: Instant::now(),
        });
        assert_eq!(p.select_category(&o), TargetCategory::Food);
    }

    #[test]
    fn steady_state_follows_the_configured_policy() {
        let hunt = planner(TargetPolicy::HuntEnemy);
        let quest = planner(TargetPolicy::KeyThenExit);

        let healthy = obs(player_at(0, 0, 5, 3));
        assert_eq!(hunt.select_category(&healthy), TargetCategory::Enemy);
        assert_eq!(quest.select_category(&healthy), TargetCategory::Key);

        let mut keyed = obs(player_at(0, 0, 5, 3));
        keyed.player.has_key = true;
        assert_eq!(quest.select_category(&keyed), TargetCategory::Exit);
    }

    #[test]
    fn visible_candidate_yields_a_direct_move() {
        let mut p = planner(TargetPolicy::HuntEnemy);
        let now = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 0));
        o.ammo_items.push(Sighting {
            loc: Loc::new(20, 0),
            seen: now,
        });

        let intents = p.tick(&o, now);
        assert_eq!(intents[0], Command::MoveTo(Loc::new(20, 0)));
    }

    #[test]
    fn blocked_candidate_falls_back_to_wander() {
        let mut p = planner(TargetPolicy::HuntEnemy);
        let now = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 0));
        o.ammo_items.push(Sighting {
            loc: Loc::new(20, 0),
            seen: now,
        });
        o.walls.insert(Loc::new(10, 0));

        let intents = p.tick(&o, now);
        // Initial wander direction is ne: +x, -y.
        assert_eq!(intents[0], Command::MoveTo(Loc::new(10, -10)));
    }

    #[test]
    fn oldest_surviving_item_is_pursued_first() {
        let p = planner(TargetPolicy::HuntEnemy);
        let now = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 0));
        o.ammo_items.push(Sighting {
            loc: Loc::new(30, 30),
            seen: now,
        });
        o.ammo_items.push(Sighting {
            loc: Loc::new(5, 5),
            seen: now,
        });
        assert_eq!(
            p.candidate(&o, TargetCategory::Ammo, now),
            Some(Loc::new(30, 30))
        );
    }

    #[test]
    fn stale_enemy_sighting_is_not_a_candidate() {
        let p = planner(TargetPolicy::HuntEnemy);
        let t0 = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 3));
        o.enemy = Some(Sighting {
            loc: Loc::new(9, 9),
            seen: t0,
        });

        assert_eq!(
            p.candidate(&o, TargetCategory::Enemy, t0 + Duration::from_millis(500)),
            Some(Loc::new(9, 9))
        );
        assert_eq!(
            p.candidate(&o, TargetCategory::Enemy, t0 + Duration::from_secs(2)),
            None
        );
    }

    #[test]
    fn bounce_flips_exactly_the_stuck_axis() {
        let a = Loc::new(10, 10);
        // x stuck, y moved: mirror x.
        assert_eq!(
            bounce_direction(Direction::NorthEast, a, Loc::new(10, 20), 1),
            Direction::NorthWest
        );
        assert_eq!(
            bounce_direction(Direction::SouthEast, a, Loc::new(10, 20), 1),
            Direction::SouthWest
        );
        // y stuck, x moved: mirror y.
        assert_eq!(
            bounce_direction(Direction::NorthEast, a, Loc::new(20, 10), 1),
            Direction::SouthEast
        );
        assert_eq!(
            bounce_direction(Direction::NorthWest, a, Loc::new(20, 10), 1),
            Direction::SouthWest
        );
    }

    #[test]
    fn bounce_leaves_direction_alone_when_both_or_neither_axis_moved() {
        let a = Loc::new(10, 10);
        assert_eq!(
            bounce_direction(Direction::NorthEast, a, Loc::new(20, 20), 1),
            Direction::NorthEast
        );
        assert_eq!(
            bounce_direction(Direction::SouthWest, a, Loc::new(10, 10), 1),
            Direction::SouthWest
        );
    }

    #[test]
    fn jitter_below_the_tolerance_counts_as_stationary() {
        let a = Loc::new(10, 10);
        // dx=0 is inside the default tolerance of 1; dy=15 is movement.
        assert_eq!(
            bounce_direction(Direction::SouthEast, a, Loc::new(10, 25), 1),
            Direction::SouthWest
        );
    }

    #[test]
    fn fresh_visible_enemy_draws_facing_and_fire_on_the_shot_tick() {
        let mut p = planner(TargetPolicy::HuntEnemy);
        let now = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 3));
        o.enemy = Some(Sighting {
            loc: Loc::new(10, 0),
            seen: now,
        });

        // shot_delay_ticks = 2: ticks 1 and 2 count down, tick 3 fires.
        let t1 = p.tick(&o, now);
        assert!(!t1.contains(&Command::Fire));
        let t2 = p.tick(&o, now);
        assert!(!t2.contains(&Command::Fire));
        let t3 = p.tick(&o, now);
        assert_eq!(
            t3,
            vec![
                Command::MoveTo(Loc::new(10, 0)),
                Command::FaceDirection(Direction::East),
                Command::Fire,
            ]
        );

        // Cadence restarts: the next two ticks stay quiet.
        assert!(!p.tick(&o, now).contains(&Command::Fire));
        assert!(!p.tick(&o, now).contains(&Command::Fire));
        assert!(p.tick(&o, now).contains(&Command::Fire));
    }

    #[test]
    fn diagonal_enemy_gets_a_diagonal_facing() {
        let mut p = planner(TargetPolicy::HuntEnemy);
        let now = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 3));
        o.enemy = Some(Sighting {
            loc: Loc::new(10, 10),
            seen: now,
        });

        p.tick(&o, now);
        p.tick(&o, now);
        let intents = p.tick(&o, now);
        assert!(intents.contains(&Command::FaceDirection(Direction::SouthEast)));
    }

    #[test]
    fn no_shot_through_a_wall_even_when_fresh() {
        let mut p = planner(TargetPolicy::HuntEnemy);
        let now = Instant::now();
        let mut o = obs(player_at(0, 0, 5, 3));
        o.enemy = Some(Sighting {
            loc: Loc::new(20, 0),
            seen: now,
        });
        o.walls.insert(Loc::new(10, 0));

        p.tick(&o, now);
        p.tick(&o, now);
        let intents = p.tick(&o, now);
        assert!(!intents.contains(&Command::Fire));
        assert!(!intents
            .iter()
            .any(|c| matches!(c, Command::FaceDirection(_))));
    }

    #[test]
    fn policy_parses_from_cli_strings() {
        assert_eq!(
            "hunt-enemy".parse::<TargetPolicy>().expect("parse"),
            TargetPolicy::HuntEnemy
        );
        assert_eq!(
            "key-then-exit".parse::<TargetPolicy>().expect("parse"),
            TargetPolicy::KeyThenExit
        );
        assert!("patrol".parse::<TargetPolicy>().is_err());
    }
}

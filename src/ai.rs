use rand::Rng;
use rand::rngs::StdRng;

use crate::config::{ENEMY_FIRE_GAP_MS, TANK_MAX_POS};
use crate::debug_ai;
use crate::entities::{snap_to_lane, Tank};
use crate::field::Field;

/// Drives one enemy tank for one step: advance along the current heading as
/// far as the terrain allows, reroll the heading when blocked (or on a rare
/// whim), and report whether the tank wants to fire. Rerolls lean heavily
/// toward turning; outright reversal is the rare outcome.
pub fn drive_enemy(enemy: &mut Tank, field: &Field, rng: &mut StdRng, now: u64) -> bool {
    enemy.ready_to_move = true;
    enemy.velocity = enemy.dir.velocity(enemy.speed());

    let next = enemy.pos + enemy.velocity;
    if next.x < 0 || next.x > TANK_MAX_POS || next.y < 0 || next.y > TANK_MAX_POS {
        enemy.ready_to_move = false;
    }

    field.clamp_move(enemy);

    if enemy.ready_to_move {
        enemy.pos += enemy.velocity;
    }

    if rng.gen_range(0..=200) == 0 || !enemy.ready_to_move {
        let roll = rng.gen_range(0..=12);
        enemy.dir = if roll < 6 {
            enemy.dir.turned_left()
        } else if roll > 6 {
            enemy.dir.turned_right()
        } else {
            enemy.dir.reversed()
        };
        snap_to_lane(&mut enemy.pos);
        debug_ai!(enemy.id, "rerolled heading to {:?}", enemy.dir);
    }

    enemy.in_flight == 0 && now.saturating_sub(enemy.last_fire) >= ENEMY_FIRE_GAP_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Dir, Point, TankKind};
    use crate::level;
    use rand::SeedableRng;

    fn open_field() -> Field {
        let mut field = Field::from_level(&level::load(1).unwrap());
        field.bricks.clear();
        field.walls.clear();
        field.water.clear();
        field
    }

    #[test]
    fn test_enemy_stays_in_bounds_over_many_steps() {
        let field = open_field();
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = Tank::enemy(1, TankKind::Basic, false, Point::new(0, 0));
        enemy.dir = Dir::Down;
        for step in 0..300 {
            drive_enemy(&mut enemy, &field, &mut rng, step * 33);
            assert!(
                (0..=TANK_MAX_POS).contains(&enemy.pos.x)
                    && (0..=TANK_MAX_POS).contains(&enemy.pos.y),
                "enemy left the field at {:?} on step {}",
                enemy.pos,
                step
            );
        }
    }

    #[test]
    fn test_blocked_enemy_rerolls_heading() {
        let field = open_field();
        let mut rng = StdRng::seed_from_u64(7);
        // Facing the top edge from a lane-aligned spot: gap is the boundary
        // check, so the tank cannot move and must pick a new heading.
        let mut enemy = Tank::enemy(1, TankKind::Basic, false, Point::new(48, 0));
        enemy.dir = Dir::Up;
        drive_enemy(&mut enemy, &field, &mut rng, 0);
        assert_eq!(enemy.pos, Point::new(48, 0));
        assert_ne!(enemy.dir, Dir::Up, "blocked tank turns away");
        assert_eq!(enemy.pos.x % 24, 0);
        assert_eq!(enemy.pos.y % 24, 0);
    }

    #[test]
    fn test_fire_gate_needs_empty_rack_and_elapsed_gap() {
        let field = open_field();
        let mut rng = StdRng::seed_from_u64(3);
        let mut enemy = Tank::enemy(1, TankKind::Basic, false, Point::new(96, 96));
        enemy.last_fire = 1000;

        assert!(
            !drive_enemy(&mut enemy, &field, &mut rng, 1500),
            "gap not yet elapsed"
        );
        assert!(drive_enemy(&mut enemy, &field, &mut rng, 2200));

        enemy.in_flight = 1;
        assert!(
            !drive_enemy(&mut enemy, &field, &mut rng, 5000),
            "one bullet already on the map"
        );
    }
}

use rand::seq::index::sample;
use rand::Rng;
use tracing::{info, warn};

use crate::error::SimError;
use crate::geometry::Rect;

use super::{ActorId, Direction, World};

/// Splits the world into `tile_size` x `footprint_height` cells and returns
/// the mid-bottom of every cell whose rectangle overlaps nothing in `taken`.
pub fn open_spots(
    world: &Rect,
    tile_size: i32,
    footprint_height: i32,
    taken: &[Rect],
) -> Vec<(i32, i32)> {
    if tile_size <= 0 || footprint_height <= 0 {
        return Vec::new();
    }
    let mut spots = Vec::new();
    let mut x = world.left();
    while x <= world.right() {
        let mut y = world.top();
        while y <= world.bottom() {
            let cell = Rect::new(x, y, tile_size, footprint_height);
            if !taken.iter().any(|rect| rect.overlaps(&cell)) {
                spots.push(cell.midbottom());
            }
            y += footprint_height;
        }
        x += tile_size;
    }
    spots
}

impl World {
    /// Footprints of every obstacle and actor currently placed.
    pub fn taken_footprints(&self) -> Vec<Rect> {
        self.obstacles()
            .iter()
            .map(|obstacle| obstacle.footprint().rect())
            .chain(self.actors().iter().map(|actor| actor.footprint().rect()))
            .collect()
    }

    /// Spawns the configured number of wanderers on distinct spots sampled
    /// from `spots`. Each gets a character other than the player's, a speed
    /// from the configured range and a random facing.
    pub fn seed_population(&mut self, spots: &[(i32, i32)]) -> Result<Vec<ActorId>, SimError> {
        let population = self.config().population.clone();
        let player_character = self.config().player.character.clone();

        let mut characters: Vec<String> = self
            .characters_available()
            .filter(|name| *name != player_character)
            .map(str::to_string)
            .collect();
        if characters.is_empty() {
            characters = self.characters_available().map(str::to_string).collect();
        }
        if characters.is_empty() {
            return Err(SimError::UnknownCharacter(player_character));
        }

        let wanted = population.count;
        let count = wanted.min(spots.len());
        if count < wanted {
            warn!(wanted, available = spots.len(), "population_clamped_to_open_spots");
        }

        let picks = sample(self.rng_mut(), spots.len(), count).into_vec();
        let mut ids = Vec::with_capacity(count);
        for pick in picks {
            let rng = self.rng_mut();
            let character = characters[rng.random_range(0..characters.len())].clone();
            let speed = rng.random_range(population.speed_min..=population.speed_max);
            let facing = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
            ids.push(self.spawn_autonomous(&character, spots[pick], speed, facing)?);
        }
        info!(count = ids.len(), open_spots = spots.len(), "population_seeded");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::assets::AssetBundle;
    use crate::config::SimConfig;

    #[test]
    fn open_spots_cover_grid_inclusive_of_far_edges() {
        let world = Rect::from_size(64, 12);
        let spots = open_spots(&world, 32, 6, &[]);
        // x in {0, 32, 64}, y in {0, 6, 12}
        assert_eq!(spots.len(), 9);
        assert!(spots.contains(&(16, 6)));
        assert!(spots.contains(&(80, 18)));
    }

    #[test]
    fn open_spots_skip_taken_cells() {
        let world = Rect::from_size(64, 12);
        let taken = [Rect::new(30, 0, 4, 6)];
        let spots = open_spots(&world, 32, 6, &taken);
        assert!(!spots.contains(&(16, 6)));
        assert!(!spots.contains(&(48, 6)));
        assert!(spots.contains(&(16, 12)));
    }

    fn seeded_world(count: usize) -> World {
        let mut config = SimConfig::default();
        config.population.count = count;
        let assets = AssetBundle::placeholder(&config).expect("assets");
        let mut world = World::new(config, &assets, 3);
        world.spawn_player((256, 256)).expect("player");
        world
    }

    #[test]
    fn population_uses_distinct_spots_and_other_characters() {
        let mut world = seeded_world(20);
        let spots = open_spots(&world.bounds(), 32, 6, &world.taken_footprints());
        let ids = world.seed_population(&spots).expect("seed");
        assert_eq!(ids.len(), 20);

        let mut starts = BTreeSet::new();
        for id in ids {
            let actor = world.actor(id).expect("actor");
            assert_ne!(actor.character(), "warrior_m");
            assert!((1..=3).contains(&actor.speed()));
            assert!(!actor.is_player());
            starts.insert(actor.rect().midbottom());
        }
        assert_eq!(starts.len(), 20);
    }

    #[test]
    fn population_is_clamped_to_available_spots() {
        let mut world = seeded_world(5);
        let ids = world
            .seed_population(&[(40, 40), (100, 100)])
            .expect("seed");
        assert_eq!(ids.len(), 2);
    }
}

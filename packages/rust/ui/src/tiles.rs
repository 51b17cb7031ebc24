//! Image-tile grid for the home page.
//!
//! Nine tiles each show an image from a shared, read-only pool. Every tile
//! rotates on its own interval (drawn once, 3–6 s): it picks an image no other
//! tile is showing, cross-fades for one second, then commits. Time is fed in
//! through [`TileGrid::tick`], so the grid is a plain state machine.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use lasfera_shared::{Result, SferaError};

pub const TILE_COUNT: usize = 9;
pub const MIN_INTERVAL_MS: u64 = 3_000;
pub const MAX_INTERVAL_MS: u64 = 6_000;
pub const TRANSITION_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    current: usize,
    next: Option<usize>,
    interval_ms: u64,
    next_rotation_ms: u64,
    transition_end_ms: Option<u64>,
}

impl Tile {
    pub fn is_transitioning(&self) -> bool {
        self.next.is_some()
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

/// Something the page should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileEvent {
    TransitionStarted { tile: usize, image: String },
    Committed { tile: usize, image: String },
}

#[derive(Debug)]
pub struct TileGrid<R> {
    pool: Vec<String>,
    tiles: Vec<Tile>,
    rng: R,
}

impl<R: Rng> TileGrid<R> {
    /// Seed every tile with a random image, starting the clock at `now_ms`.
    pub fn new(pool: Vec<String>, mut rng: R, now_ms: u64) -> Result<Self> {
        if pool.is_empty() {
            return Err(SferaError::validation("image pool is empty"));
        }

        let tiles = (0..TILE_COUNT)
            .map(|_| {
                let interval_ms = rng.gen_range(MIN_INTERVAL_MS..=MAX_INTERVAL_MS);
                Tile {
                    current: rng.gen_range(0..pool.len()),
                    next: None,
                    interval_ms,
                    next_rotation_ms: now_ms + interval_ms,
                    transition_end_ms: None,
                }
            })
            .collect();

        debug!(pool = pool.len(), tiles = TILE_COUNT, "tile grid initialized");
        Ok(Self { pool, tiles, rng })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Image currently shown by `tile`.
    pub fn image(&self, tile: usize) -> Option<&str> {
        self.tiles.get(tile).map(|t| self.pool[t.current].as_str())
    }

    /// Image `tile` is fading to, if any.
    pub fn next_image(&self, tile: usize) -> Option<&str> {
        self.tiles
            .get(tile)
            .and_then(|t| t.next)
            .map(|i| self.pool[i].as_str())
    }

    /// Advance the clock to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<TileEvent> {
        let mut events = Vec::new();

        for index in 0..self.tiles.len() {
            let tile = &mut self.tiles[index];
            if let (Some(end), Some(next)) = (tile.transition_end_ms, tile.next) {
                if now_ms >= end {
                    tile.current = next;
                    tile.next = None;
                    tile.transition_end_ms = None;
                    trace!(tile = index, image = %self.pool[next], "tile transition complete");
                    events.push(TileEvent::Committed {
                        tile: index,
                        image: self.pool[next].clone(),
                    });
                }
            }

            let due = self.tiles[index].next_rotation_ms;
            if now_ms >= due {
                let next = self.pick_next(index);
                let tile = &mut self.tiles[index];
                tile.next = Some(next);
                tile.transition_end_ms = Some(due + TRANSITION_MS);
                while tile.next_rotation_ms <= now_ms {
                    tile.next_rotation_ms += tile.interval_ms;
                }
                events.push(TileEvent::TransitionStarted {
                    tile: index,
                    image: self.pool[next].clone(),
                });
            }
        }

        events
    }

    /// A pool index not shown by any other tile, or any index if none is free.
    fn pick_next(&mut self, index: usize) -> usize {
        let own = self.tiles[index].current;
        let shown: Vec<&str> = self
            .tiles
            .iter()
            .map(|t| self.pool[t.current].as_str())
            .filter(|img| *img != self.pool[own])
            .collect();

        let available: Vec<usize> = (0..self.pool.len())
            .filter(|&i| !shown.contains(&self.pool[i].as_str()))
            .collect();

        match available.choose(&mut self.rng) {
            Some(&i) => i,
            None => {
                debug!(tile = index, "no free images, using full pool");
                self.rng.gen_range(0..self.pool.len())
            }
        }
    }
}

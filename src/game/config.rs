use serde::{Deserialize, Serialize};

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Number of apples kept on the board
    pub initial_apple_count: usize,

    // Tick schedule
    /// Interval between movement steps at score 0, in milliseconds
    pub tick_interval_ms: u64,
    /// How much each eaten apple shortens the interval, in milliseconds
    pub speedup_per_apple_ms: u64,
    /// Shortest allowed interval, in milliseconds
    pub min_tick_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            initial_snake_length: 2,
            initial_apple_count: 2,
            tick_interval_ms: 500,
            speedup_per_apple_ms: 10,
            min_tick_interval_ms: 50,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(6, 6)
    }

    /// Tick interval for a given score, shrinking per apple eaten down to the floor
    pub fn tick_interval_for(&self, score: u32) -> u64 {
        self.tick_interval_ms
            .saturating_sub(score as u64 * self.speedup_per_apple_ms)
            .max(self.min_tick_interval_ms)
    }

    /// Check that the grid can hold the initial snake and apples
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_snake_length < 2 {
            return Err(format!(
                "initial_snake_length must be at least 2, got {}",
                self.initial_snake_length
            ));
        }

        if self.grid_width < self.initial_snake_length {
            return Err(format!(
                "grid_width must fit the initial snake ({}), got {}",
                self.initial_snake_length, self.grid_width
            ));
        }

        if self.grid_height < 2 {
            return Err(format!("grid_height must be at least 2, got {}", self.grid_height));
        }

        if self.initial_apple_count == 0 {
            return Err("initial_apple_count must be at least 1".to_string());
        }

        let cells = self.grid_width * self.grid_height;
        if cells <= self.initial_snake_length + self.initial_apple_count {
            return Err(format!(
                "grid of {} cells cannot hold {} snake segments and {} apples",
                cells, self.initial_snake_length, self.initial_apple_count
            ));
        }

        if self.min_tick_interval_ms == 0 || self.tick_interval_ms < self.min_tick_interval_ms {
            return Err(format!(
                "tick_interval_ms must be at least min_tick_interval_ms ({}), got {}",
                self.min_tick_interval_ms, self.tick_interval_ms
            ));
        }

        Ok(())
    }
}

use super::{
    action::{Action, Direction},
    config::GameConfig,
    state::{CollisionType, GameOutcome, GameState, Position, Snake},
};
use rand::seq::SliceRandom;

/// Information about a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// Whether the snake ate an apple this step
    pub ate_apple: bool,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the game has ended
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: rand::rngs::ThreadRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: rand::thread_rng(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let mut state = GameState::new(
            snake,
            Vec::new(),
            self.config.grid_width,
            self.config.grid_height,
        );

        for _ in 0..self.config.initial_apple_count {
            if let Some(apple) = self.spawn_apple(&state) {
                state.apples.push(apple);
            }
        }

        state
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_running() {
            return StepResult {
                terminated: true,
                info: StepInfo {
                    ate_apple: false,
                    collision: None,
                },
            };
        }

        // Update direction based on action (ignore 180-degree turns)
        match action {
            Action::Move(new_direction) => {
                if !state.snake.direction.is_opposite(new_direction) {
                    state.snake.direction = new_direction;
                }
            }
            Action::Continue => {}
        }

        // Calculate new head position
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        // Check for collisions
        if let Some(collision) = self.check_collision(state, new_head) {
            state.outcome = Some(GameOutcome::Lost(collision));
            state.steps += 1;

            return StepResult {
                terminated: true,
                info: StepInfo {
                    ate_apple: false,
                    collision: Some(collision),
                },
            };
        }

        // Move snake, growing over an eaten apple
        let eaten = state.apple_at(new_head);
        state.snake.move_snake(eaten.is_some());

        if let Some(index) = eaten {
            state.score += 1;
            state.apples.swap_remove(index);

            // Keep the apple count constant; a board with no room left is a win
            match self.spawn_apple(state) {
                Some(apple) => state.apples.push(apple),
                None => state.outcome = Some(GameOutcome::Won),
            }
        }

        state.steps += 1;

        StepResult {
            terminated: !state.is_running(),
            info: StepInfo {
                ate_apple: eaten.is_some(),
                collision: None,
            },
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        // Check wall collision
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // Check self-collision
        if state.snake.collides_with_body(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Pick a random empty cell for a new apple, or None if the board is full
    fn spawn_apple(&mut self, state: &GameState) -> Option<Position> {
        state.empty_cells().choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset() {
        let mut engine = GameEngine::new(GameConfig::default());
        let state = engine.reset();

        assert!(state.is_running());
        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.apples.len(), 2);

        for apple in &state.apples {
            assert!(!state.snake.body.contains(apple));
        }
        assert_ne!(state.apples[0], state.apples[1]);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = engine.reset();
        state.apples = vec![Position::new(0, 0), Position::new(0, 1)];
        let initial_head = state.snake.head();

        let result = engine.step(&mut state, Action::Continue);

        assert!(!result.terminated);
        assert!(!result.info.ate_apple);
        assert_eq!(state.steps, 1);
        assert_ne!(state.snake.head(), initial_head);
    }

    #[test]
    fn test_apple_consumption() {
        let mut engine = GameEngine::new(GameConfig::default());
        let mut state = engine.reset();

        // Place one apple directly in front of the snake, the other in a corner
        let head = state.snake.head();
        state.apples = vec![
            head.moved_in_direction(state.snake.direction),
            Position::new(0, 0),
        ];
        let initial_length = state.snake.len();

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.info.ate_apple);
        assert!(!result.terminated);
        assert_eq!(state.score, 1);
        assert_eq!(state.snake.len(), initial_length + 1);
        // The eaten apple is replaced
        assert_eq!(state.apples.len(), 2);
        for apple in &state.apples {
            assert!(!state.snake.body.contains(apple));
        }
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = GameEngine::new(GameConfig::default());
        let mut state = GameState::new(
            Snake::new(Position::new(0, 5), Direction::Left, 2),
            vec![Position::new(5, 5)],
            10,
            10,
        );

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert_eq!(result.info.collision, Some(CollisionType::Wall));
        assert_eq!(state.outcome, Some(GameOutcome::Lost(CollisionType::Wall)));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = GameEngine::new(GameConfig::default());

        // Snake at (5, 5) going Right with length 5
        // Body: (5,5), (4,5), (3,5), (2,5), (1,5)
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        let mut state = GameState::new(snake, vec![Position::new(8, 8)], 10, 10);

        // Right, Down, Left, then Up runs into the body at (5,5)
        engine.step(&mut state, Action::Continue);
        engine.step(&mut state, Action::Move(Direction::Down));
        engine.step(&mut state, Action::Move(Direction::Left));
        let result = engine.step(&mut state, Action::Move(Direction::Up));

        assert!(result.terminated);
        assert_eq!(result.info.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_tail_cell_counts_as_collision() {
        let mut engine = GameEngine::new(GameConfig::default());

        // Square snake whose head is one step from its own tail
        let snake = Snake {
            body: vec![
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(0, 1),
                Position::new(0, 0),
            ],
            direction: Direction::Left,
        };
        let mut state = GameState::new(snake, vec![Position::new(5, 5)], 10, 10);

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert_eq!(result.info.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_win_when_no_room_for_apple() {
        let mut engine = GameEngine::new(GameConfig::default());

        // 2x2 board: three snake-free cells, one holds the last apple
        let snake = Snake {
            body: vec![Position::new(0, 0), Position::new(0, 1)],
            direction: Direction::Right,
        };
        let mut state = GameState::new(
            snake,
            vec![Position::new(1, 0), Position::new(1, 1)],
            2,
            2,
        );

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert!(result.info.ate_apple);
        assert_eq!(state.outcome, Some(GameOutcome::Won));
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = GameEngine::new(GameConfig::default());
        let mut state = engine.reset();
        state.snake.direction = Direction::Right;
        state.apples = vec![Position::new(0, 0)];

        // Try to turn 180 degrees (should be ignored)
        engine.step(&mut state, Action::Move(Direction::Left));

        assert_eq!(state.snake.direction, Direction::Right);
    }

    #[test]
    fn test_finished_game_no_update() {
        let mut engine = GameEngine::new(GameConfig::default());
        let mut state = engine.reset();
        state.outcome = Some(GameOutcome::Lost(CollisionType::Wall));
        let steps_before = state.steps;

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert_eq!(state.steps, steps_before); // Should not increment
    }
}

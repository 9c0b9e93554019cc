use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, interval, interval_at};

use crate::game::{Action, Direction, GameConfig, GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::score::BestScoreStore;

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    score_store: BestScoreStore,
    /// False while the board waits for the first Start/steer key
    started: bool,
    should_quit: bool,
    pending_direction: Option<Direction>,
}

impl HumanMode {
    pub fn new(config: GameConfig, score_store: BestScoreStore) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();
        let metrics = GameMetrics::with_high_score(score_store.best());

        Self {
            engine,
            state,
            metrics,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            score_store,
            started: false,
            should_quit: false,
            pending_direction: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // The tick period follows the score: each apple shortens it.
        // interval_at skips the immediate first tick a fresh interval fires.
        let mut tick_period = self.current_tick_period();
        let mut tick_timer = interval_at(Instant::now() + tick_period, tick_period);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if self.started && self.state.is_running() {
                        self.update_game()?;
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics, self.started);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            // Restart the timer when an eaten apple (or a reset) changed the period
            let wanted_period = self.current_tick_period();
            if wanted_period != tick_period {
                tick_period = wanted_period;
                tick_timer = interval_at(Instant::now() + tick_period, tick_period);
            }
        }

        Ok(())
    }

    fn current_tick_period(&self) -> Duration {
        Duration::from_millis(self.engine.config().tick_interval_for(self.state.score))
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            let action = self.input_handler.handle_key_event(key);

            match action {
                KeyAction::GameAction(Action::Move(dir)) => {
                    if self.state.is_running() {
                        self.started = true;
                        self.pending_direction = Some(dir);
                    }
                }
                KeyAction::GameAction(Action::Continue) => {}
                KeyAction::Start => {
                    if self.state.is_running() {
                        self.started = true;
                    }
                }
                KeyAction::Restart => {
                    self.reset_game();
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let action = self
            .pending_direction
            .map(Action::Move)
            .unwrap_or(Action::Continue);

        self.pending_direction = None;

        let result = self.engine.step(&mut self.state, action);

        if result.terminated {
            self.on_game_finished()?;
        }

        Ok(())
    }

    fn on_game_finished(&mut self) -> Result<()> {
        self.metrics.on_game_over(self.state.score);
        self.score_store.record(self.state.score)?;
        Ok(())
    }

    fn reset_game(&mut self) {
        self.state = self.engine.reset();
        self.metrics.on_game_start();
        self.started = false;
        self.pending_direction = None;
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CollisionType, GameOutcome};
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> BestScoreStore {
        BestScoreStore::load(dir.path().join("scores.json")).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        let dir = TempDir::new().unwrap();
        let mode = HumanMode::new(GameConfig::default(), test_store(&dir));

        assert!(mode.state.is_running());
        assert!(!mode.started);
        assert_eq!(mode.state.score, 0);
    }

    #[test]
    fn test_seeds_high_score_from_store() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);
        store.record(9).unwrap();

        let mode = HumanMode::new(GameConfig::default(), store);
        assert_eq!(mode.metrics.high_score, 9);
    }

    #[test]
    fn test_game_reset() {
        let dir = TempDir::new().unwrap();
        let mut mode = HumanMode::new(GameConfig::default(), test_store(&dir));
        mode.state.score = 10;
        mode.state.outcome = Some(GameOutcome::Lost(CollisionType::Wall));
        mode.started = true;

        mode.reset_game();

        assert_eq!(mode.state.score, 0);
        assert!(mode.state.is_running());
        assert!(!mode.started);
    }

    #[test]
    fn test_finished_game_persists_best_score() {
        let dir = TempDir::new().unwrap();
        let mut mode = HumanMode::new(GameConfig::default(), test_store(&dir));
        mode.state.score = 5;
        mode.state.outcome = Some(GameOutcome::Lost(CollisionType::SelfCollision));

        mode.on_game_finished().unwrap();

        assert_eq!(mode.metrics.high_score, 5);
        assert_eq!(mode.metrics.games_played, 1);
        assert_eq!(mode.score_store.best(), 5);
    }

    #[test]
    fn test_tick_period_follows_score() {
        let dir = TempDir::new().unwrap();
        let mut mode = HumanMode::new(GameConfig::default(), test_store(&dir));

        assert_eq!(mode.current_tick_period(), Duration::from_millis(500));
        mode.state.score = 3;
        assert_eq!(mode.current_tick_period(), Duration::from_millis(470));
    }
}

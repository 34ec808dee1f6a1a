// state.rs - Run state: the economy counters, the countdown and the
// Playing -> Won / Lost state machine.

/// Where the run is at. Won and Lost are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Playing
    }
}

/// Mutable state of one run. Only the simulation step writes to it.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub wood_count: u32,
    pub money: f32,
    /// Seconds left until the base accepts the next log.
    pub base_convert_timer: f32,
    pub time_left: f32,
    pub status: GameStatus,
    /// Flips on the first joystick press. The clock does not run before that.
    pub started: bool,
    /// Guards the win/lose sound and overlay so they fire once.
    pub result_handled: bool,
}

impl GameState {
    pub fn new(game_time: f32) -> Self {
        GameState {
            wood_count: 0,
            money: 0.0,
            base_convert_timer: 0.0,
            time_left: game_time.max(0.0),
            status: GameStatus::Playing,
            started: false,
            result_handled: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Counts the sell cooldown down, floored at zero.
    pub fn tick_cooldown(&mut self, delta: f32) {
        self.base_convert_timer = (self.base_convert_timer - delta).max(0.0);
    }

    /// Counts the clock down while the run is live.
    pub fn tick_clock(&mut self, delta: f32) {
        if self.is_playing() && self.started {
            self.time_left = (self.time_left - delta).max(0.0);
        }
    }

    /// Money is checked before time, so reaching the goal on the frame the
    /// clock hits zero is still a win.
    pub fn evaluate(&mut self, money_goal: f32) -> GameStatus {
        if !self.is_playing() {
            return self.status;
        }

        if self.money >= money_goal {
            self.status = GameStatus::Won;
        } else if self.time_left <= 0.0 {
            self.status = GameStatus::Lost;
        }
        self.status
    }

    /// Returns the terminal status the first time it is asked after the run
    /// ended, and None on every call after that.
    pub fn take_unhandled_result(&mut self) -> Option<GameStatus> {
        if !self.status.is_over() || self.result_handled {
            return None;
        }
        self.result_handled = true;
        Some(self.status)
    }
}

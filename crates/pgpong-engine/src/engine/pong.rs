
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    EpisodeFinishedError,
    core::{Action, Frame, Rgb},
    engine::environment::{Environment, StepInfo, StepOutcome},
};

/// Height of every rendered frame in pixels.
pub const FRAME_HEIGHT: usize = 210;
/// Width of every rendered frame in pixels.
pub const FRAME_WIDTH: usize = 160;
/// First row of the playing field (the score area and top wall lie above it).
pub const FIELD_TOP: usize = 34;
/// One past the last row of the playing field.
pub const FIELD_BOTTOM: usize = 194;

const WALL_THICKNESS: usize = 10;
const PADDLE_WIDTH: usize = 4;
const AGENT_COL: usize = 140;
const OPPONENT_COL: usize = 16;
const BALL_WIDTH: usize = 2;
const BALL_HEIGHT: usize = 4;

const BACKGROUND: Rgb = [144, 72, 17];
const WALL: Rgb = [236, 236, 236];
const BALL: Rgb = [236, 236, 236];
const AGENT: Rgb = [92, 186, 92];
const OPPONENT: Rgb = [213, 130, 74];

/// Tunable rules of the paddle game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PongConfig {
    /// The episode ends when either side reaches this many points.
    pub points_to_win: u32,
    /// Paddle height in pixels.
    pub paddle_height: f64,
    /// Pixels the agent's paddle moves per step.
    pub paddle_speed: f64,
    /// Maximum pixels the scripted opponent moves per step.
    pub opponent_speed: f64,
    /// Horizontal ball speed in pixels per step.
    pub ball_speed: f64,
    /// Vertical ball speed after hitting the very edge of a paddle.
    pub max_deflection: f64,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            points_to_win: 21,
            paddle_height: 16.0,
            paddle_speed: 4.0,
            opponent_speed: 2.0,
            ball_speed: 3.0,
            max_deflection: 3.0,
        }
    }
}

/// A two-paddle game rendered as 210×160 RGB frames.
///
/// The agent controls the right paddle. The left paddle follows the ball at a limited speed.
/// Points are reported as step rewards: `+1.0` when the ball gets past the opponent and `-1.0`
/// when it gets past the agent.
///
/// # Example
///
/// ```
/// use pgpong_engine::{Action, Environment, PongConfig, PongEnvironment};
///
/// let mut env = PongEnvironment::with_seed(PongConfig::default(), 42);
/// let frame = env.reset().unwrap();
/// assert_eq!((frame.height(), frame.width()), (210, 160));
///
/// let outcome = env.step(Action::Up).unwrap();
/// assert_eq!(outcome.reward, 0.0);
/// assert!(!outcome.done);
/// ```
#[derive(Debug, Clone)]
pub struct PongEnvironment {
    config: PongConfig,
    rng: Pcg32,
    agent_top: f64,
    opponent_top: f64,
    ball_x: f64,
    ball_y: f64,
    ball_vx: f64,
    ball_vy: f64,
    info: StepInfo,
    done: bool,
}

impl PongEnvironment {
    /// Creates an environment seeded from the thread-local generator.
    #[must_use]
    pub fn new(config: PongConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Creates an environment whose serves are fully determined by `seed`.
    #[must_use]
    pub fn with_seed(config: PongConfig, seed: u64) -> Self {
        let mut env = Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            agent_top: 0.0,
            opponent_top: 0.0,
            ball_x: 0.0,
            ball_y: 0.0,
            ball_vx: 0.0,
            ball_vy: 0.0,
            info: StepInfo::default(),
            done: false,
        };
        env.restart();
        env
    }

    #[must_use]
    pub fn config(&self) -> &PongConfig {
        &self.config
    }

    /// Top row of the agent's paddle.
    #[must_use]
    pub fn agent_paddle_top(&self) -> f64 {
        self.agent_top
    }

    #[must_use]
    pub fn info(&self) -> StepInfo {
        self.info
    }

    fn restart(&mut self) {
        let center = f64::midpoint(field_top(), field_bottom()) - self.config.paddle_height / 2.0;
        self.agent_top = center;
        self.opponent_top = center;
        self.info = StepInfo::default();
        self.done = false;
        self.serve();
    }

    fn serve(&mut self) {
        #[expect(clippy::cast_precision_loss)]
        let center_x = (FRAME_WIDTH / 2 - BALL_WIDTH / 2) as f64;
        let offset = self.rng.random_range(-40.0..=40.0);
        self.ball_x = center_x;
        self.ball_y = f64::midpoint(field_top(), field_bottom()) + offset;
        self.ball_vx = if self.rng.random_bool(0.5) {
            self.config.ball_speed
        } else {
            -self.config.ball_speed
        };
        self.ball_vy = self.rng.random_range(-1.5..=1.5);
    }

    fn clamp_paddle(&self, top: f64) -> f64 {
        top.clamp(field_top(), field_bottom() - self.config.paddle_height)
    }

    fn overlaps_paddle(&self, paddle_top: f64) -> bool {
        self.ball_y + ball_height() > paddle_top
            && self.ball_y < paddle_top + self.config.paddle_height
    }

    fn deflection(&self, paddle_top: f64) -> f64 {
        let half = self.config.paddle_height / 2.0;
        let offset = (self.ball_y + ball_height() / 2.0 - (paddle_top + half)) / half;
        offset.clamp(-1.0, 1.0) * self.config.max_deflection
    }

    fn move_ball(&mut self) {
        self.ball_x += self.ball_vx;
        self.ball_y += self.ball_vy;

        if self.ball_y < field_top() {
            self.ball_y = 2.0 * field_top() - self.ball_y;
            self.ball_vy = -self.ball_vy;
        }
        let lowest = field_bottom() - ball_height();
        if self.ball_y > lowest {
            self.ball_y = 2.0 * lowest - self.ball_y;
            self.ball_vy = -self.ball_vy;
        }

        #[expect(clippy::cast_precision_loss)]
        let (agent_col, opponent_col, paddle_width, ball_width) = (
            AGENT_COL as f64,
            OPPONENT_COL as f64,
            PADDLE_WIDTH as f64,
            BALL_WIDTH as f64,
        );
        if self.ball_vx > 0.0
            && self.ball_x + ball_width >= agent_col
            && self.ball_x <= agent_col + paddle_width
            && self.overlaps_paddle(self.agent_top)
        {
            self.ball_x = agent_col - ball_width;
            self.ball_vx = -self.ball_vx;
            self.ball_vy = self.deflection(self.agent_top);
        } else if self.ball_vx < 0.0
            && self.ball_x <= opponent_col + paddle_width
            && self.ball_x + ball_width >= opponent_col
            && self.overlaps_paddle(self.opponent_top)
        {
            self.ball_x = opponent_col + paddle_width;
            self.ball_vx = -self.ball_vx;
            self.ball_vy = self.deflection(self.opponent_top);
        }
    }

    /// Returns the point outcome of the current ball position, if any.
    fn score_point(&mut self) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let (frame_width, ball_width) = (FRAME_WIDTH as f64, BALL_WIDTH as f64);
        let reward = if self.ball_x > frame_width {
            self.info.opponent_score += 1;
            -1.0
        } else if self.ball_x + ball_width < 0.0 {
            self.info.agent_score += 1;
            1.0
        } else {
            return 0.0;
        };
        self.serve();
        reward
    }

    /// Draws the current state.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_frame(&self) -> Frame {
        let mut frame = Frame::filled(FRAME_HEIGHT, FRAME_WIDTH, BACKGROUND);
        frame.fill_rect(
            FIELD_TOP - WALL_THICKNESS,
            0,
            WALL_THICKNESS,
            FRAME_WIDTH,
            WALL,
        );
        frame.fill_rect(FIELD_BOTTOM, 0, WALL_THICKNESS, FRAME_WIDTH, WALL);

        let paddle_height = self.config.paddle_height.round() as usize;
        frame.fill_rect(
            self.opponent_top.round() as usize,
            OPPONENT_COL,
            paddle_height,
            PADDLE_WIDTH,
            OPPONENT,
        );
        frame.fill_rect(
            self.agent_top.round() as usize,
            AGENT_COL,
            paddle_height,
            PADDLE_WIDTH,
            AGENT,
        );

        let ball_col = self.ball_x.round();
        #[expect(clippy::cast_precision_loss)]
        let visible = ball_col >= 0.0 && ball_col < FRAME_WIDTH as f64;
        if visible {
            frame.fill_rect(
                self.ball_y.round() as usize,
                ball_col as usize,
                BALL_HEIGHT,
                BALL_WIDTH,
                BALL,
            );
        }
        frame
    }

    /// Draws the playing field as text, one character per 4×2 pixel block.
    #[must_use]
    pub fn render_text(&self) -> String {
        let frame = self.render_frame();
        let mut text = format!(
            "opponent {:2} - {:2} agent (step {})\n",
            self.info.opponent_score, self.info.agent_score, self.info.frame_number
        );
        for row in (FIELD_TOP..FIELD_BOTTOM).step_by(4) {
            for col in (0..FRAME_WIDTH).step_by(2) {
                let block = (row..row + 4)
                    .flat_map(|r| (col..col + 2).map(move |c| (r, c)))
                    .map(|(r, c)| frame.pixel(r, c))
                    .find(|&color| color != BACKGROUND);
                text.push(match block {
                    Some(AGENT | OPPONENT) => '|',
                    Some(_) => 'o',
                    None => ' ',
                });
            }
            text.push('\n');
        }
        text
    }
}

impl Environment for PongEnvironment {
    type Error = EpisodeFinishedError;

    fn reset(&mut self) -> Result<Frame, Self::Error> {
        self.restart();
        Ok(self.render_frame())
    }

    fn step(&mut self, action: Action) -> Result<StepOutcome, Self::Error> {
        if self.done {
            return Err(EpisodeFinishedError);
        }

        self.agent_top =
            self.clamp_paddle(self.agent_top + action.direction() * self.config.paddle_speed);

        let target = self.ball_y + ball_height() / 2.0 - self.config.paddle_height / 2.0;
        let chase = (target - self.opponent_top)
            .clamp(-self.config.opponent_speed, self.config.opponent_speed);
        self.opponent_top = self.clamp_paddle(self.opponent_top + chase);

        self.move_ball();
        let reward = self.score_point();

        self.info.frame_number += 1;
        let limit = self.config.points_to_win;
        self.done = self.info.agent_score >= limit || self.info.opponent_score >= limit;

        Ok(StepOutcome {
            observation: self.render_frame(),
            reward,
            done: self.done,
            info: self.info,
        })
    }

    fn render(&mut self) {
        eprint!("{}", self.render_text());
    }
}

#[expect(clippy::cast_precision_loss)]
fn field_top() -> f64 {
    FIELD_TOP as f64
}

#[expect(clippy::cast_precision_loss)]
fn field_bottom() -> f64 {
    FIELD_BOTTOM as f64
}

#[expect(clippy::cast_precision_loss)]
fn ball_height() -> f64 {
    BALL_HEIGHT as f64
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::environment::{Environment, StepResult};
use crate::error::{GameError, Result};
use crate::geometry::Rect;

/// [player_lane, enemy_lane, enemy_y / screen_height]
pub type Observation = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Right,
}

impl Lane {
    fn random(rng: &mut impl Rng) -> Self {
        if rng.random_range(0..2) == 0 {
            Lane::Left
        } else {
            Lane::Right
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left = 0,
    Stay = 1,
    Right = 2,
}

impl TryFrom<i64> for Action {
    type Error = GameError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Action::Left),
            1 => Ok(Action::Stay),
            2 => Ok(Action::Right),
            other => Err(GameError::InvalidAction(other)),
        }
    }
}

impl From<Action> for i64 {
    fn from(action: Action) -> Self {
        action as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub score: u32,
    pub level: u32,
}

/// The mutable world snapshot. Everything else about the game is fixed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub speed: f32,
    pub score: u32,
    pub level: u32,
    pub line_offset: f32,
    pub player_car: Rect,
    pub enemy_car: Rect,
    pub player_lane: Lane,
    pub enemy_lane: Lane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Uninitialized,
    Active,
    Terminated,
}

/// Road layout derived once from the screen size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadGeometry {
    pub screen_width: f32,
    pub screen_height: f32,
    pub road_width: f32,
    pub roadmark_width: f32,
    pub left_lane_x: f32,
    pub right_lane_x: f32,
}

impl RoadGeometry {
    pub fn from_config(config: &GameConfig) -> Self {
        let road_width = (config.screen_width / 1.6).floor();
        let center = config.screen_width / 2.0;
        Self {
            screen_width: config.screen_width,
            screen_height: config.screen_height,
            road_width,
            roadmark_width: (config.screen_width / 80.0).floor(),
            left_lane_x: center - road_width / 4.0,
            right_lane_x: center + road_width / 4.0,
        }
    }

    pub fn lane_x(&self, lane: Lane) -> f32 {
        match lane {
            Lane::Left => self.left_lane_x,
            Lane::Right => self.right_lane_x,
        }
    }

    /// Vertical distance between two centre dashes.
    pub fn dash_gap(&self) -> f32 {
        self.screen_height / 10.0
    }

    pub fn dash_height(&self) -> f32 {
        self.screen_height / 20.0
    }
}

/// Read-only frame description for an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderView {
    pub road: Rect,
    pub edge_lines: [Rect; 2],
    pub dashes: Vec<Rect>,
    pub player_car: Rect,
    pub enemy_car: Rect,
    pub score: u32,
    pub level: u32,
}

/// 双车道躲避游戏: 玩家车在两条车道之间切换, 躲避迎面驶来的车辆
pub struct CarGame {
    config: GameConfig,
    geometry: RoadGeometry,
    rng: StdRng,
    state: Option<EnvironmentState>,
    status: Status,
}

impl CarGame {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let geometry = RoadGeometry::from_config(&config);
        Ok(Self {
            config,
            geometry,
            rng,
            state: None,
            status: Status::Uninitialized,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn geometry(&self) -> &RoadGeometry {
        &self.geometry
    }

    pub fn state(&self) -> Option<&EnvironmentState> {
        self.state.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The state `reset()` would produce for the given lane draw.
    pub fn initial_state(&self, player_lane: Lane, enemy_lane: Lane) -> EnvironmentState {
        let player = self.config.player_car;
        let enemy = self.config.enemy_car;
        let player_y = self.config.screen_height * self.config.player_y_fraction;
        EnvironmentState {
            speed: self.config.initial_speed,
            score: 0,
            level: 0,
            line_offset: 0.0,
            player_car: Rect::from_center(
                self.geometry.lane_x(player_lane),
                player_y,
                player.width,
                player.height,
            ),
            enemy_car: self.spawn_enemy(enemy_lane),
            player_lane,
            enemy_lane,
        }
    }

    /// 敌车完全位于屏幕上方
    fn spawn_enemy(&self, lane: Lane) -> Rect {
        let enemy = self.config.enemy_car;
        let mut rect = Rect::new(0.0, -enemy.height, enemy.width, enemy.height);
        rect.set_center_x(self.geometry.lane_x(lane));
        rect
    }

    pub fn reset_with_seed(&mut self, seed: u64) -> Observation {
        self.rng = StdRng::seed_from_u64(seed);
        self.reset()
    }

    /// Installs an explicit world snapshot and makes the episode active.
    pub fn restore(&mut self, state: EnvironmentState) -> Result<Observation> {
        if state.level > state.score {
            return Err(GameError::Configuration(format!(
                "level {} cannot exceed score {}",
                state.level, state.score
            )));
        }
        self.check_on_lane("player", &state.player_car, state.player_lane)?;
        self.check_on_lane("enemy", &state.enemy_car, state.enemy_lane)?;
        self.state = Some(state);
        self.status = Status::Active;
        self.observation()
    }

    fn check_on_lane(&self, car: &str, rect: &Rect, lane: Lane) -> Result<()> {
        let expected_x = self.geometry.lane_x(lane) - rect.width / 2.0;
        if rect.x != expected_x {
            return Err(GameError::Configuration(format!(
                "{car} car x {} is not centred on the {lane:?} lane",
                rect.x
            )));
        }
        Ok(())
    }

    fn observation(&self) -> Result<Observation> {
        let state = self
            .state
            .as_ref()
            .ok_or(GameError::Precondition("environment has not been reset"))?;
        Ok(Self::encode(state, &self.geometry))
    }

    /// 车道观测由车辆中心 x 与左车道 x 比较得出
    fn encode(state: &EnvironmentState, geometry: &RoadGeometry) -> Observation {
        let lane_obs = |rect: &Rect| {
            if rect.center_x() == geometry.left_lane_x {
                0.0
            } else {
                1.0
            }
        };
        [
            lane_obs(&state.player_car),
            lane_obs(&state.enemy_car),
            state.enemy_car.center_y() / geometry.screen_height,
        ]
    }

    pub fn step(&mut self, action: &Action) -> Result<StepResult<Observation, f32, StepInfo>> {
        match self.status {
            Status::Uninitialized => {
                return Err(GameError::Precondition("step() called before reset()"));
            }
            Status::Terminated => {
                return Err(GameError::Precondition(
                    "step() called after the episode terminated; call reset() first",
                ));
            }
            Status::Active => {}
        }
        let Some(mut state) = self.state.take() else {
            return Err(GameError::Precondition("environment has not been reset"));
        };

        let rewards = self.config.rewards;
        let mut reward = 0.0;

        // 1. 换道: 只有真正改变车道时才生效
        let target = match (action, state.player_lane) {
            (Action::Left, Lane::Right) => Some(Lane::Left),
            (Action::Right, Lane::Left) => Some(Lane::Right),
            _ => None,
        };
        if let Some(lane) = target {
            state.player_lane = lane;
            state.player_car.set_center_x(self.geometry.lane_x(lane));
            reward += rewards.lane_change;
            tracing::debug!(?lane, "lane change");
        }

        // 2. 敌车前进
        state.enemy_car.y += state.speed;

        // 3. Fires on every step while level < score, so level catches up one per step.
        if state.score > 0
            && state.score % self.config.level_interval == 0
            && state.level < state.score
        {
            state.speed += self.config.speed_increment;
            state.level += 1;
            tracing::debug!(level = state.level, speed = state.speed, "level up");
        }

        // 4. 敌车驶出屏幕底部即为成功躲避
        if state.enemy_car.top() > self.geometry.screen_height {
            reward += rewards.successful_dodge;
            state.score += 1;
            let lane = Lane::random(&mut self.rng);
            state.enemy_lane = lane;
            state.enemy_car = self.spawn_enemy(lane);
            tracing::debug!(score = state.score, "dodged");
        }

        // 5-6. 碰撞检测
        let terminated = state.player_car.collides_with(&state.enemy_car);
        if terminated {
            reward += rewards.crash;
            self.status = Status::Terminated;
            tracing::debug!(score = state.score, "crashed");
        } else {
            reward += rewards.alive_per_step;
        }

        let next_state = Self::encode(&state, &self.geometry);
        let info = StepInfo {
            score: state.score,
            level: state.level,
        };
        self.state = Some(state);

        Ok(StepResult {
            next_state,
            reward,
            terminated,
            truncated: false,
            info,
        })
    }

    /// Scrolls the centre dashes by the current speed; called once per rendered frame.
    pub fn advance_road_markings(&mut self) -> Option<f32> {
        let gap = self.geometry.dash_gap();
        let state = self.state.as_mut()?;
        state.line_offset = (state.line_offset + state.speed) % gap;
        Some(state.line_offset)
    }

    pub fn render_view(&self) -> Option<RenderView> {
        let state = self.state.as_ref()?;
        let g = &self.geometry;
        let road_left = g.screen_width / 2.0 - g.road_width / 2.0;

        let gap = g.dash_gap();
        let dash_x = g.screen_width / 2.0 - g.roadmark_width / 2.0;
        let mut dashes = Vec::new();
        let mut y = -gap;
        while y < g.screen_height {
            dashes.push(Rect::new(
                dash_x,
                y + state.line_offset,
                g.roadmark_width,
                g.dash_height(),
            ));
            y += gap;
        }

        Some(RenderView {
            road: Rect::new(road_left, 0.0, g.road_width, g.screen_height),
            edge_lines: [
                Rect::new(
                    road_left + g.roadmark_width * 2.0,
                    0.0,
                    g.roadmark_width,
                    g.screen_height,
                ),
                Rect::new(
                    g.screen_width / 2.0 + g.road_width / 2.0 - g.roadmark_width * 3.0,
                    0.0,
                    g.roadmark_width,
                    g.screen_height,
                ),
            ],
            dashes,
            player_car: state.player_car,
            enemy_car: state.enemy_car,
            score: state.score,
            level: state.level,
        })
    }
}

impl Environment for CarGame {
    type State = Observation;
    type Action = Action; // 0: left, 1: stay, 2: right
    type Reward = f32;
    type Info = StepInfo;

    fn reset(&mut self) -> Self::State {
        let player_lane = Lane::random(&mut self.rng);
        let enemy_lane = Lane::random(&mut self.rng);
        let state = self.initial_state(player_lane, enemy_lane);
        let obs = Self::encode(&state, &self.geometry);
        tracing::debug!(?player_lane, ?enemy_lane, "reset");
        self.state = Some(state);
        self.status = Status::Active;
        obs
    }

    fn step(&mut self, action: &Self::Action) -> Result<StepResult<Self::State, Self::Reward, Self::Info>> {
        self.step(action)
    }

    fn current_state(&self) -> Option<Self::State> {
        self.state
            .as_ref()
            .map(|state| Self::encode(state, &self.geometry))
    }

    fn action_space(&self) -> usize {
        3 // 0: left, 1: stay, 2: right
    }

    fn state_dim(&self) -> usize {
        3 // [player_lane, enemy_lane, enemy_y_norm]
    }
}

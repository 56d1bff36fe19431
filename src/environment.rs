use crate::error::Result;

pub struct StepResult<S, R, I> {
    pub next_state: S,
    pub reward: R,
    pub terminated: bool,
    /// 本环境从不截断, 保留给外部时间限制包装
    pub truncated: bool,
    pub info: I,
}

impl<S, R, I> StepResult<S, R, I> {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

pub trait Environment {
    type State;
    type Action;
    type Reward: Copy + Into<f32>;
    type Info: Clone;

    fn reset(&mut self) -> Self::State;
    fn step(&mut self, action: &Self::Action) -> Result<StepResult<Self::State, Self::Reward, Self::Info>>;

    /// 获取当前状态, 尚未 reset 时为 None
    fn current_state(&self) -> Option<Self::State>;

    /// 动作空间维度
    fn action_space(&self) -> usize;

    /// 状态空间维度
    fn state_dim(&self) -> usize;
}

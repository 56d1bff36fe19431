use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::environment::Environment;
use crate::error::Result;
use crate::normalizer::ObservationNormalizer;
use crate::policy::Policy;

pub trait Agent<E: Environment> {
    // 运行多局并返回每局结果, plot 给出时保存奖励曲线
    fn play(
        &mut self,
        env: &mut E,
        num_episodes: usize,
        plot: Option<&Path>,
    ) -> Result<Vec<EpisodeSummary<E::Info>>>;

    // 运行一局
    fn play_episode(&mut self, env: &mut E) -> Result<EpisodeSummary<E::Info>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    Terminated,
    Truncated,
    /// The stop handle was cleared between steps.
    Stopped,
    StepLimit,
}

#[derive(Debug, Clone)]
pub struct EpisodeSummary<I> {
    pub steps: usize,
    pub total_reward: f32,
    pub final_info: Option<I>,
    pub outcome: EpisodeOutcome,
}

/// Shared "game active" flag. Clearing it halts the driver before its next step.
#[derive(Debug, Clone)]
pub struct StopHandle {
    active: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives an environment with a fixed policy: normalize, infer, step.
///
/// Normalization is optional; without statistics the raw observation goes
/// straight to the policy.
pub struct PolicyAgent<P> {
    policy: P,
    normalizer: Option<ObservationNormalizer>,
    max_steps: Option<usize>,
    stop: StopHandle,
}

impl<P> PolicyAgent<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            normalizer: None,
            max_steps: None,
            stop: StopHandle::new(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ObservationNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }
}

impl<E, P> Agent<E> for PolicyAgent<P>
where
    E: Environment,
    E::State: AsRef<[f32]>,
    E::Info: std::fmt::Debug,
    P: Policy<[f32], E::Action>,
{
    fn play(
        &mut self,
        env: &mut E,
        num_episodes: usize,
        plot: Option<&Path>,
    ) -> Result<Vec<EpisodeSummary<E::Info>>> {
        let mut summaries = Vec::with_capacity(num_episodes);

        for episode in 0..num_episodes {
            if !self.stop.is_active() {
                tracing::warn!(episode, "run stopped before episode start");
                break;
            }
            let summary = self.play_episode(env)?;
            tracing::info!(
                episode = episode + 1,
                steps = summary.steps,
                reward = summary.total_reward,
                outcome = ?summary.outcome,
                info = ?summary.final_info,
                "episode finished"
            );
            summaries.push(summary);
        }

        if let Some(path) = plot {
            let rewards: Vec<f32> = summaries.iter().map(|s| s.total_reward).collect();
            crate::utils::plot_rewards(&rewards, path, "Episode Reward")?;
        }
        Ok(summaries)
    }

    fn play_episode(&mut self, env: &mut E) -> Result<EpisodeSummary<E::Info>> {
        let mut state = env.reset();
        let mut total_reward = 0.0_f32;
        let mut steps = 0;
        let mut final_info = None;

        let outcome = loop {
            if !self.stop.is_active() {
                tracing::warn!(steps, "episode stopped");
                break EpisodeOutcome::Stopped;
            }
            if self.max_steps.is_some_and(|limit| steps >= limit) {
                tracing::warn!(steps, "episode hit the step limit");
                break EpisodeOutcome::StepLimit;
            }

            let action = match &self.normalizer {
                Some(normalizer) => {
                    let obs = normalizer.normalize(state.as_ref())?;
                    self.policy.select_action(obs.as_slice())?
                }
                None => self.policy.select_action(state.as_ref())?,
            };

            let step_result = env.step(&action)?;
            steps += 1;
            let reward: f32 = step_result.reward.into();
            total_reward += reward;
            final_info = Some(step_result.info.clone());

            if step_result.terminated {
                break EpisodeOutcome::Terminated;
            }
            if step_result.truncated {
                break EpisodeOutcome::Truncated;
            }
            state = step_result.next_state;
        };

        Ok(EpisodeSummary {
            steps,
            total_reward,
            final_info,
            outcome,
        })
    }
}

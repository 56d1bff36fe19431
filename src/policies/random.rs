use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::environments::car_game::Action;
use crate::error::Result;
use crate::policy::Policy;

/// 均匀随机策略, 用作基线
pub struct RandomPolicy {
    rng: RefCell<StdRng>,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> Policy<S, Action> for RandomPolicy {
    fn select_action(&self, _state: &S) -> Result<Action> {
        let code: i64 = self.rng.borrow_mut().random_range(0..3);
        Action::try_from(code)
    }
}

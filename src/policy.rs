use crate::error::Result;

pub trait Policy<S: ?Sized, A> {
    // 根据状态选择动作
    fn select_action(&self, state: &S) -> Result<A>;
}

impl<S: ?Sized, A, P: Policy<S, A> + ?Sized> Policy<S, A> for Box<P> {
    fn select_action(&self, state: &S) -> Result<A> {
        (**self).select_action(state)
    }
}

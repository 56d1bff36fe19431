use std::path::Path;

use tch::{CModule, Device, Kind, Tensor};

use crate::environments::car_game::Action;
use crate::error::{GameError, Result};
use crate::policy::Policy;
use crate::utils::ToTensor;

/// Runs an exported TorchScript actor network.
///
/// The module takes a `[1, obs_dim]` float tensor. Exports that already end in
/// an argmax return an integer action index; otherwise the output is treated as
/// action logits.
pub struct TorchScriptPolicy {
    module: CModule,
    device: Device,
}

impl TorchScriptPolicy {
    pub fn load(path: impl AsRef<Path>, device: Device) -> Result<Self> {
        let path = path.as_ref();
        let mut module = CModule::load_on_device(path, device)
            .map_err(|e| GameError::Policy(format!("cannot load {}: {e}", path.display())))?;
        module.set_eval();
        tracing::info!(path = %path.display(), ?device, "loaded TorchScript policy");
        Ok(Self { module, device })
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl Policy<[f32], Action> for TorchScriptPolicy {
    fn select_action(&self, state: &[f32]) -> Result<Action> {
        let input = state.to_tensor().to(self.device); // 添加 batch 维度
        let output: Tensor = tch::no_grad(|| self.module.forward_ts(&[input]))
            .map_err(|e| GameError::Policy(e.to_string()))?;

        action_from_output(&output)
    }
}

/// 整数输出视为动作编号, 浮点输出视为 logits 取 argmax
fn action_from_output(output: &Tensor) -> Result<Action> {
    let code = match output.kind() {
        Kind::Int64 | Kind::Int | Kind::Int16 | Kind::Int8 | Kind::Uint8 => {
            output.flatten(0, -1).f_int64_value(&[0])
        }
        _ => output.argmax(-1, false).flatten(0, -1).f_int64_value(&[0]),
    }
    .map_err(|e| GameError::Policy(e.to_string()))?;
    Action::try_from(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_output_is_an_action_code() {
        let output = Tensor::from_slice(&[2i64]);
        assert_eq!(action_from_output(&output).unwrap(), Action::Right);
    }

    #[test]
    fn float_output_takes_argmax() {
        let output = Tensor::from_slice(&[0.1f32, 0.7, 0.2]).unsqueeze(0);
        assert_eq!(action_from_output(&output).unwrap(), Action::Stay);
    }

    #[test]
    fn empty_output_is_a_policy_error() {
        let output = Tensor::from_slice::<i64>(&[]);
        assert!(matches!(action_from_output(&output), Err(GameError::Policy(_))));
    }
}

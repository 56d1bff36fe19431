use std::path::Path;

use crate::error::{GameError, Result};

#[cfg(feature = "torch")]
use tch::Tensor;

#[cfg(feature = "torch")]
pub trait ToTensor {
    fn to_tensor(&self) -> Tensor;
}

#[cfg(feature = "torch")]
impl ToTensor for [f32] {
    fn to_tensor(&self) -> Tensor {
        Tensor::from_slice(self).unsqueeze(0)
    }
}

#[cfg(feature = "torch")]
impl ToTensor for [f32; 3] {
    fn to_tensor(&self) -> Tensor {
        self.as_slice().to_tensor()
    }
}

fn plot_err(e: impl std::fmt::Display) -> GameError {
    GameError::Plot(e.to_string())
}

/// 画出每局总奖励曲线并保存为 PNG
pub fn plot_rewards(rewards: &[f32], filename: &Path, title: &str) -> Result<()> {
    use plotters::prelude::*;

    let root = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    // 奖励可能为负 (撞车惩罚), 纵轴同时覆盖上下界
    let max_reward = rewards.iter().cloned().fold(f32::MIN, f32::max).max(1.0);
    let min_reward = rewards.iter().cloned().fold(f32::MAX, f32::min).min(0.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 32).into_font())
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..rewards.len().max(1), min_reward..max_reward)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Episode")
        .y_desc("Total Reward")
        .light_line_style(WHITE.mix(0.3))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            rewards.iter().enumerate().map(|(i, r)| (i, *r)),
            &BLUE,
        ))
        .map_err(plot_err)?
        .label("Reward")
        .legend(|(x, y)| PathElement::new([(x, y), (x + 20, y)], BLUE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::info!(path = %filename.display(), "saved reward plot");
    Ok(())
}

//! 随机抖动裁剪.

use ndarray::Dimension;
use rand::Rng;

use super::extract_block_with_window;
use crate::{AnnotatedVolume, AugmentResult};

/// 计算抖动范围.
///
/// 先将物理半径换算为各轴的索引半径 `round(radius / spacing)`, 取最大值作为各向同性的保守估计,
/// 然后得到 `high = block / 2 - index_radius - margin`.
///
/// 返回 `(index_radius, high)`. `high` 可能为负, 由调用方决定如何处理.
pub fn jitter_bound(radius: f64, spacing: &[f64], block: usize, margin: usize) -> (i64, i64) {
    let index_radius = spacing
        .iter()
        .map(|s| (radius / s).round() as i64)
        .max()
        .unwrap_or(0);
    let high = (block / 2) as i64 - index_radius - margin as i64;
    (index_radius, high)
}

/// 一次抖动裁剪的诊断信息.
///
/// 当目标物体的索引半径与边距之和超过立方块边长的一半时, 抖动范围退化为 0
/// (`clamped == true`), 此时目标物体可能被裁掉一部分.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JitterOutcome {
    index_radius: i64,
    high: i64,
    clamped: bool,
    shift: Vec<i64>,
    window_start: Vec<i64>,
}

impl JitterOutcome {
    /// 目标物体的各向同性索引半径.
    #[inline]
    pub fn index_radius(&self) -> i64 {
        self.index_radius
    }

    /// 实际使用的抖动范围 `[-high, high)`. 总是非负.
    #[inline]
    pub fn high(&self) -> i64 {
        self.high
    }

    /// 抖动范围是否因为 `high < 0` 被强制置为 0?
    #[inline]
    pub fn is_clamped(&self) -> bool {
        self.clamped
    }

    /// 各轴的随机平移量.
    #[inline]
    pub fn shift(&self) -> &[i64] {
        &self.shift
    }

    /// 裁剪窗口在输入体数据中的起点.
    #[inline]
    pub fn window_start(&self) -> &[i64] {
        &self.window_start
    }
}

impl<A: Clone, D: Dimension> AnnotatedVolume<A, D> {
    /// 在目标点附近随机平移裁剪中心, 提取边长为 `block` 的立方块.
    ///
    /// 平移量在各轴上独立地从 `[-high, high)` 均匀采样 (见 [`jitter_bound`]),
    /// 保证目标物体与立方块边缘之间至少有 `margin` 个体素. 若 `high < 0`,
    /// 则不平移, 记录一条 warning, 并在返回的 [`JitterOutcome`] 中标记 `clamped`.
    ///
    /// 返回值中的目标点以新立方块为坐标系, 等于 `point - window_start`.
    /// 对于偶数 `block` 和整数目标点, 它等于 `block / 2 - shift`; 奇数 `block`
    /// 且窗口起点为正时, 它比 `block / 2 - shift` (整数除法) 大 1.
    /// 分辨率和物理半径保持不变.
    pub fn random_crop<R: Rng + ?Sized>(
        &self,
        block: usize,
        pad: A,
        margin: usize,
        rng: &mut R,
    ) -> AugmentResult<(Self, JitterOutcome)> {
        let (index_radius, mut high) = jitter_bound(self.radius(), self.spacing(), block, margin);
        let clamped = high < 0;
        if clamped {
            log::warn!(
                "jitter bound degenerated: block size {block}, index radius {index_radius}, \
                 margin {margin}; the object may be clipped"
            );
            high = 0;
        }

        let shift: Vec<i64> = (0..self.ndim())
            .map(|_| if high > 0 { rng.gen_range(-high..high) } else { 0 })
            .collect();
        let center: Vec<f64> = self
            .point()
            .iter()
            .zip(&shift)
            .map(|(&p, &s)| p + s as f64)
            .collect();

        let (out, window) = extract_block_with_window(self.volume(), &center, block, pad)?;
        let window_start = window.start();
        let point = self
            .point()
            .iter()
            .zip(&window_start)
            .map(|(&p, &s)| p - s as f64)
            .collect();

        let cube = Self::from_parts(out, self.spacing().to_vec(), point, self.radius());
        let outcome = JitterOutcome {
            index_radius,
            high,
            clamped,
            shift,
            window_start,
        };
        Ok((cube, outcome))
    }
}

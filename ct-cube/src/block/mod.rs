//! 立方块提取.
//!
//! 从任意维体数据中复制一个轴对齐的立方块 (边长为 `block`) 到新缓冲区.
//! 请求区域超出源数据的部分用填充值补齐, 因此输出形状总是 `(block,) * ndim`.

mod jitter;

pub use jitter::{jitter_bound, JitterOutcome};

use ndarray::{Array, ArrayView, Dimension, Slice};

use crate::volume::{check_finite, check_len};
use crate::{AugmentError, AugmentResult};

/// 单个轴上的裁剪窗口.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AxisWindow {
    /// 请求窗口在源数据中的起点. 可能为负, 也可能超出源数据长度.
    start: i64,

    /// 源数据中被复制的半开区间.
    src: (usize, usize),

    /// 输出立方块中被写入的半开区间. 长度总是与 `src` 一致.
    dst: (usize, usize),
}

impl AxisWindow {
    /// 以 `center` 为中心, 在长度为 `len` 的轴上请求长度为 `block` 的窗口.
    ///
    /// 窗口起点为 `trunc(center - block / 2)`. 与源数据完全不相交时,
    /// 复制区间退化为空区间.
    pub fn new(center: f64, block: usize, len: usize) -> Self {
        let start = (center - block as f64 / 2.0).trunc() as i64;
        let end = start.saturating_add(block as i64);
        let len = len as i64;
        let lo = start.clamp(0, len);
        let hi = end.clamp(lo, len);
        if lo == hi {
            return Self {
                start,
                src: (0, 0),
                dst: (0, 0),
            };
        }
        // 非空时 `start < len`, 因此 `lo == max(start, 0) >= start`.
        let dst_lo = (lo - start) as usize;
        Self {
            start,
            src: (lo as usize, hi as usize),
            dst: (dst_lo, dst_lo + (hi - lo) as usize),
        }
    }

    /// 请求窗口在源数据中的起点.
    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// 源数据中被复制的半开区间.
    #[inline]
    pub fn src(&self) -> (usize, usize) {
        self.src
    }

    /// 输出立方块中被写入的半开区间.
    #[inline]
    pub fn dst(&self) -> (usize, usize) {
        self.dst
    }

    /// 被复制的长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.src.1 - self.src.0
    }

    /// 是否没有复制任何数据?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 多维裁剪窗口, 每个轴一个 [`AxisWindow`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockWindow {
    axes: Vec<AxisWindow>,
    block: usize,
}

impl BlockWindow {
    /// 以 `center` 为中心, 在形状为 `shape` 的源数据上请求边长为 `block` 的立方块.
    ///
    /// 该函数不检查参数合法性, `center` 与 `shape` 长度不同时以较短者为准.
    pub fn new(center: &[f64], block: usize, shape: &[usize]) -> Self {
        let axes = center
            .iter()
            .zip(shape)
            .map(|(&c, &len)| AxisWindow::new(c, block, len))
            .collect();
        Self { axes, block }
    }

    /// 各轴窗口.
    #[inline]
    pub fn axes(&self) -> &[AxisWindow] {
        &self.axes
    }

    /// 立方块边长.
    #[inline]
    pub fn block(&self) -> usize {
        self.block
    }

    /// 请求窗口在源数据中的起点.
    pub fn start(&self) -> Vec<i64> {
        self.axes.iter().map(AxisWindow::start).collect()
    }

    /// 是否没有复制任何源数据 (输出全部为填充值)?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.axes.iter().any(AxisWindow::is_empty)
    }

    /// 输出是否含有填充值?
    #[inline]
    pub fn is_padded(&self) -> bool {
        self.axes.iter().any(|w| w.len() != self.block)
    }
}

/// 以 `center` 为中心, 从 `src` 中提取边长为 `block` 的立方块.
///
/// 输出满足 `out[i] = src[start + i]` (其中 `start` 见 [`AxisWindow::new`]),
/// 源索引越界处则为 `pad`. `center` 可以是非整数, 也可以位于源数据之外.
///
/// # 返回值
///
/// - `block` 为 0 时, 返回 `Err(ZeroBlockSize)`;
/// - `center` 长度与 `src` 维数不一致时, 返回 `Err(DimensionMismatch)`;
/// - `center` 存在非有限值时, 返回 `Err(NonFinitePoint)`.
#[inline]
pub fn extract_block<A: Clone, D: Dimension>(
    src: ArrayView<'_, A, D>,
    center: &[f64],
    block: usize,
    pad: A,
) -> AugmentResult<Array<A, D>> {
    extract_block_with_window(src, center, block, pad).map(|(out, _)| out)
}

/// 与 [`extract_block`] 相同, 但同时返回实际使用的裁剪窗口.
pub fn extract_block_with_window<A: Clone, D: Dimension>(
    src: ArrayView<'_, A, D>,
    center: &[f64],
    block: usize,
    pad: A,
) -> AugmentResult<(Array<A, D>, BlockWindow)> {
    if block == 0 {
        return Err(AugmentError::ZeroBlockSize);
    }
    check_len("center", src.ndim(), center.len())?;
    check_finite(center)?;

    let window = BlockWindow::new(center, block, src.shape());

    let mut dim = src.raw_dim();
    dim.slice_mut().fill(block);
    let mut out = Array::from_elem(dim, pad);

    if !window.is_empty() {
        let axes = window.axes();
        let from = src.slice_each_axis(|ax| {
            let (lo, hi) = axes[ax.axis.index()].src();
            Slice::from(lo..hi)
        });
        out.slice_each_axis_mut(|ax| {
            let (lo, hi) = axes[ax.axis.index()].dst();
            Slice::from(lo..hi)
        })
        .assign(&from);
    }
    Ok((out, window))
}

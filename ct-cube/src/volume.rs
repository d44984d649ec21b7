//! 带标注的体数据.

use ndarray::{Array, ArrayView, Dimension};

use crate::{AugmentError, AugmentResult};

/// 检查分量个数是否与维数一致.
#[inline]
pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> AugmentResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(AugmentError::DimensionMismatch {
            what,
            expected,
            found,
        })
    }
}

/// 检查坐标的所有分量都是有限值.
#[inline]
pub(crate) fn check_finite(point: &[f64]) -> AugmentResult<()> {
    if point.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(AugmentError::NonFinitePoint)
    }
}

/// 体数据, 体素分辨率, 目标点和目标物理半径组成的不可变值对象.
///
/// - `spacing` 与体数据的轴一一对应, 单位为毫米;
/// - `point` 是目标在体数据 **索引空间** 中的坐标 (不是物理坐标), 允许非整数;
/// - `radius` 是目标的 **物理** 半径 (毫米), 只用于约束抖动范围.
///
/// 流水线中每一步都消费一个 `AnnotatedVolume` 并返回一个新的实例,
/// 不会就地修改输入. 任何作用在体数据轴上的置换都会同步作用在 `spacing` 和 `point` 上.
#[derive(Debug, Clone)]
pub struct AnnotatedVolume<A, D: Dimension> {
    volume: Array<A, D>,
    spacing: Vec<f64>,
    point: Vec<f64>,
    radius: f64,
}

impl<A, D: Dimension> AnnotatedVolume<A, D> {
    /// 创建带标注的体数据.
    ///
    /// # 返回值
    ///
    /// - `spacing` 或 `point` 的长度与 `volume` 维数不一致时, 返回 `Err(DimensionMismatch)`;
    /// - `spacing` 存在非正数或非有限值时, 返回 `Err(InvalidSpacing)`;
    /// - `point` 存在非有限值时, 返回 `Err(NonFinitePoint)`;
    /// - `radius` 为负数或非有限值时, 返回 `Err(InvalidRadius)`.
    pub fn new(
        volume: Array<A, D>,
        spacing: Vec<f64>,
        point: Vec<f64>,
        radius: f64,
    ) -> AugmentResult<Self> {
        let ndim = volume.ndim();
        check_len("spacing", ndim, spacing.len())?;
        check_len("point", ndim, point.len())?;
        if let Some(&s) = spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(AugmentError::InvalidSpacing(s));
        }
        check_finite(&point)?;
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(AugmentError::InvalidRadius(radius));
        }
        Ok(Self::from_parts(volume, spacing, point, radius))
    }

    /// 直接拼装. 仅供流水线内部使用, 调用方负责保证各分量合法.
    #[inline]
    pub(crate) fn from_parts(
        volume: Array<A, D>,
        spacing: Vec<f64>,
        point: Vec<f64>,
        radius: f64,
    ) -> Self {
        debug_assert_eq!(volume.ndim(), spacing.len());
        debug_assert_eq!(volume.ndim(), point.len());
        Self {
            volume,
            spacing,
            point,
            radius,
        }
    }

    /// 获得体数据的一份不可变 shallow copy.
    #[inline]
    pub fn volume(&self) -> ArrayView<'_, A, D> {
        self.volume.view()
    }

    /// 体素分辨率, 与体数据的轴一一对应.
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// 目标点在索引空间中的坐标.
    #[inline]
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// 目标物理半径.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 体数据维数.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.volume.ndim()
    }

    /// 体数据形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.volume.shape()
    }

    /// 拆分为 `(体数据, 分辨率, 目标点, 物理半径)`.
    #[inline]
    pub fn into_parts(self) -> (Array<A, D>, Vec<f64>, Vec<f64>, f64) {
        (self.volume, self.spacing, self.point, self.radius)
    }

    /// 将目标点四舍五入为体素索引. 越界时返回 `None`.
    pub fn point_index(&self) -> Option<D> {
        let mut idx = self.volume.raw_dim();
        for ((i, &p), &n) in idx.slice_mut().iter_mut().zip(&self.point).zip(self.shape()) {
            let r = p.round();
            if r < 0.0 || r >= n as f64 {
                return None;
            }
            *i = r as usize;
        }
        Some(idx)
    }

    /// 获取目标点 (四舍五入后) 处的体素值. 越界时返回 `None`.
    #[inline]
    pub fn value_at_point(&self) -> Option<&A> {
        self.point_index().and_then(|idx| self.volume.get(idx))
    }
}

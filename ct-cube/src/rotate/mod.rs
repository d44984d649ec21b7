//! 90 度旋转与翻转.
//!
//! 一个 [`Orientation`] 是 `{旋转平面, 转动次数, 是否翻转}` 到
//! "轴置换 + 镜像" 的双射. 体数据, 体素分辨率和目标点都通过同一个 `Orientation`
//! 变换, 以保证三者始终一致.
//!
//! 旋转编号 `rotate_id` 的编码方式:
//!
//! - 二维: `rotate_id` 位于 `0..8`, 旋转平面为 `(0, 1)`, 翻转轴为 0;
//! - 三维: `rotate_id` 位于 `0..24`, `rotate_id / 8` 为固定轴 (同时也是翻转轴),
//!   旋转平面为另外两个轴 (升序);
//! - 两种情况下都有 `which = rotate_id % 8`, `flip = which >= 4`, `turns = which % 4`.

mod point;

pub use point::{point_after_2d_rotation, point_after_3d_rotation};

use ndarray::{Array, ArrayView, Axis, Dimension};

use crate::consts::{ROTATE_IDS_2D, ROTATE_IDS_3D};
use crate::volume::check_len;
use crate::{AnnotatedVolume, AugmentError, AugmentResult};

/// 90 度旋转 + 可选翻转.
///
/// 数组上的单步旋转为: 先反转 `plane[1]` 轴, 再交换 `plane[0]` 与 `plane[1]` 轴
/// (逆时针). 所有旋转完成后, 若 `flip` 为真, 再反转 `flip_axis` 轴.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Orientation {
    ndim: usize,
    plane: [usize; 2],
    flip_axis: usize,
    turns: u8,
    flip: bool,
}

impl Orientation {
    /// 二维变换. 旋转平面为 `(0, 1)`, 翻转轴为 0. `turns` 会对 4 取模.
    #[inline]
    pub fn planar(turns: u8, flip: bool) -> Self {
        Self {
            ndim: 2,
            plane: [0, 1],
            flip_axis: 0,
            turns: turns % 4,
            flip,
        }
    }

    /// 三维变换. 在平面 `plane` 上旋转, 翻转轴为平面之外的那个轴. `turns` 会对 4 取模.
    ///
    /// 如果 `plane` 不是两个不同的合法轴, 则返回 `Err(InvalidPlane)`.
    pub fn spatial(plane: [usize; 2], turns: u8, flip: bool) -> AugmentResult<Self> {
        let [a, b] = plane;
        if a >= 3 || b >= 3 || a == b {
            return Err(AugmentError::InvalidPlane(plane));
        }
        Ok(Self {
            ndim: 3,
            plane,
            flip_axis: 3 - a - b,
            turns: turns % 4,
            flip,
        })
    }

    /// `ndim` 维数据的旋转编号个数.
    ///
    /// 仅支持二维和三维, 否则返回 `Err(UnsupportedDimension)`.
    pub fn rotate_id_count(ndim: usize) -> AugmentResult<u8> {
        match ndim {
            2 => Ok(ROTATE_IDS_2D),
            3 => Ok(ROTATE_IDS_3D),
            n => Err(AugmentError::UnsupportedDimension(n)),
        }
    }

    /// 根据旋转编号构建变换.
    ///
    /// # 返回值
    ///
    /// - `ndim` 不为 2 或 3 时, 返回 `Err(UnsupportedDimension)`;
    /// - `rotate_id` 超出范围时, 返回 `Err(InvalidRotateId)`, 不会回绕.
    pub fn from_rotate_id(rotate_id: u8, ndim: usize) -> AugmentResult<Self> {
        if rotate_id >= Self::rotate_id_count(ndim)? {
            return Err(AugmentError::InvalidRotateId { rotate_id, ndim });
        }
        let which = rotate_id % 8;
        let (turns, flip) = (which % 4, which >= 4);
        if ndim == 2 {
            return Ok(Self::planar(turns, flip));
        }
        let plane = match rotate_id / 8 {
            0 => [1, 2],
            1 => [0, 2],
            _ => [0, 1],
        };
        Self::spatial(plane, turns, flip)
    }

    /// 维数.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// 旋转平面.
    #[inline]
    pub fn plane(&self) -> [usize; 2] {
        self.plane
    }

    /// 翻转轴.
    #[inline]
    pub fn flip_axis(&self) -> usize {
        self.flip_axis
    }

    /// 90 度转动次数, 位于 `0..4`.
    #[inline]
    pub fn turns(&self) -> u8 {
        self.turns
    }

    /// 是否翻转.
    #[inline]
    pub fn flip(&self) -> bool {
        self.flip
    }

    /// 是否为恒等变换?
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.turns == 0 && !self.flip
    }

    /// 替换转动次数.
    #[inline]
    pub(crate) fn with_turns(self, turns: u8) -> Self {
        Self {
            turns: turns % 4,
            ..self
        }
    }

    /// 去掉翻转.
    #[inline]
    pub(crate) fn without_flip(self) -> Self {
        Self {
            flip: false,
            ..self
        }
    }

    /// 转动次数为奇数时, 平面上的两个轴互换.
    #[inline]
    fn swaps_plane(&self) -> bool {
        self.turns % 2 == 1
    }

    /// 转动次数为奇数时交换平面上的两个分量. 调用方保证 `v` 的长度为 [`Self::ndim`].
    pub(crate) fn permute<T: Copy>(&self, v: &[T]) -> Vec<T> {
        let mut out = v.to_vec();
        if self.swaps_plane() {
            out.swap(self.plane[0], self.plane[1]);
        }
        out
    }

    /// 变换后的形状. `shape` 为变换前的形状.
    ///
    /// `shape` 长度与 [`Self::ndim`] 不一致时, 返回 `Err(DimensionMismatch)`.
    pub fn output_shape(&self, shape: &[usize]) -> AugmentResult<Vec<usize>> {
        check_len("shape", self.ndim, shape.len())?;
        Ok(self.permute(shape))
    }

    /// 变换后的体素分辨率.
    ///
    /// 分辨率只随轴置换而交换, 镜像不影响它.
    /// `spacing` 长度与 [`Self::ndim`] 不一致时, 返回 `Err(DimensionMismatch)`.
    pub fn apply_to_spacing(&self, spacing: &[f64]) -> AugmentResult<Vec<f64>> {
        check_len("spacing", self.ndim, spacing.len())?;
        Ok(self.permute(spacing))
    }

    /// 对数组实施变换, 返回标准布局的新数组.
    ///
    /// 数组维数与 [`Self::ndim`] 不一致时, 返回 `Err(DimensionMismatch)`.
    pub fn apply_to_array<A: Clone, D: Dimension>(
        &self,
        array: ArrayView<'_, A, D>,
    ) -> AugmentResult<Array<A, D>> {
        check_len("volume", self.ndim, array.ndim())?;

        let mut view = array;
        let [a, b] = self.plane;
        for _ in 0..self.turns {
            view.invert_axis(Axis(b));
            view.swap_axes(a, b);
        }
        if self.flip {
            view.invert_axis(Axis(self.flip_axis));
        }
        Ok(view.as_standard_layout().into_owned())
    }
}

impl<A: Clone, D: Dimension> AnnotatedVolume<A, D> {
    /// 以旋转编号 `rotate_id` 旋转/翻转体数据, 并同步置换分辨率, 重新定位目标点.
    /// 物理半径保持不变.
    ///
    /// # 返回值
    ///
    /// - 体数据不是二维或三维时, 返回 `Err(UnsupportedDimension)`;
    /// - `rotate_id` 超出范围 (二维 `0..8`, 三维 `0..24`) 时, 返回 `Err(InvalidRotateId)`.
    #[inline]
    pub fn rotate(&self, rotate_id: u8) -> AugmentResult<Self> {
        self.reorient(&Orientation::from_rotate_id(rotate_id, self.ndim())?)
    }

    /// 以给定变换旋转/翻转体数据, 并同步置换分辨率, 重新定位目标点.
    pub fn reorient(&self, orientation: &Orientation) -> AugmentResult<Self> {
        let volume = orientation.apply_to_array(self.volume())?;
        let spacing = orientation.apply_to_spacing(self.spacing())?;
        let point = orientation.apply_to_point(self.point(), self.shape())?;
        Ok(Self::from_parts(volume, spacing, point, self.radius()))
    }
}

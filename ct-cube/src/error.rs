//! 运行时错误.

use ndarray::ShapeError;

/// 立方块提取或几何增强的运行时错误.
///
/// 这些错误都代表调用方违反了接口约定. 越界裁剪窗口与抖动范围退化
/// 都属于正常情况, 不会产生错误.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AugmentError {
    /// 仅支持二维或三维数据. 参数为实际维数.
    #[error("only 2D or 3D volumes are supported, got {0}D")]
    UnsupportedDimension(usize),

    /// 坐标 / 分辨率长度与体数据维数不一致.
    #[error("{what} has {found} components, but the volume is {expected}D")]
    DimensionMismatch {
        /// 出错的参数名.
        what: &'static str,
        /// 期望的分量个数 (体数据维数).
        expected: usize,
        /// 实际的分量个数.
        found: usize,
    },

    /// 掩膜形状与切片形状不一致.
    #[error("mask shape {found:?} does not match slice shape {expected:?}")]
    ShapeMismatch {
        /// 切片形状.
        expected: Vec<usize>,
        /// 掩膜形状.
        found: Vec<usize>,
    },

    /// 旋转编号超出该维数的合法范围 (二维 `0..8`, 三维 `0..24`).
    #[error("rotate id {rotate_id} is out of range for a {ndim}D volume")]
    InvalidRotateId {
        /// 旋转编号.
        rotate_id: u8,
        /// 体数据维数.
        ndim: usize,
    },

    /// 三维旋转平面必须由两个不同的轴 (`0..3`) 组成.
    #[error("invalid rotation plane {0:?}")]
    InvalidPlane([usize; 2]),

    /// 缩放因子不在 `[0.75, 1.25]` 范围内.
    #[error("scale factor {0} is outside [0.75, 1.25]")]
    ScaleOutOfRange(f64),

    /// 体素分辨率必须是有限正数.
    #[error("voxel spacing must be positive and finite, got {0}")]
    InvalidSpacing(f64),

    /// 物理半径必须是有限非负数.
    #[error("radius must be non-negative and finite, got {0}")]
    InvalidRadius(f64),

    /// 坐标分量存在 NaN 或 inf.
    #[error("point has a non-finite component")]
    NonFinitePoint,

    /// 立方块边长为 0.
    #[error("block size must be positive")]
    ZeroBlockSize,

    /// 内部数组形状转换失败.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

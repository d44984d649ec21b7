//! 通用常量.

/// 默认立方块边长 (体素个数).
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// 默认填充值. 立方块中没有对应源数据的体素以此值填充.
pub const DEFAULT_PAD_VALUE: f32 = 106.0;

/// 默认边距 (体素个数). 抖动后目标物体与立方块边缘之间至少保留的距离.
pub const DEFAULT_MARGIN: usize = 10;

/// 缩放因子相关常量.
pub mod scale {
    /// 缩放因子下限 (含).
    pub const SCALE_MIN: f64 = 0.75;

    /// 缩放因子上限 (含).
    pub const SCALE_MAX: f64 = 1.25;

    /// 缩放因子是否在 `[SCALE_MIN, SCALE_MAX]` 范围内?
    #[inline]
    pub fn is_valid_scale(s: f64) -> bool {
        (SCALE_MIN..=SCALE_MAX).contains(&s)
    }
}

/// 二维数据的旋转编号个数: 4 种转动次数 × 是否翻转.
pub const ROTATE_IDS_2D: u8 = 8;

/// 三维数据的旋转编号个数: 3 个固定轴 × 4 种转动次数 × 是否翻转.
pub const ROTATE_IDS_3D: u8 = 24;

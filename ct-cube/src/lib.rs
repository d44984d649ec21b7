#![warn(missing_docs)]

//! 肺结节 CT 立方块提取与几何数据增强.
//!
//! 从带标注 (体素分辨率, 目标点, 目标物理半径) 的二维或三维 CT 数据中,
//! 以目标点为中心提取固定边长的立方块, 并在提取过程中实施随机缩放, 随机抖动平移,
//! 以及 90 度旋转 / 翻转. 每一步都同步更新目标点和分辨率, 保证目标点在输出立方块中
//! 仍然指向同一个物理位置.
//!
//! 所有操作都是纯函数: 输入不会被修改, 每一步都返回新的数据. 随机源由调用方注入,
//! 固定种子即可复现.
//!
//! # 流水线
//!
//! ```text
//! Augmenter::augment
//!   -> AnnotatedVolume::rescale       (最近邻缩放)
//!   -> AnnotatedVolume::random_crop   (抖动 + 立方块提取, 越界处填充)
//!   -> AnnotatedVolume::reorient      (旋转 / 翻转, 同步变换目标点和分辨率)
//! ```
//!
//! # 注意
//!
//! 1. 目标点总是 **索引空间** 坐标, 物理半径总是毫米.
//! 2. 立方块提取支持任意维数, 旋转与增强流水线仅支持二维和三维.
//! 3. 违反接口约定 (维数不符, 旋转编号或旋转平面非法, 缩放因子越界, 掩膜形状不符等) 时,
//!   公开接口返回 [`AugmentError`], 不会 panic. 越界裁剪和抖动范围退化都不是错误.
//! 4. 用户提供的分割器 ([`segment::SliceSegmenter`]) 自身 panic 时, panic 会原样传播.
//!
//! # 并发
//!
//! 开启 `rayon` feature 后, 可以使用 [`Augmenter::par_augment_batch`] 并行地处理一批数据.
//! 每个数据使用由批种子派生的独立随机源, 结果与调度顺序无关.

pub mod consts;

mod error;
pub use error::AugmentError;

/// 本 crate 的 `Result` 类型.
pub type AugmentResult<T> = Result<T, AugmentError>;

mod volume;
pub use volume::AnnotatedVolume;

pub mod block;
pub use block::{extract_block, extract_block_with_window, BlockWindow, JitterOutcome};

pub mod rotate;
pub use rotate::Orientation;

pub mod scale;

mod augment;
pub use augment::{AugmentSpec, Augmented, Augmenter};

pub mod segment;

pub mod prelude;

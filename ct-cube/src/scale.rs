//! 等比例缩放 (最近邻插值).

use itertools::izip;
use ndarray::{Array, ArrayView, Dimension, IxDyn};

use crate::consts::scale::is_valid_scale;
use crate::{AnnotatedVolume, AugmentError, AugmentResult};

/// 长度为 `n` 的轴缩放 `s` 倍后, 每个输出索引对应的输入索引.
///
/// 输出长度为 `round(n * s)` (非空轴至少为 1). 输入索引 `p` 落在输出索引 `floor(p * s)` 上,
/// 与 [`AnnotatedVolume::rescale`] 中目标点的取整方式一致. 输出索引 `q` 取满足
/// `floor(p * s) >= q` 的最小输入索引 `p`, 即 `ceil(q / s)`, 并截断到 `n - 1`,
/// 因此边界处复制边缘值, 不会引入新的填充值.
///
/// 放大时每个输入体素都保留在 `floor(p * s)` 处; 缩小时 `floor(p * s)` 处的体素
/// 与 `p` 相差不超过 1.
fn axis_map(n: usize, s: f64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let m = ((n as f64 * s).round() as usize).max(1);
    (0..m)
        .map(|q| {
            let p = ((q as f64 / s).ceil() as usize).min(n - 1);
            // `q / s` 的舍入误差可能越过整数, 以与目标点相同的表达式校正.
            if p > 0 && ((p - 1) as f64 * s).floor() as usize == q {
                p - 1
            } else {
                p
            }
        })
        .collect()
}

/// 以最近邻插值将 `src` 在所有轴上缩放 `s` 倍.
///
/// 该函数不检查 `s` 的范围, 但 `s` 必须是有限正数, 否则输出为空或只有一个体素.
pub fn zoom_nearest<A: Clone, D: Dimension>(
    src: ArrayView<'_, A, D>,
    s: f64,
) -> AugmentResult<Array<A, D>> {
    let maps: Vec<Vec<usize>> = src.shape().iter().map(|&n| axis_map(n, s)).collect();
    let out_shape: Vec<usize> = maps.iter().map(Vec::len).collect();

    let src = src.into_dyn();
    let mut from = vec![0usize; maps.len()];
    let out = Array::from_shape_fn(IxDyn(&out_shape), |idx: IxDyn| {
        for (f, &i, map) in izip!(from.iter_mut(), idx.slice(), &maps) {
            *f = map[i];
        }
        src[from.as_slice()].clone()
    });
    Ok(out.into_dimensionality::<D>()?)
}

impl<A: Clone, D: Dimension> AnnotatedVolume<A, D> {
    /// 等比例缩放 `s` 倍.
    ///
    /// 体数据以最近邻插值重采样 (见 [`zoom_nearest`]); 分辨率与物理半径都乘以 `s`;
    /// 目标点乘以 `s` 后向下取整为体素索引.
    ///
    /// `s` 不在 `[0.75, 1.25]` 范围内时, 返回 `Err(ScaleOutOfRange)`.
    pub fn rescale(&self, s: f64) -> AugmentResult<Self> {
        if !is_valid_scale(s) {
            return Err(AugmentError::ScaleOutOfRange(s));
        }
        let volume = zoom_nearest(self.volume(), s)?;
        let spacing = self.spacing().iter().map(|&x| x * s).collect();
        let point = self.point().iter().map(|&p| (p * s).floor()).collect();
        Ok(Self::from_parts(volume, spacing, point, self.radius() * s))
    }
}

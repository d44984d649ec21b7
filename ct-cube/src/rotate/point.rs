//! 坐标在 90 度旋转/翻转下的映射.
//!
//! 单步旋转 (逆时针, 与 [`super::Orientation::apply_to_array`] 的数组置换一致) 作用在平面
//! `(a, b)` 上, 设旋转前形状为 `shape`:
//!
//! ```text
//! p'[a] = shape[b] - 1 - p[b]
//! p'[b] = p[a]
//! ```
//!
//! 每一步之后平面上的两个形状分量互换, 下一步以互换后的形状为准.
//! 所有旋转完成后, 若需要翻转, 则以旋转后的形状镜像翻转轴.

use super::Orientation;
use crate::volume::check_len;
use crate::AugmentResult;

/// 单步旋转. `shape` 为旋转前的形状, 旋转后会被原地更新.
#[inline]
fn quarter_turn(point: &mut [f64], shape: &mut [usize], [a, b]: [usize; 2]) {
    let (pa, pb) = (point[a], point[b]);
    point[a] = shape[b] as f64 - 1.0 - pb;
    point[b] = pa;
    shape.swap(a, b);
}

impl Orientation {
    /// 检查坐标与形状的分量个数.
    #[inline]
    fn check_point(&self, point: &[f64], shape: &[usize]) -> AugmentResult<()> {
        check_len("point", self.ndim(), point.len())?;
        check_len("shape", self.ndim(), shape.len())
    }

    /// [`Self::apply_to_point`] 的实现. 调用方保证分量个数正确.
    pub(crate) fn map_point(&self, point: &[f64], shape: &[usize]) -> Vec<f64> {
        let mut p = point.to_vec();
        let mut cur = shape.to_vec();
        for _ in 0..self.turns() {
            quarter_turn(&mut p, &mut cur, self.plane());
        }
        if self.flip() {
            let f = self.flip_axis();
            p[f] = cur[f] as f64 - 1.0 - p[f];
        }
        p
    }

    /// [`Self::invert_point`] 的实现. 调用方保证分量个数正确.
    pub(crate) fn unmap_point(&self, point: &[f64], shape: &[usize]) -> Vec<f64> {
        let out_shape = self.permute(shape);
        let mut p = point.to_vec();
        if self.flip() {
            let f = self.flip_axis();
            p[f] = out_shape[f] as f64 - 1.0 - p[f];
        }
        // 同一平面上再转 `4 - turns` 次即回到原方向.
        self.with_turns((4 - self.turns()) % 4)
            .without_flip()
            .map_point(&p, &out_shape)
    }

    /// 求点 `point` 在体数据经过本变换后的新坐标. `shape` 为变换 **前** 的体数据形状.
    ///
    /// `point` 或 `shape` 的长度与 [`Self::ndim`] 不一致时, 返回 `Err(DimensionMismatch)`.
    pub fn apply_to_point(&self, point: &[f64], shape: &[usize]) -> AugmentResult<Vec<f64>> {
        self.check_point(point, shape)?;
        Ok(self.map_point(point, shape))
    }

    /// [`Self::apply_to_point`] 的逆映射. `point` 为变换后的坐标,
    /// `shape` 仍为变换 **前** 的体数据形状.
    ///
    /// `point` 或 `shape` 的长度与 [`Self::ndim`] 不一致时, 返回 `Err(DimensionMismatch)`.
    pub fn invert_point(&self, point: &[f64], shape: &[usize]) -> AugmentResult<Vec<f64>> {
        self.check_point(point, shape)?;
        Ok(self.unmap_point(point, shape))
    }
}

/// 二维坐标在 `rot90s` 次 90 度旋转与可选的轴 0 翻转后的新坐标.
/// `shape` 为旋转前的形状.
///
/// 例如形状 `(10, 10)` 上的点 `(3, 7)` 旋转一次后为 `(2, 3)`.
///
/// `point` 或 `shape` 不是二维时, 返回 `Err(DimensionMismatch)`.
pub fn point_after_2d_rotation(
    point: &[f64],
    shape: &[usize],
    rot90s: u8,
    flip: bool,
) -> AugmentResult<Vec<f64>> {
    Orientation::planar(rot90s, flip).apply_to_point(point, shape)
}

/// 三维坐标在平面 `axes` 上 `rot90s` 次 90 度旋转与可选的固定轴翻转后的新坐标.
/// `shape` 为旋转前的形状, 固定轴是 `axes` 之外的那个轴.
///
/// # 返回值
///
/// - `axes` 不是两个不同的合法轴时, 返回 `Err(InvalidPlane)`;
/// - `point` 或 `shape` 不是三维时, 返回 `Err(DimensionMismatch)`.
pub fn point_after_3d_rotation(
    point: &[f64],
    shape: &[usize],
    axes: [usize; 2],
    rot90s: u8,
    flip: bool,
) -> AugmentResult<Vec<f64>> {
    Orientation::spatial(axes, rot90s, flip)?.apply_to_point(point, shape)
}

#[cfg(test)]
mod tests {
    use super::{point_after_2d_rotation, point_after_3d_rotation};
    use crate::rotate::Orientation;
    use crate::AugmentError;

    #[test]
    fn test_2d_quarter_turns() {
        assert_eq!(point_after_2d_rotation(&[3.0, 7.0], &[10, 10], 1, false).unwrap(), vec![2.0, 3.0]);
        assert_eq!(point_after_2d_rotation(&[3.0, 7.0], &[10, 10], 0, false).unwrap(), vec![3.0, 7.0]);
        assert_eq!(point_after_2d_rotation(&[3.0, 7.0], &[10, 10], 0, true).unwrap(), vec![6.0, 7.0]);
        // 180 度
        assert_eq!(point_after_2d_rotation(&[3.0, 7.0], &[10, 10], 2, false).unwrap(), vec![6.0, 2.0]);
        // 绕回
        assert_eq!(point_after_2d_rotation(&[3.0, 7.0], &[10, 10], 4, false).unwrap(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_2d_asymmetric_shape() {
        // (4, 6) 旋转一次 -> (6, 4), 再一次 -> (4, 6).
        assert_eq!(point_after_2d_rotation(&[1.0, 2.0], &[4, 6], 1, false).unwrap(), vec![3.0, 1.0]);
        assert_eq!(point_after_2d_rotation(&[1.0, 2.0], &[4, 6], 2, false).unwrap(), vec![2.0, 3.0]);
        assert_eq!(point_after_2d_rotation(&[1.0, 2.0], &[4, 6], 3, false).unwrap(), vec![2.0, 2.0]);
        // 翻转以旋转后的形状为准
        assert_eq!(point_after_2d_rotation(&[1.0, 2.0], &[4, 6], 1, true).unwrap(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_3d_fixed_axis_untouched_by_turns() {
        let p = [1.0, 2.0, 3.0];
        let shape = [5, 6, 7];
        for k in 0..4 {
            assert_eq!(point_after_3d_rotation(&p, &shape, [1, 2], k, false).unwrap()[0], 1.0);
            assert_eq!(point_after_3d_rotation(&p, &shape, [0, 2], k, false).unwrap()[1], 2.0);
            assert_eq!(point_after_3d_rotation(&p, &shape, [0, 1], k, false).unwrap()[2], 3.0);
        }
        assert_eq!(point_after_3d_rotation(&p, &shape, [1, 2], 0, true).unwrap(), vec![3.0, 2.0, 3.0]);
        assert_eq!(point_after_3d_rotation(&p, &shape, [0, 1], 1, false).unwrap(), vec![3.0, 1.0, 3.0]);
    }

    #[test]
    fn test_invert_point() {
        let shape = [5, 6, 7];
        let p = [1.5, 2.0, 6.0];
        for rotate_id in 0..24 {
            let o = Orientation::from_rotate_id(rotate_id, 3).unwrap();
            let q = o.apply_to_point(&p, &shape).unwrap();
            assert_eq!(o.invert_point(&q, &shape).unwrap(), p.to_vec());
        }
    }

    #[test]
    fn test_contract_violations_are_errors() {
        assert!(matches!(
            point_after_2d_rotation(&[1.0, 2.0], &[4, 4, 4], 1, false),
            Err(AugmentError::DimensionMismatch { what: "shape", expected: 2, found: 3 })
        ));
        assert!(matches!(
            point_after_2d_rotation(&[1.0], &[4, 4], 1, false),
            Err(AugmentError::DimensionMismatch { what: "point", .. })
        ));
        assert!(matches!(
            point_after_3d_rotation(&[1.0, 2.0, 3.0], &[4, 4, 4], [1, 1], 1, false),
            Err(AugmentError::InvalidPlane([1, 1]))
        ));
        assert!(matches!(
            point_after_3d_rotation(&[1.0, 2.0], &[4, 4, 4], [0, 1], 1, false),
            Err(AugmentError::DimensionMismatch { .. })
        ));

        let o = Orientation::from_rotate_id(5, 3).unwrap();
        assert!(o.invert_point(&[1.0, 2.0], &[4, 4, 4]).is_err());
        assert!(o.apply_to_point(&[1.0, 2.0, 3.0], &[4, 4]).is_err());
    }
}

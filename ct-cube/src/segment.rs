//! 肺部分割的接口边界.
//!
//! 本 crate 不实现分割算法, 只规定分割器的形状约定, 并负责把二值掩膜作用到切片或整个扫描上.
//! 掩膜之外的体素被置为 `A::default()` (数值类型即 0).

use ndarray::{Array2, ArrayView2, ArrayViewMut2, ArrayViewMut3, Axis, Zip};

use crate::{AugmentError, AugmentResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 二维水平切片的分割器. 掩膜中为 `true` 的像素属于前景.
///
/// 任意 `Fn(ArrayView2<A>) -> Array2<bool>` 闭包都是分割器.
pub trait SliceSegmenter<A> {
    /// 计算 `slice` 的掩膜. 掩膜形状必须与 `slice` 相同.
    fn mask(&self, slice: ArrayView2<'_, A>) -> Array2<bool>;
}

impl<A, F> SliceSegmenter<A> for F
where
    F: Fn(ArrayView2<'_, A>) -> Array2<bool>,
{
    #[inline]
    fn mask(&self, slice: ArrayView2<'_, A>) -> Array2<bool> {
        self(slice)
    }
}

#[inline]
fn check_mask_shape(slice: &[usize], mask: &[usize]) -> AugmentResult<()> {
    if slice == mask {
        Ok(())
    } else {
        Err(AugmentError::ShapeMismatch {
            expected: slice.to_vec(),
            found: mask.to_vec(),
        })
    }
}

/// 返回 `slice` 被 `mask` 过滤后的副本.
///
/// 形状不一致时, 返回 `Err(ShapeMismatch)`.
pub fn apply_mask<A: Clone + Default>(
    slice: ArrayView2<'_, A>,
    mask: ArrayView2<'_, bool>,
) -> AugmentResult<Array2<A>> {
    check_mask_shape(slice.shape(), mask.shape())?;
    Ok(Zip::from(&slice)
        .and(&mask)
        .map_collect(|v, &m| if m { v.clone() } else { A::default() }))
}

/// 原地用 `mask` 过滤 `slice`, 返回被清除的体素个数.
///
/// 形状不一致时, 返回 `Err(ShapeMismatch)`, 此时 `slice` 不会被修改.
pub fn apply_mask_in_place<A: Default>(
    mut slice: ArrayViewMut2<'_, A>,
    mask: ArrayView2<'_, bool>,
) -> AugmentResult<usize> {
    check_mask_shape(slice.shape(), mask.shape())?;
    let mut cleared = 0;
    Zip::from(&mut slice).and(&mask).for_each(|v, &m| {
        if !m {
            *v = A::default();
            cleared += 1;
        }
    });
    Ok(cleared)
}

/// 逐个水平切片 (轴 0) 计算掩膜并原地过滤三维扫描, 返回被清除的体素总数.
///
/// 任一切片的掩膜形状不正确时, 返回 `Err(ShapeMismatch)`. 此前的切片已被修改.
pub fn mask_volume_slices<A: Default, S: SliceSegmenter<A> + ?Sized>(
    mut volume: ArrayViewMut3<'_, A>,
    segmenter: &S,
) -> AugmentResult<usize> {
    let mut cleared = 0;
    for mut slice in volume.axis_iter_mut(Axis(0)) {
        let mask = segmenter.mask(slice.view());
        cleared += apply_mask_in_place(slice.view_mut(), mask.view())?;
    }
    Ok(cleared)
}

/// 借助 `rayon`, 并行地运行 [`mask_volume_slices`].
///
/// 任一切片的掩膜形状不正确时, 返回 `Err(ShapeMismatch)`. 其它切片可能已被修改.
#[cfg(feature = "rayon")]
pub fn par_mask_volume_slices<A, S>(
    mut volume: ArrayViewMut3<'_, A>,
    segmenter: &S,
) -> AugmentResult<usize>
where
    A: Default + Send + Sync,
    S: SliceSegmenter<A> + Sync + ?Sized,
{
    let counts = volume
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .map(|mut slice| {
            let mask = segmenter.mask(slice.view());
            apply_mask_in_place(slice.view_mut(), mask.view())
        })
        .collect::<AugmentResult<Vec<usize>>>()?;
    Ok(counts.into_iter().sum())
}

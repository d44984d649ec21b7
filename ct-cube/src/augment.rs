//! 几何增强流水线: 缩放 -> 抖动裁剪 -> 旋转/翻转.

use itertools::izip;
use ndarray::Dimension;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::block::JitterOutcome;
use crate::consts::scale::{SCALE_MAX, SCALE_MIN};
use crate::consts::{DEFAULT_BLOCK_SIZE, DEFAULT_MARGIN, DEFAULT_PAD_VALUE};
use crate::rotate::Orientation;
use crate::{AnnotatedVolume, AugmentError, AugmentResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
    }
}

/// 增强参数.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentSpec<A> {
    block_size: usize,
    pad_value: A,
    margin: usize,
}

impl Default for AugmentSpec<f32> {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE, DEFAULT_PAD_VALUE, DEFAULT_MARGIN)
    }
}

impl<A> AugmentSpec<A> {
    /// 以立方块边长, 填充值和边距创建增强参数.
    pub fn new(block_size: usize, pad_value: A, margin: usize) -> Self {
        Self {
            block_size,
            pad_value,
            margin,
        }
    }

    /// 立方块边长.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 填充值.
    #[inline]
    pub fn pad_value(&self) -> &A {
        &self.pad_value
    }

    /// 边距.
    #[inline]
    pub fn margin(&self) -> usize {
        self.margin
    }

    /// 替换立方块边长.
    pub fn with_block_size(self, block_size: usize) -> Self {
        Self { block_size, ..self }
    }

    /// 替换填充值.
    pub fn with_pad_value(self, pad_value: A) -> Self {
        Self { pad_value, ..self }
    }

    /// 替换边距.
    pub fn with_margin(self, margin: usize) -> Self {
        Self { margin, ..self }
    }
}

/// 一次增强的结果.
#[derive(Clone, Debug)]
pub struct Augmented<A, D: Dimension> {
    cube: AnnotatedVolume<A, D>,
    scale_factor: f64,
    rotate_id: u8,
    orientation: Orientation,
    jitter: JitterOutcome,
}

impl<A, D: Dimension> Augmented<A, D> {
    /// 增强后的立方块及其分辨率, 目标点和物理半径.
    #[inline]
    pub fn cube(&self) -> &AnnotatedVolume<A, D> {
        &self.cube
    }

    /// 取出增强后的立方块.
    #[inline]
    pub fn into_cube(self) -> AnnotatedVolume<A, D> {
        self.cube
    }

    /// 采样得到的缩放因子.
    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// 使用的旋转编号.
    #[inline]
    pub fn rotate_id(&self) -> u8 {
        self.rotate_id
    }

    /// 旋转编号对应的变换.
    #[inline]
    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    /// 抖动裁剪的诊断信息.
    #[inline]
    pub fn jitter(&self) -> &JitterOutcome {
        &self.jitter
    }

    /// 将立方块中的目标点依次经过逆旋转, 裁剪窗口偏移和逆缩放,
    /// 映射回输入体数据的索引空间.
    ///
    /// 由于缩放时目标点被向下取整, 结果与输入目标点 `p` 满足
    /// `p - 1 / scale_factor < back <= p`.
    pub fn project_back(&self) -> Vec<f64> {
        // 旋转前后都是立方块, 形状相同.
        let p = self
            .orientation
            .unmap_point(self.cube.point(), self.cube.shape());
        izip!(p, self.jitter.window_start())
            .map(|(p, &start)| (p + start as f64) / self.scale_factor)
            .collect()
    }
}

/// 随机几何增强器.
///
/// 每次调用 [`Augmenter::augment`] 都相互独立, 随机源由调用方注入.
#[derive(Clone, Debug)]
pub struct Augmenter<A> {
    spec: AugmentSpec<A>,
}

impl Default for Augmenter<f32> {
    fn default() -> Self {
        Self::new(AugmentSpec::default())
    }
}

impl<A: Clone> Augmenter<A> {
    /// 以增强参数创建增强器.
    pub fn new(spec: AugmentSpec<A>) -> Self {
        Self { spec }
    }

    /// 增强参数.
    #[inline]
    pub fn spec(&self) -> &AugmentSpec<A> {
        &self.spec
    }

    /// 对一个带标注的体数据实施一次随机增强.
    ///
    /// 依次从 `rng` 中采样: 缩放因子 (`[0.75, 1.25]` 上均匀分布), 旋转编号
    /// (仅当 `rotate_id` 为 `None` 时采样, 二维 `0..8`, 三维 `0..24`),
    /// 以及各轴的抖动平移量. 然后依次执行缩放, 抖动裁剪和旋转.
    ///
    /// 输出立方块的物理半径来自缩放阶段, 分辨率和目标点来自旋转阶段.
    ///
    /// # 返回值
    ///
    /// - `input` 不是二维或三维时, 返回 `Err(UnsupportedDimension)`;
    /// - 给定的 `rotate_id` 超出范围时, 返回 `Err(InvalidRotateId)`, 此时不消耗随机数;
    /// - 立方块边长为 0 时, 返回 `Err(ZeroBlockSize)`.
    pub fn augment<D: Dimension, R: Rng + ?Sized>(
        &self,
        input: &AnnotatedVolume<A, D>,
        rotate_id: Option<u8>,
        rng: &mut R,
    ) -> AugmentResult<Augmented<A, D>> {
        let ndim = input.ndim();
        let id_count = Orientation::rotate_id_count(ndim)?;
        if let Some(rotate_id) = rotate_id.filter(|&id| id >= id_count) {
            return Err(AugmentError::InvalidRotateId { rotate_id, ndim });
        }
        if self.spec.block_size == 0 {
            return Err(AugmentError::ZeroBlockSize);
        }

        let scale_factor = rng.gen_range(SCALE_MIN..=SCALE_MAX);
        let rotate_id = match rotate_id {
            Some(id) => id,
            None => rng.gen_range(0..id_count),
        };
        let orientation = Orientation::from_rotate_id(rotate_id, ndim)?;
        log::debug!("augment {ndim}D volume: scale factor {scale_factor:.4}, rotate id {rotate_id}");

        let scaled = input.rescale(scale_factor)?;
        let (cropped, jitter) = scaled.random_crop(
            self.spec.block_size,
            self.spec.pad_value.clone(),
            self.spec.margin,
            rng,
        )?;
        let cube = cropped.reorient(&orientation)?;

        Ok(Augmented {
            cube,
            scale_factor,
            rotate_id,
            orientation,
            jitter,
        })
    }

    /// 依次增强一批数据. 第 `i` 个数据使用种子为 `seed + i` 的独立随机源.
    ///
    /// 结果与 [`Augmenter::par_augment_batch`] 完全一致.
    pub fn augment_batch<D: Dimension>(
        &self,
        inputs: &[AnnotatedVolume<A, D>],
        seed: u64,
    ) -> AugmentResult<Vec<Augmented<A, D>>> {
        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| self.augment(input, None, &mut item_rng(seed, i)))
            .collect()
    }
}

/// 批量增强中第 `index` 个数据的随机源.
#[inline]
fn item_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(index as u64))
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl<A: Clone + Send + Sync> Augmenter<A> {
    /// 借助 `rayon`, 并行地增强一批数据. 第 `i` 个数据使用种子为 `seed + i` 的独立随机源,
    /// 因此结果与调度顺序无关, 与 [`Augmenter::augment_batch`] 完全一致.
    pub fn par_augment_batch<D: Dimension>(
        &self,
        inputs: &[AnnotatedVolume<A, D>],
        seed: u64,
    ) -> AugmentResult<Vec<Augmented<A, D>>> {
        inputs
            .par_iter()
            .enumerate()
            .map(|(i, input)| self.augment(input, None, &mut item_rng(seed, i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{AugmentSpec, Augmenter};
    use crate::consts::scale::{SCALE_MAX, SCALE_MIN};
    use crate::{AnnotatedVolume, AugmentError};
    use ndarray::{s, Array1, Array2, Array3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn marked_2d() -> AnnotatedVolume<f32, ndarray::Ix2> {
        let mut v = Array2::<f32>::zeros((64, 64));
        v.slice_mut(s![28..33, 31..36]).fill(1.0);
        AnnotatedVolume::new(v, vec![1.0, 1.0], vec![30.0, 33.0], 2.0).unwrap()
    }

    fn marked_3d() -> AnnotatedVolume<f32, ndarray::Ix3> {
        let mut v = Array3::<f32>::zeros((40, 40, 40));
        v.slice_mut(s![18..23, 17..22, 19..24]).fill(1.0);
        AnnotatedVolume::new(v, vec![1.0; 3], vec![20.0, 19.0, 21.0], 1.0).unwrap()
    }

    #[test]
    fn test_spec_default_and_builders() {
        let spec = AugmentSpec::default();
        assert_eq!(spec.block_size(), 128);
        assert_eq!(*spec.pad_value(), 106.0);
        assert_eq!(spec.margin(), 10);

        let spec = spec.with_block_size(32).with_pad_value(-1.0).with_margin(4);
        assert_eq!(spec, AugmentSpec::new(32, -1.0, 4));
    }

    #[test]
    fn test_augment_2d_fixed_rotate_id() {
        let input = marked_2d();
        let aug = Augmenter::new(AugmentSpec::new(32, -1.0, 4));
        let mut rng = StdRng::seed_from_u64(11);
        for rotate_id in 0..8 {
            let out = aug.augment(&input, Some(rotate_id), &mut rng).unwrap();
            let s = out.scale_factor();
            assert!((SCALE_MIN..=SCALE_MAX).contains(&s));
            assert_eq!(out.rotate_id(), rotate_id);
            assert_eq!(out.cube().shape(), &[32, 32]);
            assert_eq!(out.cube().radius(), 2.0 * s);
            assert_eq!(out.cube().value_at_point(), Some(&1.0));
            for (&back, &p) in out.project_back().iter().zip(input.point()) {
                assert!(back <= p + 1e-9 && p - back < 1.0 / s, "{back} vs {p}");
            }
        }
    }

    #[test]
    fn test_augment_3d_random_rotate_id() {
        let input = marked_3d();
        let aug = Augmenter::new(AugmentSpec::new(16, 0.0, 2));
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..48 {
            let out = aug.augment(&input, None, &mut rng).unwrap();
            assert!(out.rotate_id() < 24);
            assert_eq!(out.cube().shape(), &[16, 16, 16]);
            assert_eq!(out.cube().value_at_point(), Some(&1.0));
            assert!(!out.jitter().is_clamped());
            let s = out.scale_factor();
            for (&back, &p) in out.project_back().iter().zip(input.point()) {
                assert!(back <= p + 1e-9 && p - back < 1.0 / s);
            }
            let mut spacing = out.cube().spacing().to_vec();
            spacing.iter_mut().for_each(|x| *x /= s);
            assert!(spacing.iter().all(|x| (x - 1.0).abs() < 1e-12));
        }
    }

    #[test]
    fn test_augment_draw_order() {
        let input = marked_2d();
        let aug = Augmenter::new(AugmentSpec::new(32, -1.0, 4));

        let out = aug
            .augment(&input, Some(3), &mut StdRng::seed_from_u64(5))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let s: f64 = rng.gen_range(SCALE_MIN..=SCALE_MAX);
        assert_eq!(out.scale_factor(), s);

        let out = aug
            .augment(&input, None, &mut StdRng::seed_from_u64(5))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let _: f64 = rng.gen_range(SCALE_MIN..=SCALE_MAX);
        let id: u8 = rng.gen_range(0..8);
        assert_eq!(out.rotate_id(), id);
    }

    #[test]
    fn test_augment_is_deterministic_under_seed() {
        let input = marked_3d();
        let aug = Augmenter::new(AugmentSpec::new(16, 0.0, 2));
        let a = aug.augment(&input, None, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = aug.augment(&input, None, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.cube().volume(), b.cube().volume());
        assert_eq!(a.cube().point(), b.cube().point());
        assert_eq!(a.jitter(), b.jitter());
    }

    #[test]
    fn test_augment_margin_exhausted() {
        let input = marked_2d();
        let aug = Augmenter::new(AugmentSpec::new(8, -1.0, 10));
        let out = aug
            .augment(&input, Some(0), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(out.jitter().is_clamped());
        assert_eq!(out.jitter().shift(), &[0, 0]);
        assert_eq!(out.cube().shape(), &[8, 8]);
    }

    #[test]
    fn test_augment_contract_violations() {
        let aug = Augmenter::new(AugmentSpec::new(8, 0.0, 0));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            aug.augment(&marked_2d(), Some(8), &mut rng),
            Err(AugmentError::InvalidRotateId { rotate_id: 8, .. })
        ));
        assert!(matches!(
            aug.augment(&marked_3d(), Some(24), &mut rng),
            Err(AugmentError::InvalidRotateId { rotate_id: 24, .. })
        ));

        let line = AnnotatedVolume::new(Array1::<f32>::zeros(5), vec![1.0], vec![0.0], 0.0).unwrap();
        assert!(matches!(
            aug.augment(&line, None, &mut rng),
            Err(AugmentError::UnsupportedDimension(1))
        ));

        let aug = Augmenter::new(AugmentSpec::new(0, 0.0, 0));
        assert!(matches!(
            aug.augment(&marked_2d(), None, &mut rng),
            Err(AugmentError::ZeroBlockSize)
        ));
    }

    #[test]
    fn test_augment_batch_seeding() {
        let inputs = vec![marked_2d(), marked_2d(), marked_2d()];
        let aug = Augmenter::new(AugmentSpec::new(32, -1.0, 4));
        let batch = aug.augment_batch(&inputs, 100).unwrap();
        assert_eq!(batch.len(), 3);
        for (i, out) in batch.iter().enumerate() {
            let single = aug
                .augment(&inputs[i], None, &mut StdRng::seed_from_u64(100 + i as u64))
                .unwrap();
            assert_eq!(out.cube().volume(), single.cube().volume());
            assert_eq!(out.rotate_id(), single.rotate_id());
        }
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_augment_batch_matches_sequential() {
        let inputs: Vec<_> = (0..8).map(|_| marked_3d()).collect();
        let aug = Augmenter::new(AugmentSpec::new(16, 0.0, 2));
        let seq = aug.augment_batch(&inputs, 42).unwrap();
        let par = aug.par_augment_batch(&inputs, 42).unwrap();
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.cube().volume(), b.cube().volume());
            assert_eq!(a.cube().point(), b.cube().point());
            assert_eq!(a.scale_factor(), b.scale_factor());
            assert_eq!(a.rotate_id(), b.rotate_id());
        }
    }
}

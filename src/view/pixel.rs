//! Per-pixel slice arithmetic.

use ndarray::{Array2, ArrayView2, Zip};

use crate::view::state::DisplayMode;

/// Min-max normalise a slice to [0, 1].
///
/// A constant slice maps to zeros. NaN samples are treated as the minimum.
pub fn normalize(slice: ArrayView2<'_, f32>) -> Array2<f32> {
    let (min, max) = slice
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return Array2::zeros(slice.raw_dim());
    }
    slice.mapv(|v| if v.is_finite() { (v - min) / range } else { 0.0 })
}

/// `part / (part + other)` elementwise, 0 where the sum is 0.
pub fn fraction(part: ArrayView2<'_, f32>, other: ArrayView2<'_, f32>) -> Array2<f32> {
    Zip::from(part).and(other).map_collect(|&p, &o| {
        let sum = p + o;
        if sum == 0.0 { 0.0 } else { p / sum }
    })
}

/// Slice images for a display mode, one per texture.
pub fn compose(mode: DisplayMode, fat: ArrayView2<'_, f32>, water: ArrayView2<'_, f32>) -> Vec<Array2<f32>> {
    match mode {
        DisplayMode::Fat => vec![normalize(fat)],
        DisplayMode::Water => vec![normalize(water)],
        DisplayMode::FatFraction => {
            let (fat, water) = (normalize(fat), normalize(water));
            vec![fraction(fat.view(), water.view())]
        }
        DisplayMode::WaterFraction => {
            let (fat, water) = (normalize(fat), normalize(water));
            vec![fraction(water.view(), fat.view())]
        }
        DisplayMode::FatWater => vec![normalize(fat), normalize(water)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_range() {
        let slice = array![[10.0_f32, 20.0], [30.0, 50.0]];
        let n = normalize(slice.view());
        assert_eq!(n, array![[0.0, 0.25], [0.5, 1.0]]);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let slice = Array2::<f32>::from_elem((3, 2), 7.0);
        assert_eq!(normalize(slice.view()), Array2::<f32>::zeros((3, 2)));
    }

    #[test]
    fn test_fat_fraction() {
        let fat = array![[0.2_f32, 0.8]];
        let water = array![[0.8_f32, 0.2]];
        let f = fraction(fat.view(), water.view());
        assert!((f[[0, 0]] - 0.2).abs() < 1e-6);
        assert!((f[[0, 1]] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_fraction_zero_sum() {
        let zeros = Array2::<f32>::zeros((1, 2));
        let f = fraction(zeros.view(), zeros.view());
        assert_eq!(f, zeros);
    }

    #[test]
    fn test_compose_modes() {
        let fat = array![[0.0_f32, 1.0], [2.0, 4.0]];
        let water = array![[4.0_f32, 2.0], [1.0, 0.0]];

        assert_eq!(compose(DisplayMode::Fat, fat.view(), water.view()).len(), 1);
        assert_eq!(compose(DisplayMode::FatWater, fat.view(), water.view()).len(), 2);

        let fat_fraction = &compose(DisplayMode::FatFraction, fat.view(), water.view())[0];
        let water_fraction = &compose(DisplayMode::WaterFraction, fat.view(), water.view())[0];
        for (f, w) in fat_fraction.iter().zip(water_fraction.iter()) {
            assert!((f + w - 1.0).abs() < 1e-6);
        }
        assert_eq!(fat_fraction[[0, 0]], 0.0);
        assert_eq!(fat_fraction[[1, 1]], 1.0);
    }
}

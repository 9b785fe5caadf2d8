//! Rounding whose behavior is defined by the
//! [font specification](https://learn.microsoft.com/en-us/typography/opentype/spec/otff).

/// Floating-point rounding per the [OpenType spec][spec].
///
/// Halfway cases round towards positive infinity, so `-0.5` becomes `0` and
/// `0.5` becomes `1`.
///
/// [spec]: https://docs.microsoft.com/en-us/typography/opentype/spec/otvaroverview#coordinate-scales-and-normalization
pub trait OtRound<U, T = Self> {
    fn ot_round(self) -> U;
}

impl OtRound<f64> for f64 {
    #[inline]
    fn ot_round(self) -> f64 {
        (self + 0.5).floor()
    }
}

impl OtRound<i64> for f64 {
    #[inline]
    fn ot_round(self) -> i64 {
        (self + 0.5).floor() as i64
    }
}

impl OtRound<i32> for f64 {
    #[inline]
    fn ot_round(self) -> i32 {
        (self + 0.5).floor() as i32
    }
}

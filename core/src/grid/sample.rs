use std::fmt::Debug;

/// Raw sample type stored in a [`Grid`](super::Grid).
///
/// The stored type never changes after construction; calibration works on
/// `f64` copies produced through [`Sample::to_f64`].
pub trait Sample: Copy + PartialEq + Debug + Send + Sync + 'static {
    const DTYPE: &'static str;

    fn to_f64(self) -> f64;

    /// Converts back from `f64`, rounding integers and saturating at the
    /// type bounds.
    fn from_f64(value: f64) -> Self;
}

macro_rules! integer_sample {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Sample for $ty {
                const DTYPE: &'static str = $name;

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value.round() as $ty
                }
            }
        )*
    };
}

integer_sample!(u8 => "uint8", u16 => "uint16", i16 => "int16", i32 => "int32");

impl Sample for f32 {
    const DTYPE: &'static str = "float32";

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    const DTYPE: &'static str = "float64";

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;
    fn clip(&self, min_thresh: T, max_thresh: T) -> T {
        if *self < min_thresh {
            min_thresh
        } else if *self > max_thresh {
            max_thresh
        } else {
            *self
        }
    }
}

#[test]
fn test_clip() {
    assert_eq!((-2.0_f64).clip(-1.0, 1.0), -1.0);
    assert_eq!((0.5_f64).clip(-1.0, 1.0), 0.5);
    assert_eq!((3.0_f32).clip(-1.0, 1.0), 1.0);
}

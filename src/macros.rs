/// Tolerance of [assert_f64_approx], loose enough for fitness accumulated over many ticks
pub const APPROX_TOLERANCE: f64 = 1e-9;

#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        assert!(
            ($l - $r).abs() < $crate::macros::APPROX_TOLERANCE,
            "assertion failed: {} !~ {}",
            $l,
            $r
        )
    };
    ($l:expr, $r:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < $crate::macros::APPROX_TOLERANCE,
            "assertion failed: {} !~ {}: {}",
            $l,
            $r,
            $msg
        )
    };
}

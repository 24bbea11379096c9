// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named easing curves.

use crate::error::SequencerError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Easing curve applied to a transition.
///
/// Stored by name (`"linear"`, `"easeInOut"`, ...). Parsing also accepts the
/// tween-library spellings found in older exports, such as `"none"` or
/// `"power1.inOut"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// Constant speed
    Linear,
    /// Cubic bezier (0.42, 0, 1, 1)
    EaseIn,
    /// Cubic bezier (0, 0, 0.58, 1)
    #[default]
    EaseOut,
    /// Cubic bezier (0.42, 0, 0.58, 1)
    EaseInOut,
    /// Quarter sine, slow start
    SineIn,
    /// Quarter sine, slow end
    SineOut,
    /// Half sine, slow at both ends
    SineInOut,
    /// Holds the start value, jumps at the end
    Step,
}

impl Ease {
    /// Every supported curve
    pub fn all() -> &'static [Ease] {
        &[
            Ease::Linear,
            Ease::EaseIn,
            Ease::EaseOut,
            Ease::EaseInOut,
            Ease::SineIn,
            Ease::SineOut,
            Ease::SineInOut,
            Ease::Step,
        ]
    }

    /// Canonical name used in exported files
    pub fn name(&self) -> &'static str {
        match self {
            Ease::Linear => "linear",
            Ease::EaseIn => "easeIn",
            Ease::EaseOut => "easeOut",
            Ease::EaseInOut => "easeInOut",
            Ease::SineIn => "sineIn",
            Ease::SineOut => "sineOut",
            Ease::SineInOut => "sineInOut",
            Ease::Step => "step",
        }
    }

    /// Map a linear time fraction to eased progress.
    ///
    /// The input is clamped to `[0, 1]`; every curve maps 0 to 0 and 1 to 1.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Ease::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Ease::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Ease::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ease {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let ease = match key.as_str() {
            "linear" | "none" => Ease::Linear,
            "easein" | "in" => Ease::EaseIn,
            "easeout" | "out" => Ease::EaseOut,
            "easeinout" | "inout" => Ease::EaseInOut,
            "sinein" | "sine.in" => Ease::SineIn,
            "sineout" | "sine.out" | "sine" => Ease::SineOut,
            "sineinout" | "sine.inout" => Ease::SineInOut,
            "step" | "steps(1)" => Ease::Step,
            other => match power_alias(other) {
                Some(ease) => ease,
                None => {
                    return Err(SequencerError::Validation(format!("unknown easing curve {s:?}")));
                }
            },
        };
        Ok(ease)
    }
}

/// `power1.in` .. `power4.inOut`, plus the bare `powerN` which eases out.
/// `power0` is linear whatever the suffix.
fn power_alias(key: &str) -> Option<Ease> {
    let rest = key.strip_prefix("power")?;
    let mut chars = rest.chars();
    let digit = chars.next()?;
    if !digit.is_ascii_digit() {
        return None;
    }
    let ease = match chars.as_str() {
        "" | ".out" => Ease::EaseOut,
        ".in" => Ease::EaseIn,
        ".inout" => Ease::EaseInOut,
        _ => return None,
    };
    Some(if digit == '0' { Ease::Linear } else { ease })
}

impl TryFrom<String> for Ease {
    type Error = SequencerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.name().to_string()
    }
}

/// Evaluate a CSS-style cubic bezier with end points (0,0) and (1,1).
///
/// Solves for the curve parameter whose x equals `x` (Newton-Raphson with a
/// bisection fallback), then returns the matching y.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let ax = 1.0 + 3.0 * x1 - 3.0 * x2;
    let bx = 3.0 * x2 - 6.0 * x1;
    let cx = 3.0 * x1;
    let ay = 1.0 + 3.0 * y1 - 3.0 * y2;
    let by = 3.0 * y2 - 6.0 * y1;
    let cy = 3.0 * y1;

    let sample_x = |s: f64| ((ax * s + bx) * s + cx) * s;
    let sample_y = |s: f64| ((ay * s + by) * s + cy) * s;
    let slope_x = |s: f64| (3.0 * ax * s + 2.0 * bx) * s + cx;

    let mut s = x;
    for _ in 0..8 {
        let err = sample_x(s) - x;
        if err.abs() < EPSILON {
            return sample_y(s);
        }
        let d = slope_x(s);
        if d.abs() < 1e-6 {
            break;
        }
        s = (s - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    while lo < hi {
        let current = sample_x(s);
        if (current - x).abs() < EPSILON {
            break;
        }
        if x > current {
            lo = s;
        } else {
            hi = s;
        }
        let next = (lo + hi) / 2.0;
        if next == s {
            break;
        }
        s = next;
    }
    sample_y(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curves_hit_end_points() {
        for ease in Ease::all() {
            assert!(ease.apply(0.0).abs() < 1e-6, "{ease} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease} at 1");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Ease::Linear.apply(-0.5), 0.0);
        assert_eq!(Ease::Linear.apply(1.5), 1.0);
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let mid = Ease::EaseInOut.apply(0.5);
        assert!((mid - 0.5).abs() < 1e-4);

        let early = Ease::EaseInOut.apply(0.25);
        let late = Ease::EaseInOut.apply(0.75);
        assert!((early + late - 1.0).abs() < 1e-4);
        assert!(early < 0.25);
    }

    #[test]
    fn test_ease_in_starts_slow_and_ease_out_starts_fast() {
        assert!(Ease::EaseIn.apply(0.3) < 0.3);
        assert!(Ease::EaseOut.apply(0.3) > 0.3);
        assert!(Ease::SineIn.apply(0.3) < 0.3);
        assert!(Ease::SineOut.apply(0.3) > 0.3);
    }

    #[test]
    fn test_curves_are_monotonic() {
        for ease in Ease::all() {
            let mut previous = 0.0;
            for i in 0..=100 {
                let value = ease.apply(f64::from(i) / 100.0);
                assert!(value + 1e-6 >= previous, "{ease} not monotonic at step {i}");
                previous = value;
            }
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("linear".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("easeInOut".parse::<Ease>().unwrap(), Ease::EaseInOut);
        assert_eq!("ease-in-out".parse::<Ease>().unwrap(), Ease::EaseInOut);
        assert_eq!("power1.inOut".parse::<Ease>().unwrap(), Ease::EaseInOut);
        assert_eq!("power2.in".parse::<Ease>().unwrap(), Ease::EaseIn);
        assert_eq!("power3".parse::<Ease>().unwrap(), Ease::EaseOut);
        assert_eq!("sine.inOut".parse::<Ease>().unwrap(), Ease::SineInOut);
        assert!("wobble".parse::<Ease>().is_err());
        assert!("powerX.in".parse::<Ease>().is_err());
        assert_eq!("power0".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("power0.in".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("power0.out".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("power0.inOut".parse::<Ease>().unwrap(), Ease::Linear);
        assert!("power0.sideways".parse::<Ease>().is_err());
    }

    #[test]
    fn test_canonical_names_parse_back() {
        for ease in Ease::all() {
            assert_eq!(ease.name().parse::<Ease>().unwrap(), *ease);
        }
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&Ease::EaseInOut).unwrap();
        assert_eq!(json, "\"easeInOut\"");
        let ease: Ease = serde_json::from_str("\"power1.out\"").unwrap();
        assert_eq!(ease, Ease::EaseOut);
        assert!(serde_json::from_str::<Ease>("\"bogus\"").is_err());
    }
}

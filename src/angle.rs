//! Angle and pulse-width arithmetic
//!
//! Integer-only helpers shared by the interpolator and joint transforms.

/// Largest angle a servo channel accepts, in degrees
pub const MAX_ANGLE: u8 = 180;

/// Clamp a signed angle into `0..=180` degrees
#[inline]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub const fn clamp_angle(angle: i16) -> u8 {
    if angle < 0 {
        0
    } else if angle > MAX_ANGLE as i16 {
        MAX_ANGLE
    } else {
        angle as u8
    }
}

/// Inclusive range of logical angles a joint may be commanded to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleRange {
    pub min: u8,
    pub max: u8,
}

impl AngleRange {
    /// Full servo sweep
    pub const FULL: Self = Self {
        min: 0,
        max: MAX_ANGLE,
    };

    /// Clamp a signed angle into this range.
    ///
    /// The result never leaves `0..=180`, even for a misconfigured range.
    #[inline]
    pub const fn clamp(self, angle: i16) -> u8 {
        let angle = clamp_angle(angle);
        let min = if self.min > MAX_ANGLE { MAX_ANGLE } else { self.min };
        let max = if self.max > MAX_ANGLE { MAX_ANGLE } else { self.max };
        if angle < min {
            min
        } else if angle > max {
            max
        } else {
            angle
        }
    }
}

/// Pulse-width bounds (in driver ticks) matching 0 and 180 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRange {
    /// Pulse for 0 degrees
    pub min: u16,
    /// Pulse for 180 degrees
    pub max: u16,
}

impl PulseRange {
    /// Map an angle onto the pulse range
    ///
    /// Linear with integer truncation toward `min`. Works for inverted
    /// ranges (`min > max`) as well.
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn pulse_for(self, angle: u8) -> u16 {
        let angle = if angle > MAX_ANGLE { MAX_ANGLE } else { angle };
        let span = self.max as i32 - self.min as i32;
        let offset = span * angle as i32 / MAX_ANGLE as i32;
        (self.min as i32 + offset) as u16
    }
}

impl Default for PulseRange {
    fn default() -> Self {
        Self { min: 150, max: 600 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_angle() {
        assert_eq!(clamp_angle(-20), 0);
        assert_eq!(clamp_angle(0), 0);
        assert_eq!(clamp_angle(97), 97);
        assert_eq!(clamp_angle(180), 180);
        assert_eq!(clamp_angle(400), 180);
    }

    #[test]
    fn test_range_clamp() {
        let arm = AngleRange { min: 0, max: 120 };
        assert_eq!(arm.clamp(-5), 0);
        assert_eq!(arm.clamp(60), 60);
        assert_eq!(arm.clamp(150), 120);

        let broken = AngleRange { min: 10, max: 250 };
        assert_eq!(broken.clamp(300), 180);
    }

    #[test]
    fn test_pulse_for() {
        let pulse = PulseRange::default();
        assert_eq!(pulse.pulse_for(0), 150);
        assert_eq!(pulse.pulse_for(90), 375);
        assert_eq!(pulse.pulse_for(180), 600);
        assert_eq!(pulse.pulse_for(1), 152);
    }
}

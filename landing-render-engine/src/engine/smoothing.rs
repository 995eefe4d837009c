use bevy::math::Vec2;

/// Moves a value toward its target by a fixed fraction of the remaining
/// distance each step.
///
/// With a factor in `(0, 1]` the approach is monotonic and never overshoots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother {
    pub current: Vec2,
    pub target: Vec2,
    factor: f32,
}

impl ExponentialSmoother {
    pub fn new(factor: f32) -> Self {
        Self {
            current: Vec2::ZERO,
            target: Vec2::ZERO,
            factor: clamp_factor(factor),
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn set_factor(&mut self, factor: f32) {
        self.factor = clamp_factor(factor);
    }

    pub fn step(&mut self) -> Vec2 {
        self.current += (self.target - self.current) * self.factor;
        self.current
    }
}

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_finite() {
        factor.clamp(f32::EPSILON, 1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_monotonically_without_overshoot() {
        let mut smoother = ExponentialSmoother::new(0.1);
        smoother.target = Vec2::new(500.0, -300.0);

        let mut previous = smoother.current.distance(smoother.target);
        for _ in 0..200 {
            let position = smoother.step();
            assert!(position.x <= 500.0 && position.y >= -300.0);
            let distance = position.distance(smoother.target);
            assert!(distance <= previous);
            previous = distance;
        }
        assert!(previous < 0.01);
    }

    #[test]
    fn full_factor_snaps_and_bad_factors_are_clamped() {
        let mut smoother = ExponentialSmoother::new(1.0);
        smoother.target = Vec2::new(3.0, 4.0);
        assert_eq!(smoother.step(), Vec2::new(3.0, 4.0));

        assert_eq!(ExponentialSmoother::new(7.5).factor(), 1.0);
        assert_eq!(ExponentialSmoother::new(f32::NAN).factor(), 1.0);
        assert!(ExponentialSmoother::new(-1.0).factor() > 0.0);
    }
}

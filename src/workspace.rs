//! Forbidden workspace volumes. The end effector must never enter any of them,
//! the typical example being the support structure or the table under the arm.

use nalgebra::Vector3;

/// A region of space the end effector must stay out of.
pub trait WorkspaceVolume: Send + Sync {
    fn contains(&self, point: &Vector3<f64>) -> bool;
}

/// Box aligned with the axes of the frame the positions are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignedBox {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl AxisAlignedBox {
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        AxisAlignedBox {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    /// Box of the given half extents around the centre.
    pub fn around(center: Vector3<f64>, half_extents: Vector3<f64>) -> Self {
        let half = half_extents.abs();
        AxisAlignedBox::new(center - half, center + half)
    }

    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) / 2.0
    }

    /// The same box scaled about its centre. A factor below 1 shrinks it.
    pub fn shrunk(&self, factor: f64) -> Self {
        let center = self.center();
        let half = (self.max - self.min) * (factor.max(0.0) / 2.0);
        AxisAlignedBox::new(center - half, center + half)
    }
}

impl WorkspaceVolume for AxisAlignedBox {
    fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

/// Everything on the side of the plane the normal points away from. With the normal
/// pointing up, this is everything below the table surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfSpace {
    pub point: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl HalfSpace {
    /// Everything below the horizontal plane at the given height.
    pub fn below(height: f64) -> Self {
        HalfSpace {
            point: Vector3::new(0.0, 0.0, height),
            normal: Vector3::z(),
        }
    }

    /// Everything above the horizontal plane at the given height.
    pub fn above(height: f64) -> Self {
        HalfSpace {
            point: Vector3::new(0.0, 0.0, height),
            normal: -Vector3::z(),
        }
    }
}

impl WorkspaceVolume for HalfSpace {
    fn contains(&self, point: &Vector3<f64>) -> bool {
        (point - self.point).dot(&self.normal) < 0.0
    }
}

/// Set of forbidden volumes. Empty workspace allows every position.
#[derive(Default)]
pub struct Workspace {
    forbidden: Vec<Box<dyn WorkspaceVolume>>,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace { forbidden: Vec::new() }
    }

    pub fn with_volume(mut self, volume: impl WorkspaceVolume + 'static) -> Self {
        self.forbidden.push(Box::new(volume));
        self
    }

    pub fn add(&mut self, volume: Box<dyn WorkspaceVolume>) {
        self.forbidden.push(volume);
    }

    pub fn len(&self) -> usize {
        self.forbidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
    }

    /// True if the point lies inside any of the forbidden volumes.
    pub fn is_forbidden(&self, point: &Vector3<f64>) -> bool {
        self.forbidden.iter().any(|volume| volume.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_contains() {
        let b = AxisAlignedBox::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(-1.0, -1.0, 0.0));
        assert!(b.contains(&Vector3::new(0.0, 0.0, 0.5)));
        assert!(b.contains(&Vector3::new(1.0, -1.0, 1.0))); // corner is inside
        assert!(!b.contains(&Vector3::new(0.0, 0.0, 1.5)));
        assert!(!b.contains(&Vector3::new(0.0, -1.1, 0.5)));
    }

    #[test]
    fn test_box_shrunk() {
        let b = AxisAlignedBox::around(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.5, 0.5, 0.5));
        let small = b.shrunk(0.1);
        assert!((small.center() - b.center()).norm() < 1e-12);
        assert!((small.max - small.min - Vector3::new(0.1, 0.1, 0.1)).norm() < 1e-12);
        assert!(b.contains(&Vector3::new(1.4, 2.0, 3.0)));
        assert!(!small.contains(&Vector3::new(1.4, 2.0, 3.0)));
    }

    #[test]
    fn test_half_space() {
        let table = HalfSpace::below(0.1);
        assert!(table.contains(&Vector3::new(5.0, -3.0, 0.0)));
        assert!(!table.contains(&Vector3::new(0.0, 0.0, 0.2)));
        assert!(!table.contains(&Vector3::new(0.0, 0.0, 0.1))); // surface itself is allowed

        let ceiling = HalfSpace::above(2.0);
        assert!(ceiling.contains(&Vector3::new(0.0, 0.0, 2.5)));
        assert!(!ceiling.contains(&Vector3::new(0.0, 0.0, 1.5)));
    }

    #[test]
    fn test_workspace() {
        let workspace = Workspace::new()
            .with_volume(HalfSpace::below(0.0))
            .with_volume(AxisAlignedBox::around(Vector3::new(0.5, 0.0, 0.5), Vector3::new(0.1, 0.1, 0.1)));
        assert_eq!(workspace.len(), 2);
        assert!(workspace.is_forbidden(&Vector3::new(0.0, 0.0, -0.1)));
        assert!(workspace.is_forbidden(&Vector3::new(0.55, 0.05, 0.45)));
        assert!(!workspace.is_forbidden(&Vector3::new(0.0, 0.0, 0.5)));
        assert!(!Workspace::new().is_forbidden(&Vector3::new(0.0, 0.0, -100.0)));
    }
}

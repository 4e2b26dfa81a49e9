use std::fmt;

/// A cubic, axis-aligned periodic box with edge length in Ångström.
///
/// The edge is always finite and strictly positive; [`BoxGeometry::new`] is the only
/// way to build one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    edge: f64,
}

impl BoxGeometry {
    /// Returns `None` when `edge` is non-finite or not strictly positive.
    pub fn new(edge: f64) -> Option<Self> {
        (edge.is_finite() && edge > 0.0).then_some(Self { edge })
    }

    #[inline]
    pub fn edge(&self) -> f64 {
        self.edge
    }

    /// A box grown by `padding` Å on every edge. Negative padding that would collapse
    /// the box yields `None`.
    pub fn padded(&self, padding: f64) -> Option<Self> {
        Self::new(self.edge + padding)
    }
}

impl fmt::Display for BoxGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} Å cube", self.edge)
    }
}

//! In-memory surface

use crate::{Primitive, PrimitiveHandle, PrimitiveKind, PrimitiveStyle, RenderSurface};

/// Surface that keeps primitives in insertion order without drawing them
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    primitives: Vec<Primitive>,
    next_handle: u64,
    autoscale_count: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives in the order they were added
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn get(&self, handle: PrimitiveHandle) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// How many times the view was asked to rescale
    pub fn autoscale_count(&self) -> usize {
        self.autoscale_count
    }
}

impl RenderSurface for RecordingSurface {
    fn add_primitive(
        &mut self,
        kind: PrimitiveKind,
        x: Vec<f64>,
        y: Option<Vec<f64>>,
        style: PrimitiveStyle,
    ) -> PrimitiveHandle {
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;

        let y = y.unwrap_or_else(|| (0..x.len()).map(|i| i as f64).collect());
        self.primitives.push(Primitive { handle, kind, x, y, style });
        handle
    }

    fn remove_primitive(&mut self, handle: PrimitiveHandle) -> bool {
        let before = self.primitives.len();
        self.primitives.retain(|p| p.handle != handle);
        self.primitives.len() != before
    }

    fn clear_all(&mut self) {
        self.primitives.clear();
    }

    fn autoscale(&mut self) {
        self.autoscale_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_core::Rgb;

    #[test]
    fn test_handles_are_unique_across_clears() {
        let mut surface = RecordingSurface::new();
        let style = PrimitiveStyle::new("a", Rgb::GRAY);

        let first = surface.add_primitive(PrimitiveKind::Line, vec![1.0], Some(vec![2.0]), style.clone());
        surface.clear_all();
        let second = surface.add_primitive(PrimitiveKind::Line, vec![1.0], Some(vec![2.0]), style);

        assert_ne!(first, second);
        assert!(!surface.remove_primitive(first));
        assert!(surface.remove_primitive(second));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_missing_y_uses_positions() {
        let mut surface = RecordingSurface::new();
        let handle = surface.add_primitive(
            PrimitiveKind::Scatter,
            vec![5.0, 6.0, 7.0],
            None,
            PrimitiveStyle::new("x only", Rgb::GRAY),
        );

        assert_eq!(surface.get(handle).unwrap().y, vec![0.0, 1.0, 2.0]);
    }
}

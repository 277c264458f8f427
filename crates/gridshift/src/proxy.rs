#![forbid(unsafe_code)]

//! Floating proxy snapshot and decoration hook.

use gridshift_core::Rect;
use serde::{Deserialize, Serialize};

use crate::index::GridIndex;

/// Visual treatment applied to the proxy at a given lift progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProxyDecoration {
    pub elevation: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for ProxyDecoration {
    fn default() -> Self {
        Self {
            elevation: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

impl ProxyDecoration {
    /// Pair this decoration with host content.
    #[must_use]
    pub fn wrap<C>(self, content: C) -> Decorated<C> {
        Decorated {
            decoration: self,
            content,
        }
    }
}

/// Host content carrying the decoration it should be painted with.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorated<C> {
    pub decoration: ProxyDecoration,
    pub content: C,
}

impl<C> Decorated<C> {
    #[must_use]
    pub fn into_inner(self) -> C {
        self.content
    }
}

/// Hook choosing how the proxy looks while lifted.
///
/// `progress` is the eased lift progress: 0.0 at rest, 1.0 fully lifted.
pub trait ProxyDecorator {
    fn decorate(&self, index: GridIndex, progress: f32) -> ProxyDecoration;
}

impl<F> ProxyDecorator for F
where
    F: Fn(GridIndex, f32) -> ProxyDecoration,
{
    fn decorate(&self, index: GridIndex, progress: f32) -> ProxyDecoration {
        self(index, progress)
    }
}

/// Default decorator: raise to `elevation`, optionally scaling up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationDecorator {
    elevation: f32,
    lifted_scale: f32,
}

impl ElevationDecorator {
    #[must_use]
    pub const fn new(elevation: f32) -> Self {
        Self {
            elevation,
            lifted_scale: 1.0,
        }
    }

    #[must_use]
    pub const fn with_lifted_scale(mut self, scale: f32) -> Self {
        self.lifted_scale = scale;
        self
    }
}

impl Default for ElevationDecorator {
    fn default() -> Self {
        Self::new(6.0)
    }
}

impl ProxyDecorator for ElevationDecorator {
    fn decorate(&self, _index: GridIndex, progress: f32) -> ProxyDecoration {
        let t = progress.clamp(0.0, 1.0);
        ProxyDecoration {
            elevation: self.elevation * t,
            scale: 1.0 + (self.lifted_scale - 1.0) * t,
            opacity: 1.0,
        }
    }
}

/// What the overlay needs to paint the proxy this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxySnapshot {
    /// Index of the dragged cell whose content the proxy shows.
    pub index: GridIndex,
    pub rect: Rect,
    /// Eased lift progress.
    pub progress: f32,
    pub decoration: ProxyDecoration,
}

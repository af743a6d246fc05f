//! Properties-panel bridge: reads the shared style of the selection and writes
//! style changes back through the history.

use crate::draw::Color;
use crate::scene::Style;

/// A style attribute across several annotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mixed<T> {
    /// Every selected annotation has this value
    Uniform(T),
    /// The selection disagrees
    Mixed,
}

impl<T: PartialEq> Mixed<T> {
    /// Folds one more value in.
    fn merge(self, value: T) -> Self {
        match self {
            Mixed::Uniform(current) if current == value => Mixed::Uniform(current),
            _ => Mixed::Mixed,
        }
    }

    pub fn uniform(self) -> Option<T> {
        match self {
            Mixed::Uniform(value) => Some(value),
            Mixed::Mixed => None,
        }
    }
}

/// Merged style of the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionStyle {
    pub stroke: Mixed<Color>,
    pub width: Mixed<f64>,
    pub fill: Mixed<Option<Color>>,
    pub opacity: Mixed<f64>,
    pub font_size: Mixed<f64>,
}

impl SelectionStyle {
    /// Merges the styles of `styles`; `None` for an empty selection.
    pub fn merge<'a, I>(styles: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Style>,
    {
        let mut styles = styles.into_iter();
        let first = styles.next()?;
        let seed = SelectionStyle {
            stroke: Mixed::Uniform(first.stroke),
            width: Mixed::Uniform(first.width),
            fill: Mixed::Uniform(first.fill),
            opacity: Mixed::Uniform(first.opacity),
            font_size: Mixed::Uniform(first.font_size),
        };
        Some(styles.fold(seed, |acc, style| SelectionStyle {
            stroke: acc.stroke.merge(style.stroke),
            width: acc.width.merge(style.width),
            fill: acc.fill.merge(style.fill),
            opacity: acc.opacity.merge(style.opacity),
            font_size: acc.font_size.merge(style.font_size),
        }))
    }
}

/// Attributes to overwrite; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleChange {
    pub stroke: Option<Color>,
    pub width: Option<f64>,
    /// `Some(None)` removes the fill
    pub fill: Option<Option<Color>>,
    pub opacity: Option<f64>,
    pub font_size: Option<f64>,
}

impl StyleChange {
    pub fn is_empty(&self) -> bool {
        self.stroke.is_none()
            && self.width.is_none()
            && self.fill.is_none()
            && self.opacity.is_none()
            && self.font_size.is_none()
    }

    /// Returns `style` with this change applied.
    pub fn applied_to(&self, style: &Style) -> Style {
        Style {
            stroke: self.stroke.unwrap_or(style.stroke),
            width: self.width.map_or(style.width, |w| w.max(0.5)),
            fill: self.fill.unwrap_or(style.fill),
            opacity: self.opacity.map_or(style.opacity, |o| o.clamp(0.0, 1.0)),
            font_size: self.font_size.map_or(style.font_size, |s| s.max(1.0)),
        }
    }
}

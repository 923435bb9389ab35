//! Style layers applied to character cells.
//!
//! A line store owns a fixed table of [`Style`] objects. Slot `n` of that
//! table corresponds to bit `n` of the [`StyleIndex`] mask stored in every
//! [`Char`](crate::Char), so a character can carry up to 16 or 32 concurrent
//! styles depending on the store's [`StyleCapacity`].
//!
//! # Examples
//!
//! ```
//! use richtext_core::{Rgba, Style, StyleIndex, TextAttributes};
//!
//! let keyword = Style::fg(Rgba::BLUE).with_bold();
//! assert!(keyword.attributes.contains(TextAttributes::BOLD));
//!
//! let mask = StyleIndex::layer(0) | StyleIndex::layer(3);
//! assert!(mask.has_layer(3));
//! assert_eq!(mask.layers().collect::<Vec<_>>(), vec![0, 3]);
//! ```

use crate::color::Rgba;
use bitflags::bitflags;

bitflags! {
    /// Rendering attributes of a style layer.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u8 {
        const BOLD          = 0x01;
        const DIM           = 0x02;
        const ITALIC        = 0x04;
        const UNDERLINE     = 0x08;
        const INVERSE       = 0x10;
        const STRIKETHROUGH = 0x20;
    }
}

bitflags! {
    /// Per-character mask of active style layers.
    ///
    /// Bit `n` set means the style in slot `n` of the owning store applies.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct StyleIndex: u32 {
        const _ = !0;
    }
}

impl StyleIndex {
    /// No layers.
    pub const NONE: Self = Self::empty();

    /// Mask with only the layer for `slot` set. Slots above 31 yield
    /// an empty mask.
    #[must_use]
    pub const fn layer(slot: usize) -> Self {
        if slot >= 32 {
            return Self::NONE;
        }
        Self::from_bits_retain(1 << slot)
    }

    #[must_use]
    pub const fn has_layer(self, slot: usize) -> bool {
        slot < 32 && self.bits() & (1 << slot) != 0
    }

    /// Iterate the slot numbers set in this mask, lowest first.
    pub fn layers(self) -> impl Iterator<Item = usize> {
        (0..32).filter(move |&slot| self.has_layer(slot))
    }
}

/// Number of slots in a store's style table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleCapacity {
    Sixteen,
    #[default]
    ThirtyTwo,
}

impl StyleCapacity {
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::Sixteen => 16,
            Self::ThirtyTwo => 32,
        }
    }

    /// Mask of every layer representable with this capacity.
    #[must_use]
    pub const fn mask(self) -> StyleIndex {
        match self {
            Self::Sixteen => StyleIndex::from_bits_retain(0xFFFF),
            Self::ThirtyTwo => StyleIndex::all(),
        }
    }
}

/// A style layer: colors plus attributes.
///
/// `None` colors mean "inherit from the renderer's default".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    pub attributes: TextAttributes,
}

impl Style {
    /// Empty style with no colors or attributes.
    pub const NONE: Self = Self {
        fg: None,
        bg: None,
        attributes: TextAttributes::empty(),
    };

    /// Create a style with only a foreground color.
    #[must_use]
    pub const fn fg(color: Rgba) -> Self {
        Self {
            fg: Some(color),
            ..Self::NONE
        }
    }

    /// Create a style with only a background color.
    #[must_use]
    pub const fn bg(color: Rgba) -> Self {
        Self {
            bg: Some(color),
            ..Self::NONE
        }
    }

    #[must_use]
    pub const fn bold() -> Self {
        Self {
            attributes: TextAttributes::BOLD,
            ..Self::NONE
        }
    }

    #[must_use]
    pub const fn underline() -> Self {
        Self {
            attributes: TextAttributes::UNDERLINE,
            ..Self::NONE
        }
    }

    #[must_use]
    pub const fn with_fg(self, color: Rgba) -> Self {
        Self {
            fg: Some(color),
            ..self
        }
    }

    #[must_use]
    pub const fn with_bg(self, color: Rgba) -> Self {
        Self {
            bg: Some(color),
            ..self
        }
    }

    /// Return a new style with the specified attributes added.
    #[must_use]
    pub const fn with_attributes(self, attrs: TextAttributes) -> Self {
        Self {
            attributes: self.attributes.union(attrs),
            ..self
        }
    }

    #[must_use]
    pub const fn with_bold(self) -> Self {
        self.with_attributes(TextAttributes::BOLD)
    }

    /// Check if this style has any non-default properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attributes.is_empty()
    }

    /// Merge two styles, with `other` taking precedence for set values.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attributes: self.attributes | other.attributes,
        }
    }
}

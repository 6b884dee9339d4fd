//! Material design inspired styling for the UI.
//!
//! This module centralises colors, spacing, icon rendering and basic widget
//! styles so the application keeps a consistent Material look.

use google_material_symbols::GoogleMaterialSymbols;
use iced::widget::{button, checkbox, container, progress_bar};
use iced::{theme, Border, Color, Element, Theme};

pub type MaterialSymbol = GoogleMaterialSymbols;

/// Material color palette
pub struct Palette;

impl Palette {
    pub const PRIMARY: Color = Color { r: 0.25, g: 0.32, b: 0.71, a: 1.0 }; // Indigo 700
    pub const ON_PRIMARY: Color = Color::WHITE;
    pub const SURFACE: Color = Color { r: 0.98, g: 0.98, b: 0.98, a: 1.0 };
    pub const ON_SURFACE: Color = Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 };
    pub const MUTED: Color = Color { r: 0.46, g: 0.46, b: 0.46, a: 1.0 };
    pub const ERROR: Color = Color { r: 0.80, g: 0.0, b: 0.0, a: 1.0 };
    pub const WARNING: Color = Color { r: 0.60, g: 0.42, b: 0.0, a: 1.0 };

    pub const SPACING: u16 = 16;
    pub const ICON_SIZE: u16 = 20;
}

/// Render a Material Symbols glyph as a text element.
pub fn icon<'a, Message: 'a>(symbol: MaterialSymbol, size: u16, color: Color) -> Element<'a, Message> {
    // Equivalent to `google_material_symbols`' `IcedExt::into_text`, inlined here
    // because that helper targets iced 0.13 while this crate uses iced 0.12.
    let font = iced::Font {
        family: iced::font::Family::Name(MaterialSymbol::FONT_FAMILY),
        ..iced::Font::default()
    };
    iced::widget::text(char::from(symbol))
        .font(font)
        .size(size)
        .style(theme::Text::Color(color))
        .into()
}

struct Primary;

impl button::StyleSheet for Primary {
    type Style = Theme;

    fn active(&self, _style: &Theme) -> button::Appearance {
        button::Appearance {
            background: Some(Palette::PRIMARY.into()),
            text_color: Palette::ON_PRIMARY,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        }
    }

    fn disabled(&self, style: &Theme) -> button::Appearance {
        button::Appearance {
            background: Some(Color { a: 0.4, ..Palette::PRIMARY }.into()),
            text_color: Color { a: 0.7, ..Palette::ON_PRIMARY },
            ..self.active(style)
        }
    }
}

struct Outlined;

impl button::StyleSheet for Outlined {
    type Style = Theme;

    fn active(&self, _style: &Theme) -> button::Appearance {
        button::Appearance {
            background: Some(Palette::SURFACE.into()),
            text_color: Palette::PRIMARY,
            border: Border {
                color: Palette::PRIMARY,
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        }
    }
}

/// Style for primary action buttons.
pub fn button_primary() -> theme::Button {
    theme::Button::Custom(Box::new(Primary))
}

/// Style for secondary, outlined buttons.
pub fn button_outlined() -> theme::Button {
    theme::Button::Custom(Box::new(Outlined))
}

/// Tab strip buttons: filled when active, outlined otherwise.
pub fn button_tab(active: bool) -> theme::Button {
    if active {
        button_primary()
    } else {
        button_outlined()
    }
}

/// Container style that mimics Material "cards".
pub fn card() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        background: Some(Palette::SURFACE.into()),
        text_color: Some(Palette::ON_SURFACE),
        border: Border {
            color: Palette::PRIMARY,
            width: 1.0,
            radius: 4.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Dimmed rendition of a card for tiles outside the scroll viewport.
pub fn card_dimmed() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        background: Some(Color { a: 0.3, ..Palette::SURFACE }.into()),
        text_color: Some(Color { a: 0.3, ..Palette::ON_SURFACE }),
        border: Border {
            color: Color { a: 0.3, ..Palette::PRIMARY },
            width: 1.0,
            radius: 4.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Banner for error messages.
pub fn error_banner() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        text_color: Some(Color::from_rgb(0.5, 0.0, 0.0)),
        background: Some(Color::from_rgb(1.0, 0.9, 0.9).into()),
        border: Border {
            color: Palette::ERROR,
            width: 1.0,
            radius: 2.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Banner for the missing-feature-index warning.
pub fn warning_banner() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        text_color: Some(Palette::WARNING),
        background: Some(Color::from_rgb(1.0, 0.97, 0.85).into()),
        border: Border {
            color: Palette::WARNING,
            width: 1.0,
            radius: 2.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Dark rounded container for the transient toast.
pub fn toast_container() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        text_color: Some(Palette::ON_PRIMARY),
        background: Some(Color { r: 0.18, g: 0.18, b: 0.18, a: 0.95 }.into()),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 16.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Badge marking original, non-deletable images.
pub fn original_badge() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        text_color: Some(Palette::ON_PRIMARY),
        background: Some(Palette::PRIMARY.into()),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 8.0.into(),
        },
        shadow: Default::default(),
    }))
}

/// Semi-opaque full-window backdrop behind the modal viewer.
pub fn backdrop() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &Theme| container::Appearance {
        text_color: Some(Palette::ON_PRIMARY),
        background: Some(Color { r: 0.0, g: 0.0, b: 0.0, a: 0.8 }.into()),
        border: Border::default(),
        shadow: Default::default(),
    }))
}

struct PrimaryCheckbox;

impl checkbox::StyleSheet for PrimaryCheckbox {
    type Style = Theme;

    fn active(&self, _style: &Theme, is_checked: bool) -> checkbox::Appearance {
        checkbox::Appearance {
            background: if is_checked {
                Palette::PRIMARY.into()
            } else {
                Palette::SURFACE.into()
            },
            icon_color: Palette::ON_PRIMARY,
            border: Border {
                color: Palette::PRIMARY,
                width: 1.0,
                radius: 2.0.into(),
            },
            text_color: None,
        }
    }

    fn hovered(&self, style: &Theme, is_checked: bool) -> checkbox::Appearance {
        self.active(style, is_checked)
    }
}

/// Style for checkboxes using the primary color.
pub fn checkbox_primary() -> theme::Checkbox {
    theme::Checkbox::Custom(Box::new(PrimaryCheckbox))
}

struct SimilarityBar;

impl progress_bar::StyleSheet for SimilarityBar {
    type Style = Theme;

    fn appearance(&self, _style: &Theme) -> progress_bar::Appearance {
        progress_bar::Appearance {
            background: Color { r: 0.88, g: 0.88, b: 0.92, a: 1.0 }.into(),
            bar: Palette::PRIMARY.into(),
            border_radius: 3.0.into(),
        }
    }
}

/// Proportional fill bar under each search result.
pub fn similarity_bar() -> theme::ProgressBar {
    theme::ProgressBar::Custom(Box::new(SimilarityBar))
}

//! Transient toast notification shared by every flow.
//!
//! Progress toasts persist until replaced; outcome toasts are auto-dismissed
//! by an epoch-guarded timer so a stale timer never clears a newer toast.

use crate::style::{self, MaterialSymbol, Palette};
use crate::Message;
use iced::widget::{container, row, text};
use iced::Element;

#[derive(Debug, Clone)]
pub struct Toast {
    pub symbol: MaterialSymbol,
    pub message: String,
}

impl Toast {
    fn new(symbol: MaterialSymbol, message: String) -> Self {
        Self { symbol, message }
    }

    pub fn uploading(step: usize, total: usize) -> Self {
        Self::new(
            MaterialSymbol::CloudUpload,
            format!("Uploading {} of {}...", step, total),
        )
    }

    pub fn deleting(step: usize, total: usize) -> Self {
        Self::new(
            MaterialSymbol::Delete,
            format!("Deleting {} of {}...", step, total),
        )
    }

    pub fn processing(current: u64, total: u64) -> Self {
        Self::new(
            MaterialSymbol::Refresh,
            format!("Processing {} of {} images...", current, total),
        )
    }

    pub fn searching() -> Self {
        Self::new(MaterialSymbol::Search, "Searching...".to_string())
    }

    pub fn success(message: String) -> Self {
        Self::new(MaterialSymbol::CheckCircle, message)
    }

    pub fn warning(message: String) -> Self {
        Self::new(MaterialSymbol::Warning, message)
    }
}

pub fn view<'a>(toast: &Toast) -> Element<'a, Message> {
    container(
        row![
            style::icon(toast.symbol, Palette::ICON_SIZE, Palette::ON_PRIMARY),
            text(toast.message.clone()).size(14),
        ]
        .spacing(8)
        .align_items(iced::Alignment::Center),
    )
    .style(style::toast_container())
    .padding(10)
    .into()
}

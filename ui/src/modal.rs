//! Full-size image overlay shared by the gallery and search results.
//!
//! One instance at most: the overlay closes on the close control, on a click
//! on the backdrop outside the image, or on Escape. Clicks on the image
//! itself are swallowed.

use crate::style::{self, MaterialSymbol, Palette};
use crate::Message;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, mouse_area, text};
use iced::{Element, Length};

#[derive(Debug, Clone)]
pub struct ModalView {
    pub filename: String,
    pub caption: String,
}

pub fn view<'a>(modal: &ModalView, handle: Option<&Handle>) -> Element<'a, Message> {
    let picture: Element<Message> = match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(640.0))
            .height(Length::Fixed(480.0))
            .into(),
        None => container(text("Loading..."))
            .width(Length::Fixed(640.0))
            .height(Length::Fixed(480.0))
            .center_x()
            .center_y()
            .into(),
    };

    let close = button(style::icon(
        MaterialSymbol::Close,
        Palette::ICON_SIZE,
        Palette::ON_PRIMARY,
    ))
    .style(style::button_primary())
    .on_press(Message::CloseModal);

    let content = mouse_area(
        container(
            column![close, picture, text(modal.caption.clone()).size(16)]
                .spacing(10)
                .align_items(iced::Alignment::Center),
        )
        .style(style::card())
        .padding(20),
    )
    .on_press(Message::ModalImagePressed);

    mouse_area(
        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .style(style::backdrop()),
    )
    .on_press(Message::BackdropPressed)
    .into()
}

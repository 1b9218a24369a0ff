// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! Composes the camera preview with its overlays:
//! - Scan notice chip (top center)
//! - Camera switcher button (bottom right)
//! - Scan result panel (bottom center)

use crate::app::state::{AppModel, Message, ScanNotice, ScanState};
use crate::constants::ui;
use crate::fl;
use cosmic::Element;
use cosmic::iced::{Background, Color, Length};
use cosmic::widget;

/// Camera switch icon SVG (camera with circular arrows)
const CAMERA_SWITCH_ICON: &[u8] =
    include_bytes!("../../resources/button_icons/camera-switch.svg");

/// Create a container style for controls overlaid on the camera preview
///
/// Semi-transparent themed background with capped corner rounding so the
/// overlay stays readable over arbitrary camera content.
pub fn overlay_container_style(theme: &cosmic::Theme) -> widget::container::Style {
    let cosmic = theme.cosmic();
    let bg = cosmic.bg_color();
    widget::container::Style {
        background: Some(Background::Color(Color::from_rgba(
            bg.red,
            bg.green,
            bg.blue,
            ui::OVERLAY_BACKGROUND_ALPHA,
        ))),
        border: cosmic::iced::Border {
            radius: cosmic.corner_radii.radius_s.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

impl AppModel {
    /// Build the main application view
    ///
    /// The preview fills the window; notices, the camera switcher, and the
    /// result panel are stacked on top of it.
    pub fn view(&self) -> Element<'_, Message> {
        let camera_preview = self.build_camera_preview();

        // Wrap the live preview in a mouse area so a tap scans immediately
        let camera_preview: Element<'_, Message> = if self.preview_handle.is_some() {
            widget::mouse_area(camera_preview)
                .on_press(Message::ScanNow)
                .into()
        } else {
            camera_preview
        };

        let mut main_stack = cosmic::iced::widget::stack![camera_preview];

        if let Some(notice) = self.build_scan_notice() {
            main_stack = main_stack.push(notice);
        }

        if self.available_cameras.len() > 1 {
            main_stack = main_stack.push(self.build_camera_switcher());
        }

        if let Some(panel) = self.build_result_panel() {
            main_stack = main_stack.push(panel);
        }

        widget::container(main_stack.width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into()
    }

    /// Build the camera preview widget
    ///
    /// Shows the latest frame when the stream is running, a startup hint
    /// while cameras are enumerating or the pipeline is warming up, and a
    /// "no camera" hint when enumeration came back empty.
    fn build_camera_preview(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        if self.camera_unavailable() {
            return widget::container(
                widget::column()
                    .push(widget::text(fl!("no-camera-found")).size(20))
                    .push(widget::vertical_space().height(spacing.space_xxs))
                    .push(widget::text(fl!("no-camera-hint")).size(14))
                    .align_x(cosmic::iced::alignment::Horizontal::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(cosmic::iced::alignment::Horizontal::Center)
            .align_y(cosmic::iced::alignment::Vertical::Center)
            .style(|theme| widget::container::Style {
                background: Some(Background::Color(theme.cosmic().bg_color().into())),
                text_color: Some(theme.cosmic().on_bg_color().into()),
                ..Default::default()
            })
            .into();
        }

        if let Some(handle) = &self.preview_handle {
            let image = widget::image::Image::new(handle.clone())
                .content_fit(cosmic::iced::ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill);

            widget::container(image)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(cosmic::iced::alignment::Horizontal::Center)
                .align_y(cosmic::iced::alignment::Vertical::Center)
                .into()
        } else {
            // Enumerating cameras or waiting for the first frame
            widget::container(widget::text(fl!("starting-camera")).size(20))
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(cosmic::iced::alignment::Horizontal::Center)
                .align_y(cosmic::iced::alignment::Vertical::Center)
                .style(|theme| widget::container::Style {
                    background: Some(Background::Color(theme.cosmic().bg_color().into())),
                    text_color: Some(theme.cosmic().on_bg_color().into()),
                    ..Default::default()
                })
                .into()
        }
    }

    /// Build the transient notice chip shown after a detection or copy
    fn build_scan_notice(&self) -> Option<Element<'_, Message>> {
        let spacing = cosmic::theme::spacing();

        let label = match self.scan_notice? {
            ScanNotice::Detected => fl!("qr-detected"),
            ScanNotice::Copied => fl!("copied-to-clipboard"),
        };

        let chip = widget::container(widget::text(label).size(14))
            .padding([spacing.space_xxs, spacing.space_s])
            .style(overlay_container_style);

        Some(
            widget::container(chip)
                .width(Length::Fill)
                .align_x(cosmic::iced::alignment::Horizontal::Center)
                .padding(spacing.space_m)
                .into(),
        )
    }

    /// Build the camera switcher button widget
    ///
    /// Only called when more than one camera is available; cycles to the
    /// next camera in enumeration order.
    fn build_camera_switcher(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let switch_icon = widget::icon::from_svg_bytes(CAMERA_SWITCH_ICON).symbolic(true);
        let icon_widget = widget::icon(switch_icon).size(24);

        let icon_content = widget::container(icon_widget)
            .width(Length::Fixed(ui::ICON_BUTTON_WIDTH))
            .height(Length::Fixed(ui::ICON_BUTTON_WIDTH))
            .center(Length::Fixed(ui::ICON_BUTTON_WIDTH));

        let btn = widget::button::custom(icon_content)
            .padding(0)
            .class(cosmic::theme::Button::Text)
            .on_press(Message::SwitchCamera);

        widget::container(widget::container(btn).style(overlay_container_style))
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(cosmic::iced::alignment::Horizontal::Right)
            .align_y(cosmic::iced::alignment::Vertical::Bottom)
            .padding(spacing.space_m)
            .into()
    }

    /// Build the scan result panel
    ///
    /// Shows the decoded payload with copy/dismiss controls, an open button
    /// for link payloads, and the auto-open countdown while one is running.
    fn build_result_panel(&self) -> Option<Element<'_, Message>> {
        let spacing = cosmic::theme::spacing();

        let (payload, link, status): (&str, Option<&str>, Option<String>) = match &self.scan {
            ScanState::Idle => return None,
            ScanState::Shown {
                payload,
                link,
                countdown,
            } => {
                let status =
                    countdown.map(|seconds| fl!("opening-link-in", seconds = seconds));
                (payload, link.as_deref(), status)
            }
            ScanState::Redirecting { payload, .. } => {
                (payload, None, Some(fl!("opening-link")))
            }
        };

        let mut content = widget::column()
            .spacing(spacing.space_xs)
            .push(widget::text(fl!("scan-result")).size(12))
            .push(widget::text(payload.to_string()).size(16));

        if let Some(status) = status {
            content = content.push(
                widget::text(status)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            );
        }

        let mut buttons = widget::row().spacing(spacing.space_xxs);
        if link.is_some() {
            buttons = buttons.push(
                widget::button::text(fl!("open-link"))
                    .class(cosmic::theme::Button::Suggested)
                    .on_press(Message::OpenLink),
            );
        }
        buttons = buttons
            .push(
                widget::button::text(fl!("copy"))
                    .class(cosmic::theme::Button::Standard)
                    .on_press(Message::CopyPayload),
            )
            .push(
                widget::button::text(fl!("dismiss"))
                    .class(cosmic::theme::Button::Standard)
                    .on_press(Message::DismissResult),
            );
        content = content.push(buttons);

        let panel = widget::container(content)
            .padding(spacing.space_s)
            .max_width(ui::RESULT_PANEL_MAX_WIDTH)
            .style(overlay_container_style);

        Some(
            widget::container(panel)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(cosmic::iced::alignment::Horizontal::Center)
                .align_y(cosmic::iced::alignment::Vertical::Bottom)
                .padding(spacing.space_l)
                .into(),
        )
    }
}

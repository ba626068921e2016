/// Screen layouts, one per application state
///
/// Pure functions of the app state; every interaction is a [`Message`].
use iced::widget::image::{Handle, Image};
use iced::widget::{
    button, canvas, column, container, horizontal_space, row, scrollable, slider, stack, text, text_input, Column,
};
use iced::{Alignment, Color, ContentFit, Element, Length};
use iced_aw::Wrap;

use super::mask_canvas::MaskCanvas;
use crate::mask::surface::{MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};
use crate::mask::Tool;
use crate::state::comparator::Comparator;
use crate::state::data::AppState;
use crate::state::session::{MAX_VARIATIONS, MIN_VARIATIONS};
use crate::{Message, NanoBananaEditor};

const THUMBNAIL_SIZE: f32 = 120.0;
const ERROR_COLOR: Color = Color::from_rgb(0.96, 0.45, 0.45);

pub(crate) fn view(app: &NanoBananaEditor) -> Element<'_, Message> {
    let screen = match app.controller.state() {
        AppState::Start => start_screen(app),
        AppState::Masking | AppState::Generating => masking_screen(app),
        AppState::Comparing => match &app.comparator {
            Some(comparator) => comparing_screen(app, comparator),
            // Comparator is always built alongside COMPARING
            None => masking_screen(app),
        },
    };

    container(scrollable(screen))
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(24)
        .into()
}

fn start_screen(app: &NanoBananaEditor) -> Element<'_, Message> {
    let mut content: Column<Message> = column![
        text("Nano Banana Editor").size(48),
        text("Upload a photo, paint over the part you want to change, and describe the edit.").size(16),
        button(if app.uploading { "Loading…" } else { "Upload Image" })
            .on_press_maybe((!app.uploading).then_some(Message::OpenFile))
            .padding(10),
        text("…or drop a PNG, JPEG or WebP file onto this window").size(14),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    if !app.preferences.onboarding_complete {
        content = content.push(welcome_banner());
    }

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(40)
        .into()
}

fn welcome_banner<'a>() -> Element<'a, Message> {
    container(
        row![
            text("👋 Welcome! Paint a mask, write a prompt, and compare up to four AI variations.").size(14),
            horizontal_space(),
            button("Got it").on_press(Message::DismissWelcome),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding(12)
    .style(container::rounded_box)
    .into()
}

fn masking_screen(app: &NanoBananaEditor) -> Element<'_, Message> {
    let session = app.controller.session();
    let generating = session.state == AppState::Generating;
    let masking = session.state == AppState::Masking;

    let header = row![
        text("Mask the area to edit").size(28),
        horizontal_space(),
        button("Start Over").on_press(Message::Reset),
    ]
    .align_y(Alignment::Center);

    let mut content = column![header].spacing(16);

    if let Some(message) = &session.error_message {
        content = content.push(text(message).color(ERROR_COLOR));
    }

    content = content.push(surface_view(app, masking));
    content = content.push(tool_row(app, masking));

    // Prompt row with enhancement
    let prompt_input = text_input("Describe the edit, e.g. \"add a red knitted hat\"", &session.prompt)
        .on_input_maybe(masking.then_some(Message::PromptChanged))
        .on_submit_maybe(masking.then_some(Message::Generate))
        .padding(10);

    let enhance_label = if app.assist.in_flight { "Enhancing…" } else { "✨ Enhance" };
    let can_enhance = masking && !app.assist.in_flight && !session.prompt.trim().is_empty();
    let enhance = button(enhance_label).on_press_maybe(can_enhance.then_some(Message::EnhancePrompt));

    content = content.push(row![prompt_input, enhance].spacing(8).align_y(Alignment::Center));
    if let Some(error) = &app.assist.error {
        content = content.push(text(error).size(14).color(ERROR_COLOR));
    }

    // Variation selector
    let mut variations = row![text("Variations:")].spacing(6).align_y(Alignment::Center);
    for count in MIN_VARIATIONS..=MAX_VARIATIONS {
        let selected = count == session.variation_count;
        let style = if selected { button::primary } else { button::secondary };
        variations = variations.push(
            button(text(count.to_string()))
                .style(style)
                .on_press_maybe(masking.then_some(Message::VariationCountChanged(count))),
        );
    }
    content = content.push(variations);

    let generate_label = if generating { "Generating…" } else { "Generate" };
    let can_generate = masking && !app.assist.in_flight;
    content = content.push(
        button(generate_label)
            .padding(10)
            .on_press_maybe(can_generate.then_some(Message::Generate)),
    );

    content.into()
}

fn surface_view(app: &NanoBananaEditor, enabled: bool) -> Element<'_, Message> {
    let (Some((width, height)), Some(base), Some(overlay)) =
        (app.surface.size(), &app.base_handle, &app.overlay_handle)
    else {
        return text("Preparing image…").into();
    };

    let width = Length::Fixed(width as f32);
    let height = Length::Fixed(height as f32);

    let layers = stack![
        Image::new(base.clone()).width(width).height(height),
        Image::new(overlay.clone()).width(width).height(height),
        canvas(MaskCanvas {
            brush_width: app.surface.brush_width(),
            enabled,
        })
        .width(width)
        .height(height),
    ];

    container(layers).center_x(Length::Fill).into()
}

fn tool_row(app: &NanoBananaEditor, enabled: bool) -> Element<'_, Message> {
    let tool_button = |label: &'static str, tool: Tool| {
        let style = if app.surface.tool() == tool { button::primary } else { button::secondary };
        button(label)
            .style(style)
            .on_press_maybe(enabled.then_some(Message::ToolSelected(tool)))
    };

    let brush = slider(
        MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH,
        app.surface.brush_width(),
        Message::BrushWidthChanged,
    )
    .step(1.0)
    .width(Length::Fixed(160.0));

    row![
        tool_button("🖌 Paint", Tool::Paint),
        tool_button("🧽 Erase", Tool::Erase),
        text(format!("Brush {:.0}px", app.surface.brush_width())).size(14),
        brush,
        horizontal_space(),
        button("Clear Mask").on_press_maybe(enabled.then_some(Message::ClearMask)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

fn comparing_screen<'a>(app: &'a NanoBananaEditor, comparator: &'a Comparator) -> Element<'a, Message> {
    let header = row![
        text("Compare the variations").size(28),
        horizontal_space(),
        button("Start Over").on_press(Message::Reset),
    ]
    .align_y(Alignment::Center);

    let selected_index = comparator.selected_index();
    let selected: Element<Message> = match app.result_handles.get(selected_index).cloned().flatten() {
        Some(handle) => Image::new(handle)
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fixed(480.0))
            .into(),
        None => text(format!("Cannot display {}", comparator.selected().name)).into(),
    };

    let actions = row![
        button("🔁 Refine").on_press(Message::Refine).padding(10),
        button("💾 Download").on_press(Message::Download).padding(10),
    ]
    .spacing(10);

    let thumbnails: Vec<Element<Message>> = comparator
        .results()
        .iter()
        .enumerate()
        .map(|(index, result)| thumbnail(app.result_handles.get(index).cloned().flatten(), &result.name, index, index == selected_index))
        .collect();

    column![
        header,
        selected,
        actions,
        Wrap::with_elements(thumbnails).spacing(8.0).line_spacing(8.0),
        video_prompt_panel(comparator),
    ]
    .spacing(16)
    .into()
}

fn thumbnail<'a>(handle: Option<Handle>, name: &str, index: usize, selected: bool) -> Element<'a, Message> {
    let content: Element<Message> = match handle {
        Some(handle) => Image::new(handle)
            .content_fit(ContentFit::Cover)
            .width(Length::Fixed(THUMBNAIL_SIZE))
            .height(Length::Fixed(THUMBNAIL_SIZE))
            .into(),
        None => text(name.to_string()).size(12).into(),
    };

    let style = if selected { button::primary } else { button::secondary };
    button(content)
        .style(style)
        .padding(4)
        .on_press(Message::SelectResult(index))
        .into()
}

fn video_prompt_panel(comparator: &Comparator) -> Element<'_, Message> {
    let derived = comparator.derived();
    let mut panel = column![text("Video prompt").size(20)].spacing(10);

    if derived.in_flight {
        panel = panel.push(text("Writing a video prompt…"));
    } else if let Some(prompt) = &derived.text {
        let copy_label = if derived.copied.is_some() { "✓ Copied" } else { "📋 Copy" };
        panel = panel
            .push(container(text(prompt).size(14)).padding(10).style(container::rounded_box))
            .push(
                row![
                    button(copy_label).on_press(Message::CopyVideoPrompt),
                    button("Regenerate").on_press(Message::GenerateVideoPrompt),
                ]
                .spacing(8),
            );
    } else {
        panel = panel.push(button("🎬 Generate Video Prompt").on_press(Message::GenerateVideoPrompt));
    }

    if let Some(error) = &derived.error {
        panel = panel.push(text(error).size(14).color(ERROR_COLOR));
    }

    panel.into()
}

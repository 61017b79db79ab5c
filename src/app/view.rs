use super::messages::Message;
use super::state::App;
use crate::config::{Engine, ProcessMode};
use crate::extract::preview;
use crate::playback::WordClass;
use iced::alignment::{Horizontal, Vertical};
use iced::widget::text::{LineHeight, Rich, Span, Wrapping};
use iced::widget::{
    Column, button, column, container, horizontal_space, pick_list, row, scrollable, slider, text,
    text_input,
};
use iced::{Background, Color, Element, Length};

const PREVIEW_CHARS: usize = 500;
const READ_WORD_COLOR: Color = Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};
const ERROR_COLOR: Color = Color {
    r: 0.8,
    g: 0.15,
    b: 0.15,
    a: 1.0,
};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let body = if self.show_reader {
            self.reader_view()
        } else {
            self.home_view()
        };

        let mut content: Column<'_, Message> = column![].padding(16).spacing(12);
        if let Some(error) = &self.error {
            content = content.push(
                row![
                    text(error.as_str()).color(ERROR_COLOR).width(Length::Fill),
                    button("Dismiss").on_press(Message::DismissError),
                ]
                .spacing(10)
                .align_y(Vertical::Center),
            );
        }
        if let Some(notice) = &self.notice {
            content = content.push(text(notice.as_str()));
        }
        content.push(body).height(Length::Fill).into()
    }

    fn home_view(&self) -> Element<'_, Message> {
        let load_button = if self.is_loading {
            button("Loading...")
        } else {
            button("Load").on_press(Message::LoadSource)
        };
        let source_row = row![
            text_input("URL or path to a .txt / .pdf file", &self.source_input)
                .on_input(Message::SourceInputChanged)
                .on_submit(Message::LoadSource)
                .width(Length::Fill),
            load_button,
            button(if self.show_settings {
                "Hide Settings"
            } else {
                "Settings"
            })
            .on_press(Message::ToggleSettings),
        ]
        .spacing(10)
        .align_y(Vertical::Center);

        let mut page: Column<'_, Message> = column![text("Web2Speech").size(28), source_row].spacing(12);

        if self.awaiting_api_key {
            page = page.push(self.api_key_prompt());
        }
        if self.show_settings {
            page = page.push(self.settings_panel());
        }
        if !self.content.is_empty() {
            page = page.push(self.content_summary());
        }

        scrollable(page.width(Length::Fill)).into()
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        let engine = self.controller.engine();
        let engine_picker = pick_list(Engine::ALL, Some(engine), Message::EngineSelected);
        let voice_picker = pick_list(
            self.voices.voices_for(engine),
            self.controller.voice().cloned(),
            Message::VoiceSelected,
        )
        .placeholder(if engine == Engine::Local && !self.voices.local_loaded() {
            "Loading voices..."
        } else {
            "Select a voice"
        });
        let mode_picker = pick_list(
            ProcessMode::ALL,
            Some(self.process_mode),
            Message::ProcessModeSelected,
        );

        let preview_button = if engine == Engine::Local && self.preview.is_none() {
            button("Preview Voice").on_press(Message::PreviewVoice)
        } else {
            button("Preview Voice")
        };

        let mut panel: Column<'_, Message> = column![
            row![text("Engine"), engine_picker]
                .spacing(10)
                .align_y(Vertical::Center),
            row![text("Voice"), voice_picker, preview_button]
                .spacing(10)
                .align_y(Vertical::Center),
            row![text("Mode"), mode_picker]
                .spacing(10)
                .align_y(Vertical::Center),
        ]
        .spacing(8);

        if engine == Engine::Remote {
            let test_button = if self.testing_connection {
                button("Testing...")
            } else {
                button("Test Connection").on_press(Message::TestConnection)
            };
            let key_status = if self.api_key.is_some() {
                "API key configured"
            } else {
                "No API key"
            };
            panel = panel.push(
                row![text(key_status), test_button]
                    .spacing(10)
                    .align_y(Vertical::Center),
            );
        }

        container(panel.padding(8)).into()
    }

    fn api_key_prompt(&self) -> Element<'_, Message> {
        container(
            column![
                text("Hugging Face API key"),
                text("The Kokoro-82M engine needs a Hugging Face access token.").size(14),
                text_input("hf_...", &self.api_key_input)
                    .on_input(Message::ApiKeyInputChanged)
                    .on_submit(Message::SaveApiKey)
                    .secure(true),
                row![
                    button("Save").on_press(Message::SaveApiKey),
                    button("Cancel").on_press(Message::CancelApiKeyPrompt),
                ]
                .spacing(10),
            ]
            .spacing(8)
            .padding(8),
        )
        .into()
    }

    fn content_summary(&self) -> Element<'_, Message> {
        let state = self.controller.state();
        let stats = row![
            text(format!("{} words", state.word_count)),
            text(format!("~{} min read", state.estimated_minutes())),
        ]
        .spacing(16);

        let start_label = match self.process_mode {
            ProcessMode::Stream => "Start Reading",
            ProcessMode::Generate => "Generate Audio File",
        };
        let start_button = if self.is_generating() {
            button(start_label)
        } else {
            button(start_label).on_press(Message::StartReading)
        };
        let mut actions = row![start_button].spacing(10);
        if self.is_generating() {
            actions = actions.push(button("Cancel").on_press(Message::CancelGeneration));
        }

        column![
            stats,
            text(preview(&self.content, PREVIEW_CHARS))
                .wrapping(Wrapping::WordOrGlyph)
                .width(Length::Fill),
            actions,
        ]
        .spacing(10)
        .into()
    }

    fn reader_view(&self) -> Element<'_, Message> {
        let state = self.controller.state();
        let highlight = self.highlight_color();
        let font_size = self.config.font_size as f32;
        let line_height = LineHeight::Relative(self.config.line_spacing);

        let spans: Vec<Span<'_, Message>> = self
            .controller
            .tokens()
            .iter()
            .map(|token| {
                let mut span: Span<'_, Message> = Span::new(format!("{} ", token.text))
                    .size(font_size)
                    .line_height(line_height)
                    .link(Message::WordClicked(token.index));
                match state.word_class(token.index) {
                    WordClass::Current => {
                        span = span
                            .background(Background::Color(highlight))
                            .padding(iced::Padding::from(2u16));
                    }
                    WordClass::Read => span = span.color(READ_WORD_COLOR),
                    WordClass::Unread => {}
                }
                span
            })
            .collect();
        let rich: Rich<'_, Message> = Rich::with_spans(spans);
        let text_view = scrollable(
            container(
                rich.width(Length::Fill)
                    .wrapping(Wrapping::WordOrGlyph)
                    .align_x(Horizontal::Left),
            )
            .width(Length::Fill)
            .padding(12),
        )
        .height(Length::FillPortion(1));

        column![text_view, self.reader_controls()]
            .spacing(12)
            .height(Length::Fill)
            .into()
    }

    fn reader_controls(&self) -> Element<'_, Message> {
        let state = self.controller.state();
        let settings = self.controller.settings();

        let play_button = if state.is_preparing {
            button("Preparing...").on_press(Message::Pause)
        } else if state.is_playing {
            button("Pause").on_press(Message::Pause)
        } else {
            button("Play").on_press(Message::Play)
        };
        let position = if state.word_count == 0 {
            String::new()
        } else {
            format!(
                "Word {} of {}",
                state.current_word_index + 1,
                state.word_count
            )
        };

        let transport = row![
            button("Back").on_press(Message::CloseReader),
            horizontal_space(),
            button("<<").on_press(Message::SkipBack),
            play_button,
            button(">>").on_press(Message::SkipForward),
            horizontal_space(),
            text(position),
            text(format!("{}% complete", state.percent_complete())),
        ]
        .spacing(10)
        .align_y(Vertical::Center)
        .width(Length::Fill);

        let tuning = row![
            column![
                text(format!("Rate: {:.1}x", settings.rate)),
                slider(0.5..=2.0, settings.rate, Message::SetRate).step(0.1),
            ]
            .spacing(4)
            .width(Length::FillPortion(1)),
            column![
                text(format!("Pitch: {:.1}x", settings.pitch)),
                slider(0.5..=2.0, settings.pitch, Message::SetPitch).step(0.1),
            ]
            .spacing(4)
            .width(Length::FillPortion(1)),
            text(self.controller.engine().to_string()),
        ]
        .spacing(12)
        .align_y(Vertical::Center);

        container(column![transport, tuning].spacing(8).padding(8)).into()
    }
}

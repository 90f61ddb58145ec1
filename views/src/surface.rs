use crate::analytics::AnalyticsModel;
use crate::costs::CostsModel;
use crate::overview::OverviewModel;
use crate::posts::PostsModel;
use crate::view::{View, ViewState};
use dashboard_core::CoreError;
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// A view together with its loaded state, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "content", rename_all = "lowercase")]
pub enum Screen {
    Overview(ViewState<OverviewModel>),
    Posts(ViewState<PostsModel>),
    Analytics(ViewState<AnalyticsModel>),
    Costs(ViewState<CostsModel>),
}

impl Screen {
    pub fn view(&self) -> View {
        match self {
            Screen::Overview(_) => View::Overview,
            Screen::Posts(_) => View::Posts,
            Screen::Analytics(_) => View::Analytics,
            Screen::Costs(_) => View::Costs,
        }
    }

    pub fn is_ready(&self) -> bool {
        match self {
            Screen::Overview(state) => state.is_ready(),
            Screen::Posts(state) => state.is_ready(),
            Screen::Analytics(state) => state.is_ready(),
            Screen::Costs(state) => state.is_ready(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Screen::Overview(state) => state.message(),
            Screen::Posts(state) => state.message(),
            Screen::Analytics(state) => state.message(),
            Screen::Costs(state) => state.message(),
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            Screen::Overview(state) => state.notice(),
            Screen::Posts(state) => state.notice(),
            Screen::Analytics(state) => state.notice(),
            Screen::Costs(state) => state.notice(),
        }
    }
}

/// Whatever draws the dashboard: charts, a terminal, a JSON stream.
pub trait RenderSurface {
    /// Called before a view's fetch starts.
    fn loading(&mut self, view: View) -> Result<(), CoreError>;

    fn render(&mut self, screen: &Screen) -> Result<(), CoreError>;
}

/// Writes each rendered screen as one line of JSON.
pub struct JsonSurface<W: Write> {
    writer: W,
}

impl<W: Write> JsonSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSurface for JsonSurface<W> {
    fn loading(&mut self, view: View) -> Result<(), CoreError> {
        debug!("{}", view.loading_message());
        Ok(())
    }

    fn render(&mut self, screen: &Screen) -> Result<(), CoreError> {
        serde_json::to_writer(&mut self.writer, screen)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

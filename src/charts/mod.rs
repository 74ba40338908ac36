//! Charts module - figure description, static rendering and interactive plots

mod figure;
mod format;
mod plotter;
mod renderer;

pub use figure::{ChartVariant, Figure, FigureBuilder, AXIS_GREY};
pub use plotter::{color32, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};

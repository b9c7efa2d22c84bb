//! State machine that recovers calibration anchors and raw series from a
//! lap-detail chart.
//!
//! Recognised vocabulary (by `class` attribute):
//!
//! ```text
//! <g class="plot">                          root, walking ends when it closes
//!   <g class="axis x"> / <g class="axis y">
//!     <g class="guides">                    one guide per nested group
//!       <path d="M{x} {y} ..."/>            pixel: x for axis x, y for axis y
//!       <text>{label}</text>                domain value for that pixel
//!   <g class="series serie-0 color-0">      also serie-1
//!     <path d="M x y L x y ..."/>           polyline encoding
//!     <desc class="value">x:y</desc>        marker encoding, one point each
//! ```
//!
//! Anything else is stepped over without changing state.

use super::error::{LapError, LapResult};
use super::geometry::{GeometryEncoding, SeriesGeometryDecoder};
use super::markup::{StartTag, Token, Tokenizer};
use super::model::{Axis, CalibrationSample, ChartCapture, SeriesIndex};

/// Elements that never get a closing tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Init,
    Plot,
    Axis(Axis),
    Guide(Axis),
    GuideLabel(Axis),
    Series(SeriesIndex),
    MarkerText(SeriesIndex),
    Done,
}

#[derive(Debug)]
struct Frame {
    name: String,
    state: WalkState,
    /// The element moved the walker into `state` (its parent was elsewhere).
    opens: bool,
}

#[derive(Debug)]
struct PendingGuide {
    axis: Axis,
    pixel: Option<f64>,
    label: Option<f64>,
}

/// Walks a token stream and accumulates a [`ChartCapture`].
#[derive(Debug, Default)]
pub struct MarkupWalker {
    frames: Vec<Frame>,
    done: bool,
    guide: Option<PendingGuide>,
    text: String,
    /// First geometry encoding seen per series; the other one is ignored.
    encodings: [Option<GeometryEncoding>; 2],
    capture: ChartCapture,
}

/// Walk a whole document.
pub fn walk(markup: &str) -> LapResult<ChartCapture> {
    let mut walker = MarkupWalker::new();
    for token in Tokenizer::new(markup) {
        walker.feed(&token)?;
        if walker.is_done() {
            break;
        }
    }
    Ok(walker.finish())
}

impl MarkupWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WalkState {
        if self.done {
            return WalkState::Done;
        }
        self.frames.last().map_or(WalkState::Init, |f| f.state)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn feed(&mut self, token: &Token<'_>) -> LapResult<()> {
        match token {
            Token::Start(tag) => self.on_start(tag),
            Token::End(name) => self.on_end(name),
            Token::Text(text) => {
                if matches!(self.state(), WalkState::GuideLabel(_) | WalkState::MarkerText(_)) {
                    self.text.push_str(text);
                }
                Ok(())
            }
        }
    }

    pub fn finish(self) -> ChartCapture {
        if !self.done {
            log::debug!("document ended in state {:?}", self.state());
        }
        self.capture
    }

    fn on_start(&mut self, tag: &StartTag<'_>) -> LapResult<()> {
        let state = self.state();
        let next = match state {
            WalkState::Done => return Ok(()),
            WalkState::Init => {
                if tag.is("g") && tag.classes().eq(["plot"]) {
                    WalkState::Plot
                } else {
                    return Ok(());
                }
            }
            WalkState::Plot => classify_plot_child(tag),
            WalkState::Axis(axis) => {
                if tag.is("g") {
                    self.begin_guide(axis);
                    WalkState::Guide(axis)
                } else {
                    state
                }
            }
            WalkState::Guide(axis) => {
                if tag.is("path") {
                    self.guide_pixel(axis, tag)?;
                    state
                } else if tag.is("text") {
                    self.text.clear();
                    WalkState::GuideLabel(axis)
                } else {
                    state
                }
            }
            WalkState::Series(series) => match GeometryEncoding::for_element(tag) {
                Some(GeometryEncoding::PathCommands) => {
                    let d = tag.attr("d").ok_or_else(|| {
                        LapError::malformed("series path", tag.name, "missing 'd' attribute")
                    })?;
                    self.add_points(series, GeometryEncoding::PathCommands, d)?;
                    state
                }
                Some(GeometryEncoding::MarkerDescription) => {
                    self.text.clear();
                    WalkState::MarkerText(series)
                }
                None => state,
            },
            WalkState::GuideLabel(_) | WalkState::MarkerText(_) => state,
        };

        let opens = next != state;
        if !tag.self_closing && !VOID_ELEMENTS.iter().any(|v| tag.is(v)) {
            self.frames.push(Frame {
                name: tag.name.to_ascii_lowercase(),
                state: next,
                opens,
            });
        } else if opens {
            // `<text/>` or `<desc/>`: nothing to read, the element is over.
            self.close_frame(next)?;
        }
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> LapResult<()> {
        if self.done {
            return Ok(());
        }
        // Unmatched close tags are ignored; unclosed children are closed
        // together with their parent.
        let Some(depth) = self
            .frames
            .iter()
            .rposition(|f| f.name.eq_ignore_ascii_case(name))
        else {
            return Ok(());
        };
        while self.frames.len() > depth {
            if let Some(frame) = self.frames.pop() {
                if frame.opens {
                    self.close_frame(frame.state)?;
                }
            }
        }
        Ok(())
    }

    /// Leave `state` after the element that entered it has ended.
    fn close_frame(&mut self, state: WalkState) -> LapResult<()> {
        match state {
            WalkState::GuideLabel(axis) => self.guide_label(axis)?,
            WalkState::MarkerText(series) => {
                let text = std::mem::take(&mut self.text);
                self.add_points(series, GeometryEncoding::MarkerDescription, text.trim())?;
            }
            WalkState::Guide(_) => self.end_guide(),
            WalkState::Plot => {
                log::debug!(
                    "plot closed: {} x guides, {} y guides, {} + {} series points",
                    self.capture.axis_x.len(),
                    self.capture.axis_y.len(),
                    self.capture.series[0].len(),
                    self.capture.series[1].len()
                );
                self.done = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn begin_guide(&mut self, axis: Axis) {
        self.guide = Some(PendingGuide {
            axis,
            pixel: None,
            label: None,
        });
    }

    fn guide_pixel(&mut self, axis: Axis, tag: &StartTag<'_>) -> LapResult<()> {
        let role = guide_role(axis);
        let d = tag
            .attr("d")
            .ok_or_else(|| LapError::malformed(role, tag.name, "missing 'd' attribute"))?;
        // The guide's start point carries the coordinate along its axis.
        let position = match axis {
            Axis::X => 0,
            Axis::Y => 1,
        };
        let token = d
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .nth(position)
            .ok_or_else(|| LapError::malformed(role, d, "guide path too short"))?;
        let number = token.strip_prefix(|c: char| c.is_ascii_alphabetic()).unwrap_or(token);
        let pixel = number
            .parse::<f64>()
            .map_err(|e| LapError::malformed(role, token, e.to_string()))?;

        match self.guide.as_mut() {
            Some(guide) if guide.pixel.is_none() => guide.pixel = Some(pixel),
            Some(_) => log::debug!("{role}: extra path ignored ({d})"),
            None => {}
        }
        Ok(())
    }

    fn guide_label(&mut self, axis: Axis) -> LapResult<()> {
        let role = label_role(axis);
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        if text.is_empty() {
            log::debug!("{role}: empty label ignored");
            return Ok(());
        }
        let value = text
            .parse::<f64>()
            .map_err(|e| LapError::malformed(role, text, e.to_string()))?;
        if !value.is_finite() {
            return Err(LapError::malformed(role, text, "label is not a finite number"));
        }
        if let Some(guide) = self.guide.as_mut() {
            if guide.label.is_none() {
                guide.label = Some(value);
            }
        }
        Ok(())
    }

    fn end_guide(&mut self) {
        let Some(guide) = self.guide.take() else {
            return;
        };
        match (guide.pixel, guide.label) {
            (Some(pixel), Some(value)) => {
                let sample = CalibrationSample::new(pixel, value);
                match guide.axis {
                    Axis::X => self.capture.axis_x.push(sample),
                    Axis::Y => self.capture.axis_y.push(sample),
                }
            }
            (pixel, label) => log::debug!(
                "axis {} guide without pair (pixel {pixel:?}, label {label:?}) ignored",
                guide.axis
            ),
        }
    }

    fn add_points(
        &mut self,
        series: SeriesIndex,
        encoding: GeometryEncoding,
        payload: &str,
    ) -> LapResult<()> {
        let chosen = *self.encodings[series.index()].get_or_insert(encoding);
        if chosen != encoding {
            log::debug!("{series}: {encoding:?} ignored, series already uses {chosen:?}");
            return Ok(());
        }
        let decoder = encoding.decoder();
        let points = decoder.decode(payload)?;
        let raw = &mut self.capture.series[series.index()];
        if decoder.replaces_existing() {
            if !raw.is_empty() {
                log::debug!("{series}: later {} replaces {} points", decoder.role(), raw.len());
            }
            raw.points = points;
        } else {
            raw.points.extend(points);
        }
        Ok(())
    }
}

fn classify_plot_child(tag: &StartTag<'_>) -> WalkState {
    if !tag.is("g") {
        return WalkState::Plot;
    }
    if tag.has_class("axis") {
        if tag.has_class("x") {
            return WalkState::Axis(Axis::X);
        }
        if tag.has_class("y") {
            return WalkState::Axis(Axis::Y);
        }
    }
    if tag.has_class("series") {
        if let Some(series) = tag.classes().find_map(SeriesIndex::from_class_token) {
            return WalkState::Series(series);
        }
    }
    WalkState::Plot
}

fn guide_role(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "axis x guide",
        Axis::Y => "axis y guide",
    }
}

fn label_role(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "axis x label",
        Axis::Y => "axis y label",
    }
}

use super::error::{LapError, LapResult};
use super::markup::StartTag;

// ---------------------------------------------------------------------------
// Series geometry decoders
// ---------------------------------------------------------------------------

/// Turns the payload of one series element into pixel coordinates.
pub trait SeriesGeometryDecoder {
    /// Element role used in error messages.
    fn role(&self) -> &'static str;

    /// Whether decoded points replace what the series already holds
    /// (a whole polyline) or extend it (one marker at a time).
    fn replaces_existing(&self) -> bool;

    fn decode(&self, payload: &str) -> LapResult<Vec<[f64; 2]>>;
}

/// `d` attribute of a series `<path>`: `M x y L x y ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathCommands;

/// Text of a marker's `<desc>`: `x:y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerDescription;

impl SeriesGeometryDecoder for PathCommands {
    fn role(&self) -> &'static str {
        "series path"
    }

    fn replaces_existing(&self) -> bool {
        true
    }

    fn decode(&self, payload: &str) -> LapResult<Vec<[f64; 2]>> {
        let mut coords = Vec::new();
        for token in payload.split(|c: char| c.is_ascii_whitespace() || c == ',') {
            // Command letters are glued to the first coordinate: "M12.5".
            let number = token.strip_prefix(|c: char| c.is_ascii_alphabetic()).unwrap_or(token);
            if number.is_empty() {
                continue;
            }
            let value = number
                .parse::<f64>()
                .map_err(|e| LapError::malformed(self.role(), token, e.to_string()))?;
            coords.push(value);
        }
        if coords.len() % 2 != 0 {
            return Err(LapError::malformed(
                self.role(),
                payload,
                format!("odd number of coordinates ({})", coords.len()),
            ));
        }
        Ok(coords.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
    }
}

impl SeriesGeometryDecoder for MarkerDescription {
    fn role(&self) -> &'static str {
        "series marker"
    }

    fn replaces_existing(&self) -> bool {
        false
    }

    fn decode(&self, payload: &str) -> LapResult<Vec<[f64; 2]>> {
        let (x, y) = payload
            .split_once(':')
            .ok_or_else(|| LapError::malformed(self.role(), payload, "expected 'x:y'"))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| LapError::malformed(self.role(), s, e.to_string()))
        };
        Ok(vec![[parse(x)?, parse(y)?]])
    }
}

/// How a series element encodes its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryEncoding {
    PathCommands,
    MarkerDescription,
}

impl GeometryEncoding {
    /// Pick the encoding from the element kind seen inside a series group.
    pub fn for_element(tag: &StartTag<'_>) -> Option<Self> {
        if tag.is("path") {
            Some(GeometryEncoding::PathCommands)
        } else if tag.is("desc") && (tag.attr("class").is_none() || tag.has_class("value")) {
            Some(GeometryEncoding::MarkerDescription)
        } else {
            None
        }
    }

    pub fn decoder(self) -> &'static dyn SeriesGeometryDecoder {
        match self {
            GeometryEncoding::PathCommands => &PathCommands,
            GeometryEncoding::MarkerDescription => &MarkerDescription,
        }
    }
}

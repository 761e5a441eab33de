//! PyTeapot text framing.
//!
//! Every value is wrapped by its tag letter and the frame ends with `\n`:
//!
//! ```text
//! quaternion  w<w>wa<x>ab<y>bc<z>c
//! euler       y<yaw>yp<pitch>pr<roll>r
//! ```
//!
//! The viewer takes the text between the first two occurrences of a tag, so
//! the tag letters must never appear inside a value. Four decimals are sent.

use core::fmt::Write;

use heapless::String;

use crate::error::Result;
use crate::orientation::{EulerAngles, Quaternion, Sample};

pub const FRAME_CAPACITY: usize = 96;

const QUAT_TAGS: [char; 4] = ['w', 'a', 'b', 'c'];
const EULER_TAGS: [char; 3] = ['y', 'p', 'r'];

pub type Frame = String<FRAME_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layout {
    Quaternion,
    Euler,
}

impl Layout {
    fn tags(&self) -> &'static [char] {
        match self {
            Layout::Quaternion => &QUAT_TAGS,
            Layout::Euler => &EULER_TAGS,
        }
    }
}

impl Sample {
    pub fn layout(&self) -> Layout {
        match self {
            Sample::Quaternion(_) => Layout::Quaternion,
            Sample::Euler(_) => Layout::Euler,
        }
    }
}

/// Anything a frame can be pushed to: the UDP broadcaster, the serial console.
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    async fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// Formats a sample, `None` if a value is not finite or too wide for the
/// frame buffer.
pub fn encode(sample: &Sample) -> Option<Frame> {
    let mut frame = Frame::new();
    let tags = sample.layout().tags();

    match sample {
        Sample::Quaternion(q) => write_fields(&mut frame, tags, &[q.w, q.x, q.y, q.z])?,
        Sample::Euler(e) => write_fields(&mut frame, tags, &[e.yaw, e.pitch, e.roll])?,
    }
    frame.push('\n').ok()?;

    Some(frame)
}

fn write_fields(frame: &mut Frame, tags: &[char], values: &[f32]) -> Option<()> {
    for (tag, value) in tags.iter().zip(values) {
        // "NaN" and "inf" would collide with the tag letters
        if !value.is_finite() {
            return None;
        }
        write!(frame, "{tag}{value:.4}{tag}").ok()?;
    }
    Some(())
}

/// Parses a frame the way the viewer does.
pub fn decode(line: &str, layout: Layout) -> Option<Sample> {
    let line = line.trim_end_matches(['\r', '\n']);

    let mut values = [0.0f32; 4];
    for (tag, value) in layout.tags().iter().zip(values.iter_mut()) {
        *value = line.split(*tag).nth(1)?.trim().parse().ok()?;
    }

    let [a, b, c, d] = values;
    match layout {
        Layout::Quaternion => Some(Sample::Quaternion(Quaternion::new(a, b, c, d))),
        Layout::Euler => Some(Sample::Euler(EulerAngles {
            yaw: a,
            pitch: b,
            roll: c,
        })),
    }
}

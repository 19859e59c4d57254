//! Protocol messages
//!
//! Every value published on the bus travels inside a [`Message`] envelope.

use lumos_core::{
    CellSetBinaryOp, ClipPlanes, ColorMap, Histogram, ImageJpeg, Progress, SelectedIds,
    ToggleIdRequest, Topic,
};
use serde::{Deserialize, Serialize};

/// Protocol version
pub const PROTOCOL_VERSION: u32 = 1;

/// Top-level message envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Protocol version
    pub version: u32,
    /// Message sequence number
    pub sequence: u64,
    /// Timestamp (milliseconds since epoch)
    pub timestamp: u64,
    /// Published value
    pub event: Event,
}

impl Message {
    /// Create a new message with the given event
    pub fn new(sequence: u64, event: Event) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            sequence,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            event,
        }
    }

    /// Topic of the carried event
    pub fn topic(&self) -> &'static str {
        self.event.type_name()
    }
}

/// Values that can be published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ColorMap(ColorMap),
    Histogram(Histogram),
    ClipPlanes(ClipPlanes),
    Progress(Progress),
    ImageJpeg(ImageJpeg),
    ToggleIdRequest(ToggleIdRequest),
    SelectedIds(SelectedIds),
    CellSetBinaryOp(CellSetBinaryOp),
}

macro_rules! impl_event_from {
    ($($variant:ident),* $(,)?) => {
        impl Event {
            /// Fully qualified type name of the carried value
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Event::$variant(_) => <$variant as Topic>::TYPE_NAME,)*
                }
            }

            /// Type names of every publishable value
            pub const TYPE_NAMES: &'static [&'static str] = &[
                $(<$variant as Topic>::TYPE_NAME,)*
            ];
        }

        $(
            impl From<$variant> for Event {
                fn from(value: $variant) -> Self {
                    Event::$variant(value)
                }
            }
        )*
    };
}

impl_event_from!(
    ColorMap,
    Histogram,
    ClipPlanes,
    Progress,
    ImageJpeg,
    ToggleIdRequest,
    SelectedIds,
    CellSetBinaryOp,
);

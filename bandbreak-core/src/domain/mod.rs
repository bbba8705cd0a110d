//! Domain types for BandBreak.

pub mod band;
pub mod bar;
pub mod instrument;
pub mod position;

pub use band::{BandError, BandLevels};
pub use bar::{BarWindow, TickExtremes};
pub use instrument::Instrument;
pub use position::{CloseReason, Direction, OrderId, OrderRequest, PositionClosed, PositionId};

//! Interrupt fed, table driven command console
//!
//! ```text
//! rx interrupt ── LineAccumulator ──► CommandSlot ──► Dispatcher ──► CommandTable ──► handler
//! ```
//!
//! Example
//!
//! ```rust
//! use pico_remote_console::console::*;
//! use pico_remote_console::log::{LogConfig, LogLevel, LogSink, Logger, System};
//!
//! struct Silent;
//! impl LogSink for Silent {
//!   fn emit(&self, _: LogLevel, _: System, _: &str) {}
//! }
//!
//! fn store(ctx: &mut u16, value: u16) -> Result<()> {
//!   *ctx = value;
//!   Ok(())
//! }
//!
//! static TABLE: CommandTable<u16> = CommandTable::new(&[CommandDescriptor {
//!   name:        "logreg",
//!   arg_kind:    ArgKind::Hex,
//!   max_arg_len: 4,
//!   handler:     store,
//!   help:        "Set the logger register",
//! }]);
//!
//! let log = Logger::new(Silent, LogConfig::new(0, LogLevel::Info));
//! let mut slot = CommandSlot::<20>::new();
//! let (writer, reader) = slot.split();
//! let mut rx = LineAccumulator::new(writer, &log, b'\r');
//! let mut dispatcher = Dispatcher::new(&TABLE, reader, &log);
//!
//! for &b in b"LOGREG 1a2b\r" {
//!   rx.on_byte_received(b);
//! }
//!
//! let mut value = 0;
//! assert!(dispatcher.poll_and_dispatch(&mut value).unwrap().is_ok());
//! assert_eq!(value, 0x1a2b);
//! ```

pub mod accumulator;
pub mod commands;
pub mod dispatcher;
pub mod errors;
pub mod hex;
pub mod line_buffer;
pub mod slot;
pub mod table;

pub use accumulator::{LineAccumulator, RxEvent};
pub use commands::{CommandContext, VoltageProbe};
pub use dispatcher::{Dispatcher, Executed, split_line};
pub use errors::{ConsoleError, IntoTruncate, Result};
pub use hex::hex_to_u16;
pub use line_buffer::{AsStr, LineBuffer};
pub use slot::{CommandSlot, PendingLine, SlotReader, SlotWriter};
pub use table::{ArgKind, CommandDescriptor, CommandTable, Handler};

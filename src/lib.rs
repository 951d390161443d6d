// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                    RP Pico Remote Command Console
// ————————————————————————————————————————————————————————————————————————————————————————————————

//! Hardware independent core of the remote command console.
//!
//! A receive interrupt feeds bytes into a [`console::LineAccumulator`], which hands completed
//! lines over to the main loop through a [`console::CommandSlot`]. The main loop polls a
//! [`console::Dispatcher`] that matches the line against a static [`console::CommandTable`] and
//! invokes the bound handler.
//!
//! Reporting goes through an injected [`log::Report`] collaborator.

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod config;
pub mod console;
pub mod log;

pub use calibration::Calibration;
pub use config::{CONFIG_DEFAULT, Config, LINE_CAPACITY, LINE_TERMINATOR};
pub use console::{
  ArgKind, CommandDescriptor, CommandSlot, CommandTable, ConsoleError, Dispatcher, Executed,
  LineAccumulator, RxEvent, hex_to_u16,
};
pub use log::{LogConfig, LogLevel, LogQueue, LogRecord, LogSink, Logger, Report, System};

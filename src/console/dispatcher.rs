//! Main loop side of the console
//! Drains the command slot, matches the line against the command table and runs the handler.

use crate::log::{Report, System};
use crate::{debug, error, info, warn};

use super::errors::{ConsoleError, IntoTruncate, Result};
use super::line_buffer::AsStr;
use super::slot::SlotReader;
use super::table::CommandTable;

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Executed
// ————————————————————————————————————————————————————————————————————————————————————————————————

/// A line that reached its handler
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Executed {
  pub command:          &'static str,
  pub value:            u16,
  /// Argument text given to a command that takes none
  pub ignored_argument: bool,
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Dispatcher
// ————————————————————————————————————————————————————————————————————————————————————————————————

pub struct Dispatcher<'a, C: 'static, R: Report + ?Sized, const N: usize> {
  table: &'a CommandTable<C>,
  slot:  SlotReader<'a, N>,
  log:   &'a R,
}

impl<'a, C: 'static, R: Report + ?Sized, const N: usize> Dispatcher<'a, C, R, N> {
  pub fn new(table: &'a CommandTable<C>, slot: SlotReader<'a, N>, log: &'a R) -> Self {
    Self { table, slot, log }
  }

  pub fn table(&self) -> &'a CommandTable<C> {
    self.table
  }

  pub fn is_pending(&self) -> bool {
    self.slot.is_pending()
  }

  // ——————————————————————————————————————————————————————————————————————————————————————————————
  //                                       Poll And Dispatch
  // ——————————————————————————————————————————————————————————————————————————————————————————————

  /// Non-blocking. Returns `None` if no line is pending.
  ///
  /// Otherwise the line is processed completely and the slot is unlocked before returning,
  /// whatever the outcome.
  pub fn poll_and_dispatch(&mut self, ctx: &mut C) -> Option<Result<Executed>> {
    let mut pending = self.slot.take()?;
    debug!(self.log, System::Command, "Parse buffer is locked");

    let outcome = dispatch_line(self.table, pending.line_mut(), ctx, self.log);
    pending.release();

    Some(outcome)
  }
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                        Helper Functions
// ————————————————————————————————————————————————————————————————————————————————————————————————

// ——————————————————————————————————————— Split Line ——————————————————————————————————————————————

/// Splits at the first space. The argument starts after any run of spaces.
/// Returns `None` as argument if the line has no space at all.
pub fn split_line(line: &mut [u8]) -> (&mut [u8], Option<&[u8]>) {
  match line.iter().position(|&b| b == b' ') {
    Some(pos) => {
      let (cmd, rest) = line.split_at_mut(pos);
      let rest = &rest[1..];
      let start = rest.iter().position(|&b| b != b' ').unwrap_or(rest.len());
      (cmd, Some(&rest[start..]))
    }
    None => (line, None),
  }
}

// ————————————————————————————————————————— Dispatch ——————————————————————————————————————————————

fn dispatch_line<C: 'static, R: Report + ?Sized>(
  table: &CommandTable<C>,
  line: &mut [u8],
  ctx: &mut C,
  log: &R,
) -> Result<Executed> {
  let (cmd, arg) = split_line(line);
  cmd.make_ascii_lowercase();

  if let Some(arg) = arg {
    debug!(log, System::Command, "The parameter is {}", arg.as_str());
  }

  let Some(command) = table.find(cmd)
  else {
    let err = ConsoleError::CmdNotFound(IntoTruncate::into_truncated(&*cmd));
    error!(log, System::Command, "{}", err);
    return Err(err);
  };

  let text = arg.unwrap_or_default();
  let mut ignored_argument = false;

  let value = if !command.arg_kind.takes_argument() {
    if !text.is_empty() {
      warn!(log, System::Command, "Ignoring argument to {}", command.name);
      ignored_argument = true;
    }
    info!(log, System::Command, "Executing {} with no argument", command.name);
    0
  }
  else {
    debug!(log, System::Command, "Argument size of {} is {}", command.name, text.len());
    if text.len() > command.max_arg_len {
      let err = ConsoleError::ArgTooLong {
        command: command.name,
        len:     text.len(),
        max:     command.max_arg_len,
      };
      error!(log, System::Command, "{}", err);
      return Err(err);
    }

    let value = command.arg_kind.convert(text);
    info!(log, System::Command, "Executing {} with argument 0x{:x}", command.name, value);
    value
  };

  if let Err(err) = command.invoke(ctx, value) {
    error!(log, System::Command, "{} failed: {}", command.name, err);
    return Err(err);
  }

  Ok(Executed {
    command: command.name,
    value,
    ignored_argument,
  })
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

//! Command descriptors and the static command table
//! Register new commands by adding a descriptor, the dispatcher needs no change.

use core::fmt;

use super::errors::Result;
use super::hex::hex_to_u16;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                            Handler
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Every command handler receives the application context and the converted argument.
/// Commands without an argument are called with 0.
pub type Handler<C> = fn(&mut C, u16) -> Result<()>;

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                          Argument Kind
// —————————————————————————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArgKind {
  None,
  Hex,
}

impl ArgKind {
  /// False for commands that ignore their argument text
  pub fn takes_argument(self) -> bool {
    self != ArgKind::None
  }

  /// Converts validated argument text into the handler value
  pub fn convert(self, text: &[u8]) -> u16 {
    match self {
      ArgKind::None => 0,
      ArgKind::Hex => hex_to_u16(text),
    }
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                           Descriptor
// —————————————————————————————————————————————————————————————————————————————————————————————————

pub struct CommandDescriptor<C> {
  pub name:        &'static str,
  pub arg_kind:    ArgKind,
  pub max_arg_len: usize,
  pub handler:     Handler<C>,
  pub help:        &'static str,
}

impl<C> CommandDescriptor<C> {
  pub fn invoke(&self, ctx: &mut C, value: u16) -> Result<()> {
    (self.handler)(ctx, value)
  }
}

// —————————————————————————————————————————————————————————————————————————————————————————————————
//                                          Command Table
// —————————————————————————————————————————————————————————————————————————————————————————————————

/// Ordered, immutable list of commands.
pub struct CommandTable<C: 'static> {
  commands: &'static [CommandDescriptor<C>],
}

impl<C: 'static> CommandTable<C> {
  /// Names must be non-empty lowercase ascii without spaces, and unique.
  /// Checked at build time when the table is a `static`.
  pub const fn new(commands: &'static [CommandDescriptor<C>]) -> Self {
    let mut i = 0;
    while i < commands.len() {
      let name = commands[i].name.as_bytes();
      if name.is_empty() {
        panic!("command name is empty");
      }

      let mut b = 0;
      while b < name.len() {
        if name[b] == b' ' || name[b].is_ascii_uppercase() || !name[b].is_ascii_graphic() {
          panic!("command name must be lowercase ascii without spaces");
        }
        b += 1;
      }

      let mut j = 0;
      while j < i {
        if bytes_eq(commands[j].name.as_bytes(), name) {
          panic!("duplicate command name");
        }
        j += 1;
      }
      i += 1;
    }

    Self { commands }
  }

  /// Linear scan in table order. `name` must already be lowercase.
  pub fn find(&self, name: &[u8]) -> Option<&CommandDescriptor<C>> {
    self.commands.iter().find(|cmd| cmd.name.as_bytes() == name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor<C>> {
    self.commands.iter()
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  /// One `name - help` line per command, in table order
  pub fn write_help<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
    for cmd in self.commands.iter() {
      write!(out, "{} - {}\r\n", cmd.name, cmd.help)?;
    }
    Ok(())
  }
}

const fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  let mut i = 0;
  while i < a.len() {
    if a[i] != b[i] {
      return false;
    }
    i += 1;
  }
  true
}

// ————————————————————————————————————————————————————————————————————————————————————————————————
//                                              Tests
// ————————————————————————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
  use super::*;
  use std::string::String;

  fn noop(_: &mut u32, _: u16) -> Result<()> {
    Ok(())
  }

  fn store(ctx: &mut u32, value: u16) -> Result<()> {
    *ctx = value as u32;
    Ok(())
  }

  static TABLE: CommandTable<u32> = CommandTable::new(&[
    CommandDescriptor {
      name:        "hello",
      arg_kind:    ArgKind::None,
      max_arg_len: 0,
      handler:     noop,
      help:        "Says hello",
    },
    CommandDescriptor {
      name:        "logreg",
      arg_kind:    ArgKind::Hex,
      max_arg_len: 4,
      handler:     store,
      help:        "Set logger register",
    },
  ]);

  #[test]
  fn finds_by_exact_name() {
    assert_eq!(TABLE.find(b"logreg").map(|c| c.name), Some("logreg"));
    assert!(TABLE.find(b"LOGREG").is_none());
    assert!(TABLE.find(b"log").is_none());
    assert!(TABLE.find(b"").is_none());
  }

  #[test]
  fn invoke_calls_bound_handler() {
    let mut ctx = 0u32;
    TABLE.find(b"logreg").unwrap().invoke(&mut ctx, 0x1a2b).unwrap();
    assert_eq!(ctx, 0x1a2b);
  }

  #[test]
  fn help_lists_commands_in_order() {
    let mut out = String::new();
    TABLE.write_help(&mut out).unwrap();
    assert_eq!(out, "hello - Says hello\r\nlogreg - Set logger register\r\n");
  }

  #[test]
  fn arg_kind_conversion() {
    assert_eq!(ArgKind::Hex.convert(b"ff"), 0xff);
    assert_eq!(ArgKind::None.convert(b"ff"), 0);
    assert!(!ArgKind::None.takes_argument());
  }

  static DUPLICATES: [CommandDescriptor<u32>; 2] = [
    CommandDescriptor {
      name:        "a",
      arg_kind:    ArgKind::None,
      max_arg_len: 0,
      handler:     noop,
      help:        "",
    },
    CommandDescriptor {
      name:        "a",
      arg_kind:    ArgKind::None,
      max_arg_len: 0,
      handler:     noop,
      help:        "",
    },
  ];

  static UPPERCASE: [CommandDescriptor<u32>; 1] = [CommandDescriptor {
    name:        "Hello",
    arg_kind:    ArgKind::None,
    max_arg_len: 0,
    handler:     noop,
    help:        "",
  }];

  #[test]
  #[should_panic(expected = "duplicate command name")]
  fn rejects_duplicates() {
    let _ = CommandTable::new(&DUPLICATES);
  }

  #[test]
  #[should_panic(expected = "lowercase")]
  fn rejects_uppercase_names() {
    let _ = CommandTable::new(&UPPERCASE);
  }
}

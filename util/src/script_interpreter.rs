//! # Command script interpreter module
//!
//! This module provides an interpreter for command scripts: plain text files
//! holding one command per line. Blank lines and anything following a `#`
//! are ignored. Each command is parsed with the `FromStr` implementation of
//! the command type, so the interpreter knows nothing about the commands
//! themselves.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::fs;
use regex::Regex;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command read from the script.
#[derive(Debug)]
pub struct Command<T> {
    /// The (1-based) line number of the command in the script
    pub line: usize,

    /// The parsed command
    pub cmd: T
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.next_cmd` to
/// acquire the commands in order.
pub struct ScriptInterpreter<T> {
    script_path: Option<PathBuf>,
    cmds: VecDeque<Command<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty")]
    ScriptEmpty,

    #[error("Script contains an invalid command on line {0}: {1}")]
    InvalidCmd(usize, String)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: FromStr,
    T::Err: Display
{

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());
        
        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        let mut si = Self::from_script(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the text of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of commands
        let mut cmd_queue: VecDeque<Command<T>> = VecDeque::new();

        // Everything up to a comment marker, excluding surrounding whitespace
        let re = match Regex::new(r"^\s*([^#]*?)\s*(#.*)?$") {
            Ok(r) => r,
            Err(e) => return Err(ScriptError::InvalidCmd(0, e.to_string()))
        };

        for (idx, line) in script.lines().enumerate() {
            let payload = match re.captures(line).and_then(|c| c.get(1)) {
                Some(m) => m.as_str(),
                None => continue
            };

            if payload.is_empty() {
                continue
            }

            let cmd = match T::from_str(payload) {
                Ok(c) => c,
                Err(e) => return Err(ScriptError::InvalidCmd(
                    idx + 1, e.to_string()
                ))
            };

            cmd_queue.push_back(Command {
                line: idx + 1,
                cmd
            });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            script_path: None,
            cmds: cmd_queue
        })
    }

    /// Pop the next command from the script, or `None` at the end of the
    /// script.
    pub fn next_cmd(&mut self) -> Option<Command<T>> {
        self.cmds.pop_front()
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the path the script was loaded from, if any
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_script() {
        let script = "\
            # warm up\n\
            \n\
            12\n\
            \t 7   # trailing comment\n";

        let mut si = ScriptInterpreter::<u32>::from_script(script).unwrap();
        assert_eq!(si.get_num_cmds(), 2);

        let first = si.next_cmd().unwrap();
        assert_eq!(first.line, 3);
        assert_eq!(first.cmd, 12);

        let second = si.next_cmd().unwrap();
        assert_eq!(second.line, 4);
        assert_eq!(second.cmd, 7);

        assert!(si.next_cmd().is_none());
    }

    #[test]
    fn test_invalid_and_empty() {
        match ScriptInterpreter::<u32>::from_script("1\nfoo\n") {
            Err(ScriptError::InvalidCmd(2, _)) => (),
            _ => panic!("expected an invalid command on line 2")
        }

        assert!(matches!(
            ScriptInterpreter::<u32>::from_script("# nothing\n"),
            Err(ScriptError::ScriptEmpty)
        ));

        assert!(matches!(
            ScriptInterpreter::<u32>::new("/nonexistent/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}

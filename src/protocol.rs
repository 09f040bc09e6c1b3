//! Line protocol spoken with the referee.
//!
//! Initialisation: the cell count, then one `index richness n0 .. n5` line
//! per cell. Each request: day, nutrients, `sun score`,
//! `oppSun oppScore oppIsWaiting`, the tree count and one
//! `cell size isMine isDormant` line per tree, then the possible-move count
//! and that many move lines, which are skipped.

use std::{io::BufRead, str::FromStr};

use thiserror::Error;

use crate::{
    grid::{CellRecord, GridError, DIRECTIONS},
    state::{InputError, TreeRecord, TurnInput},
};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("input ended while reading {expected}")]
    MissingLine { expected: &'static str },
    #[error("malformed {expected} on line {line}: {text:?}")]
    Malformed {
        expected: &'static str,
        line: usize,
        text: String,
    },
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Input(#[from] InputError),
}

pub struct ProtocolReader<R> {
    input: R,
    line: usize,
    buffer: String,
}

impl<R: BufRead> ProtocolReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            buffer: String::new(),
        }
    }

    /// Lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn read_board(&mut self) -> Result<Vec<CellRecord>, ProtocolError> {
        let [count] = self.expect_fields::<usize, 1>("cell count")?;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let [id, richness, neighbors @ ..] =
                self.expect_fields::<i32, { 2 + DIRECTIONS }>("cell line")?;
            let malformed = || self.malformed("cell line");
            records.push(CellRecord {
                id: usize::try_from(id).map_err(|_| malformed())?,
                richness: u8::try_from(richness).map_err(|_| malformed())?,
                neighbors,
            });
        }
        Ok(records)
    }

    /// Reads one request. Returns `None` on a clean end of input before the
    /// first line of the request.
    pub fn read_turn(&mut self) -> Result<Option<TurnInput>, ProtocolError> {
        let Some(text) = self.next_line()? else {
            return Ok(None);
        };
        let [day] = self.parse_fields::<u32, 1>(&text, "day")?;
        let [nutrients] = self.expect_fields::<u32, 1>("nutrients")?;
        let [sun, score] = self.expect_fields::<u32, 2>("own sun and score")?;
        let [opp_sun, opp_score, opp_waiting] =
            self.expect_fields::<u32, 3>("opponent sun, score and waiting flag")?;

        let [tree_count] = self.expect_fields::<usize, 1>("tree count")?;
        let mut trees = Vec::with_capacity(tree_count);
        for _ in 0..tree_count {
            let [cell, size, is_mine, is_dormant] = self.expect_fields::<u32, 4>("tree line")?;
            trees.push(TreeRecord {
                cell: cell as usize,
                size: u8::try_from(size).map_err(|_| self.malformed("tree line"))?,
                is_mine: is_mine != 0,
                is_dormant: is_dormant != 0,
            });
        }

        let [moves] = self.expect_fields::<usize, 1>("possible move count")?;
        for _ in 0..moves {
            self.expect_line("possible move")?;
        }

        Ok(Some(TurnInput {
            day,
            nutrients,
            sun,
            score,
            opp_sun,
            opp_score,
            opp_waiting: opp_waiting != 0,
            trees,
        }))
    }

    fn next_line(&mut self) -> Result<Option<String>, ProtocolError> {
        self.buffer.clear();
        if self.input.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(self.buffer.trim().to_string()))
    }

    fn expect_line(&mut self, expected: &'static str) -> Result<String, ProtocolError> {
        self.next_line()?
            .ok_or(ProtocolError::MissingLine { expected })
    }

    fn expect_fields<T: FromStr, const N: usize>(
        &mut self,
        expected: &'static str,
    ) -> Result<[T; N], ProtocolError> {
        let text = self.expect_line(expected)?;
        self.parse_fields(&text, expected)
    }

    fn parse_fields<T: FromStr, const N: usize>(
        &self,
        text: &str,
        expected: &'static str,
    ) -> Result<[T; N], ProtocolError> {
        let values = text
            .split_whitespace()
            .map(str::parse::<T>)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|_| self.malformed_text(expected, text))?;
        values
            .try_into()
            .map_err(|_| self.malformed_text(expected, text))
    }

    fn malformed(&self, expected: &'static str) -> ProtocolError {
        self.malformed_text(expected, self.buffer.trim())
    }

    fn malformed_text(&self, expected: &'static str, text: &str) -> ProtocolError {
        ProtocolError::Malformed {
            expected,
            line: self.line,
            text: text.to_string(),
        }
    }
}

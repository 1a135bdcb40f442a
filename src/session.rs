//! Interactive prompt loop
//!
//! Asks for a state, lists its sites, and shows the places near whichever
//! site the user picks. Every fetch goes through the response cache.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::cache::{CacheError, ResponseCache};
use crate::data::SiteRecord;
use crate::lookup::{self, LookupError, PlacesSource, SiteSource};
use crate::ui;

pub const STATE_PROMPT: &str = "Enter a state name(e.g. Michigan,michigan) or 'exit'";
pub const SELECTION_PROMPT: &str = "Choose the number for further details or 'exit' or 'back'";
pub const INVALID_STATE: &str = "[ERROR] Enter proper state name";
pub const INVALID_INPUT: &str = "[ERROR] Invalid Input";

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading input or writing output failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A fetch failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The final cache flush failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// What the user typed at the site selection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index of the chosen site
    Site(usize),
    Back,
    Exit,
    Invalid,
}

/// Parses a selection against a list of `count` sites
///
/// Sites are numbered from 1, so `"3"` selects index 2 and `"0"` is invalid.
pub fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim();
    if input.eq_ignore_ascii_case("back") {
        return Selection::Back;
    }
    if input.eq_ignore_ascii_case("exit") {
        return Selection::Exit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Selection::Site(n - 1),
        _ => Selection::Invalid,
    }
}

/// Where the selection loop hands control back to
enum Flow {
    Back,
    Exit,
}

/// Writes a prompt and reads one line of input
///
/// Returns `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    writeln!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// One interactive session over a cache and its sources
pub struct Session<'a, S, P> {
    cache: &'a mut ResponseCache,
    sites: &'a S,
    places: &'a P,
}

impl<'a, S: SiteSource, P: PlacesSource> Session<'a, S, P> {
    pub fn new(cache: &'a mut ResponseCache, sites: &'a S, places: &'a P) -> Self {
        Self {
            cache,
            sites,
            places,
        }
    }

    /// Runs the prompt loop until the user exits or input ends
    ///
    /// The cache is flushed once more before returning normally. A failed
    /// fetch ends the session with an error.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), SessionError> {
        while let Some(state_name) = prompt(&mut input, &mut output, STATE_PROMPT)? {
            if state_name.eq_ignore_ascii_case("exit") {
                break;
            }

            let directory = lookup::state_directory(self.cache, self.sites).await?;
            let Some(state_url) = directory.url_for(&state_name) else {
                writeln!(output, "{}\n", INVALID_STATE)?;
                continue;
            };

            let sites = lookup::sites_for_state(self.cache, self.sites, state_url).await?;
            ui::render_site_list(&mut output, &state_name, &sites)?;

            match self.choose_site(&mut input, &mut output, &sites).await? {
                Flow::Back => continue,
                Flow::Exit => break,
            }
        }

        writeln!(output, "Bye")?;
        self.cache.save()?;
        Ok(())
    }

    async fn choose_site<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        sites: &[SiteRecord],
    ) -> Result<Flow, SessionError> {
        while let Some(choice) = prompt(input, output, SELECTION_PROMPT)? {
            match parse_selection(&choice, sites.len()) {
                Selection::Site(index) => {
                    let site = &sites[index];
                    let nearby = lookup::nearby_places(self.cache, self.places, site).await?;
                    ui::render_nearby_places(output, site, &nearby)?;
                }
                Selection::Back => return Ok(Flow::Back),
                Selection::Exit => return Ok(Flow::Exit),
                Selection::Invalid => writeln!(output, "{}\n", INVALID_INPUT)?,
            }
        }
        Ok(Flow::Exit)
    }
}

// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Hit grading and note bookkeeping

use std::time::Duration;

use crate::config::KaraokeConfig;
use crate::render::{colors, Color};
use crate::scene::karaoke::session::{KaraokeSession, KaraokeSound};

/// How close a press landed to its note
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KaraokeGrade {
    /// Outside every window
    Miss,
    /// Inside the good window
    Good,
    /// Inside the great window
    Great,
    /// Inside the perfect window
    Perfect,
}

impl KaraokeGrade {
    /// Points awarded
    pub fn points(self) -> u32 {
        match self {
            KaraokeGrade::Miss => 0,
            KaraokeGrade::Good => 20,
            KaraokeGrade::Great => 40,
            KaraokeGrade::Perfect => 80,
        }
    }

    /// Text shown when the grade is awarded
    pub fn label(self) -> &'static str {
        match self {
            KaraokeGrade::Miss => "Miss",
            KaraokeGrade::Good => "Good",
            KaraokeGrade::Great => "Great",
            KaraokeGrade::Perfect => "Perfect",
        }
    }

    /// Colour of the floating label
    pub fn color(self) -> Color {
        match self {
            KaraokeGrade::Perfect => colors::YELLOW,
            KaraokeGrade::Miss => colors::RED,
            _ => colors::WHITE,
        }
    }
}

/// Upper bounds of each grade's window, exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWindows {
    /// Perfect window
    pub perfect: Duration,
    /// Great window
    pub great: Duration,
    /// Good window
    pub good: Duration,
}

impl ScoreWindows {
    /// Windows from config
    pub fn from_config(config: &KaraokeConfig) -> Self {
        ScoreWindows {
            perfect: Duration::from_millis(config.perfect_window_ms),
            great: Duration::from_millis(config.great_window_ms),
            good: Duration::from_millis(config.good_window_ms),
        }
    }

    /// Grade a press at `hit` against a note due at `target`
    pub fn grade(&self, hit: Duration, target: Duration) -> KaraokeGrade {
        let delta = if hit > target { hit - target } else { target - hit };
        if delta < self.perfect {
            KaraokeGrade::Perfect
        } else if delta < self.great {
            KaraokeGrade::Great
        } else if delta < self.good {
            KaraokeGrade::Good
        } else {
            KaraokeGrade::Miss
        }
    }
}

impl Default for ScoreWindows {
    fn default() -> Self {
        ScoreWindows::from_config(&KaraokeConfig::default())
    }
}

/// A note and whether it was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// Sound that hits it
    pub sound: KaraokeSound,
    /// When it is due
    pub target: Duration,
    /// When it was hit
    pub hit: Option<Duration>,
}

/// Every note of a session with hit state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTrack {
    notes: Vec<Note>,
    windows: ScoreWindows,
}

impl NoteTrack {
    /// Track for a validated session; unknown sound ids are skipped
    pub fn new(session: &KaraokeSession, windows: ScoreWindows) -> Self {
        let notes = session
            .inputs
            .iter()
            .filter_map(|input| {
                KaraokeSound::from_id(input.sound).map(|sound| Note {
                    sound,
                    target: input.target(),
                    hit: None,
                })
            })
            .collect();
        NoteTrack { notes, windows }
    }

    /// Notes in session order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Register a press of `sound` at `now`.
    ///
    /// The unhit note of that sound with the best non-miss grade records the
    /// hit; on a tie the earlier note wins. Returns the note index and grade,
    /// or `None` when no note was close enough.
    pub fn register_press(&mut self, sound: KaraokeSound, now: Duration) -> Option<(usize, KaraokeGrade)> {
        let mut best: Option<(usize, KaraokeGrade)> = None;
        for (index, note) in self.notes.iter().enumerate() {
            if note.sound != sound || note.hit.is_some() {
                continue;
            }
            let grade = self.windows.grade(now, note.target);
            if grade != KaraokeGrade::Miss && best.map_or(true, |(_, current)| grade > current) {
                best = Some((index, grade));
            }
        }
        if let Some((index, _)) = best {
            self.notes[index].hit = Some(now);
        }
        best
    }

    /// Grade of a note; unhit notes are misses
    pub fn grade_of(&self, note: &Note) -> KaraokeGrade {
        note.hit
            .map_or(KaraokeGrade::Miss, |hit| self.windows.grade(hit, note.target))
    }

    /// One plus the points of every note
    pub fn total_score(&self) -> u32 {
        1 + self
            .notes
            .iter()
            .map(|note| self.grade_of(note).points())
            .sum::<u32>()
    }

    /// Number of notes hit so far
    pub fn hit_count(&self) -> usize {
        self.notes.iter().filter(|note| note.hit.is_some()).count()
    }
}
